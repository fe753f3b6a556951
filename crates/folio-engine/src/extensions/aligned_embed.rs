//! Video frame embed that carries its own horizontal alignment.
//!
//! Alignment lives on the wrapper element as a flex layout, never on the
//! iframe, so the frame itself stays free of presentation attributes:
//!
//! ```html
//! <div data-alignable-embed="" class="..." style="display: flex; justify-content: center">
//!   <iframe src="..." width="640" height="480" frameborder="0" allowfullscreen=""></iframe>
//! </div>
//! ```

use crate::html::{Element, style};
use crate::model::{AlignableEmbedAttrs, Align, DEFAULT_EMBED_HEIGHT, DEFAULT_EMBED_WIDTH, Node};
use regex::Regex;
use std::sync::OnceLock;

pub const MARKER: &str = "data-alignable-embed";
/// Marker written by an earlier version of the editor.
pub const LEGACY_MARKER: &str = "data-youtube-video";

pub const WRAPPER_CLASS: &str = "alignable-embed my-6 w-full";
const FRAME_ALLOW: &str =
    "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture";

static VIDEO_PAGE_REGEX: OnceLock<Regex> = OnceLock::new();

fn video_page_regex() -> &'static Regex {
    VIDEO_PAGE_REGEX.get_or_init(|| {
        Regex::new(
            r"^https?://(?:www\.|m\.)?(?:youtube\.com/(?:watch\?(?:[^#]*&)?v=|shorts/)|youtu\.be/)([A-Za-z0-9_-]+)",
        )
        .expect("Invalid video page regex")
    })
}

/// Build an aligned embed node. A blank `src` yields no node; zero sizes fall
/// back to the defaults.
pub fn create(src: &str, width: Option<u32>, height: Option<u32>, align: Align) -> Option<Node> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }
    Some(Node::AlignableEmbed {
        attrs: AlignableEmbedAttrs {
            src: Some(src.to_string()),
            width: width.filter(|w| *w > 0).unwrap_or(DEFAULT_EMBED_WIDTH),
            height: height.filter(|h| *h > 0).unwrap_or(DEFAULT_EMBED_HEIGHT),
            align,
        },
    })
}

/// Alignment for a new embed: the explicit choice if there is one, otherwise
/// the alignment of the text block at the insertion point.
pub fn inherit_align(explicit: Option<Align>, context: Option<Align>) -> Align {
    explicit.or(context).unwrap_or_default()
}

/// Rewrite a video page URL into its embeddable form. URLs that are not
/// recognised video pages are returned unchanged.
pub fn embed_url(url: &str) -> String {
    let url = url.trim();
    match video_page_regex().captures(url) {
        Some(captures) => format!("https://www.youtube-nocookie.com/embed/{}", &captures[1]),
        None => url.to_string(),
    }
}

pub fn render(attrs: &AlignableEmbedAttrs) -> Element {
    let mut frame = Element::new("iframe");
    if let Some(src) = &attrs.src {
        frame.set_attr("src", src);
    }
    frame.set_attr("width", attrs.width.to_string());
    frame.set_attr("height", attrs.height.to_string());
    frame.set_attr("frameborder", "0");
    frame.set_attr("allow", FRAME_ALLOW);
    frame.set_attr("allowfullscreen", "");

    let mut wrapper = Element::new("div")
        .with_attr(MARKER, "")
        .with_attr("class", WRAPPER_CLASS);
    match attrs.align {
        Align::Left => {}
        Align::Center => wrapper.set_attr("style", "display: flex; justify-content: center"),
        Align::Right => wrapper.set_attr("style", "display: flex; justify-content: flex-end"),
    }
    wrapper.with_child(frame)
}

pub fn is_marked(element: &Element) -> bool {
    element.has_attr(MARKER) || element.has_attr(LEGACY_MARKER)
}

/// Read an aligned embed back from its wrapper. Returns `None` when the
/// wrapper holds no iframe, in which case the caller keeps the markup as is.
pub fn parse(wrapper: &Element) -> Option<Node> {
    let frame = wrapper.find_tag("iframe")?;
    let src = frame
        .attr("src")
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(str::to_string);
    Some(Node::AlignableEmbed {
        attrs: AlignableEmbedAttrs {
            src,
            width: parse_dimension(frame.attr("width"), DEFAULT_EMBED_WIDTH),
            height: parse_dimension(frame.attr("height"), DEFAULT_EMBED_HEIGHT),
            align: align_from_style(wrapper.attr("style")),
        },
    })
}

/// Infer alignment from the wrapper's inline style. The check is a substring
/// match on the whitespace-free, lowercased style text; anything that is not
/// a centred or end-justified flex layout reads as left.
pub fn align_from_style(style: Option<&str>) -> Align {
    let Some(style) = style else {
        return Align::Left;
    };
    let compact = style::compact(style);
    if compact.contains("justify-content:center") {
        Align::Center
    } else if compact.contains("justify-content:flex-end") {
        Align::Right
    } else {
        Align::Left
    }
}

/// Integer value of a size attribute. Leading digits are read the way
/// browsers read `width="640px"`; anything without them, or zero, gives the
/// default.
pub fn parse_dimension(value: Option<&str>, default: u32) -> u32 {
    let Some(value) = value else {
        return default;
    };
    let digits: String = value
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    match digits.parse::<u32>() {
        Ok(parsed) if parsed > 0 => parsed,
        _ => default,
    }
}
