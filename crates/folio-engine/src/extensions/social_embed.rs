//! Social post embed.
//!
//! The serializer writes an inert placeholder and nothing else; the live
//! widget is mounted later by the hydrator. Post identifiers are opaque
//! strings throughout.

use crate::html::{Element, HtmlNode};
use crate::model::{Node, SocialEmbedAttrs};
use regex::Regex;
use std::sync::OnceLock;

pub const MARKER: &str = "data-social-embed";
pub const KIND_ATTR: &str = "data-embed-kind";
pub const KIND: &str = "social";
pub const ID_ATTR: &str = "data-embed-id";
/// Identifier attribute written by an earlier version of the editor.
pub const LEGACY_ID_ATTR: &str = "data-tweet-id";
/// Set by the hydrator once a placeholder has been handled.
pub const PROCESSED_ATTR: &str = "data-embed-processed";
/// Class of the provider's own static blockquote markup.
pub const PROVIDER_CLASS: &str = "twitter-tweet";

pub const CANONICAL_BASE: &str = "https://x.com/i/status";
pub const PLACEHOLDER_CLASS: &str = "social-embed my-6";

pub const INVALID_ATTR: &str = "data-embed-invalid";
pub const INVALID_CLASS: &str = "social-embed-invalid my-6 rounded border border-dashed p-4";
pub const INVALID_MESSAGE: &str = "This post embed has no post id and cannot be shown.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmbedUrlError {
    #[error("post URL is empty")]
    Empty,
    #[error("not a post status URL: {0}")]
    NotStatusUrl(String),
}

static STATUS_URL_REGEX: OnceLock<Regex> = OnceLock::new();

fn status_url_regex() -> &'static Regex {
    STATUS_URL_REGEX.get_or_init(|| {
        Regex::new(
            r"^https?://(?:www\.|mobile\.)?(?:twitter\.com|x\.com)/[A-Za-z0-9_]{1,15}/status(?:es)?/([0-9]{1,20})(?:[/?#].*)?$",
        )
        .expect("Invalid status URL regex")
    })
}

/// Pull the post id out of a status URL such as
/// `https://x.com/someone/status/1790123456789012345?s=20`.
pub fn extract_status_id(url: &str) -> Result<String, EmbedUrlError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(EmbedUrlError::Empty);
    }
    status_url_regex()
        .captures(url)
        .map(|captures| captures[1].to_string())
        .ok_or_else(|| EmbedUrlError::NotStatusUrl(url.to_string()))
}

/// Build a social embed node for a known post id. Blank ids yield no node.
pub fn create(external_id: &str) -> Option<Node> {
    let attrs = SocialEmbedAttrs::new(external_id);
    attrs.is_valid().then_some(Node::SocialEmbed { attrs })
}

/// Public link to a post, used by fallback cards.
pub fn canonical_url(external_id: &str) -> String {
    canonical_url_with(CANONICAL_BASE, external_id)
}

pub fn canonical_url_with(base: &str, external_id: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), external_id)
}

/// Placeholder markup. An embed without an id gets no id attribute.
pub fn render(attrs: &SocialEmbedAttrs) -> Element {
    let mut placeholder = Element::new("div")
        .with_attr(MARKER, "")
        .with_attr(KIND_ATTR, KIND);
    if let Some(id) = &attrs.external_id {
        placeholder.set_attr(ID_ATTR, id);
    }
    placeholder.with_attr("class", PLACEHOLDER_CLASS)
}

/// Visible marker for an embed that has no post id.
pub fn render_invalid() -> Element {
    Element::new("div")
        .with_attr(INVALID_ATTR, "")
        .with_attr("class", INVALID_CLASS)
        .with_attr("role", "note")
        .with_child(HtmlNode::text(INVALID_MESSAGE))
}

/// Whether an element is one of our placeholders, current or legacy.
pub fn is_marked(element: &Element) -> bool {
    element.has_attr(MARKER)
        || element.attr(KIND_ATTR) == Some(KIND)
        || element.has_attr(LEGACY_ID_ATTR)
}

pub fn placeholder_id(element: &Element) -> Option<&str> {
    element
        .attr(ID_ATTR)
        .or_else(|| element.attr(LEGACY_ID_ATTR))
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

/// Read a placeholder back. A missing or empty id still yields a node, so the
/// embed stays visible (as invalid) instead of vanishing from the document.
pub fn parse(element: &Element) -> Node {
    Node::SocialEmbed {
        attrs: SocialEmbedAttrs {
            external_id: placeholder_id(element).map(str::to_string),
        },
    }
}

pub fn is_provider_markup(element: &Element) -> bool {
    element.tag == "blockquote" && element.has_class(PROVIDER_CLASS)
}

/// Recognise the provider's static `<blockquote class="twitter-tweet">`
/// markup by its status link. Returns `None` when no link carries a status
/// id, so the quote is read as an ordinary blockquote.
pub fn parse_provider_markup(element: &Element) -> Option<Node> {
    let mut links = Vec::new();
    collect_links(element, &mut links);
    links
        .into_iter()
        .rev()
        .find_map(|href| extract_status_id(href).ok())
        .and_then(|id| create(&id))
}

fn collect_links<'a>(element: &'a Element, out: &mut Vec<&'a str>) {
    for child in element.child_elements() {
        if child.tag == "a"
            && let Some(href) = child.attr("href")
        {
            out.push(href);
        }
        collect_links(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::parse_fragment;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("https://twitter.com/jack/status/20", "20")]
    #[case("https://x.com/some_user/status/1790123456789012345", "1790123456789012345")]
    #[case("http://mobile.twitter.com/a/statuses/123/photo/1", "123")]
    #[case("https://www.x.com/a/status/123?s=20", "123")]
    #[case("https://x.com/a/status/123#reply", "123")]
    #[case(" https://x.com/a/status/123 ", "123")]
    fn test_extract_status_id_accepts(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(extract_status_id(url), Ok(expected.to_string()));
    }

    #[rstest]
    #[case("https://x.com/a/status/")]
    #[case("https://x.com/a/status/12ab")]
    #[case("https://x.com/this_name_is_far_too_long/status/1")]
    #[case("https://x.com/a/status/123456789012345678901")]
    #[case("https://example.com/a/status/1")]
    #[case("ftp://x.com/a/status/1")]
    #[case("x.com/a/status/1")]
    #[case("https://x.com/a/likes/1")]
    fn test_extract_status_id_rejects(#[case] url: &str) {
        assert!(matches!(
            extract_status_id(url),
            Err(EmbedUrlError::NotStatusUrl(_))
        ));
    }

    #[test]
    fn test_extract_status_id_empty() {
        assert_eq!(extract_status_id("   "), Err(EmbedUrlError::Empty));
    }

    #[test]
    fn test_canonical_url_is_deterministic() {
        assert_eq!(canonical_url("42"), "https://x.com/i/status/42");
        assert_eq!(
            canonical_url_with("https://example.com/status/", "42"),
            "https://example.com/status/42"
        );
    }

    #[test]
    fn test_render_placeholder() {
        let element = render(&SocialEmbedAttrs::new("1790123456789012345"));
        assert_eq!(
            element.outer_html(),
            r#"<div data-social-embed="" data-embed-kind="social" data-embed-id="1790123456789012345" class="social-embed my-6"></div>"#
        );
    }

    #[test]
    fn test_parse_missing_id_keeps_node() {
        let element = Element::new("div").with_attr(MARKER, "");
        assert_eq!(
            parse(&element),
            Node::SocialEmbed {
                attrs: SocialEmbedAttrs { external_id: None }
            }
        );
    }

    #[test]
    fn test_parse_legacy_id() {
        let element = Element::new("div").with_attr(LEGACY_ID_ATTR, "77");
        assert!(is_marked(&element));
        assert_eq!(
            parse(&element),
            Node::SocialEmbed {
                attrs: SocialEmbedAttrs::new("77")
            }
        );
    }

    #[test]
    fn test_parse_provider_markup() {
        let nodes = parse_fragment(
            r#"<blockquote class="twitter-tweet"><p lang="en">Hello</p>&mdash; A (@a) <a href="https://twitter.com/a/status/555?ref_src=twsrc%5Etfw">May 1, 2024</a></blockquote>"#,
        );
        let quote = nodes.iter().find_map(HtmlNode::as_element).unwrap();
        assert!(is_provider_markup(quote));
        assert_eq!(
            parse_provider_markup(quote),
            Some(Node::SocialEmbed {
                attrs: SocialEmbedAttrs::new("555")
            })
        );
    }
}
