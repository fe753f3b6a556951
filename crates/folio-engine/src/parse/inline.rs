use crate::html::{Element, HtmlNode};
use crate::model::{ImageAttrs, Inline, LinkAttrs, Mark, Node, marks::with_mark};

/// Result of reading inline content: either an inline run, or an image that
/// has to be hoisted out of the surrounding text block.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum InlineItem {
    Inline(Inline),
    Image(Node),
}

/// Tags that are phrasing content. At block level they start an implicit
/// paragraph instead of being treated as blocks.
const PHRASING_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "big", "br", "button", "cite", "code", "data", "del", "dfn",
    "em", "font", "i", "input", "ins", "kbd", "label", "mark", "meter", "output", "progress", "q",
    "ruby", "s", "samp", "select", "small", "span", "strike", "strong", "sub", "sup", "textarea",
    "time", "tt", "u", "var", "wbr",
];

pub(crate) fn is_phrasing(element: &Element) -> bool {
    PHRASING_TAGS.contains(&element.tag.as_str())
}

/// Mark an element stands for, if any. Matching is on tag names only.
pub(crate) fn mark_for(element: &Element) -> Option<Mark> {
    let mark = match element.tag.as_str() {
        "strong" | "b" => Mark::Bold,
        "em" | "i" => Mark::Italic,
        "u" => Mark::Underline,
        "s" | "strike" | "del" => Mark::Strike,
        "code" => Mark::Code,
        "mark" => Mark::Highlight,
        "a" => Mark::Link {
            attrs: LinkAttrs {
                href: element.attr("href")?.to_string(),
                target: element.attr("target").map(str::to_string),
            },
        },
        _ => return None,
    };
    Some(mark)
}

pub(crate) fn image_from(element: &Element) -> Node {
    Node::Image {
        attrs: ImageAttrs {
            src: element.attr("src").unwrap_or_default().to_string(),
            alt: element.attr("alt").map(str::to_string),
            title: element.attr("title").map(str::to_string),
        },
    }
}

/// Read inline content, carrying the marks of enclosing elements down to
/// every run. Unknown elements become raw inline fragments that keep those
/// marks.
pub(crate) fn collect_inlines(nodes: &[HtmlNode], marks: &[Mark], out: &mut Vec<InlineItem>) {
    for node in nodes {
        match node {
            HtmlNode::Text(text) => out.push(InlineItem::Inline(Inline::Text {
                text: text.clone(),
                marks: marks.to_vec(),
            })),
            HtmlNode::Comment(_) => {}
            HtmlNode::Raw(html) => out.push(InlineItem::Inline(Inline::RawHtml {
                html: html.clone(),
                marks: marks.to_vec(),
            })),
            HtmlNode::Element(element) => collect_element(element, marks, out),
        }
    }
}

fn collect_element(element: &Element, marks: &[Mark], out: &mut Vec<InlineItem>) {
    if element.tag == "br" {
        out.push(InlineItem::Inline(Inline::HardBreak));
        return;
    }
    if element.tag == "img" {
        out.push(InlineItem::Image(image_from(element)));
        return;
    }
    if let Some(mark) = mark_for(element) {
        let nested = with_mark(marks, mark);
        collect_inlines(&element.children, &nested, out);
        return;
    }
    if element.tag == "span" && element.attrs.is_empty() {
        collect_inlines(&element.children, marks, out);
        return;
    }
    log::debug!("Keeping unrecognised inline <{}> as raw HTML", element.tag);
    out.push(InlineItem::Inline(Inline::RawHtml {
        html: element.outer_html(),
        marks: marks.to_vec(),
    }));
}
