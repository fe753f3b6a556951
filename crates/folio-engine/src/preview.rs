//! Plain-text and image extraction for activity listings.
//!
//! Every function here is total: malformed markup yields less text, never an
//! error.

use crate::html::{self, HtmlNode, parse_fragment};
use crate::model::{Document, Inline, Node};
use crate::parse::from_html;

pub const DEFAULT_PREVIEW_LENGTH: usize = 150;
pub const ELLIPSIS: char = '…';

/// Text of every block in document order, joined with single spaces.
/// Embeds, images and rules contribute nothing.
pub fn extract_plain_text(doc: &Document) -> String {
    let mut parts = Vec::new();
    for node in &doc.content {
        collect_block_text(node, &mut parts);
    }
    collapse_whitespace(&parts.join(" "))
}

fn collect_block_text(node: &Node, parts: &mut Vec<String>) {
    match node {
        Node::Paragraph { content, .. } | Node::Heading { content, .. } => {
            parts.push(inline_text(content));
        }
        Node::BulletList { content }
        | Node::OrderedList { content, .. }
        | Node::ListItem { content }
        | Node::TaskList { content }
        | Node::TaskItem { content, .. }
        | Node::Blockquote { content } => {
            for child in content {
                collect_block_text(child, parts);
            }
        }
        Node::CodeBlock { text, .. } => parts.push(text.clone()),
        Node::RawHtml { html } => parts.push(html::text_content(&parse_fragment(html))),
        Node::Image { .. }
        | Node::HorizontalRule
        | Node::AlignableEmbed { .. }
        | Node::SocialEmbed { .. } => {}
    }
}

fn inline_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text { text, .. } => out.push_str(text),
            Inline::HardBreak => out.push(' '),
            Inline::RawHtml { html, .. } => {
                out.push_str(&html::text_content(&[HtmlNode::Raw(html.clone())]))
            }
        }
    }
    out
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Source of the first image in document order, including images inside
/// preserved markup.
pub fn extract_first_image(doc: &Document) -> Option<String> {
    doc.descendants().into_iter().find_map(|(_, node)| match node {
        Node::Image { attrs } if !attrs.src.trim().is_empty() => Some(attrs.src.clone()),
        Node::RawHtml { html } => first_img_src(&parse_fragment(html)),
        _ => None,
    })
}

fn first_img_src(nodes: &[HtmlNode]) -> Option<String> {
    nodes.iter().filter_map(HtmlNode::as_element).find_map(|element| {
        if element.tag == "img" {
            return element
                .attr("src")
                .filter(|src| !src.trim().is_empty())
                .map(str::to_string);
        }
        first_img_src(&element.children)
    })
}

/// Plain text cut to at most `max_chars` characters on a word boundary, with
/// an ellipsis appended when anything was cut.
pub fn preview_blurb(doc: &Document, max_chars: usize) -> String {
    truncate_words(&extract_plain_text(doc), max_chars)
}

pub fn extract_plain_text_from_html(html: &str) -> String {
    extract_plain_text(&from_html(html))
}

pub fn extract_first_image_from_html(html: &str) -> Option<String> {
    extract_first_image(&from_html(html))
}

pub fn preview_blurb_from_html(html: &str, max_chars: usize) -> String {
    preview_blurb(&from_html(html), max_chars)
}

fn truncate_words(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    let next_is_space = text
        .chars()
        .nth(max_chars)
        .is_some_and(char::is_whitespace);
    let kept = if next_is_space {
        cut.as_str()
    } else {
        // A single word longer than the limit is cut mid-word.
        cut.rfind(char::is_whitespace)
            .map_or(cut.as_str(), |index| &cut[..index])
    };
    let mut out = kept.trim_end().to_string();
    out.push(ELLIPSIS);
    out
}
