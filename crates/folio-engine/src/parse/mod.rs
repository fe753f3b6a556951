/*!
 * # Parser (HTML to tree)
 *
 * Inverse of the serializer. Input is run through html5ever and mapped to
 * nodes by tag name and marker attributes. Presentation classes are never
 * consulted.
 *
 * Parsing is total. Markup that no node kind claims is kept verbatim as a
 * `rawHtml` node (or an inline raw fragment inside text), so text is never
 * lost, and the result always satisfies the document's composition rules.
 */

mod inline;

use crate::extensions::{aligned_embed, social_embed};
use crate::html::{Element, HtmlNode, is_blank, is_html_space, parse_fragment, style};
use crate::model::{
    Align, CodeBlockAttrs, Document, HeadingAttrs, Inline, MAX_HEADING_LEVEL, Node,
    OrderedListAttrs, TaskItemAttrs, TextAttrs, normalize_inlines,
};
use inline::{InlineItem, collect_inlines, image_from, is_phrasing};

/// Parse persisted HTML into a document.
pub fn from_html(html: &str) -> Document {
    Document::new(parse_nodes(&parse_fragment(html)))
}

/// Map already parsed HTML nodes to document nodes.
pub fn parse_nodes(nodes: &[HtmlNode]) -> Vec<Node> {
    let mut blocks = BlockBuilder::default();
    for node in nodes {
        match node {
            HtmlNode::Comment(_) => {}
            HtmlNode::Text(_) | HtmlNode::Raw(_) => blocks.pending.push(node.clone()),
            HtmlNode::Element(element) => {
                if element.tag == "img" {
                    blocks.flush();
                    blocks.out.push(image_from(element));
                } else if is_block(element) {
                    blocks.flush();
                    blocks.out.extend(parse_block(element));
                } else {
                    blocks.pending.push(node.clone());
                }
            }
        }
    }
    blocks.flush();
    blocks.out
}

/// Accumulates block output, turning runs of bare inline content into
/// implicit paragraphs.
#[derive(Default)]
struct BlockBuilder {
    out: Vec<Node>,
    pending: Vec<HtmlNode>,
}

impl BlockBuilder {
    fn flush(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        if pending.iter().all(HtmlNode::is_blank_text) {
            return;
        }
        let mut items = Vec::new();
        collect_inlines(&pending, &[], &mut items);
        self.out
            .extend(split_text_block(&items, true, |content| Node::Paragraph {
                attrs: TextAttrs::default(),
                content,
            }));
    }
}

/// Whether an element is handled at block level rather than as part of an
/// implicit paragraph.
fn is_block(element: &Element) -> bool {
    aligned_embed::is_marked(element) || social_embed::is_marked(element) || !is_phrasing(element)
}

fn parse_block(element: &Element) -> Vec<Node> {
    if social_embed::is_marked(element) {
        return vec![social_embed::parse(element)];
    }
    if aligned_embed::is_marked(element) {
        return match aligned_embed::parse(element) {
            Some(node) => vec![node],
            None => {
                log::debug!("Aligned embed wrapper without a frame, keeping it as raw HTML");
                vec![raw(element)]
            }
        };
    }

    match element.tag.as_str() {
        "p" => {
            let align = text_align(element);
            text_block(element, |content| Node::Paragraph {
                attrs: TextAttrs { text_align: align },
                content,
            })
        }
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = element.tag[1..]
                .parse::<u8>()
                .unwrap_or(1)
                .min(MAX_HEADING_LEVEL);
            let align = text_align(element);
            text_block(element, |content| Node::Heading {
                attrs: HeadingAttrs {
                    level,
                    text_align: align,
                },
                content,
            })
        }
        "ul" if element.attr("data-type") == Some("taskList") => {
            wrap_list(list_items(element, task_item), |content| Node::TaskList { content })
        }
        "ul" => wrap_list(list_items(element, list_item), |content| Node::BulletList {
            content,
        }),
        "ol" => {
            let start = element
                .attr("start")
                .and_then(|start| start.trim().parse::<u32>().ok())
                .unwrap_or(1);
            wrap_list(list_items(element, list_item), |content| Node::OrderedList {
                attrs: OrderedListAttrs { start },
                content,
            })
        }
        "blockquote" => {
            if social_embed::is_provider_markup(element)
                && let Some(node) = social_embed::parse_provider_markup(element)
            {
                return vec![node];
            }
            vec![Node::Blockquote {
                content: non_empty(parse_nodes(&element.children)),
            }]
        }
        "pre" => vec![code_block(element)],
        "hr" => vec![Node::HorizontalRule],
        _ => vec![raw(element)],
    }
}

fn raw(element: &Element) -> Node {
    log::debug!("Keeping unrecognised <{}> as raw HTML", element.tag);
    Node::RawHtml {
        html: element.outer_html(),
    }
}

fn text_align(element: &Element) -> Option<Align> {
    element
        .attr("style")
        .and_then(|css| style::property(css, "text-align"))
        .and_then(|value| Align::parse(&value))
}

fn text_block(element: &Element, build: impl Fn(Vec<Inline>) -> Node) -> Vec<Node> {
    let mut items = Vec::new();
    collect_inlines(&element.children, &[], &mut items);
    split_text_block(&items, false, build)
}

/// Turn inline items into text blocks, hoisting images out as sibling image
/// blocks. Without images the whole run becomes a single block, even an empty
/// one. With images, segments holding only whitespace are dropped.
fn split_text_block(
    items: &[InlineItem],
    trim: bool,
    build: impl Fn(Vec<Inline>) -> Node,
) -> Vec<Node> {
    let has_images = items
        .iter()
        .any(|item| matches!(item, InlineItem::Image(_)));
    if !has_images {
        let inlines = items
            .iter()
            .filter_map(|item| match item {
                InlineItem::Inline(inline) => Some(inline.clone()),
                InlineItem::Image(_) => None,
            })
            .collect();
        return vec![build(finish_inlines(inlines, trim))];
    }

    let mut out = Vec::new();
    let mut segment: Vec<Inline> = Vec::new();
    for item in items {
        match item {
            InlineItem::Inline(inline) => segment.push(inline.clone()),
            InlineItem::Image(image) => {
                push_segment(&mut out, std::mem::take(&mut segment), &build);
                out.push(image.clone());
            }
        }
    }
    push_segment(&mut out, segment, &build);
    out
}

fn push_segment(out: &mut Vec<Node>, segment: Vec<Inline>, build: &impl Fn(Vec<Inline>) -> Node) {
    let blank = segment
        .iter()
        .all(|inline| matches!(inline, Inline::Text { text, .. } if is_blank(text)));
    if !blank {
        out.push(build(finish_inlines(segment, true)));
    }
}

fn finish_inlines(inlines: Vec<Inline>, trim: bool) -> Vec<Inline> {
    let mut inlines = normalize_inlines(inlines);
    if trim {
        if let Some(Inline::Text { text, .. }) = inlines.first_mut() {
            *text = text.trim_start_matches(is_html_space).to_string();
        }
        if let Some(Inline::Text { text, .. }) = inlines.last_mut() {
            *text = text.trim_end_matches(is_html_space).to_string();
        }
        inlines = normalize_inlines(inlines);
    }
    inlines
}

/// Collect list items. Content that sits directly inside the list without an
/// item wrapper is gathered into an item of its own so nothing is dropped.
fn list_items(list: &Element, item: fn(&Element) -> Node) -> Vec<Node> {
    let mut items = Vec::new();
    let mut stray: Vec<HtmlNode> = Vec::new();
    for child in &list.children {
        match child {
            HtmlNode::Element(element) if element.tag == "li" => {
                flush_stray(&mut items, &mut stray, item);
                items.push(item(element));
            }
            HtmlNode::Comment(_) => {}
            other => stray.push(other.clone()),
        }
    }
    flush_stray(&mut items, &mut stray, item);
    items
}

fn flush_stray(items: &mut Vec<Node>, stray: &mut Vec<HtmlNode>, item: fn(&Element) -> Node) {
    if stray.iter().all(HtmlNode::is_blank_text) {
        stray.clear();
        return;
    }
    let wrapper = Element::new("li").with_children(std::mem::take(stray));
    items.push(item(&wrapper));
}

fn list_item(element: &Element) -> Node {
    Node::ListItem {
        content: non_empty(parse_nodes(&element.children)),
    }
}

fn task_item(element: &Element) -> Node {
    let checked = element.attr("data-checked") == Some("true");
    let body = element.child_elements().find(|child| child.tag == "div");
    let content = match body {
        Some(div) => parse_nodes(&div.children),
        None => {
            let children: Vec<HtmlNode> = element
                .children
                .iter()
                .filter(|child| !matches!(child, HtmlNode::Element(e) if e.tag == "label"))
                .cloned()
                .collect();
            parse_nodes(&children)
        }
    };
    Node::TaskItem {
        attrs: TaskItemAttrs { checked },
        content: non_empty(content),
    }
}

/// An empty list carries no content and is dropped.
fn wrap_list(items: Vec<Node>, build: impl Fn(Vec<Node>) -> Node) -> Vec<Node> {
    if items.is_empty() {
        return Vec::new();
    }
    vec![build(items)]
}

fn non_empty(content: Vec<Node>) -> Vec<Node> {
    if content.is_empty() {
        vec![Node::empty_paragraph()]
    } else {
        content
    }
}

fn code_block(pre: &Element) -> Node {
    let code = match pre.children.as_slice() {
        [HtmlNode::Element(code)] if code.tag == "code" => Some(code),
        _ => None,
    };
    let language = code.and_then(|code| {
        code.classes()
            .find_map(|class| class.strip_prefix("language-"))
            .filter(|language| !language.is_empty())
            .map(str::to_string)
    });
    let text = match code {
        Some(code) => code.text_content(),
        None => pre.text_content(),
    };
    Node::CodeBlock {
        attrs: CodeBlockAttrs { language },
        text,
    }
}
