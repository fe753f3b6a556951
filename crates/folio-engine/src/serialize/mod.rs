/*!
 * # Serializer (tree to HTML)
 *
 * Converts a [`Document`] into the HTML string that is persisted as an
 * activity's content. Output is a pure function of the tree: no randomness,
 * no clock, no network. Every node kind has a rendering, so serialization
 * cannot fail.
 *
 * Inline marks are written with a mark stack. Between two neighbouring runs
 * only the marks that differ are closed and reopened, and marks always nest
 * in canonical rank order, which is what lets the parser reconstruct the same
 * mark sets.
 */

pub mod classes;

use crate::extensions::{aligned_embed, social_embed};
use crate::html::{Element, HtmlNode, write_nodes};
use crate::model::{Align, Document, Inline, Mark, Node, code_language};

/// Serialize a document to HTML.
pub fn to_html(doc: &Document) -> String {
    write_nodes(&to_dom(doc))
}

/// Serialize a document to an owned HTML tree.
pub fn to_dom(doc: &Document) -> Vec<HtmlNode> {
    doc.content.iter().map(render_block).collect()
}

/// Serialize a single node.
pub fn node_to_html(node: &Node) -> String {
    write_nodes(&[render_block(node)])
}

fn render_block(node: &Node) -> HtmlNode {
    let element = match node {
        Node::Paragraph { attrs, content } => {
            text_block("p", classes::PARAGRAPH, attrs.text_align, content)
        }
        Node::Heading { attrs, content } => {
            let level = attrs.level.clamp(1, crate::model::MAX_HEADING_LEVEL);
            text_block(
                &format!("h{level}"),
                classes::heading(level),
                attrs.text_align,
                content,
            )
        }
        Node::BulletList { content } => {
            container("ul", content).with_attr("class", classes::BULLET_LIST)
        }
        Node::OrderedList { attrs, content } => {
            let mut list = Element::new("ol");
            if attrs.start != 1 {
                list.set_attr("start", attrs.start.to_string());
            }
            list.set_attr("class", classes::ORDERED_LIST);
            list.with_children(content.iter().map(render_block))
        }
        Node::ListItem { content } => {
            container("li", content).with_attr("class", classes::LIST_ITEM)
        }
        Node::TaskList { content } => Element::new("ul")
            .with_attr("data-type", "taskList")
            .with_attr("class", classes::TASK_LIST)
            .with_children(content.iter().map(render_block)),
        Node::TaskItem { attrs, content } => {
            let mut checkbox = Element::new("input").with_attr("type", "checkbox");
            if attrs.checked {
                checkbox.set_attr("checked", "");
            }
            Element::new("li")
                .with_attr("data-type", "taskItem")
                .with_attr("data-checked", attrs.checked.to_string())
                .with_attr("class", classes::TASK_ITEM)
                .with_child(
                    Element::new("label")
                        .with_child(checkbox)
                        .with_child(Element::new("span")),
                )
                .with_child(container("div", content))
        }
        Node::Blockquote { content } => {
            container("blockquote", content).with_attr("class", classes::BLOCKQUOTE)
        }
        Node::CodeBlock { attrs, text } => {
            let mut code = Element::new("code");
            if let Some(language) = attrs.language.as_deref().and_then(code_language) {
                code.set_attr("class", format!("language-{language}"));
            }
            Element::new("pre")
                .with_attr("class", classes::CODE_BLOCK)
                .with_child(code.with_child(HtmlNode::text(text.as_str())))
        }
        Node::Image { attrs } => {
            let mut image = Element::new("img").with_attr("src", attrs.src.as_str());
            if let Some(alt) = &attrs.alt {
                image.set_attr("alt", alt);
            }
            if let Some(title) = &attrs.title {
                image.set_attr("title", title);
            }
            image.with_attr("class", classes::IMAGE)
        }
        Node::HorizontalRule => Element::new("hr").with_attr("class", classes::RULE),
        Node::AlignableEmbed { attrs } => aligned_embed::render(attrs),
        Node::SocialEmbed { attrs } => social_embed::render(attrs),
        Node::RawHtml { html } => return HtmlNode::Raw(html.clone()),
    };
    HtmlNode::Element(element)
}

fn container(tag: &str, content: &[Node]) -> Element {
    Element::new(tag).with_children(content.iter().map(render_block))
}

fn text_block(tag: &str, class: &str, align: Option<Align>, content: &[Inline]) -> Element {
    let mut element = Element::new(tag).with_attr("class", class);
    if let Some(align) = align {
        element.set_attr("style", format!("text-align: {align}"));
    }
    element.with_children(render_inlines(content))
}

/// One open mark on the stack and the nodes collected inside it so far.
struct Frame {
    mark: Option<Mark>,
    children: Vec<HtmlNode>,
}

/// Render inline runs, nesting mark elements in canonical order.
pub fn render_inlines(inlines: &[Inline]) -> Vec<HtmlNode> {
    let mut stack = vec![Frame {
        mark: None,
        children: Vec::new(),
    }];

    for inline in inlines {
        let marks = inline.marks();
        let open: Vec<&Mark> = stack.iter().filter_map(|frame| frame.mark.as_ref()).collect();
        let keep = open
            .iter()
            .zip(marks)
            .take_while(|(open, wanted)| **open == *wanted)
            .count();

        while stack.len() > keep + 1 {
            close_frame(&mut stack);
        }
        for mark in &marks[keep..] {
            stack.push(Frame {
                mark: Some(mark.clone()),
                children: Vec::new(),
            });
        }

        let node = match inline {
            Inline::Text { text, .. } => HtmlNode::text(text.as_str()),
            Inline::HardBreak => HtmlNode::Element(Element::new("br")),
            Inline::RawHtml { html, .. } => HtmlNode::Raw(html.clone()),
        };
        if let Some(top) = stack.last_mut() {
            top.children.push(node);
        }
    }

    while stack.len() > 1 {
        close_frame(&mut stack);
    }
    stack.pop().map(|root| root.children).unwrap_or_default()
}

fn close_frame(stack: &mut Vec<Frame>) {
    let Some(frame) = stack.pop() else {
        return;
    };
    let Some(mark) = frame.mark else {
        return;
    };
    let element = mark_element(&mark).with_children(frame.children);
    if let Some(parent) = stack.last_mut() {
        parent.children.push(HtmlNode::Element(element));
    }
}

fn mark_element(mark: &Mark) -> Element {
    match mark {
        Mark::Link { attrs } => {
            let mut link = Element::new("a").with_attr("href", attrs.href.as_str());
            if let Some(target) = &attrs.target {
                link.set_attr("target", target);
                if target == "_blank" {
                    link.set_attr("rel", "noopener noreferrer");
                }
            }
            link.with_attr("class", classes::LINK)
        }
        Mark::Bold => Element::new("strong"),
        Mark::Italic => Element::new("em"),
        Mark::Underline => Element::new("u"),
        Mark::Strike => Element::new("s"),
        Mark::Highlight => Element::new("mark").with_attr("class", classes::HIGHLIGHT),
        Mark::Code => Element::new("code").with_attr("class", classes::INLINE_CODE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AlignableEmbedAttrs, CodeBlockAttrs, HeadingAttrs, ImageAttrs, OrderedListAttrs,
        SocialEmbedAttrs, TaskItemAttrs, TextAttrs,
    };
    use insta::assert_snapshot;

    fn doc(content: Vec<Node>) -> Document {
        Document::new(content)
    }

    #[test]
    fn test_paragraph_with_alignment() {
        let html = to_html(&doc(vec![Node::Paragraph {
            attrs: TextAttrs {
                text_align: Some(Align::Center),
            },
            content: vec![Inline::text("Hello & welcome")],
        }]));
        assert_snapshot!(html, @r#"<p class="mb-4 leading-relaxed" style="text-align: center">Hello &amp; welcome</p>"#);
    }

    #[test]
    fn test_heading_levels() {
        let html = to_html(&doc(vec![Node::Heading {
            attrs: HeadingAttrs::new(2),
            content: vec![Inline::text("Section")],
        }]));
        assert_snapshot!(html, @r#"<h2 class="mt-6 mb-3 text-2xl font-semibold">Section</h2>"#);
    }

    #[test]
    fn test_mark_stack_only_closes_changed_marks() {
        let inlines = vec![
            Inline::marked("a", vec![Mark::Bold]),
            Inline::marked("b", vec![Mark::Bold, Mark::Italic]),
            Inline::marked("c", vec![Mark::Bold]),
            Inline::text("d"),
        ];
        assert_snapshot!(write_nodes(&render_inlines(&inlines)), @"<strong>a<em>b</em>c</strong>d");
    }

    #[test]
    fn test_link_stays_outermost() {
        let inlines = vec![
            Inline::marked("x", vec![Mark::Bold, Mark::link("/p")]),
            Inline::marked("y", vec![Mark::link("/p")]),
        ];
        assert_snapshot!(
            write_nodes(&render_inlines(&inlines)),
            @r#"<a href="/p" class="underline underline-offset-2"><strong>x</strong>y</a>"#
        );
    }

    #[test]
    fn test_hard_break_closes_marks() {
        let inlines = vec![
            Inline::marked("a", vec![Mark::Italic]),
            Inline::HardBreak,
            Inline::marked("b", vec![Mark::Italic]),
        ];
        assert_snapshot!(write_nodes(&render_inlines(&inlines)), @"<em>a</em><br><em>b</em>");
    }

    #[test]
    fn test_lists() {
        let html = to_html(&doc(vec![Node::OrderedList {
            attrs: OrderedListAttrs { start: 3 },
            content: vec![Node::ListItem {
                content: vec![Node::paragraph("three")],
            }],
        }]));
        assert_snapshot!(html, @r#"<ol start="3" class="mb-4 ml-6 list-decimal"><li class="mb-1"><p class="mb-4 leading-relaxed">three</p></li></ol>"#);
    }

    #[test]
    fn test_task_item() {
        let html = to_html(&doc(vec![Node::TaskList {
            content: vec![Node::TaskItem {
                attrs: TaskItemAttrs { checked: true },
                content: vec![Node::paragraph("done")],
            }],
        }]));
        assert_snapshot!(html, @r#"<ul data-type="taskList" class="mb-4 list-none"><li data-type="taskItem" data-checked="true" class="mb-1 flex items-start gap-2"><label><input type="checkbox" checked=""><span></span></label><div><p class="mb-4 leading-relaxed">done</p></div></li></ul>"#);
    }

    #[test]
    fn test_code_block_escapes_text() {
        let html = to_html(&doc(vec![Node::CodeBlock {
            attrs: CodeBlockAttrs {
                language: Some("rust".to_string()),
            },
            text: "if a < b {}\n".to_string(),
        }]));
        assert_eq!(
            html,
            "<pre class=\"my-4 overflow-x-auto rounded p-4 font-mono text-sm\"><code class=\"language-rust\">if a &lt; b {}\n</code></pre>"
        );
    }

    #[test]
    fn test_code_language_with_spaces_stays_one_token() {
        let html = to_html(&doc(vec![Node::CodeBlock {
            attrs: CodeBlockAttrs {
                language: Some("c sharp".to_string()),
            },
            text: "var x = 1;".to_string(),
        }]));
        assert!(html.contains(r#"<code class="language-c-sharp">"#));
        let parsed = crate::parse::from_html(&html);
        assert!(matches!(
            &parsed.content[0],
            Node::CodeBlock { attrs, .. } if attrs.language.as_deref() == Some("c-sharp")
        ));
    }

    #[test]
    fn test_image_and_rule() {
        let html = to_html(&doc(vec![
            Node::Image {
                attrs: ImageAttrs {
                    src: "/a.png".to_string(),
                    alt: Some("A \"quoted\" alt".to_string()),
                    title: None,
                },
            },
            Node::HorizontalRule,
        ]));
        assert_snapshot!(html, @r#"<img src="/a.png" alt="A &quot;quoted&quot; alt" class="my-6 h-auto max-w-full rounded"><hr class="my-8">"#);
    }

    #[test]
    fn test_embeds() {
        let html = to_html(&doc(vec![
            Node::AlignableEmbed {
                attrs: AlignableEmbedAttrs {
                    src: Some("https://www.youtube-nocookie.com/embed/abc".to_string()),
                    align: Align::Right,
                    ..AlignableEmbedAttrs::default()
                },
            },
            Node::SocialEmbed {
                attrs: SocialEmbedAttrs::new("99"),
            },
        ]));
        assert_snapshot!(html, @r#"<div data-alignable-embed="" class="alignable-embed my-6 w-full" style="display: flex; justify-content: flex-end"><iframe src="https://www.youtube-nocookie.com/embed/abc" width="640" height="480" frameborder="0" allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture" allowfullscreen=""></iframe></div><div data-social-embed="" data-embed-kind="social" data-embed-id="99" class="social-embed my-6"></div>"#);
    }

    #[test]
    fn test_raw_html_is_verbatim() {
        let html = to_html(&doc(vec![Node::RawHtml {
            html: "<table><tbody><tr><td>x</td></tr></tbody></table>".to_string(),
        }]));
        assert_eq!(html, "<table><tbody><tr><td>x</td></tr></tbody></table>");
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let document = doc(vec![
            Node::heading(1, "Title"),
            Node::paragraph("Body"),
            Node::SocialEmbed {
                attrs: SocialEmbedAttrs::new("1"),
            },
        ]);
        assert_eq!(to_html(&document), to_html(&document.clone()));
    }
}
