//! In-editor rendering contract for each node kind.
//!
//! [`node_view`] matches every node kind explicitly; adding a kind to
//! [`Node`] does not compile until it has a view here as well as a rendering
//! in the serializer.

use crate::extensions::{aligned_embed, social_embed};
use crate::html::HtmlNode;
use crate::model::{AlignableEmbedAttrs, Align, Node, SocialEmbedAttrs};
use crate::serialize;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeView {
    /// Editable inline content inside the given tag.
    TextBlock {
        tag: String,
        align: Option<Align>,
    },
    /// Block container rendered with the given tag; children have their own views.
    Container { tag: &'static str },
    Code { language: Option<String> },
    Image { src: String, alt: Option<String> },
    Rule,
    /// Video frame inside an aligned wrapper.
    AlignedFrame(AlignableEmbedAttrs),
    /// Mount point the hydrator turns into a live widget.
    SocialMount { external_id: String },
    /// Visible affordance for an embed that cannot be mounted.
    InvalidEmbed { message: &'static str },
    /// Preserved markup, shown read-only.
    Raw { html: String },
}

pub fn node_view(node: &Node) -> NodeView {
    match node {
        Node::Paragraph { attrs, .. } => NodeView::TextBlock {
            tag: "p".to_string(),
            align: attrs.text_align,
        },
        Node::Heading { attrs, .. } => NodeView::TextBlock {
            tag: format!("h{}", attrs.level),
            align: attrs.text_align,
        },
        Node::BulletList { .. } | Node::TaskList { .. } => NodeView::Container { tag: "ul" },
        Node::OrderedList { .. } => NodeView::Container { tag: "ol" },
        Node::ListItem { .. } | Node::TaskItem { .. } => NodeView::Container { tag: "li" },
        Node::Blockquote { .. } => NodeView::Container { tag: "blockquote" },
        Node::CodeBlock { attrs, .. } => NodeView::Code {
            language: attrs.language.clone(),
        },
        Node::Image { attrs } => NodeView::Image {
            src: attrs.src.clone(),
            alt: attrs.alt.clone(),
        },
        Node::HorizontalRule => NodeView::Rule,
        Node::AlignableEmbed { attrs } => NodeView::AlignedFrame(attrs.clone()),
        Node::SocialEmbed {
            attrs: SocialEmbedAttrs {
                external_id: Some(id),
            },
        } => NodeView::SocialMount {
            external_id: id.clone(),
        },
        Node::SocialEmbed { .. } => NodeView::InvalidEmbed {
            message: social_embed::INVALID_MESSAGE,
        },
        Node::RawHtml { html } => NodeView::Raw { html: html.clone() },
    }
}

impl NodeView {
    /// Atomic views are selected and moved as a whole.
    pub fn is_atomic(&self) -> bool {
        matches!(
            self,
            NodeView::Image { .. }
                | NodeView::AlignedFrame(_)
                | NodeView::SocialMount { .. }
                | NodeView::InvalidEmbed { .. }
        )
    }

    pub fn is_editable_text(&self) -> bool {
        matches!(self, NodeView::TextBlock { .. } | NodeView::Code { .. })
    }
}

/// Markup for a node as shown inside the editor.
///
/// This matches the persisted HTML except for social embeds without an id,
/// which show the invalid-embed affordance instead of an empty placeholder.
pub fn render_in_editor(node: &Node) -> HtmlNode {
    match node_view(node) {
        NodeView::InvalidEmbed { .. } => HtmlNode::Element(social_embed::render_invalid()),
        NodeView::SocialMount { external_id } => {
            HtmlNode::Element(social_embed::render(&SocialEmbedAttrs::new(external_id)))
        }
        NodeView::AlignedFrame(attrs) => HtmlNode::Element(aligned_embed::render(&attrs)),
        _ => HtmlNode::Raw(serialize::node_to_html(node)),
    }
}
