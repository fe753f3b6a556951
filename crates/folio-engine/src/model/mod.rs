/*!
 * # Document Model
 *
 * A document is a tree of typed [`Node`]s. The set of node kinds is closed:
 * every kind is a variant of one enum, so adding a kind fails to compile until
 * the serializer, the parser and the node views all handle it.
 *
 * ## Composition
 *
 * - Text blocks (`paragraph`, `heading`) hold inline runs ([`Inline`]).
 * - Containers (`bulletList`, `orderedList`, `listItem`, `taskList`,
 *   `taskItem`, `blockquote`) hold other nodes.
 * - Atomic nodes (`image`, `alignableEmbed`, `socialEmbed`) have no content
 *   field at all, which is what keeps editing commands from splitting them.
 * - `rawHtml` is the opaque holder for markup the parser does not recognise.
 *
 * The JSON form follows the editor framework's document JSON
 * (`{"type": "paragraph", "attrs": {...}, "content": [...]}`).
 */

pub mod attrs;
pub mod marks;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use attrs::{
    AlignableEmbedAttrs, Align, CodeBlockAttrs, DEFAULT_EMBED_HEIGHT, DEFAULT_EMBED_WIDTH,
    HeadingAttrs, code_language, ImageAttrs, MAX_HEADING_LEVEL, OrderedListAttrs, SocialEmbedAttrs,
    TaskItemAttrs, TextAttrs,
};
pub use marks::{LinkAttrs, Mark};

/// A block-level node of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Paragraph {
        #[serde(default)]
        attrs: TextAttrs,
        #[serde(default)]
        content: Vec<Inline>,
    },
    Heading {
        #[serde(default)]
        attrs: HeadingAttrs,
        #[serde(default)]
        content: Vec<Inline>,
    },
    BulletList {
        #[serde(default)]
        content: Vec<Node>,
    },
    OrderedList {
        #[serde(default)]
        attrs: OrderedListAttrs,
        #[serde(default)]
        content: Vec<Node>,
    },
    ListItem {
        #[serde(default)]
        content: Vec<Node>,
    },
    TaskList {
        #[serde(default)]
        content: Vec<Node>,
    },
    TaskItem {
        #[serde(default)]
        attrs: TaskItemAttrs,
        #[serde(default)]
        content: Vec<Node>,
    },
    Blockquote {
        #[serde(default)]
        content: Vec<Node>,
    },
    CodeBlock {
        #[serde(default)]
        attrs: CodeBlockAttrs,
        #[serde(default)]
        text: String,
    },
    Image {
        attrs: ImageAttrs,
    },
    HorizontalRule,
    AlignableEmbed {
        #[serde(default)]
        attrs: AlignableEmbedAttrs,
    },
    SocialEmbed {
        #[serde(default)]
        attrs: SocialEmbedAttrs,
    },
    /// Markup preserved verbatim because no node kind claims it.
    RawHtml { html: String },
}

/// Inline content of a text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inline {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        marks: Vec<Mark>,
    },
    HardBreak,
    /// Inline markup preserved verbatim, still wrapped by the surrounding marks.
    RawHtml {
        html: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        marks: Vec<Mark>,
    },
}

impl Node {
    pub fn paragraph(text: impl Into<String>) -> Self {
        let text = text.into();
        let content = if text.is_empty() {
            Vec::new()
        } else {
            vec![Inline::text(text)]
        };
        Node::Paragraph {
            attrs: TextAttrs::default(),
            content,
        }
    }

    pub fn empty_paragraph() -> Self {
        Node::Paragraph {
            attrs: TextAttrs::default(),
            content: Vec::new(),
        }
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Node::Heading {
            attrs: HeadingAttrs::new(level),
            content: vec![Inline::text(text)],
        }
    }

    /// Type name as used in the JSON form.
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Paragraph { .. } => "paragraph",
            Node::Heading { .. } => "heading",
            Node::BulletList { .. } => "bulletList",
            Node::OrderedList { .. } => "orderedList",
            Node::ListItem { .. } => "listItem",
            Node::TaskList { .. } => "taskList",
            Node::TaskItem { .. } => "taskItem",
            Node::Blockquote { .. } => "blockquote",
            Node::CodeBlock { .. } => "codeBlock",
            Node::Image { .. } => "image",
            Node::HorizontalRule => "horizontalRule",
            Node::AlignableEmbed { .. } => "alignableEmbed",
            Node::SocialEmbed { .. } => "socialEmbed",
            Node::RawHtml { .. } => "rawHtml",
        }
    }

    /// Atomic nodes are edited as a single unit and never hold content.
    pub fn is_atomic(&self) -> bool {
        matches!(
            self,
            Node::Image { .. } | Node::AlignableEmbed { .. } | Node::SocialEmbed { .. }
        )
    }

    pub fn is_textblock(&self) -> bool {
        matches!(self, Node::Paragraph { .. } | Node::Heading { .. })
    }

    /// Child nodes of a container; empty for every other kind.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::BulletList { content }
            | Node::OrderedList { content, .. }
            | Node::ListItem { content }
            | Node::TaskList { content }
            | Node::TaskItem { content, .. }
            | Node::Blockquote { content } => content,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::BulletList { content }
            | Node::OrderedList { content, .. }
            | Node::ListItem { content }
            | Node::TaskList { content }
            | Node::TaskItem { content, .. }
            | Node::Blockquote { content } => Some(content),
            _ => None,
        }
    }

    pub fn inlines(&self) -> Option<&[Inline]> {
        match self {
            Node::Paragraph { content, .. } | Node::Heading { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn inlines_mut(&mut self) -> Option<&mut Vec<Inline>> {
        match self {
            Node::Paragraph { content, .. } | Node::Heading { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Text alignment of a text block, if one is set.
    pub fn text_align(&self) -> Option<Align> {
        match self {
            Node::Paragraph { attrs, .. } => attrs.text_align,
            Node::Heading { attrs, .. } => attrs.text_align,
            _ => None,
        }
    }
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    pub fn marked(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        let mut marks = marks;
        marks::normalize_marks(&mut marks);
        Inline::Text {
            text: text.into(),
            marks,
        }
    }

    pub fn marks(&self) -> &[Mark] {
        match self {
            Inline::Text { marks, .. } | Inline::RawHtml { marks, .. } => marks,
            Inline::HardBreak => &[],
        }
    }

    pub fn marks_mut(&mut self) -> Option<&mut Vec<Mark>> {
        match self {
            Inline::Text { marks, .. } | Inline::RawHtml { marks, .. } => Some(marks),
            Inline::HardBreak => None,
        }
    }

    /// Width of this inline in editor positions: one per character of text,
    /// one for every non-text inline.
    pub fn len(&self) -> usize {
        match self {
            Inline::Text { text, .. } => text.chars().count(),
            Inline::HardBreak | Inline::RawHtml { .. } => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Remove empty text runs, canonicalise mark sets and merge neighbouring runs
/// that carry identical marks.
pub fn normalize_inlines(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::with_capacity(inlines.len());
    for mut inline in inlines {
        if let Some(marks) = inline.marks_mut() {
            marks::normalize_marks(marks);
        }
        if let Inline::Text { text, .. } = &inline
            && text.is_empty()
        {
            continue;
        }
        if let (
            Some(Inline::Text {
                text: previous,
                marks: previous_marks,
            }),
            Inline::Text { text, marks },
        ) = (out.last_mut(), &inline)
            && previous_marks == marks
        {
            previous.push_str(text);
            continue;
        }
        out.push(inline);
    }
    out
}

/// Address of a node: child indices from the document root downwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(pub Vec<usize>);

impl NodePath {
    pub fn root(index: usize) -> Self {
        NodePath(vec![index])
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        NodePath(indices)
    }

    /// Parent path and the index within the parent, or `None` for the empty path.
    pub fn split_last(&self) -> Option<(NodePath, usize)> {
        let (last, parent) = self.0.split_last()?;
        Some((NodePath(parent.to_vec()), *last))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("doc");
        }
        let parts: Vec<String> = self.0.iter().map(usize::to_string).collect();
        f.write_str(&parts.join("."))
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        NodePath(indices)
    }
}

/// Composition-rule violations reported by [`Document::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("{parent} at {path} may only contain {expected} nodes, found {found}")]
    InvalidChild {
        path: NodePath,
        parent: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("{node} at {path} must not be empty")]
    EmptyContainer { path: NodePath, node: &'static str },
    #[error("{node} is not allowed at {path}")]
    Misplaced { path: NodePath, node: &'static str },
    #[error("heading at {path} has level {level}, expected 1 to {MAX_HEADING_LEVEL}")]
    HeadingLevel { path: NodePath, level: u8 },
    #[error("code block at {path} has language {language:?}, which is not a single token")]
    CodeLanguage { path: NodePath, language: String },
}

/// The root of a document tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub content: Vec<Node>,
}

impl Document {
    pub fn new(content: Vec<Node>) -> Self {
        Self { content }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn node_at(&self, path: &NodePath) -> Option<&Node> {
        let (first, rest) = path.0.split_first()?;
        let mut node = self.content.get(*first)?;
        for index in rest {
            node = node.children().get(*index)?;
        }
        Some(node)
    }

    pub fn node_at_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
        let (first, rest) = path.0.split_first()?;
        let mut node = self.content.get_mut(*first)?;
        for index in rest {
            node = node.children_mut()?.get_mut(*index)?;
        }
        Some(node)
    }

    /// Child list that holds the node at `path`: the document content for
    /// top-level nodes, otherwise the parent container's content.
    pub fn siblings_mut(&mut self, path: &NodePath) -> Option<&mut Vec<Node>> {
        let (parent, _) = path.split_last()?;
        if parent.is_empty() {
            return Some(&mut self.content);
        }
        self.node_at_mut(&parent)?.children_mut()
    }

    /// All nodes in document order, paired with their paths.
    pub fn descendants(&self) -> Vec<(NodePath, &Node)> {
        fn walk<'a>(nodes: &'a [Node], base: &NodePath, out: &mut Vec<(NodePath, &'a Node)>) {
            for (index, node) in nodes.iter().enumerate() {
                let path = base.child(index);
                out.push((path.clone(), node));
                walk(node.children(), &path, out);
            }
        }

        let mut out = Vec::new();
        walk(&self.content, &NodePath::default(), &mut out);
        out
    }

    /// Path of the first text block in document order.
    pub fn first_textblock(&self) -> Option<NodePath> {
        self.descendants()
            .into_iter()
            .find(|(_, node)| node.is_textblock())
            .map(|(path, _)| path)
    }

    /// Check composition rules for the whole tree.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (index, node) in self.content.iter().enumerate() {
            validate_node(node, &NodePath::root(index), None)?;
        }
        Ok(())
    }
}

fn validate_node(node: &Node, path: &NodePath, parent: Option<&Node>) -> Result<(), SchemaError> {
    let item_parent_ok = match node {
        Node::ListItem { .. } => matches!(
            parent,
            Some(Node::BulletList { .. } | Node::OrderedList { .. })
        ),
        Node::TaskItem { .. } => matches!(parent, Some(Node::TaskList { .. })),
        _ => true,
    };
    if !item_parent_ok {
        return Err(SchemaError::Misplaced {
            path: path.clone(),
            node: node.type_name(),
        });
    }

    match node {
        Node::Heading { attrs, .. } if !(1..=MAX_HEADING_LEVEL).contains(&attrs.level) => {
            return Err(SchemaError::HeadingLevel {
                path: path.clone(),
                level: attrs.level,
            });
        }
        Node::CodeBlock { attrs, .. }
            if attrs
                .language
                .as_deref()
                .is_some_and(|language| code_language(language).as_deref() != Some(language)) =>
        {
            return Err(SchemaError::CodeLanguage {
                path: path.clone(),
                language: attrs.language.clone().unwrap_or_default(),
            });
        }
        Node::BulletList { content } | Node::OrderedList { content, .. } => {
            require_children(node, path, content, "listItem", |child| {
                matches!(child, Node::ListItem { .. })
            })?;
        }
        Node::TaskList { content } => {
            require_children(node, path, content, "taskItem", |child| {
                matches!(child, Node::TaskItem { .. })
            })?;
        }
        Node::ListItem { content } | Node::TaskItem { content, .. } | Node::Blockquote { content } => {
            require_children(node, path, content, "block", |child| {
                !matches!(child, Node::ListItem { .. } | Node::TaskItem { .. })
            })?;
        }
        _ => {}
    }

    for (index, child) in node.children().iter().enumerate() {
        validate_node(child, &path.child(index), Some(node))?;
    }
    Ok(())
}

fn require_children(
    node: &Node,
    path: &NodePath,
    content: &[Node],
    expected: &'static str,
    allowed: impl Fn(&Node) -> bool,
) -> Result<(), SchemaError> {
    if content.is_empty() {
        return Err(SchemaError::EmptyContainer {
            path: path.clone(),
            node: node.type_name(),
        });
    }
    if let Some(child) = content.iter().find(|child| !allowed(child)) {
        return Err(SchemaError::InvalidChild {
            path: path.clone(),
            parent: node.type_name(),
            expected,
            found: child.type_name(),
        });
    }
    Ok(())
}
