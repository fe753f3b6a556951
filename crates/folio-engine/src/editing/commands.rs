use crate::model::{Align, Mark, Node, NodePath};

/// Edit commands accepted by [`Editor::apply`](super::Editor::apply).
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    /// Insert a block after the one at the cursor. An empty paragraph at the
    /// cursor is replaced instead.
    InsertNode { node: Node },
    /// Insert a video frame. Without an explicit alignment the embed takes the
    /// alignment of the text block at the cursor.
    InsertAlignableEmbed {
        src: String,
        width: Option<u32>,
        height: Option<u32>,
        align: Option<Align>,
    },
    /// Insert a social post embed from a status URL.
    InsertSocialEmbed { url: String },
    /// Toggle a mark over the selected text.
    ToggleMark { mark: Mark },
    /// Change one attribute of the node at `path`.
    SetNodeAttr { path: NodePath, attr: AttrUpdate },
    /// Replace the selected text.
    InsertText { text: String },
    /// Align the selected text block or aligned embed.
    SetTextAlign { align: Option<Align> },
    DeleteNode { path: NodePath },
}

/// A single attribute change. Updates that do not belong to the addressed
/// node kind are rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrUpdate {
    /// Alignment of an aligned embed.
    Align(Align),
    /// Alignment of a paragraph or heading.
    TextAlign(Option<Align>),
    /// Frame size of an aligned embed. Zero keeps the default.
    Size { width: u32, height: u32 },
    ExternalId(String),
    Checked(bool),
    HeadingLevel(u8),
    /// Source of an image or aligned embed.
    Src(String),
}
