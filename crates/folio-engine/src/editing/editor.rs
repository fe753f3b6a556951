use super::{AttrUpdate, Cmd, Patch, Selection};
use crate::extensions::{aligned_embed, social_embed};
use crate::html::{HtmlNode, parse_fragment};
use crate::model::marks::{has_mark_kind, with_mark, without_mark};
use crate::model::{
    Align, DEFAULT_EMBED_HEIGHT, DEFAULT_EMBED_WIDTH, Document, Inline, MAX_HEADING_LEVEL, Mark,
    Node, NodePath, SocialEmbedAttrs, normalize_inlines,
};
use crate::{parse, serialize};

/// In-memory editable document.
///
/// Every command runs against a copy of the document. The copy replaces the
/// current document only if the command applied and the result still obeys
/// the composition rules, so a rejected command never leaves a half-edited
/// tree behind.
#[derive(Debug, Clone)]
pub struct Editor {
    doc: Document,
    selection: Selection,
    version: u64,
    /// Whether edits are checked against the composition rules. Documents that
    /// were already invalid when loaded are edited without the check.
    strict: bool,
}

impl Editor {
    pub fn new(doc: Document) -> Self {
        let selection = doc
            .first_textblock()
            .map(|path| Selection::caret(path, 0))
            .unwrap_or_default();
        let strict = doc.validate().is_ok();
        Self {
            doc,
            selection,
            version: 0,
            strict,
        }
    }

    pub fn from_html(html: &str) -> Self {
        Self::new(parse::from_html(html))
    }

    pub fn to_html(&self) -> String {
        serialize::to_html(&self.doc)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Move the selection. Returns false, leaving the selection unchanged, if
    /// the path does not address a node or the range is out of bounds.
    pub fn set_selection(&mut self, selection: Selection) -> bool {
        let Some(node) = self.doc.node_at(&selection.path) else {
            return false;
        };
        if selection.range.start > selection.range.end || selection.range.end > content_len(node)
        {
            return false;
        }
        self.selection = selection;
        true
    }

    /// Apply a command
    pub fn apply(&mut self, cmd: Cmd) -> Patch {
        let mut doc = self.doc.clone();
        let mut selection = self.selection.clone();

        let applied = match cmd {
            Cmd::InsertNode { node } => insert_block(&mut doc, &mut selection, node),
            Cmd::InsertAlignableEmbed {
                src,
                width,
                height,
                align,
            } => {
                let context = doc.node_at(&selection.path).and_then(Node::text_align);
                let align = aligned_embed::inherit_align(align, context);
                let src = aligned_embed::embed_url(&src);
                match aligned_embed::create(&src, width, height, align) {
                    Some(node) => insert_block(&mut doc, &mut selection, node),
                    None => false,
                }
            }
            Cmd::InsertSocialEmbed { url } => match social_embed::extract_status_id(&url) {
                Ok(id) => social_embed::create(&id)
                    .is_some_and(|node| insert_block(&mut doc, &mut selection, node)),
                Err(err) => {
                    log::debug!("Rejected social embed: {err}");
                    false
                }
            },
            Cmd::ToggleMark { mark } => toggle_mark(&mut doc, &selection, mark),
            Cmd::SetNodeAttr { path, attr } => doc
                .node_at_mut(&path)
                .is_some_and(|node| set_attr(node, attr)),
            Cmd::InsertText { text } => insert_text(&mut doc, &mut selection, &text),
            Cmd::SetTextAlign { align } => doc
                .node_at_mut(&selection.path)
                .is_some_and(|node| set_text_align(node, align)),
            Cmd::DeleteNode { path } => delete_node(&mut doc, &mut selection, &path),
        };

        let applied = applied && self.accepts(&doc);
        if applied {
            self.doc = doc;
            self.selection = selection;
            self.version += 1;
        }
        Patch {
            applied,
            version: self.version,
            selection: self.selection.clone(),
        }
    }

    fn accepts(&self, doc: &Document) -> bool {
        if !self.strict {
            return true;
        }
        match doc.validate() {
            Ok(()) => true,
            Err(err) => {
                log::debug!("Edit rejected: {err}");
                false
            }
        }
    }
}

/// Number of selectable positions inside a node.
fn content_len(node: &Node) -> usize {
    match node {
        Node::CodeBlock { text, .. } => text.chars().count(),
        _ => node
            .inlines()
            .map(|inlines| inlines.iter().map(Inline::len).sum())
            .unwrap_or(0),
    }
}

fn is_empty_paragraph(node: &Node) -> bool {
    matches!(node, Node::Paragraph { content, .. } if content.is_empty())
}

fn insert_block(doc: &mut Document, selection: &mut Selection, node: Node) -> bool {
    let path = selection.path.clone();
    let replace = doc.node_at(&path).is_some_and(is_empty_paragraph);
    let Some((parent, index)) = path.split_last() else {
        return false;
    };
    let Some(siblings) = doc.siblings_mut(&path) else {
        doc.content.push(node);
        *selection = Selection::node(NodePath::root(doc.content.len() - 1));
        return true;
    };
    let at = if replace {
        siblings[index] = node;
        index
    } else {
        let at = (index + 1).min(siblings.len());
        siblings.insert(at, node);
        at
    };
    *selection = Selection::node(parent.child(at));
    true
}

/// Split inline runs at a character offset.
fn split_inlines_at(inlines: Vec<Inline>, offset: usize) -> (Vec<Inline>, Vec<Inline>) {
    let mut before = Vec::new();
    let mut after = Vec::new();
    let mut pos = 0;
    for inline in inlines {
        let len = inline.len();
        let start = pos;
        pos += len;
        match inline {
            inline if start + len <= offset => before.push(inline),
            inline if start >= offset => after.push(inline),
            Inline::Text { text, marks } => {
                let cut = offset - start;
                before.push(Inline::Text {
                    text: text.chars().take(cut).collect(),
                    marks: marks.clone(),
                });
                after.push(Inline::Text {
                    text: text.chars().skip(cut).collect(),
                    marks,
                });
            }
            inline => after.push(inline),
        }
    }
    (before, after)
}

fn toggle_mark(doc: &mut Document, selection: &Selection, mark: Mark) -> bool {
    let range = selection.range.clone();
    if range.is_empty() {
        return false;
    }
    let Some(inlines) = doc.node_at_mut(&selection.path).and_then(Node::inlines_mut) else {
        return false;
    };
    let (before, rest) = split_inlines_at(std::mem::take(inlines), range.start);
    let (mut selected, after) = split_inlines_at(rest, range.end - range.start);

    let markable: Vec<&Inline> = selected
        .iter()
        .filter(|inline| accepts_mark(inline, &mark))
        .collect();
    let remove = !markable.is_empty()
        && markable
            .iter()
            .all(|inline| has_mark_kind(inline.marks(), &mark));
    let changed = !markable.is_empty();

    for inline in &mut selected {
        if !accepts_mark(inline, &mark) {
            continue;
        }
        if let Some(marks) = inline.marks_mut() {
            *marks = if remove {
                without_mark(marks, &mark)
            } else {
                with_mark(marks, mark.clone())
            };
        }
    }

    let mut joined = before;
    joined.extend(selected);
    joined.extend(after);
    *inlines = normalize_inlines(joined);
    changed
}

/// Raw markup holding an anchor never takes a link mark: nested anchors are
/// split apart when the HTML is parsed again.
fn accepts_mark(inline: &Inline, mark: &Mark) -> bool {
    match inline {
        Inline::HardBreak => false,
        Inline::RawHtml { html, .. } if matches!(mark, Mark::Link { .. }) => {
            !contains_anchor(&parse_fragment(html))
        }
        Inline::Text { .. } | Inline::RawHtml { .. } => true,
    }
}

fn contains_anchor(nodes: &[HtmlNode]) -> bool {
    nodes
        .iter()
        .filter_map(HtmlNode::as_element)
        .any(|element| element.tag == "a" || element.find_tag("a").is_some())
}

/// Marks a new character at `offset` picks up: those of the character before
/// it, or of the first run when inserting at the start.
fn marks_at(inlines: &[Inline], offset: usize) -> Vec<Mark> {
    let mut pos = 0;
    for inline in inlines {
        let len = inline.len();
        if offset == 0 || (offset > pos && offset <= pos + len) {
            return match inline {
                Inline::Text { marks, .. } => marks.clone(),
                _ => Vec::new(),
            };
        }
        pos += len;
    }
    Vec::new()
}

fn insert_text(doc: &mut Document, selection: &mut Selection, text: &str) -> bool {
    let range = selection.range.clone();
    if text.is_empty() && range.is_empty() {
        return false;
    }
    let Some(node) = doc.node_at_mut(&selection.path) else {
        return false;
    };
    if range.start > range.end || range.end > content_len(node) {
        return false;
    }

    if let Node::CodeBlock { text: code, .. } = node {
        let chars: Vec<char> = code.chars().collect();
        let mut updated: String = chars[..range.start].iter().collect();
        updated.push_str(text);
        updated.extend(&chars[range.end..]);
        *code = updated;
    } else if let Some(inlines) = node.inlines_mut() {
        let marks = marks_at(inlines, range.start);
        let (before, rest) = split_inlines_at(std::mem::take(inlines), range.start);
        let (_, after) = split_inlines_at(rest, range.end - range.start);

        let mut joined = before;
        for (index, line) in text.split('\n').enumerate() {
            if index > 0 {
                joined.push(Inline::HardBreak);
            }
            joined.push(Inline::Text {
                text: line.to_string(),
                marks: marks.clone(),
            });
        }
        joined.extend(after);
        *inlines = normalize_inlines(joined);
    } else {
        return false;
    }

    let caret = range.start + text.chars().count();
    selection.range = caret..caret;
    true
}

fn set_attr(node: &mut Node, attr: AttrUpdate) -> bool {
    match (node, attr) {
        (Node::AlignableEmbed { attrs }, AttrUpdate::Align(align)) => attrs.align = align,
        (Node::AlignableEmbed { attrs }, AttrUpdate::Size { width, height }) => {
            attrs.width = if width > 0 { width } else { DEFAULT_EMBED_WIDTH };
            attrs.height = if height > 0 { height } else { DEFAULT_EMBED_HEIGHT };
        }
        (Node::AlignableEmbed { attrs }, AttrUpdate::Src(src)) => {
            let src = aligned_embed::embed_url(&src);
            if src.is_empty() {
                return false;
            }
            attrs.src = Some(src);
        }
        (Node::Image { attrs }, AttrUpdate::Src(src)) => {
            let src = src.trim();
            if src.is_empty() {
                return false;
            }
            attrs.src = src.to_string();
        }
        (Node::SocialEmbed { attrs }, AttrUpdate::ExternalId(id)) => {
            *attrs = SocialEmbedAttrs::new(id);
        }
        (Node::TaskItem { attrs, .. }, AttrUpdate::Checked(checked)) => attrs.checked = checked,
        (Node::Heading { attrs, .. }, AttrUpdate::HeadingLevel(level)) => {
            if !(1..=MAX_HEADING_LEVEL).contains(&level) {
                return false;
            }
            attrs.level = level;
        }
        (Node::Heading { attrs, .. }, AttrUpdate::TextAlign(align)) => attrs.text_align = align,
        (Node::Paragraph { attrs, .. }, AttrUpdate::TextAlign(align)) => attrs.text_align = align,
        (node, attr) => {
            log::debug!("{attr:?} does not apply to {}", node.type_name());
            return false;
        }
    }
    true
}

fn set_text_align(node: &mut Node, align: Option<Align>) -> bool {
    match node {
        Node::Paragraph { attrs, .. } => attrs.text_align = align,
        Node::Heading { attrs, .. } => attrs.text_align = align,
        Node::AlignableEmbed { attrs } => attrs.align = align.unwrap_or_default(),
        _ => return false,
    }
    true
}

fn delete_node(doc: &mut Document, selection: &mut Selection, path: &NodePath) -> bool {
    let Some((parent, index)) = path.split_last() else {
        return false;
    };
    let Some(siblings) = doc.siblings_mut(path) else {
        return false;
    };
    if index >= siblings.len() {
        return false;
    }
    siblings.remove(index);
    let emptied = siblings.is_empty();

    if emptied && !parent.is_empty() {
        let parent_is_list = matches!(
            doc.node_at(&parent),
            Some(Node::BulletList { .. } | Node::OrderedList { .. } | Node::TaskList { .. })
        );
        if parent_is_list {
            return delete_node(doc, selection, &parent);
        }
        if let Some(children) = doc.node_at_mut(&parent).and_then(Node::children_mut) {
            children.push(Node::empty_paragraph());
        }
    }

    reanchor(doc, selection, path);
    true
}

/// Keep the selection on the same node after `deleted` was removed, or move
/// it to the nearest remaining node when it was inside the deleted one.
fn reanchor(doc: &Document, selection: &mut Selection, deleted: &NodePath) {
    let depth = deleted.0.len();
    let level = depth - 1;
    let same_parent = selection.path.0.len() >= depth && selection.path.0[..level] == deleted.0[..level];
    if same_parent {
        let selected = selection.path.0[level];
        let removed = deleted.0[level];
        if selected == removed {
            let mut fallback = deleted.clone();
            fallback.0[level] = removed.saturating_sub(1);
            fallback.0.truncate(depth);
            *selection = Selection::node(fallback);
        } else if selected > removed {
            selection.path.0[level] -= 1;
        }
    }
    if doc.node_at(&selection.path).is_none() {
        *selection = doc
            .first_textblock()
            .map(|path| Selection::caret(path, 0))
            .unwrap_or_default();
    }
}
