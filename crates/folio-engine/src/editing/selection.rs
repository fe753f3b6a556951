use crate::model::NodePath;
use std::ops::Range;

/// Current selection: a node and a character range inside it.
///
/// For text blocks the range counts characters of the block's inline content
/// (non-text inlines count as one). For any other node the range is `0..0`
/// and the whole node is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub path: NodePath,
    pub range: Range<usize>,
}

impl Selection {
    pub fn caret(path: NodePath, offset: usize) -> Self {
        Self {
            path,
            range: offset..offset,
        }
    }

    pub fn node(path: NodePath) -> Self {
        Self::caret(path, 0)
    }

    pub fn range(path: NodePath, range: Range<usize>) -> Self {
        Self { path, range }
    }

    pub fn is_collapsed(&self) -> bool {
        self.range.start >= self.range.end
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::node(NodePath::root(0))
    }
}
