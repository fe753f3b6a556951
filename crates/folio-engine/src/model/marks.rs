use serde::{Deserialize, Serialize};

/// Attributes carried by a link mark.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkAttrs {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Inline annotation applied to a run of text.
///
/// A run carries at most one mark of each kind. Mark sets are kept in
/// [`Mark::rank`] order, which is also the nesting order used when the run is
/// written out as HTML (lowest rank outermost).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mark {
    Link { attrs: LinkAttrs },
    Bold,
    Italic,
    Underline,
    Strike,
    Highlight,
    Code,
}

impl Mark {
    pub fn link(href: impl Into<String>) -> Self {
        Mark::Link {
            attrs: LinkAttrs {
                href: href.into(),
                target: None,
            },
        }
    }

    /// Position of this kind in the canonical mark order.
    pub fn rank(&self) -> u8 {
        match self {
            Mark::Link { .. } => 0,
            Mark::Bold => 1,
            Mark::Italic => 2,
            Mark::Underline => 3,
            Mark::Strike => 4,
            Mark::Highlight => 5,
            Mark::Code => 6,
        }
    }

    /// Whether both marks are of the same kind, ignoring attributes.
    pub fn same_kind(&self, other: &Mark) -> bool {
        self.rank() == other.rank()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mark::Link { .. } => "link",
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Underline => "underline",
            Mark::Strike => "strike",
            Mark::Highlight => "highlight",
            Mark::Code => "code",
        }
    }
}

/// Sort a mark list into canonical order and drop repeated kinds, keeping the
/// first occurrence of each.
pub fn normalize_marks(marks: &mut Vec<Mark>) {
    marks.sort_by_key(Mark::rank);
    marks.dedup_by(|later, earlier| later.same_kind(earlier));
}

/// Return `marks` with `mark` added, replacing any existing mark of the same
/// kind. The result is in canonical order.
pub fn with_mark(marks: &[Mark], mark: Mark) -> Vec<Mark> {
    let mut out: Vec<Mark> = marks
        .iter()
        .filter(|existing| !existing.same_kind(&mark))
        .cloned()
        .collect();
    out.push(mark);
    normalize_marks(&mut out);
    out
}

/// Return `marks` without any mark of the same kind as `mark`.
pub fn without_mark(marks: &[Mark], mark: &Mark) -> Vec<Mark> {
    marks
        .iter()
        .filter(|existing| !existing.same_kind(mark))
        .cloned()
        .collect()
}

pub fn has_mark_kind(marks: &[Mark], mark: &Mark) -> bool {
    marks.iter().any(|existing| existing.same_kind(mark))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_orders_and_dedups() {
        let mut marks = vec![Mark::Code, Mark::Bold, Mark::link("/a"), Mark::Bold];
        normalize_marks(&mut marks);
        assert_eq!(marks, vec![Mark::link("/a"), Mark::Bold, Mark::Code]);
    }

    #[test]
    fn test_with_mark_replaces_same_kind() {
        let marks = vec![Mark::link("/old"), Mark::Italic];
        let updated = with_mark(&marks, Mark::link("/new"));
        assert_eq!(updated, vec![Mark::link("/new"), Mark::Italic]);
    }

    #[test]
    fn test_without_mark_ignores_attributes() {
        let marks = vec![Mark::link("/a"), Mark::Bold];
        assert_eq!(without_mark(&marks, &Mark::link("/other")), vec![Mark::Bold]);
    }

    #[test]
    fn test_link_mark_json_shape() {
        let json = serde_json::to_string(&Mark::link("https://example.com")).unwrap();
        assert_eq!(json, r#"{"type":"link","attrs":{"href":"https://example.com"}}"#);
        let bold: Mark = serde_json::from_str(r#"{"type":"bold"}"#).unwrap();
        assert_eq!(bold, Mark::Bold);
    }
}
