use super::Selection;

/// Result of applying a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// False when the command was rejected and the document is unchanged.
    pub applied: bool,
    pub version: u64,
    pub selection: Selection,
}
