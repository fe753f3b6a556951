/*!
 * # Editing Surface
 *
 * An [`Editor`] owns one [`Document`](crate::model::Document), a selection and
 * a version counter. All changes go through [`Cmd`]s, and every call to
 * [`Editor::apply`] returns a [`Patch`] saying whether the command applied,
 * the new version and where the selection ended up.
 *
 * ## Usage Pattern
 *
 * ```rust
 * use folio_engine::editing::{Cmd, Editor};
 *
 * let mut editor = Editor::from_html("<p>Watch this</p>");
 * let patch = editor.apply(Cmd::InsertSocialEmbed {
 *     url: "https://x.com/someone/status/1790123456789012345".to_string(),
 * });
 * assert!(patch.applied);
 *
 * let html = editor.to_html();
 * assert!(html.contains(r#"data-embed-id="1790123456789012345""#));
 * ```
 *
 * ## Module Structure
 *
 * - **`editor`**: the `Editor` and command application
 * - **`commands`**: `Cmd` and `AttrUpdate`
 * - **`selection`**: node path plus character range
 * - **`patch`**: result of applying a command
 * - **`node_view`**: how each node kind is shown inside the editor
 */

pub mod commands;
pub mod editor;
pub mod node_view;
pub mod patch;
pub mod selection;

pub use commands::{AttrUpdate, Cmd};
pub use editor::Editor;
pub use node_view::{NodeView, node_view};
pub use patch::Patch;
pub use selection::Selection;
