pub mod activity;
pub mod editing;
pub mod extensions;
pub mod html;
pub mod hydrate;
pub mod model;
pub mod parse;
pub mod preview;
pub mod serialize;
pub mod store;

// Re-export key types for easier usage
pub use activity::{Activity, ActivityDraft, ActivityFilter, ActivityPatch, slugify};
pub use editing::{AttrUpdate, Cmd, Editor, Patch, Selection};
pub use hydrate::{
    ContentView, HtmlHost, HydrationReport, Hydrator, HydratorOptions, MountError, MountPoll,
    MountTicket, WidgetLoader, WidgetMarkup, WidgetProvider, hydrate_static,
};
pub use model::{Align, Document, Inline, Mark, Node, NodePath, SchemaError};
pub use parse::from_html;
pub use preview::{extract_first_image, extract_plain_text, preview_blurb};
pub use serialize::to_html;
pub use store::{ActivityStore, FileStore, MemoryStore, StoreError};
