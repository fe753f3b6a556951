//! Persistence of activity records.
//!
//! The backing service is opaque to the rest of the crate: callers hand it
//! already-serialized content and get records back. No locking is done;
//! the last write wins.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::activity::{Activity, ActivityDraft, ActivityFilter, ActivityPatch};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Activity not found: {0}")]
    NotFound(String),
    #[error("Slug already in use: {0}")]
    SlugTaken(String),
    #[error("Cannot derive a slug from {0:?}")]
    InvalidSlug(String),
    #[error("Invalid store directory: {0}")]
    InvalidStoreDir(PathBuf),
    #[error("Failed to decode activity at {path}: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to encode activity: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait ActivityStore {
    fn create(&mut self, draft: ActivityDraft) -> Result<Activity, StoreError>;
    fn get(&self, slug: &str) -> Result<Option<Activity>, StoreError>;
    fn get_by_id(&self, id: Uuid) -> Result<Option<Activity>, StoreError>;
    fn update(&mut self, id: Uuid, patch: ActivityPatch) -> Result<Activity, StoreError>;
    fn delete(&mut self, id: Uuid) -> Result<(), StoreError>;
    /// Matching activities, newest first.
    fn list(&self, filter: &ActivityFilter) -> Result<Vec<Activity>, StoreError>;
}

/// Rejects an empty slug or one held by a different activity.
fn check_slug(
    slug: &str,
    source: &str,
    own_id: Option<Uuid>,
    existing: &[Activity],
) -> Result<(), StoreError> {
    if slug.is_empty() {
        return Err(StoreError::InvalidSlug(source.to_string()));
    }
    if existing
        .iter()
        .any(|activity| activity.slug == slug && Some(activity.id) != own_id)
    {
        return Err(StoreError::SlugTaken(slug.to_string()));
    }
    Ok(())
}

fn filter_sorted(mut activities: Vec<Activity>, filter: &ActivityFilter) -> Vec<Activity> {
    activities.retain(|activity| filter.matches(activity));
    activities.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.slug.cmp(&b.slug))
    });
    activities
}
