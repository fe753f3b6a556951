use super::{ActivityStore, StoreError, check_slug, filter_sorted};
use crate::activity::{Activity, ActivityDraft, ActivityFilter, ActivityPatch};
use crate::preview::DEFAULT_PREVIEW_LENGTH;
use chrono::Utc;
use uuid::Uuid;

/// In-process store, used by tests and previews.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    activities: Vec<Activity>,
    preview_length: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_preview_length(DEFAULT_PREVIEW_LENGTH)
    }

    pub fn with_preview_length(preview_length: usize) -> Self {
        Self {
            activities: Vec::new(),
            preview_length,
        }
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

impl ActivityStore for MemoryStore {
    fn create(&mut self, draft: ActivityDraft) -> Result<Activity, StoreError> {
        let title = draft.title.clone();
        let activity = Activity::from_draft_with(draft, Utc::now(), self.preview_length);
        check_slug(&activity.slug, &title, None, &self.activities)?;
        self.activities.push(activity.clone());
        Ok(activity)
    }

    fn get(&self, slug: &str) -> Result<Option<Activity>, StoreError> {
        Ok(self
            .activities
            .iter()
            .find(|activity| activity.slug == slug)
            .cloned())
    }

    fn get_by_id(&self, id: Uuid) -> Result<Option<Activity>, StoreError> {
        Ok(self
            .activities
            .iter()
            .find(|activity| activity.id == id)
            .cloned())
    }

    fn update(&mut self, id: Uuid, patch: ActivityPatch) -> Result<Activity, StoreError> {
        let index = self
            .activities
            .iter()
            .position(|activity| activity.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let mut updated = self.activities[index].clone();
        let requested_slug = patch.slug.clone();
        updated.apply(patch, Utc::now(), self.preview_length);
        if let Some(requested) = requested_slug {
            check_slug(&updated.slug, &requested, Some(id), &self.activities)?;
        }
        self.activities[index] = updated.clone();
        Ok(updated)
    }

    fn delete(&mut self, id: Uuid) -> Result<(), StoreError> {
        let before = self.activities.len();
        self.activities.retain(|activity| activity.id != id);
        if self.activities.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn list(&self, filter: &ActivityFilter) -> Result<Vec<Activity>, StoreError> {
        Ok(filter_sorted(self.activities.clone(), filter))
    }
}
