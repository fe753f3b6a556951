use super::{ActivityStore, StoreError, check_slug, filter_sorted};
use crate::activity::{Activity, ActivityDraft, ActivityFilter, ActivityPatch};
use crate::preview::DEFAULT_PREVIEW_LENGTH;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One pretty-printed JSON file per activity, named `{id}.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    preview_length: usize,
}

impl FileStore {
    /// Open a store directory, creating it when missing.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        if root.exists() && !root.is_dir() {
            return Err(StoreError::InvalidStoreDir(root));
        }
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            preview_length: DEFAULT_PREVIEW_LENGTH,
        })
    }

    pub fn with_preview_length(mut self, preview_length: usize) -> Self {
        self.preview_length = preview_length;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    fn read(path: &Path) -> Result<Activity, StoreError> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| StoreError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write(&self, activity: &Activity) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(activity)?;
        fs::write(self.path_for(activity.id), content)?;
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Activity>, StoreError> {
        let mut activities = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_file()
                && let Some(ext) = path.extension()
                && ext == "json"
            {
                activities.push(Self::read(&path)?);
            }
        }
        Ok(activities)
    }
}

impl ActivityStore for FileStore {
    fn create(&mut self, draft: ActivityDraft) -> Result<Activity, StoreError> {
        let title = draft.title.clone();
        let activity = Activity::from_draft_with(draft, Utc::now(), self.preview_length);
        check_slug(&activity.slug, &title, None, &self.load_all()?)?;
        self.write(&activity)?;
        log::info!("Created activity {} ({})", activity.slug, activity.id);
        Ok(activity)
    }

    fn get(&self, slug: &str) -> Result<Option<Activity>, StoreError> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|activity| activity.slug == slug))
    }

    fn get_by_id(&self, id: Uuid) -> Result<Option<Activity>, StoreError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(None);
        }
        Self::read(&path).map(Some)
    }

    fn update(&mut self, id: Uuid, patch: ActivityPatch) -> Result<Activity, StoreError> {
        let mut activity = self
            .get_by_id(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let requested_slug = patch.slug.clone();
        activity.apply(patch, Utc::now(), self.preview_length);
        if let Some(requested) = requested_slug {
            check_slug(&activity.slug, &requested, Some(id), &self.load_all()?)?;
        }
        self.write(&activity)?;
        log::debug!("Updated activity {}", activity.id);
        Ok(activity)
    }

    fn delete(&mut self, id: Uuid) -> Result<(), StoreError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        fs::remove_file(path)?;
        log::info!("Deleted activity {id}");
        Ok(())
    }

    fn list(&self, filter: &ActivityFilter) -> Result<Vec<Activity>, StoreError> {
        Ok(filter_sorted(self.load_all()?, filter))
    }
}
