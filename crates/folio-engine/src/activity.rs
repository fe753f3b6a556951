use crate::preview::{self, DEFAULT_PREVIEW_LENGTH};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A post in the activity feed. Field names follow the persisted record,
/// which mixes camel and snake case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    #[serde(rename = "formatTag", default)]
    pub format_tag: Option<String>,
    #[serde(rename = "categoryTags", default)]
    pub category_tags: Vec<String>,
    #[serde(rename = "industryTags", default)]
    pub industry_tags: Vec<String>,
    #[serde(default)]
    pub preview: String,
    #[serde(default)]
    pub featured_image: Option<String>,
    /// Serialized document HTML.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an activity. The slug is derived from the title when
/// absent, and the featured image from the first image in the content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityDraft {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(rename = "formatTag", default)]
    pub format_tag: Option<String>,
    #[serde(rename = "categoryTags", default)]
    pub category_tags: Vec<String>,
    #[serde(rename = "industryTags", default)]
    pub industry_tags: Vec<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub published: bool,
}

impl ActivityDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn resolved_slug(&self) -> String {
        match &self.slug {
            Some(slug) if !slug.trim().is_empty() => slugify(slug),
            _ => slugify(&self.title),
        }
    }
}

/// Partial update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(rename = "formatTag", default)]
    pub format_tag: Option<Option<String>>,
    #[serde(rename = "categoryTags", default)]
    pub category_tags: Option<Vec<String>>,
    #[serde(rename = "industryTags", default)]
    pub industry_tags: Option<Vec<String>>,
    #[serde(default)]
    pub preview: Option<String>,
    #[serde(default)]
    pub featured_image: Option<Option<String>>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub published: Option<bool>,
}

impl ActivityPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFilter {
    pub published: Option<bool>,
    /// Matches either a category or an industry tag.
    pub tag: Option<String>,
    pub format_tag: Option<String>,
}

impl ActivityFilter {
    pub fn published() -> Self {
        Self {
            published: Some(true),
            ..Self::default()
        }
    }

    pub fn matches(&self, activity: &Activity) -> bool {
        if let Some(published) = self.published
            && activity.published != published
        {
            return false;
        }
        if let Some(tag) = &self.tag
            && !activity
                .category_tags
                .iter()
                .chain(&activity.industry_tags)
                .any(|candidate| candidate.eq_ignore_ascii_case(tag))
        {
            return false;
        }
        if let Some(format_tag) = &self.format_tag
            && !activity
                .format_tag
                .as_deref()
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(format_tag))
        {
            return false;
        }
        true
    }
}

impl Activity {
    pub fn from_draft(draft: ActivityDraft, now: DateTime<Utc>) -> Self {
        Self::from_draft_with(draft, now, DEFAULT_PREVIEW_LENGTH)
    }

    pub fn from_draft_with(
        draft: ActivityDraft,
        now: DateTime<Utc>,
        preview_length: usize,
    ) -> Self {
        let slug = draft.resolved_slug();
        let preview = preview::preview_blurb_from_html(&draft.content, preview_length);
        let featured_image = draft
            .featured_image
            .filter(|src| !src.trim().is_empty())
            .or_else(|| preview::extract_first_image_from_html(&draft.content));
        Self {
            id: Uuid::new_v4(),
            slug,
            title: draft.title,
            format_tag: draft.format_tag,
            category_tags: draft.category_tags,
            industry_tags: draft.industry_tags,
            preview,
            featured_image,
            content: draft.content,
            published: draft.published,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a patch. New content recomputes the preview and the featured
    /// image unless the patch sets them explicitly.
    pub fn apply(&mut self, patch: ActivityPatch, now: DateTime<Utc>, preview_length: usize) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(slug) = patch.slug {
            self.slug = slugify(&slug);
        }
        if let Some(format_tag) = patch.format_tag {
            self.format_tag = format_tag;
        }
        if let Some(tags) = patch.category_tags {
            self.category_tags = tags;
        }
        if let Some(tags) = patch.industry_tags {
            self.industry_tags = tags;
        }
        if let Some(content) = patch.content {
            self.preview = preview::preview_blurb_from_html(&content, preview_length);
            self.featured_image = preview::extract_first_image_from_html(&content);
            self.content = content;
        }
        if let Some(featured_image) = patch.featured_image {
            self.featured_image = featured_image;
        }
        if let Some(preview) = patch.preview {
            self.preview = preview;
        }
        if let Some(published) = patch.published {
            self.published = published;
        }
        self.updated_at = now;
    }
}

/// URL slug: lowercase ASCII letters and digits, every other run of
/// characters collapsed to a single `-`, no leading or trailing `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn sample() -> Activity {
        Activity::from_draft(
            ActivityDraft {
                title: "Robot Cell Retrofit".to_string(),
                format_tag: Some("Case Study".to_string()),
                category_tags: vec!["Robotics".to_string()],
                industry_tags: vec!["Automotive".to_string()],
                content: r#"<p>We retrofitted a welding cell.</p><p><img src="/cell.jpg"></p>"#
                    .to_string(),
                ..ActivityDraft::default()
            },
            Utc::now(),
        )
    }

    #[rstest]
    #[case("Robot Cell Retrofit", "robot-cell-retrofit")]
    #[case("  PLC -- upgrade!  ", "plc-upgrade")]
    #[case("Q3 2024: Results", "q3-2024-results")]
    #[case("Café crème", "caf-cr-me")]
    #[case("!!!", "")]
    fn test_slugify(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(slugify(input), expected);
    }

    #[test]
    fn test_from_draft_derives_fields() {
        let activity = sample();
        assert_eq!(activity.slug, "robot-cell-retrofit");
        assert_eq!(activity.preview, "We retrofitted a welding cell.");
        assert_eq!(activity.featured_image.as_deref(), Some("/cell.jpg"));
        assert_eq!(activity.created_at, activity.updated_at);
    }

    #[test]
    fn test_explicit_slug_is_slugified() {
        let draft = ActivityDraft {
            slug: Some("My Custom Slug".to_string()),
            ..ActivityDraft::new("Title", "")
        };
        assert_eq!(draft.resolved_slug(), "my-custom-slug");
    }

    #[test]
    fn test_serde_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        let object = json.as_object().unwrap();
        for key in [
            "formatTag",
            "categoryTags",
            "industryTags",
            "featured_image",
            "created_at",
            "updated_at",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn test_patch_content_recomputes_preview() {
        let mut activity = sample();
        let later = activity.updated_at + chrono::Duration::seconds(5);
        activity.apply(
            ActivityPatch {
                content: Some("<p>Rewritten.</p>".to_string()),
                published: Some(true),
                ..ActivityPatch::default()
            },
            later,
            DEFAULT_PREVIEW_LENGTH,
        );
        assert_eq!(activity.preview, "Rewritten.");
        assert!(activity.published);
        assert_eq!(activity.updated_at, later);
        assert_eq!(activity.slug, "robot-cell-retrofit");
    }

    #[test]
    fn test_patch_content_recomputes_featured_image() {
        let mut activity = sample();
        let now = activity.updated_at;
        activity.apply(
            ActivityPatch {
                content: Some(r#"<p>New shot.</p><img src="/new.png">"#.to_string()),
                ..ActivityPatch::default()
            },
            now,
            DEFAULT_PREVIEW_LENGTH,
        );
        assert_eq!(activity.featured_image.as_deref(), Some("/new.png"));

        activity.apply(
            ActivityPatch {
                content: Some("<p>No pictures.</p>".to_string()),
                ..ActivityPatch::default()
            },
            now,
            DEFAULT_PREVIEW_LENGTH,
        );
        assert_eq!(activity.featured_image, None);
    }

    #[test]
    fn test_explicit_featured_image_wins_over_content() {
        let mut activity = sample();
        let now = activity.updated_at;
        activity.apply(
            ActivityPatch {
                content: Some(r#"<img src="/new.png">"#.to_string()),
                featured_image: Some(Some("/chosen.png".to_string())),
                ..ActivityPatch::default()
            },
            now,
            DEFAULT_PREVIEW_LENGTH,
        );
        assert_eq!(activity.featured_image.as_deref(), Some("/chosen.png"));
    }

    #[rstest]
    #[case(ActivityFilter::default(), true)]
    #[case(ActivityFilter::published(), false)]
    #[case(ActivityFilter { tag: Some("robotics".to_string()), ..ActivityFilter::default() }, true)]
    #[case(ActivityFilter { tag: Some("automotive".to_string()), ..ActivityFilter::default() }, true)]
    #[case(ActivityFilter { tag: Some("food".to_string()), ..ActivityFilter::default() }, false)]
    #[case(ActivityFilter { format_tag: Some("case study".to_string()), ..ActivityFilter::default() }, true)]
    fn test_filter(#[case] filter: ActivityFilter, #[case] expected: bool) {
        assert_eq!(filter.matches(&sample()), expected);
    }
}
