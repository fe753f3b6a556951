use super::Input;
use anyhow::{Context, Result};
use clap::Subcommand;
use folio_config::Config;
use folio_engine::store::{ActivityStore, FileStore};
use folio_engine::{Activity, ActivityDraft, ActivityFilter, ActivityPatch};
use std::io::Write;
use uuid::Uuid;

#[derive(Subcommand, Debug)]
pub enum ActivityCommand {
    /// Create an activity from an HTML file
    Create {
        #[arg(long)]
        title: String,
        /// HTML content file, or - for stdin
        #[arg(long)]
        content: Input,
        /// Defaults to a slug derived from the title
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        format_tag: Option<String>,
        #[arg(long = "category")]
        categories: Vec<String>,
        #[arg(long = "industry")]
        industries: Vec<String>,
        #[arg(long)]
        featured_image: Option<String>,
        #[arg(long)]
        published: bool,
    },

    /// List activities, newest first
    List {
        /// Only published activities
        #[arg(long)]
        published: bool,
        /// Category or industry tag
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        format_tag: Option<String>,
    },

    /// Print an activity as JSON
    Show { slug: String },

    /// Change fields of an activity
    Update {
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        /// HTML content file, or - for stdin
        #[arg(long)]
        content: Option<Input>,
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        format_tag: Option<String>,
    },

    /// Publish an activity, or take it down with --unpublish
    Publish {
        id: Uuid,
        #[arg(long)]
        unpublish: bool,
    },

    Delete { id: Uuid },
}

pub fn run(command: ActivityCommand, config: &Config, out: &mut dyn Write) -> Result<()> {
    let mut store = FileStore::open(&config.store_path)
        .with_context(|| format!("Failed to open store at {}", config.store_path.display()))?
        .with_preview_length(config.preview_length);
    log::debug!("Using activity store at {}", store.root().display());
    execute(command, &mut store, out)
}

fn execute(
    command: ActivityCommand,
    store: &mut dyn ActivityStore,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        ActivityCommand::Create {
            title,
            content,
            slug,
            format_tag,
            categories,
            industries,
            featured_image,
            published,
        } => {
            let draft = ActivityDraft {
                title,
                slug,
                format_tag,
                category_tags: categories,
                industry_tags: industries,
                featured_image,
                content: content.read_to_string()?,
                published,
            };
            let activity = store.create(draft)?;
            writeln!(out, "{}\t{}", activity.id, activity.slug)?;
        }
        ActivityCommand::List {
            published,
            tag,
            format_tag,
        } => {
            let filter = ActivityFilter {
                published: published.then_some(true),
                tag,
                format_tag,
            };
            for activity in store.list(&filter)? {
                writeln!(out, "{}", summary_line(&activity))?;
            }
        }
        ActivityCommand::Show { slug } => {
            let activity = store
                .get(&slug)?
                .with_context(|| format!("No activity with slug {slug}"))?;
            serde_json::to_writer_pretty(&mut *out, &activity)?;
            writeln!(out)?;
        }
        ActivityCommand::Update {
            id,
            title,
            content,
            slug,
            format_tag,
        } => {
            let patch = ActivityPatch {
                title,
                slug,
                format_tag: format_tag.map(Some),
                content: content.map(|input| input.read_to_string()).transpose()?,
                ..ActivityPatch::default()
            };
            if patch.is_empty() {
                log::warn!("Nothing to update for {id}");
                return Ok(());
            }
            let activity = store.update(id, patch)?;
            writeln!(out, "{}", summary_line(&activity))?;
        }
        ActivityCommand::Publish { id, unpublish } => {
            let patch = ActivityPatch {
                published: Some(!unpublish),
                ..ActivityPatch::default()
            };
            let activity = store.update(id, patch)?;
            writeln!(out, "{}", summary_line(&activity))?;
        }
        ActivityCommand::Delete { id } => {
            store.delete(id)?;
            writeln!(out, "deleted {id}")?;
        }
    }
    Ok(())
}

fn summary_line(activity: &Activity) -> String {
    let state = if activity.published { "published" } else { "draft" };
    format!(
        "{}\t{}\t{}\t{}",
        activity.id, activity.slug, state, activity.title
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_engine::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn execute_to_string(command: ActivityCommand, store: &mut MemoryStore) -> String {
        let mut buffer = Vec::new();
        execute(command, store, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    fn create_command(dir: &TempDir, title: &str, published: bool) -> ActivityCommand {
        let path = dir.path().join(format!("{title}.html"));
        std::fs::write(&path, "<p>Body text</p>").unwrap();
        ActivityCommand::Create {
            title: title.to_string(),
            content: Input::File(path),
            slug: None,
            format_tag: None,
            categories: vec!["Robotics".to_string()],
            industries: Vec::new(),
            featured_image: None,
            published,
        }
    }

    #[test]
    fn test_create_list_publish() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = MemoryStore::new();
        execute_to_string(create_command(&temp_dir, "Alpha", false), &mut store);
        execute_to_string(create_command(&temp_dir, "Beta", true), &mut store);

        let listed = execute_to_string(
            ActivityCommand::List {
                published: true,
                tag: None,
                format_tag: None,
            },
            &mut store,
        );
        assert_eq!(listed.lines().count(), 1);
        assert!(listed.contains("\tbeta\tpublished\tBeta"));

        let alpha = store.get("alpha").unwrap().unwrap();
        execute_to_string(
            ActivityCommand::Publish {
                id: alpha.id,
                unpublish: false,
            },
            &mut store,
        );
        assert!(store.get("alpha").unwrap().unwrap().published);
    }

    #[test]
    fn test_show_prints_persisted_json() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = MemoryStore::new();
        execute_to_string(create_command(&temp_dir, "Gamma", false), &mut store);
        let shown = execute_to_string(
            ActivityCommand::Show {
                slug: "gamma".to_string(),
            },
            &mut store,
        );
        let value: serde_json::Value = serde_json::from_str(&shown).unwrap();
        assert_eq!(value["preview"], "Body text");
        assert_eq!(value["categoryTags"][0], "Robotics");
    }

    #[test]
    fn test_show_unknown_slug_fails() {
        let mut store = MemoryStore::new();
        let mut buffer = Vec::new();
        let result = execute(
            ActivityCommand::Show {
                slug: "nope".to_string(),
            },
            &mut store,
            &mut buffer,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_run_against_file_store() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            store_path: temp_dir.path().join("store"),
            ..Config::default()
        };
        let mut buffer = Vec::new();
        run(create_command(&temp_dir, "Delta", false), &config, &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.trim_end().ends_with("\tdelta"));
        assert_eq!(std::fs::read_dir(&config.store_path).unwrap().count(), 1);
    }
}
