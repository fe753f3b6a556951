mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{ActivityCommand, Input};
use folio_config::Config;
use std::io::{self, Write};
use std::path::PathBuf;

/// Convert, preview and publish folio documents
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.config/folio/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Activity store directory, overriding the config file
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse HTML into document JSON
    Parse {
        /// HTML file, or - for stdin
        input: Input,
        /// Check the document against the composition rules
        #[arg(long)]
        validate: bool,
    },

    /// Render document JSON as HTML
    Render {
        /// JSON file, or - for stdin
        input: Input,
    },

    /// Parse and re-serialize HTML, failing if a second pass changes the tree
    Roundtrip {
        /// HTML file, or - for stdin
        input: Input,
    },

    /// Print the preview blurb and featured image of an HTML document
    Preview {
        /// HTML file, or - for stdin
        input: Input,
        /// Maximum blurb length in characters
        #[arg(short, long)]
        length: Option<usize>,
    },

    /// Replace social embed placeholders with static fallback cards
    Static {
        /// HTML file, or - for stdin
        input: Input,
    },

    /// Manage activities in the store
    Activity {
        #[command(subcommand)]
        command: ActivityCommand,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?
            .with_context(|| format!("Config file not found: {}", path.display()))?,
        None => {
            log::debug!("Config path: {}", Config::config_path().display());
            Config::load_or_default()?
        }
    };
    if let Some(store) = &cli.store {
        config.store_path = store.clone();
    }
    Ok(config)
}

fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let config = load_config(&cli)?;
    match cli.command {
        Command::Parse { input, validate } => commands::convert::parse(&input, validate, out),
        Command::Render { input } => commands::convert::render(&input, out),
        Command::Roundtrip { input } => commands::convert::roundtrip(&input, out),
        Command::Preview { input, length } => {
            let length = length.unwrap_or(config.preview_length);
            commands::convert::preview(&input, length, out)
        }
        Command::Static { input } => commands::convert::to_static(&input, &config, out),
        Command::Activity { command } => commands::activity::run(command, &config, out),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["folio", "preview", "-", "--verbose", "--store", "/tmp/s"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/s")));
        assert!(matches!(cli.command, Command::Preview { length: None, .. }));
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let cli = Cli::try_parse_from([
            "folio",
            "--config",
            "/definitely/not/here/config.toml",
            "render",
            "-",
        ])
        .unwrap();
        assert!(load_config(&cli).is_err());
    }
}
