pub mod activity;
pub mod convert;

pub use activity::ActivityCommand;

use anyhow::{Context, Result};
use std::convert::Infallible;
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;

/// A file path, or `-` for standard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl FromStr for Input {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(if value == "-" {
            Input::Stdin
        } else {
            Input::File(PathBuf::from(value))
        })
    }
}

impl Input {
    pub fn read_to_string(&self) -> Result<String> {
        match self {
            Input::Stdin => {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .context("Failed to read standard input")?;
                Ok(buffer)
            }
            Input::File(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display())),
        }
    }
}
