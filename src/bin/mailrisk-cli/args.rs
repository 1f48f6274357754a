use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use mailrisk_lib::Settings;

#[derive(Parser)]
#[command(name = "mailrisk-cli", version, about = "Domain risk classification for e-mail addresses")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    /// read addresses from stdin (one per line)
    #[arg(long)]
    pub stdin: bool,

    /// write report to file (JSON/NDJSON/CSV depending on --format)
    #[arg(long)]
    pub out: Option<String>,

    /// format: human|json|ndjson|csv
    #[arg(long, default_value = "human")]
    pub format: String,

    /// TOML settings file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// data directory (overrides `data_dir` from the settings file)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// more logs (-v: debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// JSON logs on stderr
    #[arg(long)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// classify one or more addresses
    Check {
        #[arg(required = true)]
        emails: Vec<String>,
    },
    /// show which data files were found and how many entries each list holds
    Status,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn clap_command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }

    /// Defaults, then the settings file, then command-line overrides.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_toml_file(path)
                .with_context(|| format!("load settings from {}", path.display()))?,
            None => Settings::default(),
        };
        if let Some(dir) = &self.data_dir {
            settings.data_dir = dir.clone();
        }
        Ok(settings)
    }
}
