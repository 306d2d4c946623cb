//! Core CLI definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dbdmix")]
#[command(about = "Mix cosmetic attachments onto Dead by Daylight character models", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output extra info to the console
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where to find the settings file and attachment definitions
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Path to settings YAML file (uses configured default, then settings.yaml)
    pub settings: Option<PathBuf>,

    /// Attachment definitions folder (overrides `attachmentsDir` from settings)
    #[arg(short, long, env = "DBDMIX_ATTACHMENTS_DIR")]
    pub attachments_dir: Option<PathBuf>,
}

/// Output format for the list command
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate settings against the attachment definitions
    #[command(visible_alias = "c")]
    Check {
        #[command(flatten)]
        args: SettingsArgs,
    },

    /// List slots, base models and attachments
    #[command(visible_alias = "l")]
    List {
        #[command(flatten)]
        args: SettingsArgs,

        /// Only list this slot
        #[arg(short, long)]
        slot: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Mix attachments with character models and write a results report
    #[command(visible_alias = "m")]
    Mix {
        #[command(flatten)]
        args: SettingsArgs,

        /// Only mix this slot
        #[arg(short, long)]
        slot: Option<String>,

        /// Only mix onto this base model
        #[arg(short, long)]
        base_model: Option<String>,

        /// Results file (defaults to <settings>-results.yaml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print every combination kept
        #[arg(short, long)]
        print: bool,

        /// Overwrite an existing results file
        #[arg(long)]
        overwrite: bool,

        /// Mix without writing the results file
        #[arg(long)]
        dry_run: bool,
    },

    /// Configure default paths
    Configure {
        /// Set default settings file
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Set default attachment definitions folder
        #[arg(long)]
        attachments_dir: Option<PathBuf>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
