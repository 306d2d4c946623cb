//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up dbdmix CLI defaults.

use crate::config::Config;
use anyhow::Result;
use std::path::PathBuf;

/// Handle the configure command
///
/// # Arguments
/// * `settings` - Optional settings file to use by default
/// * `attachments_dir` - Optional attachment definitions folder to use by default
/// * `show` - If true, show current configuration
pub fn handle(settings: Option<PathBuf>, attachments_dir: Option<PathBuf>, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if settings.is_none() && attachments_dir.is_none() {
        show_usage();
        return Ok(());
    }

    apply(&mut config, settings, attachments_dir);
    config.save()?;

    show_config(&config);
    if let Ok(path) = Config::config_path() {
        println!("Config saved to: {}", path.display());
    }

    Ok(())
}

/// Update only the values that were given
fn apply(config: &mut Config, settings: Option<PathBuf>, attachments_dir: Option<PathBuf>) {
    if let Some(path) = settings {
        config.settings_path = Some(path);
    }
    if let Some(dir) = attachments_dir {
        config.attachments_dir = Some(dir);
    }
}

/// Display current configuration
fn show_config(config: &Config) {
    match &config.settings_path {
        Some(path) => println!("Settings file: {}", path.display()),
        None => println!("No settings file configured"),
    }

    match &config.attachments_dir {
        Some(dir) => println!("Attachments folder: {}", dir.display()),
        None => println!("No attachments folder configured"),
    }

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: dbdmix configure --settings PATH --attachments-dir DIR");
    println!("   or: dbdmix configure --show");
}
