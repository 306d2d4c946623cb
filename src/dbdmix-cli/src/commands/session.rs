//! Loading settings and attachment definitions shared by every command

use anyhow::{bail, Context, Result};
use dbdmix::{AttachmentDefinition, ConfigError, Mixer, PartCatalog, Settings};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::SettingsArgs;
use crate::config::Config;
use crate::file_utils;

/// Settings and catalog loaded for one command run
#[derive(Debug)]
pub struct Session {
    pub settings_path: PathBuf,
    pub settings: Settings,
    pub attachments_dir: PathBuf,
    pub catalog: PartCatalog,
}

impl Session {
    /// Resolve paths, then load the settings file and attachment definitions
    pub fn open(args: &SettingsArgs) -> Result<Self> {
        let config = Config::load()?;
        let settings_path = config.resolve_settings_path(args.settings.clone());

        if !settings_path.exists() {
            bail!(
                "Settings file not found: {} (pass a path or run `dbdmix configure --settings <path>`)",
                settings_path.display()
            );
        }

        let settings = Settings::load(&settings_path)
            .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;
        tracing::info!(
            "Loaded settings from {} file(s) ending at {}",
            settings.sources.len(),
            settings_path.display()
        );

        let from_settings = settings
            .attachments_dir
            .as_deref()
            .map(|dir| relative_to_settings(&settings_path, dir));
        let attachments_dir =
            config.resolve_attachments_dir(args.attachments_dir.clone(), from_settings);
        let catalog = load_catalog(&attachments_dir)?;
        tracing::info!(
            "Loaded {} attachment(s) in {} slot(s) from {}",
            catalog.len(),
            catalog.slots().count(),
            attachments_dir.display()
        );

        Ok(Session {
            settings_path,
            settings,
            attachments_dir,
            catalog,
        })
    }

    /// Catalog with the base models from settings registered, without rule checks
    pub fn catalog_with_base_models(&self) -> PartCatalog {
        let mut catalog = self.catalog.clone();
        for (slot, models) in &self.settings.base_models {
            catalog.add_base_models(slot, models.iter().cloned());
        }
        catalog
    }

    /// Compile the rules, reporting every settings problem at once
    pub fn mixer(&self) -> Result<Mixer> {
        Mixer::new(&self.settings, self.catalog.clone()).map_err(|err| {
            report_problems(&err);
            anyhow::anyhow!(
                "{} problem(s) found in {}",
                err.problems.len(),
                self.settings_path.display()
            )
        })
    }
}

/// Print each settings problem on its own line
pub fn report_problems(err: &ConfigError) {
    eprintln!("Settings problems:");
    for problem in &err.problems {
        eprintln!("  - {}", problem);
    }
}

/// Resolve a relative `attachmentsDir` against the settings file's folder
pub fn relative_to_settings(settings_path: &Path, dir: &Path) -> PathBuf {
    match settings_path.parent() {
        Some(parent) if dir.is_relative() => parent.join(dir),
        _ => dir.to_path_buf(),
    }
}

/// Load every `*.yaml` attachment definition under `dir`.
///
/// Definitions without a `slot` take the name of the folder they are in.
pub fn load_catalog(dir: &Path) -> Result<PartCatalog> {
    if !dir.is_dir() {
        bail!("Attachments folder not found: {}", dir.display());
    }

    let mut catalog = PartCatalog::new();
    file_utils::walk_definition_files(dir, |path, folder_slot| {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read attachment definition {}", path.display()))?;
        let definition = AttachmentDefinition::from_yaml(&contents)
            .with_context(|| format!("Failed to parse attachment definition {}", path.display()))?;

        let attachment = definition
            .into_attachment(folder_slot)
            .with_context(|| format!("Invalid attachment definition {}", path.display()))?;
        tracing::debug!("{}: {} from {}", attachment.slot, attachment.id, path.display());

        catalog
            .insert(attachment)
            .with_context(|| format!("Failed to add {}", path.display()))?;
        Ok(())
    })?;

    Ok(catalog)
}
