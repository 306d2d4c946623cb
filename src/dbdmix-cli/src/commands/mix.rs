//! Mix command handler
//!
//! Enumerates attachment combinations for each slot and base model and writes
//! the results report.

use anyhow::{bail, Context, Result};
use dbdmix::{MixResults, Mixer};
use std::fs;
use std::path::{Path, PathBuf};

use super::session::Session;
use crate::cli::SettingsArgs;

/// Options for a mixing run
#[derive(Debug, Default)]
pub struct MixOptions {
    pub slot: Option<String>,
    pub base_model: Option<String>,
    pub output: Option<PathBuf>,
    pub print: bool,
    pub overwrite: bool,
    pub dry_run: bool,
}

/// Reject a slot or base model the catalog doesn't know
pub fn validate_selection(mixer: &Mixer, slot: Option<&str>, base_model: Option<&str>) -> Result<()> {
    let catalog = mixer.catalog();

    if let Some(slot) = slot {
        if catalog.slot(slot).is_none() {
            bail!("Unknown slot: {}", slot);
        }
    }

    if let Some(model) = base_model {
        let known = match slot {
            Some(slot) => catalog.has_base_model(slot, model),
            None => catalog.slots().any(|s| s.base_models().any(|m| m == model)),
        };
        if !known {
            bail!("Unknown base model: {}", model);
        }
    }

    Ok(())
}

/// Print per slot and base model counts, and optionally every combination
pub fn print_summary(results: &MixResults, print_combos: bool) {
    for (slot, models) in &results.slots {
        println!("{}:", slot);
        for (model, mix) in models {
            println!(
                "  {}: {} combination(s), {} skipped",
                model,
                mix.combinations.len(),
                mix.skipped
            );
            if print_combos {
                for combo in &mix.combinations {
                    println!("    {}", combo);
                }
            }
        }
    }
    println!();
    println!(
        "Total: {} combination(s), {} skipped",
        results.total_combinations, results.total_skipped
    );
}

/// Write the results report, refusing to replace an existing file unless asked
pub fn write_results(results: &MixResults, path: &Path, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        bail!(
            "{} already exists (use --overwrite to replace it)",
            path.display()
        );
    }

    let yaml = results.to_yaml().context("Failed to serialize results")?;
    fs::write(path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}

/// Main handler for the mix command
pub fn handle(args: &SettingsArgs, options: MixOptions) -> Result<()> {
    let session = Session::open(args)?;
    let mixer = session.mixer()?;

    let slot = options.slot.as_deref();
    let base_model = options.base_model.as_deref();
    validate_selection(&mixer, slot, base_model)?;

    let results = mixer.mix_selected(slot, base_model);
    print_summary(&results, options.print);

    let output = options
        .output
        .unwrap_or_else(|| dbdmix::results_path(&session.settings_path));

    if options.dry_run {
        tracing::info!("Dry run: not writing {}", output.display());
        return Ok(());
    }

    write_results(&results, &output, options.overwrite)?;
    println!("Results written to {}", output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbdmix::{Attachment, PartCatalog, Settings};

    fn create_test_mixer() -> Mixer {
        let mut catalog = PartCatalog::new();
        catalog
            .insert(Attachment::new("SurvivorTorso", "KateGuitar"))
            .unwrap();
        catalog
            .insert(Attachment::new("SurvivorTorso", "KatePurpleHat"))
            .unwrap();
        let settings = Settings::from_yaml(
            "baseModels:\n  SurvivorTorso: [KateBikerVariantsReadyToRide]\n",
        )
        .unwrap();
        Mixer::new(&settings, catalog).unwrap()
    }

    #[test]
    fn test_validate_selection() {
        let mixer = create_test_mixer();

        assert!(validate_selection(&mixer, None, None).is_ok());
        assert!(validate_selection(&mixer, Some("SurvivorTorso"), None).is_ok());
        assert!(validate_selection(&mixer, None, Some("KateBikerVariantsReadyToRide")).is_ok());
        assert!(validate_selection(&mixer, Some("SurvivorLegs"), None).is_err());
        assert!(validate_selection(&mixer, Some("SurvivorTorso"), Some("Nobody")).is_err());
    }

    #[test]
    fn test_write_results_respects_overwrite() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("settings-results.yaml");
        let results = create_test_mixer().mix_all();

        write_results(&results, &path, false).unwrap();
        assert!(write_results(&results, &path, false).is_err());
        write_results(&results, &path, true).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(MixResults::from_yaml(&written).unwrap(), results);
        assert_eq!(results.total_combinations, 4);
    }
}
