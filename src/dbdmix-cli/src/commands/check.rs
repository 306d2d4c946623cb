//! Settings validation command handler

use anyhow::Result;

use super::session::Session;
use crate::cli::SettingsArgs;

/// Load and compile the settings, reporting every problem found
pub fn handle(args: &SettingsArgs) -> Result<()> {
    let session = Session::open(args)?;
    let mixer = session.mixer()?;

    let catalog = mixer.catalog();
    let slots: Vec<_> = catalog.slots().collect();
    let base_models: usize = slots.iter().map(|s| s.base_models().count()).sum();

    println!("Settings OK: {}", session.settings_path.display());
    println!(
        "  {} slot(s), {} attachment(s), {} base model(s), {} skip pattern(s)",
        slots.len(),
        catalog.len(),
        base_models,
        mixer.rules().filter().len()
    );

    for slot in slots.iter().filter(|s| s.base_models().next().is_none()) {
        println!(
            "  note: slot {} has no base models under `baseModels` and will not be mixed",
            slot.name
        );
    }

    Ok(())
}
