//! Attachment mixing across slots and base models.
//!
//! The mixer ties the compiled rules and skip patterns together: for every
//! slot and every base model it enumerates rule-valid combinations and drops
//! the ones a skip pattern matches. The result can be written out as a YAML
//! report next to the settings file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::catalog::PartCatalog;
use crate::combo::{ComboEnumerator, Combination};
use crate::rules::{ConfigError, RuleSet};
use crate::settings::Settings;

/// Combinations mixed for one base model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseModelMix {
    pub skipped: usize,
    pub combinations: Vec<Combination>,
}

/// Report of a mixing run: slot → base model → combinations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixResults {
    pub total_combinations: usize,
    pub total_skipped: usize,
    pub slots: BTreeMap<String, BTreeMap<String, BaseModelMix>>,
}

impl MixResults {
    fn record(&mut self, slot: &str, base_model: &str, mix: BaseModelMix) {
        self.total_combinations += mix.combinations.len();
        self.total_skipped += mix.skipped;
        self.slots
            .entry(slot.to_string())
            .or_default()
            .insert(base_model.to_string(), mix);
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

/// Path of the results report for a settings file (`settings.yaml` → `settings-results.yaml`)
pub fn results_path(settings_path: &Path) -> PathBuf {
    let stem = settings_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "settings".to_string());
    settings_path.with_file_name(format!("{stem}-results.yaml"))
}

/// Mixes attachments using rules compiled once at construction
#[derive(Debug, Clone)]
pub struct Mixer {
    rules: RuleSet,
}

impl Mixer {
    pub fn new(settings: &Settings, catalog: PartCatalog) -> Result<Self, ConfigError> {
        Ok(Mixer {
            rules: RuleSet::compile(settings, catalog)?,
        })
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn catalog(&self) -> &PartCatalog {
        self.rules.catalog()
    }

    /// Every rule-valid combination for `slot` on `base_model`, skip patterns not applied
    pub fn enumerate_combinations(&self, slot: &str, base_model: &str) -> ComboEnumerator<'_> {
        ComboEnumerator::new(&self.rules, slot, base_model)
    }

    /// Rule-valid combinations minus those matched by a skip pattern
    pub fn mix<'a>(
        &'a self,
        slot: &'a str,
        base_model: &'a str,
    ) -> impl Iterator<Item = Combination> + 'a {
        let filter = self.rules.filter();
        self.enumerate_combinations(slot, base_model)
            .filter(move |combo| !filter.should_skip(slot, combo, base_model))
    }

    /// Mix one slot on one base model, counting skipped combinations
    pub fn mix_base_model(&self, slot: &str, base_model: &str) -> BaseModelMix {
        let filter = self.rules.filter();
        let mut mix = BaseModelMix::default();

        for combo in self.enumerate_combinations(slot, base_model) {
            if filter.should_skip(slot, &combo, base_model) {
                tracing::trace!("Skipping {combo} for {slot} on {base_model}");
                mix.skipped += 1;
            } else {
                mix.combinations.push(combo);
            }
        }

        mix
    }

    /// Mix every slot on every base model declared for it
    pub fn mix_all(&self) -> MixResults {
        self.mix_selected(None, None)
    }

    /// Mix, optionally limited to one slot and/or one base model
    pub fn mix_selected(&self, slot: Option<&str>, base_model: Option<&str>) -> MixResults {
        let mut results = MixResults::default();

        for catalog_slot in self.catalog().slots() {
            let slot_name = catalog_slot.name.as_str();
            if slot.is_some_and(|wanted| wanted != slot_name) {
                continue;
            }

            let models: Vec<&str> = catalog_slot
                .base_models()
                .filter(|model| base_model.map_or(true, |wanted| wanted == *model))
                .collect();
            if models.is_empty() {
                tracing::warn!("No base models to mix for slot {slot_name}, skipping");
                continue;
            }

            for model in models {
                let mix = self.mix_base_model(slot_name, model);
                tracing::debug!(
                    "{slot_name} on {model}: {} combination(s), {} skipped",
                    mix.combinations.len(),
                    mix.skipped
                );
                results.record(slot_name, model, mix);
            }
        }

        results
    }
}
