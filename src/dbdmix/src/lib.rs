//! # dbdmix
//!
//! Attachment combination mixer for Dead by Daylight cosmetic mods.
//!
//! This library provides functionality to:
//! - Load mixing settings (with inherited settings files)
//! - Build a catalog of attachments per slot and base model
//! - Compile equivalence, superset, exclusivity and conflict rules
//! - Enumerate every valid attachment combination per slot and base model
//! - Drop combinations matched by skip patterns and report the result
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = dbdmix::Settings::load(Path::new("settings.yaml"))?;
//!
//! let mut catalog = dbdmix::PartCatalog::new();
//! catalog.insert(dbdmix::Attachment::new("SurvivorLegs", "KateLegsBlueChains"))?;
//! catalog.insert(dbdmix::Attachment::new("SurvivorLegs", "KateLegsLeftBlueChain"))?;
//!
//! let mixer = dbdmix::Mixer::new(&settings, catalog)?;
//! for combo in mixer.mix("SurvivorLegs", "KateBikerVariantsRoughRider") {
//!     println!("{combo}");
//! }
//!
//! let report = mixer.mix_all().to_yaml()?;
//! std::fs::write(dbdmix::results_path(Path::new("settings.yaml")), report)?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod combo;
pub mod filter;
pub mod mixer;
pub mod rules;
pub mod settings;

// Re-export commonly used items
#[doc(inline)]
pub use catalog::{Attachment, AttachmentDefinition, CatalogError, PartCatalog, Slot};
#[doc(inline)]
pub use combo::{ComboEnumerator, Combination};
#[doc(inline)]
pub use filter::{ComboFilter, MatchMode, SkipPattern};
#[doc(inline)]
pub use mixer::{results_path, BaseModelMix, MixResults, Mixer};
#[doc(inline)]
pub use rules::{ConfigError, RuleSet};
#[doc(inline)]
pub use settings::{Settings, SettingsError, SkipEntry};
