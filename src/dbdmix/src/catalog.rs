//! Attachment catalog.
//!
//! Holds every attachment known per slot along with the base models each slot
//! is mixed onto. Attachments may be restricted to a subset of base models.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to parse attachment definition: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Attachment definition `{0}` has no slot")]
    MissingSlot(String),

    #[error("Attachment `{id}` is defined more than once in slot {slot}")]
    Duplicate { slot: String, id: String },
}

/// On-disk form of a single attachment definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentDefinition {
    pub attachment_id: String,

    /// Slot name; when absent the loader fills it from the containing folder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,

    /// Base models this attachment fits (absent = every base model)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_models: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl AttachmentDefinition {
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Convert into an [`Attachment`], using `fallback_slot` if none was given
    pub fn into_attachment(self, fallback_slot: Option<&str>) -> Result<Attachment, CatalogError> {
        let slot = match self.slot.or_else(|| fallback_slot.map(str::to_string)) {
            Some(slot) => slot,
            None => return Err(CatalogError::MissingSlot(self.attachment_id)),
        };

        Ok(Attachment {
            id: self.attachment_id,
            slot,
            base_models: self.base_models.map(|models| models.into_iter().collect()),
            display_name: self.display_name,
        })
    }
}

/// A cosmetic asset pluggable into exactly one slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: String,
    pub slot: String,
    /// `None` means the attachment is unrestricted
    pub base_models: Option<BTreeSet<String>>,
    pub display_name: Option<String>,
}

impl Attachment {
    pub fn new(slot: impl Into<String>, id: impl Into<String>) -> Self {
        Attachment {
            id: id.into(),
            slot: slot.into(),
            base_models: None,
            display_name: None,
        }
    }

    /// Restrict the attachment to the given base models
    pub fn restricted_to<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_models = Some(models.into_iter().map(Into::into).collect());
        self
    }

    pub fn fits(&self, base_model: &str) -> bool {
        self.base_models
            .as_ref()
            .map_or(true, |models| models.contains(base_model))
    }
}

/// Attachments and base models for one slot
#[derive(Debug, Clone, Default)]
pub struct Slot {
    pub name: String,
    attachments: BTreeMap<String, Attachment>,
    base_models: BTreeSet<String>,
}

impl Slot {
    fn new(name: &str) -> Self {
        Slot {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments.values()
    }

    pub fn attachment(&self, id: &str) -> Option<&Attachment> {
        self.attachments.get(id)
    }

    pub fn base_models(&self) -> impl Iterator<Item = &str> {
        self.base_models.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }
}

/// All known attachments, keyed by slot
#[derive(Debug, Clone, Default)]
pub struct PartCatalog {
    slots: BTreeMap<String, Slot>,
}

impl PartCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attachment to its slot, creating the slot if needed
    pub fn insert(&mut self, attachment: Attachment) -> Result<(), CatalogError> {
        let slot = self
            .slots
            .entry(attachment.slot.clone())
            .or_insert_with(|| Slot::new(&attachment.slot));

        if slot.attachments.contains_key(&attachment.id) {
            return Err(CatalogError::Duplicate {
                slot: attachment.slot,
                id: attachment.id,
            });
        }

        slot.attachments.insert(attachment.id.clone(), attachment);
        Ok(())
    }

    /// Register the base models a slot is mixed onto
    pub fn add_base_models<I, S>(&mut self, slot: &str, models: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self
            .slots
            .entry(slot.to_string())
            .or_insert_with(|| Slot::new(slot));
        entry.base_models.extend(models.into_iter().map(Into::into));
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.values()
    }

    pub fn contains(&self, slot: &str, id: &str) -> bool {
        self.slot(slot).is_some_and(|s| s.attachments.contains_key(id))
    }

    pub fn has_base_model(&self, slot: &str, model: &str) -> bool {
        self.slot(slot).is_some_and(|s| s.base_models.contains(model))
    }

    pub fn base_models(&self, slot: &str) -> Vec<&str> {
        self.slot(slot)
            .map(|s| s.base_models().collect())
            .unwrap_or_default()
    }

    /// Attachment ids in a slot usable on `base_model`, in ascending order
    pub fn available(&self, slot: &str, base_model: &str) -> Vec<&str> {
        self.slot(slot)
            .map(|s| {
                s.attachments()
                    .filter(|a| a.fits(base_model))
                    .map(|a| a.id.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Total number of attachments across all slots
    pub fn len(&self) -> usize {
        self.slots.values().map(Slot::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legs_catalog() -> PartCatalog {
        let mut catalog = PartCatalog::new();
        catalog
            .insert(Attachment::new("SurvivorLegs", "KateLegsRightBlueChain"))
            .unwrap();
        catalog
            .insert(Attachment::new("SurvivorLegs", "KateLegsBlueChains"))
            .unwrap();
        catalog
            .insert(
                Attachment::new("SurvivorLegs", "KateLegsShortRightBlueChain")
                    .restricted_to(["KateBikerVariantsRoughRider"]),
            )
            .unwrap();
        catalog.add_base_models(
            "SurvivorLegs",
            ["KateBikerVariantsRoughRider", "KateBikerVariantsHellsAngel"],
        );
        catalog
    }

    #[test]
    fn test_available_is_sorted_and_filtered() {
        let catalog = legs_catalog();

        assert_eq!(
            catalog.available("SurvivorLegs", "KateBikerVariantsRoughRider"),
            vec![
                "KateLegsBlueChains",
                "KateLegsRightBlueChain",
                "KateLegsShortRightBlueChain"
            ]
        );
        assert_eq!(
            catalog.available("SurvivorLegs", "KateBikerVariantsHellsAngel"),
            vec!["KateLegsBlueChains", "KateLegsRightBlueChain"]
        );
        assert!(catalog.available("SurvivorTorso", "Anything").is_empty());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut catalog = legs_catalog();
        let result = catalog.insert(Attachment::new("SurvivorLegs", "KateLegsBlueChains"));

        assert!(matches!(result, Err(CatalogError::Duplicate { .. })));
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_base_models() {
        let catalog = legs_catalog();

        assert!(catalog.has_base_model("SurvivorLegs", "KateBikerVariantsHellsAngel"));
        assert!(!catalog.has_base_model("SurvivorLegs", "KateBikerVariantsReadyToRide"));
        assert_eq!(catalog.base_models("SurvivorLegs").len(), 2);
    }

    #[test]
    fn test_definition_from_yaml() {
        let yaml = r#"
attachmentId: KatePurpleHat
baseModels:
- KateBikerVariantsReadyToRide
displayName: Purple Hat
"#;
        let def = AttachmentDefinition::from_yaml(yaml).unwrap();
        assert_eq!(def.attachment_id, "KatePurpleHat");
        assert!(def.slot.is_none());

        let attachment = def.into_attachment(Some("SurvivorTorso")).unwrap();
        assert_eq!(attachment.slot, "SurvivorTorso");
        assert!(attachment.fits("KateBikerVariantsReadyToRide"));
        assert!(!attachment.fits("KateBikerVariantsHellsAngel"));
    }

    #[test]
    fn test_definition_without_slot() {
        let def = AttachmentDefinition::from_yaml("attachmentId: Lonely").unwrap();
        let result = def.into_attachment(None);

        assert!(matches!(result, Err(CatalogError::MissingSlot(id)) if id == "Lonely"));
    }
}
