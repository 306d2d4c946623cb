//! Catalog listing command handler
//!
//! Shows slots, the base models they are mixed onto, and their attachments.

use anyhow::{bail, Context, Result};
use dbdmix::{PartCatalog, Slot};
use serde::Serialize;

use super::session::Session;
use crate::cli::{OutputFormat, SettingsArgs};

/// Serializable view of one slot
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SlotListing {
    pub slot: String,
    pub base_models: Vec<String>,
    pub attachments: Vec<AttachmentListing>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentListing {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_models: Option<Vec<String>>,
}

impl From<&Slot> for SlotListing {
    fn from(slot: &Slot) -> Self {
        SlotListing {
            slot: slot.name.clone(),
            base_models: slot.base_models().map(str::to_string).collect(),
            attachments: slot
                .attachments()
                .map(|a| AttachmentListing {
                    id: a.id.clone(),
                    display_name: a.display_name.clone(),
                    base_models: a.base_models.as_ref().map(|m| m.iter().cloned().collect()),
                })
                .collect(),
        }
    }
}

/// Build listings for every slot, or only `slot` if given
pub fn build_listings(catalog: &PartCatalog, slot: Option<&str>) -> Result<Vec<SlotListing>> {
    if let Some(name) = slot {
        let Some(found) = catalog.slot(name) else {
            bail!("Unknown slot: {}", name);
        };
        return Ok(vec![SlotListing::from(found)]);
    }

    Ok(catalog.slots().map(SlotListing::from).collect())
}

fn print_table(listings: &[SlotListing]) {
    for listing in listings {
        println!("{} ({} attachments)", listing.slot, listing.attachments.len());

        if listing.base_models.is_empty() {
            println!("  base models: (none)");
        } else {
            println!("  base models: {}", listing.base_models.join(", "));
        }

        for attachment in &listing.attachments {
            let mut line = format!("    {}", attachment.id);
            if let Some(name) = &attachment.display_name {
                line.push_str(&format!(" \"{}\"", name));
            }
            if let Some(models) = &attachment.base_models {
                line.push_str(&format!(" [only: {}]", models.join(", ")));
            }
            println!("{}", line);
        }
        println!();
    }

    let total: usize = listings.iter().map(|l| l.attachments.len()).sum();
    println!("Total: {} slots, {} attachments", listings.len(), total);
}

/// Main handler for the list command
pub fn handle(args: &SettingsArgs, slot: Option<&str>, format: OutputFormat) -> Result<()> {
    let session = Session::open(args)?;
    let catalog = session.catalog_with_base_models();
    let listings = build_listings(&catalog, slot)?;

    match format {
        OutputFormat::Table => print_table(&listings),
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&listings).context("Failed to serialize listing")?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&listings).context("Failed to serialize listing")?;
            print!("{}", yaml);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbdmix::Attachment;

    fn create_test_catalog() -> PartCatalog {
        let mut catalog = PartCatalog::new();
        catalog
            .insert(Attachment::new("SurvivorTorso", "KateGuitar"))
            .unwrap();
        catalog
            .insert(
                Attachment::new("SurvivorTorso", "KatePurpleHat")
                    .restricted_to(["KateBikerVariantsReadyToRide"]),
            )
            .unwrap();
        catalog
            .insert(Attachment::new("SurvivorLegs", "KateLegsBlueChains"))
            .unwrap();
        catalog.add_base_models("SurvivorTorso", ["KateBikerVariantsReadyToRide"]);
        catalog
    }

    #[test]
    fn test_build_listings() {
        let catalog = create_test_catalog();
        let listings = build_listings(&catalog, None).unwrap();

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].slot, "SurvivorLegs");
        assert!(listings[0].base_models.is_empty());
        assert_eq!(listings[1].attachments.len(), 2);
        assert_eq!(
            listings[1].attachments[1].base_models,
            Some(vec!["KateBikerVariantsReadyToRide".to_string()])
        );
    }

    #[test]
    fn test_build_listings_single_slot() {
        let catalog = create_test_catalog();

        let listings = build_listings(&catalog, Some("SurvivorTorso")).unwrap();
        assert_eq!(listings.len(), 1);

        assert!(build_listings(&catalog, Some("SurvivorHead")).is_err());
    }

    #[test]
    fn test_listing_json_shape() {
        let catalog = create_test_catalog();
        let listings = build_listings(&catalog, Some("SurvivorLegs")).unwrap();
        let json = serde_json::to_value(&listings).unwrap();

        assert_eq!(json[0]["slot"], "SurvivorLegs");
        assert_eq!(json[0]["attachments"][0]["id"], "KateLegsBlueChains");
        assert!(json[0]["attachments"][0].get("baseModels").is_none());
    }
}
