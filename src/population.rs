// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Filling detected BOS equipment into a project's slots.
//!
//! [`prepare_population`] resolves the detected items to catalog parts and
//! builds the payload that stores them, [`save_population`] hands the
//! payload to the [`SystemDetailsStore`].

use crate::collaborators::SystemDetailsStore;
use crate::fields::{slot_payload, SlotAddress, SlotRecord};
use crate::{BosEquipmentItem, BosSection, Error, PartCatalog, Payload, ProjectConfigurationResult};
use serde::Serialize;
use serde_json::json;

const NOTHING_DETECTED: &str = "No BOS equipment detected";

/// The catalog-resolved items of a project and the payload that stores
/// them.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationPlan {
    pub items: Vec<BosEquipmentItem>,
    pub payload: Payload,
    /// The items grouped by block name, one line per item.
    pub summary: String,
}

impl PopulationPlan {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

/// The result of saving a payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SaveOutcome {
    pub success: bool,
    pub message: String,
}

/// Resolves `items` to catalog parts and builds the payload that stores
/// them.
///
/// Fails if an item addresses a slot outside its section.
pub fn prepare_population(
    items: &[BosEquipmentItem],
    catalog: &PartCatalog,
) -> Result<PopulationPlan, Error> {
    if items.is_empty() {
        return Ok(PopulationPlan {
            items: Vec::new(),
            payload: Payload::new(),
            summary: NOTHING_DETECTED.to_string(),
        });
    }

    let items = catalog.resolve_items(items);
    let mut payload = Payload::new();
    for item in &items {
        payload.extend(slot_payload(&item_address(item)?, &item_record(item)));
    }
    Ok(PopulationPlan {
        summary: population_summary(&items),
        items,
        payload,
    })
}

/// Combine items go to slot 1 of their position, all others to their slot
/// in their system's section.
fn item_address(item: &BosEquipmentItem) -> Result<SlotAddress, Error> {
    match item.section {
        BosSection::Combine => SlotAddress::new(item.section, item.position, 1),
        section => SlotAddress::new(section, item.system_number, item.position),
    }
}

fn item_record(item: &BosEquipmentItem) -> SlotRecord {
    SlotRecord {
        make: item.make.clone().unwrap_or_default(),
        model: item.model.clone().unwrap_or_default(),
        amp_rating: item.amp_rating.map(|a| a.to_string()).unwrap_or_default(),
        is_new: item.is_new,
        block_name: Some(item.block_name.clone()).filter(|b| !b.is_empty()),
        ..SlotRecord::new(item.equipment_type.as_str())
    }
}

/// Groups items by block name, in order of first appearance.
fn population_summary(items: &[BosEquipmentItem]) -> String {
    let mut blocks: Vec<(&str, Vec<&BosEquipmentItem>)> = Vec::new();
    for item in items {
        match blocks.iter_mut().find(|(name, _)| *name == item.block_name) {
            Some((_, block)) => block.push(item),
            None => blocks.push((item.block_name.as_str(), vec![item])),
        }
    }

    let mut lines = Vec::new();
    for (name, block) in blocks {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("{name}:"));
        for item in block {
            let part = match (&item.make, &item.model, item.amp_rating) {
                (Some(make), Some(model), Some(amps)) => format!("{make} {model} ({amps}A)"),
                (Some(make), Some(model), None) => format!("{make} {model}"),
                _ => "Manual selection required".to_string(),
            };
            lines.push(format!("  • {}: {part}", item.equipment_type));
        }
    }
    lines.join("\n")
}

/// Saves a payload to a project's equipment details.
///
/// If the store rejects the payload, it is sent once more nested as
/// `{"systemDetails": payload}` through
/// [`update_project`][SystemDetailsStore::update_project].  Never fails, a
/// second rejection is reported in the outcome.
pub async fn save_population(
    store: &dyn SystemDetailsStore,
    project_id: &str,
    payload: &Payload,
) -> SaveOutcome {
    tracing::debug!(
        "Saving {} BOS fields to project {project_id}.",
        payload.len()
    );
    let result = match store.patch_system_details(project_id, payload).await {
        Ok(()) => Ok(()),
        Err(err) => {
            tracing::warn!("Saving system details failed ({err}), updating the project instead.");
            store
                .update_project(project_id, &json!({ "systemDetails": payload }))
                .await
        }
    };
    match result {
        Ok(()) => SaveOutcome {
            success: true,
            message: "BOS equipment saved successfully".to_string(),
        },
        Err(err) => SaveOutcome {
            success: false,
            message: format!("Failed to save BOS equipment: {err}"),
        },
    }
}

/// Resolves the items of a detection result to catalog parts and saves
/// them.  Nothing is saved when nothing was detected.
pub async fn populate_project(
    store: &dyn SystemDetailsStore,
    project_id: &str,
    result: &ProjectConfigurationResult,
    catalog: &PartCatalog,
) -> Result<SaveOutcome, Error> {
    let plan = prepare_population(&result.all_bos_items, catalog)?;
    if plan.is_empty() {
        return Ok(SaveOutcome {
            success: false,
            message: plan.summary,
        });
    }
    Ok(save_population(store, project_id, &plan.payload).await)
}
