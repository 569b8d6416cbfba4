// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Detecting which BOS configuration a system needs.
//!
//! Detection is done by the [`Switchboard`], which walks a fixed,
//! priority-ordered registry of [`DetectorRule`][rule::DetectorRule]s.
//! Rules for the utilities the switchboard knows about come first, grouped
//! by utility, followed by the utility-agnostic generic rules.  The first
//! rule whose precondition holds decides the result.

mod aps;
mod builder;
mod combine;
mod generic;
mod project;
mod regional;
mod rule;
mod sizing;
mod switchboard;

pub use combine::detect_combine_point;
pub use sizing::{derated_amps, standard_amp_rating};
pub use switchboard::Switchboard;

use crate::BosSection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const PRE_COMBINE: &str = "PRE COMBINE";
const POST_COMBINE: &str = "POST COMBINE";
const POST_SMS: &str = "POST SMS";
const ESS: &str = "ESS";
const BACKUP_LOAD_SUB_PANEL: &str = "BACKUP LOAD SUB PANEL";

/// How specific a configuration match is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// A BOS component a configuration requires, addressed to the slot it
/// should be stored in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BosEquipmentItem {
    pub equipment_type: String,
    /// The 1-based slot number, or for the combine section, the position.
    pub position: u8,
    pub section: BosSection,
    /// The system the item belongs to, `0` for the combine section.
    pub system_number: u8,
    pub min_amp_rating: u32,
    pub sizing_calculation: String,
    pub block_name: String,
    pub is_new: bool,
    /// Filled in by catalog matching.
    pub make: Option<String>,
    pub model: Option<String>,
    pub amp_rating: Option<u32>,
}

/// A detected configuration and the BOS components it requires.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationMatch {
    pub config_id: String,
    pub config_name: String,
    pub description: String,
    pub confidence: Confidence,
    pub bos_equipment: Vec<BosEquipmentItem>,
}

/// The configurations detected for a whole project.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfigurationResult {
    /// The match for each system that has one, by system number.
    pub systems: BTreeMap<u8, ConfigurationMatch>,
    pub combine: Option<ConfigurationMatch>,
    /// Every item of every match, in system order, combine point last.
    #[serde(rename = "allBOSItems")]
    pub all_bos_items: Vec<BosEquipmentItem>,
}

impl ProjectConfigurationResult {
    /// Returns the match for a system, if there is one.
    pub fn system(&self, system: u8) -> Option<&ConfigurationMatch> {
        self.systems.get(&system)
    }

    /// Whether nothing at all was detected.
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty() && self.combine.is_none()
    }
}

/// Returns a human readable, one line per match summary of a project's
/// detected configurations.
pub fn configuration_summary(result: &ProjectConfigurationResult) -> String {
    if result.is_empty() {
        return "No BOS configurations detected".to_string();
    }
    let mut lines: Vec<String> = result
        .systems
        .iter()
        .map(|(system, m)| {
            format!(
                "System {system}: {} ({} items)",
                m.config_name,
                m.bos_equipment.len()
            )
        })
        .collect();
    if let Some(combine) = &result.combine {
        lines.push(format!(
            "Combine: {} ({} items)",
            combine.config_name,
            combine.bos_equipment.len()
        ));
    }
    lines.join("\n")
}
