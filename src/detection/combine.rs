// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Detecting the BOS needed where multiple systems are combined.

use super::sizing::Sizing;
use super::{BosEquipmentItem, Confidence, ConfigurationMatch, POST_COMBINE};
use crate::fields::{number, occupied_slots, ProjectField, RawFields, SystemField};
use crate::section::{COMBINE_POSITIONS, MAX_SYSTEMS};
use crate::BosSection;
use serde::Deserialize;
use serde_json::Value;

/// How and which systems are combined, as stored in the project.
#[derive(Debug, Deserialize)]
struct CombineDescriptor {
    #[serde(default)]
    method: String,
    #[serde(default)]
    active_systems: Vec<i64>,
}

fn parse_descriptor(fields: &RawFields) -> Option<CombineDescriptor> {
    let parsed = match fields.get(ProjectField::CombinePositions.key())? {
        Value::String(s) if s.trim().is_empty() => return None,
        Value::String(s) => serde_json::from_str(s),
        value @ Value::Object(_) => serde_json::from_value(value.clone()),
        _ => return None,
    };
    match parsed {
        Ok(descriptor) => Some(descriptor),
        Err(err) => {
            tracing::warn!("Ignoring malformed combine descriptor: {err}");
            None
        }
    }
}

/// Returns the combine point match of a project, or `None` if the project
/// doesn't combine systems, the combined output is zero, or every combine
/// position is already taken.
///
/// The single AC disconnect is sized to 1.25 times the summed inverter
/// output of the combined systems, and goes to slot 1 of the first free
/// combine position.
pub fn detect_combine_point(fields: &RawFields) -> Option<ConfigurationMatch> {
    let descriptor = parse_descriptor(fields)?;

    let total_output: f64 = descriptor
        .active_systems
        .iter()
        .filter_map(|&system| u8::try_from(system).ok())
        .filter(|system| (1..=MAX_SYSTEMS).contains(system))
        .filter_map(|system| number(fields, &SystemField::InverterMaxContinuousOutput.key(system)))
        .sum();
    let sizing = Sizing::combine_point(total_output);
    if sizing.min_amps == 0 {
        return None;
    }

    let Some(position) = (1..=COMBINE_POSITIONS).find(|&position| {
        occupied_slots(fields, BosSection::Combine, position)
            .is_ok_and(|slots| !slots.contains(&1))
    }) else {
        tracing::debug!("Every combine position is taken.");
        return None;
    };

    Some(ConfigurationMatch {
        config_id: "combine-point".to_string(),
        config_name: "Multi-System Combine Point".to_string(),
        description: format!("BOS for {} combining multiple systems", descriptor.method),
        confidence: Confidence::High,
        bos_equipment: vec![BosEquipmentItem {
            equipment_type: "AC Disconnect".to_string(),
            position,
            section: BosSection::Combine,
            system_number: 0,
            min_amp_rating: sizing.min_amps,
            sizing_calculation: sizing.calculation,
            block_name: POST_COMBINE.to_string(),
            is_new: true,
            make: None,
            model: None,
            amp_rating: None,
        }],
    })
}
