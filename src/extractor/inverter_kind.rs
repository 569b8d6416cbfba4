// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Resolving whether a system uses a string inverter or microinverters.
//!
//! The strategies are tried in order and the first one that resolves wins.

use crate::equipment::{contains_ci, InverterKind};
use crate::fields::{text, RawFields, SystemField};
use crate::resolution::Resolution;

/// Manufacturers that only make microinverters.
const MICROINVERTER_BRANDS: &[&str] = &[
    "enphase",
    "hoymiles",
    "hoymiles power",
    "apsystems",
    "ap systems",
    "iq",
];

type Strategy = fn(&RawFields, u8) -> Resolution<InverterKind>;

/// The strategies, by name, in the order they are tried.
pub(crate) const INVERTER_KIND_STRATEGIES: &[(&str, Strategy)] = &[
    ("explicit type", explicit_type),
    ("selected system", selected_system),
    ("brand inference", brand_inference),
    ("model present", model_present),
];

/// Resolves the inverter kind of a system.
pub(crate) fn resolve_inverter_kind(fields: &RawFields, system: u8) -> InverterKind {
    for (name, strategy) in INVERTER_KIND_STRATEGIES {
        if let Some(kind) = strategy(fields, system).resolved() {
            tracing::debug!("System {system}: inverter kind '{kind}' from {name}.");
            return kind;
        }
    }
    InverterKind::Unresolved
}

/// Reads the inverter make, falling back to the field older projects used
/// for string inverters.
pub(crate) fn inverter_make(fields: &RawFields, system: u8) -> Option<&str> {
    text(fields, &SystemField::InverterMake.key(system))
        .or_else(|| text(fields, &SystemField::LegacyInverterMake.key(system)))
}

pub(crate) fn inverter_model(fields: &RawFields, system: u8) -> Option<&str> {
    text(fields, &SystemField::InverterModel.key(system))
        .or_else(|| text(fields, &SystemField::LegacyInverterModel.key(system)))
}

fn parse_kind(value: &str) -> Resolution<InverterKind> {
    match value {
        "microinverter" => Resolution::Resolved(InverterKind::Microinverter),
        "inverter" => Resolution::Resolved(InverterKind::String),
        _ => Resolution::Unresolved,
    }
}

fn explicit_type(fields: &RawFields, system: u8) -> Resolution<InverterKind> {
    text(fields, &SystemField::InverterType.key(system)).map_or(Resolution::Unresolved, parse_kind)
}

fn selected_system(fields: &RawFields, system: u8) -> Resolution<InverterKind> {
    text(fields, &SystemField::SelectedSystem.key(system))
        .map_or(Resolution::Unresolved, |value| {
            parse_kind(&value.to_lowercase())
        })
}

fn brand_inference(fields: &RawFields, system: u8) -> Resolution<InverterKind> {
    match inverter_make(fields, system) {
        Some(make) if MICROINVERTER_BRANDS.iter().any(|b| contains_ci(make, b)) => {
            Resolution::Resolved(InverterKind::Microinverter)
        }
        _ => Resolution::Unresolved,
    }
}

fn model_present(fields: &RawFields, system: u8) -> Resolution<InverterKind> {
    match inverter_model(fields, system) {
        Some(_) => Resolution::Resolved(InverterKind::String),
        None => Resolution::Unresolved,
    }
}
