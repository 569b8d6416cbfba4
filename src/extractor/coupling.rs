// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Resolving whether a system's batteries are AC or DC coupled.

use super::hybrid::is_hybrid_model;
use crate::collaborators::{BatteryCatalog, EquipmentSpecs};
use crate::equipment::CouplingType;
use crate::resolution::Resolution;

/// A source of coupling information.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum CouplingSource {
    /// The `couple_type` of the matching battery catalog record.
    BatteryCatalog,
    /// The specification of the battery.
    EquipmentSpecs,
    /// Whether the inverter model looks like a hybrid inverter.  Always
    /// resolves.
    InverterPattern,
}

/// The sources tried for systems with batteries, in order.
pub(crate) const WITH_BATTERIES: &[CouplingSource] = &[
    CouplingSource::BatteryCatalog,
    CouplingSource::EquipmentSpecs,
    CouplingSource::InverterPattern,
];

/// The sources tried for systems without batteries.
pub(crate) const WITHOUT_BATTERIES: &[CouplingSource] = &[CouplingSource::InverterPattern];

/// The equipment the coupling is resolved for.
pub(crate) struct CouplingInputs<'a> {
    pub(crate) battery_make: &'a str,
    pub(crate) battery_model: &'a str,
    pub(crate) battery_quantity: u32,
    pub(crate) inverter_model: &'a str,
}

/// The resolved coupling, and the coupling reported by a catalog service if
/// one of them resolved it.
#[derive(Debug, PartialEq)]
pub(crate) struct ResolvedCoupling {
    pub(crate) coupling: CouplingType,
    pub(crate) reported: Option<CouplingType>,
}

pub(crate) struct CouplingResolver<'a> {
    pub(crate) battery_catalog: Option<&'a dyn BatteryCatalog>,
    pub(crate) equipment_specs: Option<&'a dyn EquipmentSpecs>,
}

impl CouplingResolver<'_> {
    pub(crate) async fn resolve(&self, inputs: &CouplingInputs<'_>) -> ResolvedCoupling {
        let sources = if inputs.battery_quantity > 0 {
            WITH_BATTERIES
        } else {
            WITHOUT_BATTERIES
        };
        for source in sources {
            let resolution = match source {
                CouplingSource::BatteryCatalog => self.from_battery_catalog(inputs).await,
                CouplingSource::EquipmentSpecs => self.from_equipment_specs(inputs).await,
                CouplingSource::InverterPattern => {
                    return ResolvedCoupling {
                        coupling: from_inverter_pattern(inputs.inverter_model),
                        reported: None,
                    };
                }
            };
            if let Some(coupling) = resolution.resolved() {
                tracing::debug!(
                    "Coupling of {} {} resolved to {coupling} from {source:?}.",
                    inputs.battery_make,
                    inputs.battery_model
                );
                return ResolvedCoupling {
                    coupling,
                    reported: Some(coupling),
                };
            }
        }
        ResolvedCoupling {
            coupling: from_inverter_pattern(inputs.inverter_model),
            reported: None,
        }
    }

    async fn from_battery_catalog(&self, inputs: &CouplingInputs<'_>) -> Resolution<CouplingType> {
        let Some(catalog) = self.battery_catalog else {
            return Resolution::Unresolved;
        };
        if inputs.battery_make.is_empty() || inputs.battery_model.is_empty() {
            return Resolution::Unresolved;
        }
        match catalog.batteries_by_manufacturer(inputs.battery_make).await {
            Ok(records) => records
                .iter()
                .find(|record| record.matches_model(inputs.battery_model))
                .and_then(|record| record.couple_type.as_deref())
                .and_then(CouplingType::parse)
                .into(),
            Err(err) => {
                tracing::warn!(
                    "Battery catalog lookup for {} failed: {err}",
                    inputs.battery_make
                );
                Resolution::Unresolved
            }
        }
    }

    async fn from_equipment_specs(&self, inputs: &CouplingInputs<'_>) -> Resolution<CouplingType> {
        let Some(specs) = self.equipment_specs else {
            return Resolution::Unresolved;
        };
        if inputs.battery_make.is_empty() || inputs.battery_model.is_empty() {
            return Resolution::Unresolved;
        }
        match specs
            .specification("Battery", inputs.battery_make, inputs.battery_model)
            .await
        {
            Ok(spec) => spec.and_then(|spec| spec.coupling()).into(),
            Err(err) => {
                tracing::warn!(
                    "Specification lookup for {} {} failed: {err}",
                    inputs.battery_make,
                    inputs.battery_model
                );
                Resolution::Unresolved
            }
        }
    }
}

fn from_inverter_pattern(inverter_model: &str) -> CouplingType {
    if is_hybrid_model(inverter_model) {
        CouplingType::Dc
    } else {
        CouplingType::Ac
    }
}
