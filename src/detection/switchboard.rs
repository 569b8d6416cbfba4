// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The detector registry and the switchboard that walks it.

use super::aps::APS;
use super::generic::GENERIC_RULES;
use super::regional::{SRP, TEP, TRICO, XCEL};
use super::rule::{DetectionContext, DetectorRule, UtilityTier};
use super::ConfigurationMatch;
use crate::equipment::EquipmentState;
use crate::EngineConfig;
use std::collections::BTreeMap;

/// The utility tiers, in the order they are tried.
const UTILITY_TIERS: &[UtilityTier] = &[APS, SRP, TEP, TRICO, XCEL];

/// Detects BOS configurations.
///
/// The switchboard holds no state besides its configuration, so detecting
/// the same state twice gives the same result.
#[derive(Clone, Debug, Default)]
pub struct Switchboard {
    config: EngineConfig,
}

impl Switchboard {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the configuration of a single system, or `None` if no rule
    /// applies to it.
    ///
    /// Rules that depend on the other systems of a project never apply
    /// here, use
    /// [`detect_project_configuration`][Switchboard::detect_project_configuration]
    /// for those.
    pub fn detect_system_configuration(&self, state: &EquipmentState) -> Option<ConfigurationMatch> {
        self.detect_with_earlier_systems(state, &BTreeMap::new())
    }

    /// Like [`detect_system_configuration`][Switchboard::detect_system_configuration],
    /// but with access to the states of the systems of the same project
    /// that were detected before this one.
    pub fn detect_with_earlier_systems(
        &self,
        state: &EquipmentState,
        earlier_systems: &BTreeMap<u8, EquipmentState>,
    ) -> Option<ConfigurationMatch> {
        let ctx = DetectionContext {
            config: &self.config,
            earlier_systems,
        };
        let system = state.system_number;
        let Some(rule) = rules_for(&state.utility_name).find(|rule| (rule.applies)(state, &ctx))
        else {
            tracing::debug!("System {system}: no configuration rule applies.");
            return None;
        };

        let result = rule.build_match(state, &ctx);
        match &result {
            Some(m) => tracing::debug!(
                "System {system}: matched {} with {} items.",
                m.config_id,
                m.bos_equipment.len()
            ),
            None => tracing::debug!(
                "System {system}: {} applies, but its sections are full.",
                rule.id
            ),
        }
        result
    }
}

/// Returns the rules for a utility in evaluation order: the rules of every
/// utility tier the name matches, then the generic rules.
fn rules_for(utility_name: &str) -> impl Iterator<Item = &'static DetectorRule> + '_ {
    UTILITY_TIERS
        .iter()
        .filter(move |tier| tier.utility.matches(utility_name))
        .inspect(|tier| tracing::debug!("Trying the {} rules.", tier.utility))
        .flat_map(|tier| tier.rules.iter())
        .chain(GENERIC_RULES.iter())
}
