// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Detecting the configurations of every system in a project.

use super::combine::detect_combine_point;
use super::{ProjectConfigurationResult, Switchboard};
use crate::extractor::{is_system_active, resolve_utility_name, EquipmentStateExtractor};
use crate::fields::RawFields;
use crate::section::MAX_SYSTEMS;
use crate::Error;
use std::collections::BTreeMap;

impl Switchboard {
    /// Detects the configuration of every active system of a project, and
    /// its combine point.
    ///
    /// Systems are extracted and detected one at a time, in increasing
    /// order, because the rules for a system may look at the systems before
    /// it.  Inactive systems are skipped.
    pub async fn detect_project_configuration(
        &self,
        fields: &RawFields,
        utility_name: Option<&str>,
        extractor: &EquipmentStateExtractor<'_>,
    ) -> Result<ProjectConfigurationResult, Error> {
        let utility_name = resolve_utility_name(fields, utility_name);
        let mut result = ProjectConfigurationResult::default();
        let mut earlier_systems = BTreeMap::new();

        for system in 1..=MAX_SYSTEMS {
            if !is_system_active(fields, system) {
                tracing::debug!("System {system} is inactive, skipping.");
                continue;
            }
            let state = extractor
                .extract(fields, system, Some(&utility_name))
                .await?;
            if let Some(m) = self.detect_with_earlier_systems(&state, &earlier_systems) {
                result.all_bos_items.extend(m.bos_equipment.iter().cloned());
                result.systems.insert(system, m);
            }
            earlier_systems.insert(system, state);
        }

        result.combine = detect_combine_point(fields);
        if let Some(combine) = &result.combine {
            result
                .all_bos_items
                .extend(combine.bos_equipment.iter().cloned());
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::configuration_summary;
    use crate::BosSection;
    use crate::test_utils::FieldsBuilder;

    #[tokio::test]
    async fn test_multi_system_project() -> Result<(), Error> {
        let fields = FieldsBuilder::new()
            .utility("APS")
            .set(
                "ele_combine_positions",
                r#"{"method": "Sub Panel", "active_systems": [1, 2]}"#,
            )
            .system(1)
            .solar("REC", "Alpha 405", 20)
            .inverter("Enphase", "IQ8M", 24.0)
            .bos(BosSection::Utility, 1, "PV Meter")
            .system(2)
            .inverter("Tesla", "Powerwall 3", 30.0)
            .battery("Tesla", "Powerwall 3", 1, 48.0)
            .sms("Tesla", "Backup Gateway 3")
            .backup_panel("Square D", "QO", None)
            .backup_option("Whole Home")
            .build();

        let result = Switchboard::default()
            .detect_project_configuration(&fields, None, &EquipmentStateExtractor::default())
            .await?;

        assert_eq!(
            result.system(1).map(|m| m.config_id.as_str()),
            Some("aps-pv-only-micro-no-sms")
        );
        // System 2 reads system 1's extracted state.
        let sys2 = result.system(2).unwrap();
        assert_eq!(sys2.config_id, "tesla-pw3-multi-whole-home");
        assert!(sys2
            .bos_equipment
            .iter()
            .any(|i| i.system_number == 1 && i.section == BosSection::Utility));

        let combine = result.combine.as_ref().unwrap();
        // (24 + 30) × 1.25 = 67.5
        assert_eq!(combine.bos_equipment[0].min_amp_rating, 68);

        let total = result.systems.values().map(|m| m.bos_equipment.len()).sum::<usize>() + 1;
        assert_eq!(result.all_bos_items.len(), total);
        assert_eq!(
            result.all_bos_items.last().map(|i| i.section),
            Some(BosSection::Combine)
        );
        assert_eq!(
            configuration_summary(&result).lines().last(),
            Some("Combine: Multi-System Combine Point (1 items)")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_inactive_systems_skipped() -> Result<(), Error> {
        let fields = FieldsBuilder::new()
            .system(3)
            .solar("REC", "Alpha 405", 12)
            .inverter("SolarEdge", "SE3800H", 16.0)
            .build();

        let result = Switchboard::default()
            .detect_project_configuration(
                &fields,
                Some("Salt River Project"),
                &EquipmentStateExtractor::default(),
            )
            .await?;

        // The SRP rules only cover system 1.
        assert_eq!(result.systems.keys().copied().collect::<Vec<_>>(), [3]);
        assert_eq!(result.systems[&3].config_id, "generic-pv-only");
        assert!(result.all_bos_items.iter().all(|i| i.system_number == 3));
        assert_eq!(result.combine, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_project() -> Result<(), Error> {
        let result = Switchboard::default()
            .detect_project_configuration(
                &RawFields::new(),
                None,
                &EquipmentStateExtractor::default(),
            )
            .await?;
        assert!(result.is_empty());
        assert!(result.all_bos_items.is_empty());
        assert_eq!(
            configuration_summary(&result),
            "No BOS configurations detected"
        );
        Ok(())
    }
}
