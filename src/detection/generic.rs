// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Utility-agnostic fallback rules.  They use standard equipment names and
//! apply to every system.

use super::builder::MatchBuilder;
use super::rule::{DetectionContext, DetectorRule};
use super::sizing::Sizing;
use super::{Confidence, BACKUP_LOAD_SUB_PANEL, ESS, POST_SMS, PRE_COMBINE};
use crate::BosSection;

const AC_DISCONNECT: &str = "AC Disconnect";
const PV_METER: &str = "PV Meter";

pub(crate) const GENERIC_RULES: &[DetectorRule] = &[
    DetectorRule {
        id: "generic-ac-coupled",
        name: "Generic AC-Coupled System",
        description: "Solar panels with battery storage (AC-Coupled)",
        confidence: Confidence::Medium,
        applies: |s, _| s.solar.present && s.has_battery_units() && s.has_inverter_output(),
        build: |b, ctx| {
            pv_items(b, ctx);
            storage_items(b, ctx);
        },
    },
    DetectorRule {
        id: "generic-battery-only",
        name: "Generic Battery-Only System",
        description: "Battery storage without solar panels",
        confidence: Confidence::Medium,
        applies: |s, _| !s.solar.present && s.has_battery_units() && s.has_inverter_output(),
        build: storage_items,
    },
    DetectorRule {
        id: "generic-pv-only",
        name: "Generic PV-Only System",
        description: "Solar panels with inverter, no battery storage",
        confidence: Confidence::Medium,
        applies: |s, _| s.solar.present && !s.has_battery_units() && s.has_inverter_output(),
        build: pv_items,
    },
];

fn sizing(b: &MatchBuilder) -> Sizing {
    Sizing::derated(b.state().inverter.max_continuous_output)
}

fn pv_items(b: &mut MatchBuilder, _: &DetectionContext) {
    let sizing = sizing(b);
    b.add_all(
        BosSection::Utility,
        &[PV_METER, AC_DISCONNECT],
        &sizing,
        PRE_COMBINE,
    );
}

/// A disconnect for the battery, and one each for the backup panel and the
/// SMS when they are present.
fn storage_items(b: &mut MatchBuilder, _: &DetectionContext) {
    let sizing = sizing(b);
    let s = b.state();
    b.add(BosSection::Battery1, AC_DISCONNECT, &sizing, ESS);
    if s.backup.present {
        b.add(
            BosSection::Backup,
            AC_DISCONNECT,
            &sizing,
            BACKUP_LOAD_SUB_PANEL,
        );
    }
    if s.sms.present {
        b.add(BosSection::PostSms, AC_DISCONNECT, &sizing, POST_SMS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::ConfigurationMatch;
    use crate::equipment::{BackupOption, EquipmentState, InverterKind};
    use crate::test_utils::StateBuilder;
    use crate::EngineConfig;
    use std::collections::BTreeMap;

    fn detect(state: &EquipmentState) -> Option<ConfigurationMatch> {
        let config = EngineConfig::default();
        let earlier = BTreeMap::new();
        let ctx = DetectionContext {
            config: &config,
            earlier_systems: &earlier,
        };
        GENERIC_RULES
            .iter()
            .find(|rule| (rule.applies)(state, &ctx))
            .and_then(|rule| rule.build_match(state, &ctx))
    }

    fn sections(m: &ConfigurationMatch) -> Vec<(BosSection, &str, &str)> {
        m.bos_equipment
            .iter()
            .map(|i| (i.section, i.equipment_type.as_str(), i.block_name.as_str()))
            .collect()
    }

    #[test]
    fn test_ac_coupled() {
        let state = StateBuilder::new(3, "")
            .solar()
            .inverter(InverterKind::String, "Generic", "GI-7600", 32.0)
            .battery("Tesla", "Powerwall 2", 1, 20.0)
            .sms("Tesla", "Gateway 2")
            .backup("Square D", Some(100), BackupOption::WholeHome)
            .build();
        let m = detect(&state).unwrap();
        assert_eq!(m.config_id, "generic-ac-coupled");
        assert_eq!(m.confidence, Confidence::Medium);
        assert_eq!(
            sections(&m),
            [
                (BosSection::Utility, PV_METER, PRE_COMBINE),
                (BosSection::Utility, AC_DISCONNECT, PRE_COMBINE),
                (BosSection::Battery1, AC_DISCONNECT, ESS),
                (BosSection::Backup, AC_DISCONNECT, BACKUP_LOAD_SUB_PANEL),
                (BosSection::PostSms, AC_DISCONNECT, POST_SMS),
            ]
        );
        assert!(m.bos_equipment.iter().all(|i| i.min_amp_rating == 40));
        assert!(m.bos_equipment.iter().all(|i| i.system_number == 3));
    }

    #[test]
    fn test_battery_only() {
        let state = StateBuilder::new(2, "")
            .inverter(InverterKind::String, "Tesla", "Powerwall 3", 48.0)
            .battery("Tesla", "Powerwall 3", 1, 48.0)
            .build();
        let m = detect(&state).unwrap();
        assert_eq!(m.config_id, "generic-battery-only");
        assert_eq!(sections(&m), [(BosSection::Battery1, AC_DISCONNECT, ESS)]);
        assert_eq!(m.bos_equipment[0].min_amp_rating, 60);
    }

    #[test]
    fn test_pv_only_and_misses() {
        let state = StateBuilder::new(1, "")
            .solar()
            .inverter(InverterKind::Microinverter, "Enphase", "IQ8M", 24.0)
            .build();
        assert_eq!(
            detect(&state).map(|m| m.config_id).as_deref(),
            Some("generic-pv-only")
        );

        let no_output = StateBuilder::new(1, "")
            .solar()
            .battery("Tesla", "Powerwall 2", 1, 20.0)
            .build();
        assert!(detect(&no_output).is_none());
        assert!(detect(&EquipmentState::default()).is_none());
    }
}
