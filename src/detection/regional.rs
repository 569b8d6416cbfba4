// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Detector rules for the regional utilities.
//!
//! Each utility has a PV-only rule for string inverters and one for
//! microinverters, using its own names for the meter and the disconnect.
//! Ratings are rounded up to the standard ladder.

use super::builder::MatchBuilder;
use super::rule::{DetectionContext, DetectorRule, Utility, UtilityTier};
use super::sizing::Sizing;
use super::{Confidence, PRE_COMBINE};
use crate::equipment::{EquipmentState, PoiType};
use crate::BosSection;

pub(crate) const SRP: UtilityTier = UtilityTier {
    utility: Utility::Srp,
    rules: &[
        DetectorRule {
            id: "srp-pv-only-string",
            name: "SRP PV-Only String Inverter",
            description: "Solar panels with string inverter, no battery (SRP)",
            confidence: Confidence::High,
            applies: |s, _| is_pv_only_string(s),
            build: |b, _| pv_only(b, "Dedicated DER Meter", "DER Meter Disconnect Switch"),
        },
        DetectorRule {
            id: "srp-pv-only-micro",
            name: "SRP PV-Only Microinverter",
            description: "Solar panels with microinverter, no battery (SRP)",
            confidence: Confidence::High,
            applies: |s, _| is_pv_only_micro(s),
            build: |b, _| pv_only(b, "Dedicated DER Meter", "DER Meter Disconnect Switch"),
        },
    ],
};

pub(crate) const TEP: UtilityTier = UtilityTier {
    utility: Utility::Tep,
    rules: &[
        DetectorRule {
            id: "tep-pv-only-string",
            name: "TEP PV-Only String Inverter",
            description: "Solar panels with string inverter, no battery (TEP)",
            confidence: Confidence::High,
            applies: |s, _| is_pv_only_string(s),
            build: |b, _| pv_only(b, "Utility DG Meter", "DG Disconnect Switch"),
        },
        DetectorRule {
            id: "tep-pv-only-micro",
            name: "TEP PV-Only Microinverter",
            description: "Solar panels with microinverter, no battery (TEP)",
            confidence: Confidence::High,
            applies: |s, _| is_pv_only_micro(s),
            build: |b, _| pv_only(b, "Utility DG Meter", "DG Disconnect Switch"),
        },
    ],
};

pub(crate) const TRICO: UtilityTier = UtilityTier {
    utility: Utility::Trico,
    rules: &[
        DetectorRule {
            id: "trico-pv-only-string",
            name: "TRICO PV-Only String Inverter",
            description: "Solar panels with string inverter, no battery (TRICO)",
            confidence: Confidence::High,
            applies: |s, _| is_pv_only_string(s),
            build: |b, _| {
                pv_only(
                    b,
                    "Co-Generation Meter",
                    "Co-Generation System Utility Disconnect",
                )
            },
        },
        DetectorRule {
            id: "trico-pv-only-micro",
            name: "TRICO PV-Only Microinverter",
            description: "Solar panels with microinverter, no battery (TRICO)",
            confidence: Confidence::High,
            applies: |s, _| is_pv_only_micro(s),
            build: |b, _| {
                pv_only(
                    b,
                    "Co-Generation Meter",
                    "Co-Generation System Utility Disconnect",
                )
            },
        },
    ],
};

/// Xcel substitutes the disconnect by point of interconnection.
pub(crate) const XCEL: UtilityTier = UtilityTier {
    utility: Utility::Xcel,
    rules: &[
        DetectorRule {
            id: "xcel-pv-only-string-{poi_id}",
            name: "Xcel PV-Only String Inverter ({poi})",
            description: "Solar panels with string inverter, no battery (Xcel {poi})",
            confidence: Confidence::High,
            applies: |s, _| is_pv_only_string(s),
            build: xcel_pv_only,
        },
        DetectorRule {
            id: "xcel-pv-only-micro-{poi_id}",
            name: "Xcel PV-Only Microinverter ({poi})",
            description: "Solar panels with microinverter, no battery (Xcel {poi})",
            confidence: Confidence::High,
            applies: |s, _| is_pv_only_micro(s),
            build: xcel_pv_only,
        },
    ],
};

fn is_pv_only(s: &EquipmentState) -> bool {
    s.system_number == 1 && s.solar.present && !s.has_battery_units() && s.has_inverter_output()
}

fn is_pv_only_string(s: &EquipmentState) -> bool {
    is_pv_only(s) && s.inverter.present && !s.is_microinverter()
}

fn is_pv_only_micro(s: &EquipmentState) -> bool {
    is_pv_only(s) && s.is_microinverter()
}

fn pv_only(b: &mut MatchBuilder, meter: &str, disconnect: &str) {
    let sizing = Sizing::standard(b.state().inverter.max_continuous_output);
    b.add_all(BosSection::Utility, &[meter, disconnect], &sizing, PRE_COMBINE);
}

fn xcel_pv_only(b: &mut MatchBuilder, _: &DetectionContext) {
    let disconnect = match b.state().poi {
        Some(PoiType::SupplySide) => "Non-Fused AC Disconnect",
        Some(PoiType::LoadSide) | None => "Fused AC Disconnect",
    };
    pv_only(b, "Production Meter", disconnect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::ConfigurationMatch;
    use crate::equipment::InverterKind;
    use crate::test_utils::StateBuilder;
    use crate::EngineConfig;
    use std::collections::BTreeMap;

    fn detect(tier: &UtilityTier, state: &EquipmentState) -> Option<ConfigurationMatch> {
        let config = EngineConfig::default();
        let earlier = BTreeMap::new();
        let ctx = DetectionContext {
            config: &config,
            earlier_systems: &earlier,
        };
        tier.rules
            .iter()
            .find(|rule| (rule.applies)(state, &ctx))
            .and_then(|rule| rule.build_match(state, &ctx))
    }

    fn pv(kind: InverterKind, output: f64) -> StateBuilder {
        StateBuilder::new(1, "Salt River Project")
            .solar()
            .inverter(kind, "Generic", "GI-7600", output)
    }

    #[test]
    fn test_srp_standard_rating() {
        let m = detect(&SRP, &pv(InverterKind::String, 33.0).build()).unwrap();
        assert_eq!(m.config_id, "srp-pv-only-string");
        assert_eq!(m.bos_equipment[0].equipment_type, "Dedicated DER Meter");
        assert_eq!(m.bos_equipment[1].equipment_type, "DER Meter Disconnect Switch");
        assert_eq!(m.bos_equipment[1].min_amp_rating, 50);
        assert_eq!(
            m.bos_equipment[1].sizing_calculation,
            "33A × 1.25 = 42A (Standard: 50A)"
        );
    }

    #[test]
    fn test_tep_and_trico_names() {
        let m = detect(&TEP, &pv(InverterKind::Microinverter, 16.0).build()).unwrap();
        assert_eq!(m.config_id, "tep-pv-only-micro");
        assert_eq!(m.bos_equipment[0].equipment_type, "Utility DG Meter");
        assert_eq!(m.bos_equipment[0].min_amp_rating, 20);

        let m = detect(&TRICO, &pv(InverterKind::String, 40.0).build()).unwrap();
        assert_eq!(m.config_name, "TRICO PV-Only String Inverter");
        assert_eq!(
            m.bos_equipment[1].equipment_type,
            "Co-Generation System Utility Disconnect"
        );
    }

    #[test]
    fn test_xcel_poi_substitution() {
        let m = detect(
            &XCEL,
            &pv(InverterKind::String, 32.0)
                .poi(PoiType::SupplySide)
                .build(),
        )
        .unwrap();
        assert_eq!(m.config_id, "xcel-pv-only-string-supply_side");
        assert_eq!(m.config_name, "Xcel PV-Only String Inverter (Supply Side)");
        assert_eq!(m.bos_equipment[1].equipment_type, "Non-Fused AC Disconnect");

        let m = detect(&XCEL, &pv(InverterKind::Microinverter, 32.0).build()).unwrap();
        assert_eq!(m.config_id, "xcel-pv-only-micro-load_side");
        assert_eq!(
            m.description,
            "Solar panels with microinverter, no battery (Xcel Load Side)"
        );
        assert_eq!(m.bos_equipment[1].equipment_type, "Fused AC Disconnect");
    }

    #[test]
    fn test_only_system_1_without_batteries() {
        let state = StateBuilder::new(2, "SRP")
            .solar()
            .inverter(InverterKind::String, "Generic", "GI-7600", 32.0)
            .build();
        assert!(detect(&SRP, &state).is_none());

        let state = pv(InverterKind::String, 32.0)
            .battery("Tesla", "Powerwall 2", 1, 20.0)
            .build();
        assert!(detect(&SRP, &state).is_none());
    }
}
