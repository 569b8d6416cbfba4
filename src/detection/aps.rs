// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Detector rules for Arizona Public Service projects.
//!
//! Ranked from the most specific equipment combinations down to plain
//! PV-only systems: named battery ecosystems first, then DC-coupled, Tesla
//! Powerwall 3, AC-coupled and PV-only rules.

use super::builder::MatchBuilder;
use super::rule::{DetectionContext, DetectorRule, Utility, UtilityTier};
use super::sizing::Sizing;
use super::{Confidence, BACKUP_LOAD_SUB_PANEL, ESS, POST_COMBINE, POST_SMS, PRE_COMBINE};
use crate::equipment::{BackupOption, CouplingType, EquipmentState};
use crate::BosSection::{Backup, Battery1, PostSms, Utility as UtilitySection};

const UNI_METER: &str = "Uni-Directional Meter";
const UNI_LINE_DISCONNECT: &str = "Uni-Directional Meter Line Side Disconnect";
const BI_METER: &str = "Bi-Directional Meter";
const BI_DER_DISCONNECT: &str = "Bi-Directional Meter DER Side Disconnect";
const BI_LINE_DISCONNECT: &str = "Bi-Directional Meter Line Side Disconnect";
const UTILITY_DISCONNECT: &str = "Utility Disconnect";

pub(crate) const APS: UtilityTier = UtilityTier {
    utility: Utility::Aps,
    rules: &[
        DetectorRule {
            id: "franklin-aps-whole-home",
            name: "Franklin aPower + APS (Whole Home Backup)",
            description: "Franklin aPower battery with Agate SMS, Whole Home backup",
            confidence: Confidence::High,
            applies: |s, _| is_franklin(s) && s.backup.option == BackupOption::WholeHome,
            build: franklin,
        },
        DetectorRule {
            id: "franklin-aps-partial-home",
            name: "Franklin aPower + APS (Partial Home Backup)",
            description: "Franklin aPower battery with Agate SMS, Partial Home backup",
            confidence: Confidence::High,
            applies: |s, _| is_franklin(s) && s.backup.option == BackupOption::PartialHome,
            build: franklin,
        },
        DetectorRule {
            id: "enphase-aps-whole-home",
            name: "Enphase Microinverter + IQ Battery + APS (Whole Home)",
            description: ENPHASE_DESCRIPTION,
            confidence: Confidence::High,
            applies: |s, _| is_enphase(s) && s.backup.option == BackupOption::WholeHome,
            build: enphase,
        },
        DetectorRule {
            id: "enphase-aps-partial-home",
            name: "Enphase Microinverter + IQ Battery + APS (Partial Home)",
            description: ENPHASE_DESCRIPTION,
            confidence: Confidence::High,
            applies: |s, _| is_enphase(s) && s.backup.option == BackupOption::PartialHome,
            build: enphase,
        },
        DetectorRule {
            id: "aps-dc-coupled-sms-backup",
            name: "APS DC-Coupled + SMS + Whole/Partial Home Backup",
            description: "DC-coupled battery system with SMS and backup panel (SolarEdge, Generac PWRcell, etc.)",
            confidence: Confidence::High,
            applies: |s, _| is_dc_coupled(s) && s.sms.present && wants_backup(s),
            build: dc_coupled_sms_backup,
        },
        DetectorRule {
            id: "aps-dc-coupled-sms-no-backup",
            name: "APS DC-Coupled + SMS + No Backup",
            description: "DC-coupled battery system with SMS but no backup panel",
            confidence: Confidence::High,
            applies: |s, _| is_dc_coupled(s) && s.sms.present && lacks_backup(s),
            build: dc_coupled_sms,
        },
        DetectorRule {
            id: "aps-dc-coupled-no-sms-backup",
            name: "APS DC-Coupled + No SMS + Backup",
            description: "DC-coupled battery system with backup panel but no SMS",
            confidence: Confidence::High,
            applies: |s, _| is_dc_coupled(s) && !s.sms.present && wants_backup(s),
            build: dc_coupled_backup,
        },
        DetectorRule {
            id: "aps-dc-coupled-no-sms-no-backup",
            name: "APS DC-Coupled + No SMS + No Backup",
            description: "DC-coupled battery system with no SMS and no backup panel",
            confidence: Confidence::High,
            applies: |s, _| is_dc_coupled(s) && !s.sms.present && lacks_backup(s),
            build: dc_coupled,
        },
        DetectorRule {
            id: "tesla-pw3-multi-whole-home",
            name: "Tesla Powerwall 3 + Gateway 3 + APS Whole Home (Multi-System)",
            description: "Multi-system: PV (Sys1) + Tesla PW3 (Sys2), Whole Home backup",
            confidence: Confidence::High,
            applies: is_tesla_multi_system,
            build: tesla_multi_system,
        },
        DetectorRule {
            id: "tesla-pw3-single",
            name: "Tesla Powerwall 3 + APS {backup}",
            description: "Single-system Tesla Powerwall 3, {backup} backup",
            confidence: Confidence::High,
            applies: |s, _| {
                s.system_number == 1
                    && is_tesla_pw3(s)
                    && s.has_battery_units()
                    && s.backup.option.is_selected()
            },
            build: tesla_single_system,
        },
        DetectorRule {
            id: "aps-ac-coupled-string-sms-backup",
            name: "APS AC-Coupled String Inverter + SMS + Backup",
            description: "AC-coupled battery system with string inverter, SMS, and backup panel",
            confidence: Confidence::High,
            applies: |s, _| is_ac_string(s) && s.sms.present && wants_backup(s),
            build: ac_coupled_sms_backup,
        },
        DetectorRule {
            id: "aps-ac-coupled-string-sms-no-backup",
            name: "APS AC-Coupled String Inverter + SMS (No Backup)",
            description: "AC-coupled battery system with string inverter and SMS, no backup panel",
            confidence: Confidence::High,
            applies: |s, _| is_ac_string(s) && s.sms.present && lacks_backup(s),
            build: ac_coupled_sms,
        },
        DetectorRule {
            id: "aps-ac-coupled-string-no-sms-backup",
            name: "APS AC-Coupled String Inverter + Backup (No SMS)",
            description: "AC-coupled battery system with string inverter and backup, no SMS",
            confidence: Confidence::High,
            applies: |s, _| is_ac_string(s) && !s.sms.present && wants_backup(s),
            build: ac_coupled_backup,
        },
        DetectorRule {
            id: "aps-ac-coupled-string-no-sms-no-backup",
            name: "APS AC-Coupled String Inverter (No SMS, No Backup)",
            description: "AC-coupled battery system with string inverter, no SMS, no backup",
            confidence: Confidence::High,
            applies: |s, _| is_ac_string(s) && !s.sms.present && lacks_backup(s),
            build: ac_coupled,
        },
        DetectorRule {
            id: "aps-ac-coupled-micro-sms-backup",
            name: "APS AC-Coupled Microinverter + SMS + Backup",
            description: "AC-coupled battery system with microinverter, SMS, and backup panel",
            confidence: Confidence::High,
            applies: |s, _| is_ac_micro(s) && s.sms.present && wants_backup(s),
            build: ac_coupled_sms_backup,
        },
        DetectorRule {
            id: "aps-ac-coupled-micro-sms-no-backup",
            name: "APS AC-Coupled Microinverter + SMS (No Backup)",
            description: "AC-coupled battery system with microinverter and SMS, no backup panel",
            confidence: Confidence::High,
            applies: |s, _| is_ac_micro(s) && s.sms.present && lacks_backup(s),
            build: ac_coupled_sms,
        },
        DetectorRule {
            id: "aps-ac-coupled-micro-no-sms-backup",
            name: "APS AC-Coupled Microinverter + Backup (No SMS)",
            description: "AC-coupled battery system with microinverter and backup, no SMS",
            confidence: Confidence::High,
            applies: |s, _| is_ac_micro(s) && !s.sms.present && wants_backup(s),
            build: ac_coupled_backup,
        },
        DetectorRule {
            id: "aps-ac-coupled-micro-no-sms-no-backup",
            name: "APS AC-Coupled Microinverter (No SMS, No Backup)",
            description: "AC-coupled battery system with microinverter, no SMS, no backup",
            confidence: Confidence::High,
            applies: |s, _| is_ac_micro(s) && !s.sms.present && lacks_backup(s),
            build: ac_coupled,
        },
        DetectorRule {
            id: "aps-pv-only-string-sms",
            name: "APS PV-Only String Inverter + SMS",
            description: "Solar panels with string inverter and SMS, no battery storage",
            confidence: Confidence::High,
            applies: |s, _| is_pv_only(s) && !s.is_microinverter() && s.sms.present,
            build: pv_only_three_items,
        },
        DetectorRule {
            id: "aps-pv-only-string-no-sms",
            name: "APS PV-Only String Inverter (No SMS)",
            description: "Solar panels with string inverter, no battery storage, no SMS",
            confidence: Confidence::High,
            applies: |s, _| is_pv_only(s) && !s.is_microinverter() && !s.sms.present,
            build: pv_only_string_no_sms,
        },
        DetectorRule {
            id: "aps-pv-only-micro-sms",
            name: "APS PV-Only Microinverter + SMS",
            description: "Solar panels with microinverters and SMS, no battery storage",
            confidence: Confidence::High,
            applies: |s, _| is_pv_only(s) && s.is_microinverter() && s.sms.present,
            build: pv_only_three_items,
        },
        DetectorRule {
            id: "aps-pv-only-micro-no-sms",
            name: "APS PV-Only Microinverter (No SMS)",
            description: "Solar panels with microinverters, no battery storage, no SMS",
            confidence: Confidence::High,
            applies: |s, _| is_pv_only(s) && s.is_microinverter() && !s.sms.present,
            build: pv_only_three_items,
        },
        DetectorRule {
            id: "aps-pv-only-string",
            name: "APS PV-Only String Inverter",
            description: "Solar panels with string inverter, no battery storage",
            confidence: Confidence::High,
            applies: |s, _| is_any_system_pv_only(s) && s.is_string_inverter(),
            build: pv_only,
        },
        DetectorRule {
            id: "aps-pv-only-micro",
            name: "APS PV-Only Microinverter",
            description: "Solar panels with microinverters, no battery storage",
            confidence: Confidence::High,
            applies: |s, _| is_any_system_pv_only(s) && s.is_microinverter(),
            build: pv_only,
        },
    ],
};

const ENPHASE_DESCRIPTION: &str =
    "Enphase IQ ecosystem with microinverters, IQ Battery, and IQ System Controller";

// Preconditions

fn is_franklin(s: &EquipmentState) -> bool {
    s.system_number == 1
        && s.solar.present
        && s.battery_make_contains("franklin")
        && s.battery_model_contains("apower")
        && s.has_battery_units()
        && s.sms_make_contains("franklin")
        && s.sms_model_contains("agate")
}

fn is_enphase(s: &EquipmentState) -> bool {
    s.system_number == 1
        && s.solar.present
        && s.is_microinverter()
        && s.inverter_make_contains("enphase")
        && s.battery_make_contains("enphase")
        && s.has_battery_units()
        && s.sms_make_contains("enphase")
}

fn is_dc_coupled(s: &EquipmentState) -> bool {
    s.system_number == 1
        && s.solar.present
        && s.inverter.present
        && s.has_battery_units()
        && s.coupling == CouplingType::Dc
        && s.has_inverter_output()
}

fn is_ac_coupled(s: &EquipmentState) -> bool {
    s.system_number == 1
        && s.solar.present
        && s.inverter.present
        && s.has_battery_units()
        && !s.battery.make.is_empty()
        && !s.battery.model.is_empty()
        && s.coupling == CouplingType::Ac
        && s.has_inverter_output()
}

fn is_ac_string(s: &EquipmentState) -> bool {
    is_ac_coupled(s) && !s.is_microinverter()
}

fn is_ac_micro(s: &EquipmentState) -> bool {
    is_ac_coupled(s) && s.is_microinverter()
}

/// A backup panel with a whole or partial home backup option.
fn wants_backup(s: &EquipmentState) -> bool {
    s.backup.present && s.has_home_backup()
}

/// Neither a backup panel nor a home backup option.
fn lacks_backup(s: &EquipmentState) -> bool {
    !s.backup.present && !s.has_home_backup()
}

fn is_tesla_pw3(s: &EquipmentState) -> bool {
    s.inverter_make_contains("tesla") || s.inverter_make_contains("powerwall")
}

/// System 2 is a Tesla Powerwall 3 with Gateway 3 for whole home backup,
/// and system 1 is a microinverter PV system without batteries or SMS.
fn is_tesla_multi_system(s: &EquipmentState, ctx: &DetectionContext) -> bool {
    let is_gateway_3 = s.sms_make_contains("tesla")
        && (s.sms_model_contains("gateway 3") || s.sms_model_contains("gateway3"));
    s.system_number == 2
        && is_tesla_pw3(s)
        && is_gateway_3
        && s.has_battery_units()
        && s.backup.option == BackupOption::WholeHome
        && ctx.earlier_systems.get(&1).is_some_and(|sys1| {
            sys1.is_microinverter()
                && sys1.solar.present
                && !sys1.has_battery_units()
                && !sys1.sms.present
        })
}

fn is_pv_only(s: &EquipmentState) -> bool {
    s.system_number == 1 && is_any_system_pv_only(s)
}

fn is_any_system_pv_only(s: &EquipmentState) -> bool {
    s.solar.present && s.inverter.present && !s.has_battery_units() && s.has_inverter_output()
}

// Builders

fn inverter_label(s: &EquipmentState) -> &'static str {
    if s.is_microinverter() {
        "microinverter"
    } else {
        "inverter"
    }
}

fn franklin(b: &mut MatchBuilder, _: &DetectionContext) {
    let s = b.state();
    let inverter = s.inverter.max_continuous_output;
    let battery = s.battery.max_continuous_output;
    b.add_all(
        UtilitySection,
        &[UNI_METER, UNI_LINE_DISCONNECT],
        &Sizing::fixed(100, "standard APS solar production"),
        PRE_COMBINE,
    );
    b.add_all(
        Battery1,
        &[BI_DER_DISCONNECT, BI_METER, BI_LINE_DISCONNECT],
        &Sizing::derated(battery),
        ESS,
    );
    b.add_all(
        PostSms,
        &[BI_DER_DISCONNECT, UTILITY_DISCONNECT],
        &Sizing::combined(inverter, "inverter", battery),
        POST_COMBINE,
    );
}

fn enphase(b: &mut MatchBuilder, _: &DetectionContext) {
    let s = b.state();
    b.add_all(
        UtilitySection,
        &[UNI_METER, UNI_LINE_DISCONNECT],
        &Sizing::fixed(100, "fixed for APS solar production"),
        PRE_COMBINE,
    );
    b.add(
        PostSms,
        UTILITY_DISCONNECT,
        &Sizing::combined(
            s.inverter.max_continuous_output,
            "microinverter",
            s.battery.max_continuous_output,
        ),
        POST_COMBINE,
    );
}

fn dc_backup_items(b: &mut MatchBuilder, ctx: &DetectionContext) {
    let bus = ctx.backup_bus_rating(b.state());
    b.add_all(
        Backup,
        &[UNI_METER, UNI_LINE_DISCONNECT],
        &Sizing::bus_rating(bus),
        BACKUP_LOAD_SUB_PANEL,
    );
}

fn dc_coupled_sms_backup(b: &mut MatchBuilder, ctx: &DetectionContext) {
    dc_backup_items(b, ctx);
    dc_coupled_sms(b, ctx);
}

fn dc_coupled_sms(b: &mut MatchBuilder, _: &DetectionContext) {
    let sizing = Sizing::derated(b.state().inverter.max_continuous_output);
    b.add_all(
        UtilitySection,
        &[BI_DER_DISCONNECT, BI_METER],
        &sizing,
        PRE_COMBINE,
    );
    b.add(PostSms, UTILITY_DISCONNECT, &sizing, POST_SMS);
}

fn dc_coupled_backup(b: &mut MatchBuilder, ctx: &DetectionContext) {
    dc_backup_items(b, ctx);
    dc_coupled(b, ctx);
}

fn dc_coupled(b: &mut MatchBuilder, _: &DetectionContext) {
    let sizing = Sizing::derated(b.state().inverter.max_continuous_output);
    b.add(UtilitySection, UTILITY_DISCONNECT, &sizing, PRE_COMBINE);
}

fn tesla_multi_system(b: &mut MatchBuilder, ctx: &DetectionContext) {
    let s = b.state();
    if let Some(sys1) = ctx.earlier_systems.get(&1) {
        let sizing = Sizing::fixed(100, "standard microinverter");
        for equipment_type in [UNI_METER, UNI_LINE_DISCONNECT] {
            b.add_to(sys1, UtilitySection, equipment_type, &sizing, PRE_COMBINE);
        }
    }
    b.add_all(
        Backup,
        &[UNI_METER, UNI_LINE_DISCONNECT],
        &Sizing::fixed(ctx.backup_bus_rating(s), "backup panel bus rating"),
        ESS,
    );
    b.add_all(
        UtilitySection,
        &[BI_DER_DISCONNECT, BI_METER, UTILITY_DISCONNECT],
        &Sizing::combined(
            s.inverter.max_continuous_output,
            "inverter",
            ctx.config.tesla_pw3_output_amps,
        ),
        POST_COMBINE,
    );
}

fn tesla_single_system(b: &mut MatchBuilder, ctx: &DetectionContext) {
    let s = b.state();
    if s.backup.present {
        b.add_all(
            Backup,
            &[UNI_METER, UNI_LINE_DISCONNECT],
            &Sizing::fixed(ctx.backup_bus_rating(s), "backup panel bus rating"),
            ESS,
        );
    }
    b.add_all(
        UtilitySection,
        &[
            UNI_METER,
            BI_DER_DISCONNECT,
            BI_METER,
            UTILITY_DISCONNECT,
            UNI_LINE_DISCONNECT,
        ],
        &Sizing::combined(
            s.inverter.max_continuous_output,
            "inverter",
            ctx.config.tesla_pw3_output_amps,
        ),
        PRE_COMBINE,
    );
}

fn ac_backup_items(b: &mut MatchBuilder, ctx: &DetectionContext) {
    let bus = ctx.backup_bus_rating(b.state());
    b.add_all(
        Backup,
        &[BI_METER, BI_LINE_DISCONNECT],
        &Sizing::bus_rating(bus),
        ESS,
    );
}

fn ac_combined_sizing(s: &EquipmentState) -> Sizing {
    Sizing::combined(
        s.inverter.max_continuous_output,
        inverter_label(s),
        s.battery.max_continuous_output,
    )
}

fn ac_coupled_sms_backup(b: &mut MatchBuilder, ctx: &DetectionContext) {
    ac_backup_items(b, ctx);
    ac_pre_combine_items(b);
    b.add_all(
        PostSms,
        &[BI_DER_DISCONNECT, BI_METER, BI_LINE_DISCONNECT],
        &ac_combined_sizing(b.state()),
        POST_SMS,
    );
}

fn ac_coupled_sms(b: &mut MatchBuilder, _: &DetectionContext) {
    ac_pre_combine_items(b);
    b.add_all(
        PostSms,
        &[BI_DER_DISCONNECT, BI_METER],
        &ac_combined_sizing(b.state()),
        POST_SMS,
    );
}

/// The items between the inverter and the SMS, sized to the inverter alone.
fn ac_pre_combine_items(b: &mut MatchBuilder) {
    b.add_all(
        UtilitySection,
        &[UNI_METER, UTILITY_DISCONNECT, UNI_LINE_DISCONNECT],
        &Sizing::derated(b.state().inverter.max_continuous_output),
        PRE_COMBINE,
    );
}

fn ac_coupled_backup(b: &mut MatchBuilder, ctx: &DetectionContext) {
    ac_backup_items(b, ctx);
    b.add_all(
        UtilitySection,
        &[
            UNI_METER,
            UTILITY_DISCONNECT,
            UNI_LINE_DISCONNECT,
            BI_DER_DISCONNECT,
            BI_METER,
        ],
        &ac_combined_sizing(b.state()),
        PRE_COMBINE,
    );
}

fn ac_coupled(b: &mut MatchBuilder, _: &DetectionContext) {
    b.add_all(
        UtilitySection,
        &[UNI_METER, BI_DER_DISCONNECT, BI_METER, BI_LINE_DISCONNECT],
        &ac_combined_sizing(b.state()),
        PRE_COMBINE,
    );
}

fn pv_only_three_items(b: &mut MatchBuilder, _: &DetectionContext) {
    b.add_all(
        UtilitySection,
        &[UNI_LINE_DISCONNECT, UNI_METER, UTILITY_DISCONNECT],
        &Sizing::derated(b.state().inverter.max_continuous_output),
        PRE_COMBINE,
    );
}

fn pv_only_string_no_sms(b: &mut MatchBuilder, _: &DetectionContext) {
    b.add_all(
        UtilitySection,
        &[UNI_METER, UTILITY_DISCONNECT],
        &Sizing::derated(b.state().inverter.max_continuous_output),
        PRE_COMBINE,
    );
}

fn pv_only(b: &mut MatchBuilder, _: &DetectionContext) {
    b.add_all(
        UtilitySection,
        &[UNI_METER, UNI_LINE_DISCONNECT],
        &Sizing::derated(b.state().inverter.max_continuous_output),
        PRE_COMBINE,
    );
}
