// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Deciding which BOS sections are shown for a system.
//!
//! The predicates read the raw fields directly, not the extracted
//! [`EquipmentState`][crate::equipment::EquipmentState], so they agree with
//! what the forms show while a project is still being filled in.

use crate::equipment::BackupOption;
use crate::extractor::{inverter_make, inverter_model, is_system_active};
use crate::fields::{number, text, RawFields, SystemField};
use crate::section::MAX_SYSTEMS;
use crate::BosSection;
use serde_json::Value;

/// Whether a section is shown for a system.  The combine section belongs to
/// the project, so `system` is ignored for it.
pub fn is_section_visible(fields: &RawFields, section: BosSection, system: u8) -> bool {
    let key = |field: SystemField| field.key(system);
    match section {
        BosSection::Utility => {
            let has_combiner = text(fields, &key(SystemField::StringCombinerPanelMake)).is_some()
                && text(fields, &key(SystemField::StringCombinerPanelModel)).is_some();
            has_combiner
                || (inverter_make(fields, system).is_some()
                    && inverter_model(fields, system).is_some())
        }
        BosSection::Battery1 => {
            has_quantity(fields, &[
                key(SystemField::TriggerBattery1Qty),
                key(SystemField::TriggerBattery1Quantity),
            ])
        }
        BosSection::Battery2 => {
            has_quantity(fields, &[
                key(SystemField::TriggerBattery2Qty),
                key(SystemField::TriggerBattery2Quantity),
            ])
        }
        BosSection::Backup => {
            let option = text(fields, &key(SystemField::BackupOption))
                .or_else(|| text(fields, &key(SystemField::EssBackupOption)));
            BackupOption::parse(option).is_home_backup()
        }
        BosSection::PostSms => {
            let is_sms = |value: Option<&str>| {
                value.is_some_and(|v| !v.eq_ignore_ascii_case("no sms"))
            };
            let has_sms = is_sms(text(fields, &key(SystemField::SmsMake)))
                && is_sms(text(fields, &key(SystemField::SmsModel)));
            has_sms || fields.get(&key(SystemField::NoSms)) == Some(&Value::Bool(false))
        }
        BosSection::Combine => active_system_count(fields) >= 2,
    }
}

/// Returns the number of systems with any equipment.
pub fn active_system_count(fields: &RawFields) -> usize {
    (1..=MAX_SYSTEMS)
        .filter(|&system| is_system_active(fields, system))
        .count()
}

/// Whether the first of `keys` holding a nonzero quantity holds a positive
/// whole one.
fn has_quantity(fields: &RawFields, keys: &[String]) -> bool {
    keys.iter()
        .find_map(|key| number(fields, key).filter(|qty| *qty != 0.0))
        .is_some_and(|qty| qty.trunc() > 0.0)
}
