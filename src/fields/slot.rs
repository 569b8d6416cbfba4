// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Typed addresses of BOS slots and the records stored in them.

use super::raw::{flag, text, RawFields};
use crate::section::{COMBINE_POSITIONS, MAX_SYSTEMS};
use crate::{BosSection, Error};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// The fields that make up a slot.  Not every section has every field, see
/// [`SlotAddress::suffixes`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldSuffix {
    EquipmentType,
    Make,
    Model,
    AmpRating,
    IsNew,
    /// The inverse of `IsNew`, used by the combine section only.
    Existing,
    /// The position label, used by the combine section only.
    Position,
    Trigger,
    Active,
    BlockName,
}

impl FieldSuffix {
    fn as_str(self) -> &'static str {
        match self {
            FieldSuffix::EquipmentType => "equipment_type",
            FieldSuffix::Make => "make",
            FieldSuffix::Model => "model",
            FieldSuffix::AmpRating => "amp_rating",
            FieldSuffix::IsNew => "is_new",
            FieldSuffix::Existing => "existing",
            FieldSuffix::Position => "position",
            FieldSuffix::Trigger => "trigger",
            FieldSuffix::Active => "active",
            FieldSuffix::BlockName => "block_name",
        }
    }
}

const SYSTEM_SUFFIXES: &[FieldSuffix] = &[
    FieldSuffix::EquipmentType,
    FieldSuffix::Make,
    FieldSuffix::Model,
    FieldSuffix::AmpRating,
    FieldSuffix::IsNew,
    FieldSuffix::Trigger,
    FieldSuffix::Active,
    FieldSuffix::BlockName,
];

const SYSTEM_SUFFIXES_WITHOUT_ACTIVE: &[FieldSuffix] = &[
    FieldSuffix::EquipmentType,
    FieldSuffix::Make,
    FieldSuffix::Model,
    FieldSuffix::AmpRating,
    FieldSuffix::IsNew,
    FieldSuffix::Trigger,
    FieldSuffix::BlockName,
];

const COMBINE_SUFFIXES: &[FieldSuffix] = &[
    FieldSuffix::EquipmentType,
    FieldSuffix::Make,
    FieldSuffix::Model,
    FieldSuffix::AmpRating,
    FieldSuffix::Existing,
    FieldSuffix::Position,
];

/// The address of a single BOS slot.
///
/// For per-system sections the scope is the system number (1 to 4), for the
/// combine section it is the combine position (1 to 3).  Slots are numbered
/// from 1 up to the section's capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotAddress {
    section: BosSection,
    scope: u8,
    slot: u8,
}

impl SlotAddress {
    /// Creates a new address, checking that the scope and slot are within
    /// the section's bounds.
    pub fn new(section: BosSection, scope: u8, slot: u8) -> Result<Self, Error> {
        if section == BosSection::Combine {
            if !(1..=COMBINE_POSITIONS).contains(&scope) {
                return Err(Error::invalid_slot(format!(
                    "Combine position {scope} is outside 1..={COMBINE_POSITIONS}."
                )));
            }
        } else if !(1..=MAX_SYSTEMS).contains(&scope) {
            return Err(Error::invalid_system(format!(
                "System {scope} is outside 1..={MAX_SYSTEMS}."
            )));
        }
        if !(1..=section.capacity()).contains(&slot) {
            return Err(Error::invalid_slot(format!(
                "Slot {slot} is outside 1..={} for section {section}.",
                section.capacity()
            )));
        }
        Ok(Self {
            section,
            scope,
            slot,
        })
    }

    pub fn section(&self) -> BosSection {
        self.section
    }

    /// The system number, or the combine position for the combine section.
    pub fn scope(&self) -> u8 {
        self.scope
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }

    /// Returns the address of another slot in the same section and scope.
    pub(crate) fn with_slot(&self, slot: u8) -> Result<Self, Error> {
        Self::new(self.section, self.scope, slot)
    }

    /// The fields this slot is made of.
    pub fn suffixes(&self) -> &'static [FieldSuffix] {
        match self.section {
            BosSection::Combine => COMBINE_SUFFIXES,
            section if section.has_active_flag() => SYSTEM_SUFFIXES,
            _ => SYSTEM_SUFFIXES_WITHOUT_ACTIVE,
        }
    }

    /// Returns the key of one of the slot's fields.
    pub fn field(&self, suffix: FieldSuffix) -> String {
        format!("{}_{}", self.prefix(), suffix.as_str())
    }

    /// The value written to the slot's `trigger` field.
    pub(crate) fn trigger_value(&self) -> Option<String> {
        let system = self.scope;
        match self.section {
            BosSection::Utility => Some(format!("sys{system}_stringCombiner")),
            BosSection::Battery1 => Some(format!("sys{system}_battery1")),
            BosSection::Battery2 => Some(format!("sys{system}_battery2")),
            BosSection::Backup => Some(format!("sys{system}_backupSubPanel")),
            BosSection::PostSms => Some(format!("sys{system}_postSMS")),
            BosSection::Combine => None,
        }
    }

    fn prefix(&self) -> String {
        let (scope, slot) = (self.scope, self.slot);
        match self.section {
            BosSection::Utility => format!("bos_sys{scope}_type{slot}"),
            BosSection::Battery1 => format!("bos_sys{scope}_battery1_type{slot}"),
            BosSection::Battery2 => format!("bos_sys{scope}_battery2_type{slot}"),
            BosSection::Backup => format!("bos_sys{scope}_backup_type{slot}"),
            BosSection::PostSms => format!("post_sms_bos_sys{scope}_type{slot}"),
            BosSection::Combine => format!("postcombine_{scope}_{slot}"),
        }
    }
}

/// The equipment stored in one slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRecord {
    pub equipment_type: String,
    pub make: String,
    pub model: String,
    pub amp_rating: String,
    pub is_new: bool,
    pub block_name: Option<String>,
}

impl SlotRecord {
    /// Creates a record for new equipment of the given type, with no part
    /// selected yet.
    pub fn new(equipment_type: impl Into<String>) -> Self {
        Self {
            equipment_type: equipment_type.into(),
            make: String::new(),
            model: String::new(),
            amp_rating: String::new(),
            is_new: true,
            block_name: None,
        }
    }
}

/// Reads the record stored at `address`, or `None` if the slot has no
/// equipment type.
pub fn read_slot(fields: &RawFields, address: &SlotAddress) -> Option<SlotRecord> {
    let equipment_type = text(fields, &address.field(FieldSuffix::EquipmentType))?;
    let is_new = if address.section == BosSection::Combine {
        !flag(fields, &address.field(FieldSuffix::Existing)).unwrap_or(false)
    } else {
        flag(fields, &address.field(FieldSuffix::IsNew)).unwrap_or(true)
    };
    let block_name = if address.section == BosSection::Combine {
        None
    } else {
        text(fields, &address.field(FieldSuffix::BlockName)).map(String::from)
    };

    Some(SlotRecord {
        equipment_type: equipment_type.to_string(),
        make: display(fields, &address.field(FieldSuffix::Make)),
        model: display(fields, &address.field(FieldSuffix::Model)),
        amp_rating: display(fields, &address.field(FieldSuffix::AmpRating)),
        is_new,
        block_name,
    })
}

/// Returns the populated slots of a section in slot order, together with
/// their slot numbers.
pub(crate) fn populated_slots(
    fields: &RawFields,
    section: BosSection,
    scope: u8,
) -> Result<Vec<(u8, SlotRecord)>, Error> {
    let mut slots = Vec::new();
    for slot in 1..=section.capacity() {
        let address = SlotAddress::new(section, scope, slot)?;
        if let Some(record) = read_slot(fields, &address) {
            slots.push((slot, record));
        }
    }
    Ok(slots)
}

/// Returns the slot numbers of a section that already hold equipment.
pub(crate) fn occupied_slots(
    fields: &RawFields,
    section: BosSection,
    scope: u8,
) -> Result<BTreeSet<u8>, Error> {
    Ok(populated_slots(fields, section, scope)?
        .into_iter()
        .map(|(slot, _)| slot)
        .collect())
}

fn display(fields: &RawFields, key: &str) -> String {
    match fields.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}
