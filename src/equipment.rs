// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module defines `EquipmentState`, the normalized view of one system's
//! equipment that the detectors work on, and the enums it is made of.

use crate::BosSection;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

/// Represents the type of an inverter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InverterKind {
    Microinverter,
    /// A string inverter.
    String,
    #[default]
    Unresolved,
}

impl Display for InverterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InverterKind::Microinverter => write!(f, "microinverter"),
            InverterKind::String => write!(f, "inverter"),
            InverterKind::Unresolved => write!(f, ""),
        }
    }
}

/// Whether battery power flows on the AC or the DC side of the inverter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CouplingType {
    #[default]
    Ac,
    Dc,
}

impl CouplingType {
    /// Parses a `couple_type` value as returned by the catalog services.
    pub(crate) fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_uppercase();
        if value.starts_with("DC") {
            Some(CouplingType::Dc)
        } else if value.starts_with("AC") {
            Some(CouplingType::Ac)
        } else {
            None
        }
    }
}

impl Display for CouplingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CouplingType::Ac => write!(f, "AC"),
            CouplingType::Dc => write!(f, "DC"),
        }
    }
}

/// The backup option chosen for a system.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BackupOption {
    WholeHome,
    PartialHome,
    None,
    #[default]
    Unset,
    Other(String),
}

impl BackupOption {
    pub(crate) fn parse(value: Option<&str>) -> Self {
        match value {
            Some("Whole Home") => BackupOption::WholeHome,
            Some("Partial Home") => BackupOption::PartialHome,
            Some("None") => BackupOption::None,
            Some(other) if !other.is_empty() => BackupOption::Other(other.to_string()),
            _ => BackupOption::Unset,
        }
    }

    /// Whether the option is `Whole Home` or `Partial Home`.
    pub fn is_home_backup(&self) -> bool {
        matches!(self, BackupOption::WholeHome | BackupOption::PartialHome)
    }

    /// Whether any backup option other than `None` was chosen.
    pub fn is_selected(&self) -> bool {
        !matches!(self, BackupOption::None | BackupOption::Unset)
    }
}

impl Display for BackupOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackupOption::WholeHome => write!(f, "Whole Home"),
            BackupOption::PartialHome => write!(f, "Partial Home"),
            BackupOption::None => write!(f, "None"),
            BackupOption::Unset => write!(f, ""),
            BackupOption::Other(other) => write!(f, "{other}"),
        }
    }
}

/// Where the system ties into the utility service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoiType {
    SupplySide,
    LoadSide,
}

impl PoiType {
    /// Classifies a free-text method of interconnection.
    pub(crate) fn classify(method: &str) -> Option<Self> {
        let method = method.to_lowercase();
        if method.contains("supply") {
            Some(PoiType::SupplySide)
        } else if method.contains("load") {
            Some(PoiType::LoadSide)
        } else {
            None
        }
    }
}

impl Display for PoiType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoiType::SupplySide => write!(f, "supply_side"),
            PoiType::LoadSide => write!(f, "load_side"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SolarPanels {
    pub present: bool,
    pub make: String,
    pub model: String,
    pub quantity: u32,
    pub wattage: u32,
    pub is_new: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inverter {
    pub present: bool,
    pub kind: InverterKind,
    pub make: String,
    pub model: String,
    /// Maximum continuous output in amps.
    pub max_continuous_output: f64,
    pub quantity: u32,
    pub is_new: bool,
    pub aggregate_breaker_amps: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Battery {
    pub present: bool,
    pub make: String,
    pub model: String,
    pub quantity: u32,
    /// Maximum continuous output in amps.
    pub max_continuous_output: f64,
    pub is_new: bool,
    /// The coupling type reported by the catalog services, if any.
    pub couple_type: Option<CouplingType>,
}

/// A storage management system.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StorageManagement {
    pub present: bool,
    pub make: String,
    pub model: String,
    pub is_new: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BackupPanel {
    pub present: bool,
    pub make: String,
    pub model: String,
    pub bus_rating: Option<u32>,
    pub is_new: bool,
    pub option: BackupOption,
}

/// The slots of each section that already hold equipment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExistingSlots(BTreeMap<BosSection, BTreeSet<u8>>);

impl ExistingSlots {
    pub(crate) fn insert(&mut self, section: BosSection, slot: u8) {
        self.0.entry(section).or_default().insert(slot);
    }

    /// Whether the given slot of a section is occupied.
    pub fn contains(&self, section: BosSection, slot: u8) -> bool {
        self.0.get(&section).is_some_and(|slots| slots.contains(&slot))
    }

    /// Returns the occupied slots of a section in increasing order.
    pub fn slots(&self, section: BosSection) -> impl Iterator<Item = u8> + '_ {
        self.0.get(&section).into_iter().flatten().copied()
    }
}

/// A normalized, read-only snapshot of one system's equipment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EquipmentState {
    pub system_number: u8,
    pub utility_name: String,
    pub solar: SolarPanels,
    pub inverter: Inverter,
    pub battery: Battery,
    /// The resolved coupling type of the system.
    pub coupling: CouplingType,
    pub sms: StorageManagement,
    pub backup: BackupPanel,
    pub poi: Option<PoiType>,
    pub existing_slots: ExistingSlots,
}

/// Case-insensitive substring match.
pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Predicates used by the detectors.
impl EquipmentState {
    pub(crate) fn is_microinverter(&self) -> bool {
        self.inverter.kind == InverterKind::Microinverter
    }

    pub(crate) fn is_string_inverter(&self) -> bool {
        self.inverter.kind == InverterKind::String
    }

    pub(crate) fn has_battery_units(&self) -> bool {
        self.battery.quantity > 0
    }

    pub(crate) fn has_home_backup(&self) -> bool {
        self.backup.option.is_home_backup()
    }

    pub(crate) fn has_inverter_output(&self) -> bool {
        self.inverter.max_continuous_output > 0.0
    }

    pub(crate) fn inverter_make_contains(&self, needle: &str) -> bool {
        contains_ci(&self.inverter.make, needle)
    }

    pub(crate) fn battery_make_contains(&self, needle: &str) -> bool {
        contains_ci(&self.battery.make, needle)
    }

    pub(crate) fn battery_model_contains(&self, needle: &str) -> bool {
        contains_ci(&self.battery.model, needle)
    }

    pub(crate) fn sms_make_contains(&self, needle: &str) -> bool {
        self.sms.present && contains_ci(&self.sms.make, needle)
    }

    pub(crate) fn sms_model_contains(&self, needle: &str) -> bool {
        self.sms.present && contains_ci(&self.sms.model, needle)
    }
}
