// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

/*!
# Solar BOS Engine

This is a library for working out the balance-of-system (BOS) equipment a
solar, storage and backup installation needs, and for filling that equipment
into a project's BOS slots.

A project is described by a flat snapshot of form fields, the [`RawFields`].
Up to four systems are described in a project, each with its own solar
panels, inverter, batteries, storage management system and backup panel.

## Extraction

The [`EquipmentStateExtractor`] turns the fields of one system into an
[`EquipmentState`], a normalized view that the detection rules work on.  It
resolves the inverter kind and the AC/DC coupling of the batteries, looking
batteries and inverters up through the [`BatteryCatalog`] and
[`EquipmentSpecs`] collaborators when they are available.

## Detection

The [`Switchboard`] holds a priority-ordered registry of detection rules.
Utility-specific rules are tried first, followed by the generic ones, and
the first rule whose precondition holds decides the [`ConfigurationMatch`]
for a system.  [`detect_project_configuration`][Switchboard::detect_project_configuration]
runs detection for every active system of a project and adds the
multi-system combine point.

## Slots

Detected [`BosEquipmentItem`]s are stored in slots, addressed by
[`SlotAddress`].  Each [`BosSection`] has a fixed number of slots per
system, and the combine section has a fixed number of slots per combine
position.  The slot operations produce [`Payload`]s, which the
[`SystemDetailsStore`] persists:

- [`slot_payload`] and [`clear_payload`] write and clear a single slot.
- [`compact_section`] closes the gaps in a section.
- [`reorder_section`] moves a slot to a new place in a section.

## Population

[`prepare_population`] resolves detected items to parts of the
[`PartCatalog`] and builds the payload that stores them, and
[`save_population`] hands it to the store.

## Utility requirements

The [`UtilityRequirementsService`] fetches the BOS equipment a utility
requires through a [`RequirementsSource`], and caches the answers for the
configured time.
*/

mod catalog;
pub use catalog::{standard_type, CatalogEntry, PartCatalog};

mod collaborators;
pub use collaborators::{
    BatteryCatalog, BatteryRecord, EquipmentSpec, EquipmentSpecs, RequirementsSource,
    SystemDetailsStore,
};

mod config;
pub use config::EngineConfig;

mod detection;
pub use detection::{
    configuration_summary, derated_amps, detect_combine_point, standard_amp_rating,
    BosEquipmentItem, Confidence, ConfigurationMatch, ProjectConfigurationResult, Switchboard,
};

mod equipment;
pub use equipment::{
    BackupOption, BackupPanel, Battery, CouplingType, EquipmentState, ExistingSlots, Inverter,
    InverterKind, PoiType, SolarPanels, StorageManagement,
};

mod error;
pub use error::Error;

mod extractor;
pub use extractor::{is_system_active, resolve_utility_name, EquipmentStateExtractor};

mod fields;
pub use fields::{
    clear_payload, compact_section, read_slot, reorder_section, slot_payload, FieldSuffix,
    Payload, RawFields, SlotAddress, SlotRecord,
};

mod population;
pub use population::{
    populate_project, prepare_population, save_population, PopulationPlan, SaveOutcome,
};

mod requirements;
pub use requirements::{
    parse_requirements, requirement_standard_type, resolve_standard_type,
    resolve_utility_abbrev, BosRequirement, Clock, SystemClock, UtilityRequirements,
    UtilityRequirementsService,
};

mod resolution;

mod section;
pub use section::{BosSection, COMBINE_POSITIONS, MAX_SYSTEMS};

mod visibility;
pub use visibility::{active_system_count, is_section_visible};

#[cfg(test)]
mod test_utils;
