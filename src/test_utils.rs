// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module is only compiled when running unit tests and contains features
//! that are shared by the tests of all modules.
//!
//! - the `FieldsBuilder`, which can declaratively build raw field snapshots.
//! - the `StateBuilder`, for building `EquipmentState`s without going
//!   through extraction.
//! - in-memory fakes for the collaborator traits, and a manually advanced
//!   clock.

use crate::collaborators::{
    BatteryCatalog, BatteryRecord, EquipmentSpec, EquipmentSpecs, RequirementsSource,
    SystemDetailsStore,
};
use crate::equipment::{BackupOption, CouplingType, EquipmentState, InverterKind, PoiType};
use crate::fields::{FieldSuffix, ProjectField, SlotAddress, SystemField};
use crate::requirements::{Clock, UtilityRequirements};
use crate::{BosEquipmentItem, BosSection, Error, Payload, RawFields};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// A builder for raw field snapshots.
///
/// Per-system setters write to the system last selected with
/// [`system`][FieldsBuilder::system], which is system 1 initially.
pub(crate) struct FieldsBuilder {
    fields: RawFields,
    system: u8,
}

impl FieldsBuilder {
    pub(crate) fn new() -> Self {
        Self {
            fields: RawFields::new(),
            system: 1,
        }
    }

    pub(crate) fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    fn set_system(self, field: SystemField, value: impl Into<Value>) -> Self {
        let key = field.key(self.system);
        self.set(&key, value)
    }

    pub(crate) fn utility(self, name: &str) -> Self {
        self.set(ProjectField::Utility.key(), name)
    }

    pub(crate) fn interconnection(self, method: &str) -> Self {
        self.set(ProjectField::InterconnectionMethod.key(), method)
    }

    /// Selects the system the following setters write to.
    pub(crate) fn system(mut self, system: u8) -> Self {
        self.system = system;
        self
    }

    pub(crate) fn solar(self, make: &str, model: &str, quantity: u32) -> Self {
        self.set_system(SystemField::SolarPanelMake, make)
            .set_system(SystemField::SolarPanelModel, model)
            .set_system(SystemField::SolarPanelQty, quantity)
    }

    pub(crate) fn inverter(self, make: &str, model: &str, output: f64) -> Self {
        self.set_system(SystemField::InverterMake, make)
            .set_system(SystemField::InverterModel, model)
            .set_system(SystemField::InverterMaxContinuousOutput, output)
    }

    pub(crate) fn battery(self, make: &str, model: &str, quantity: u32, output: f64) -> Self {
        self.set_system(SystemField::Battery1Make, make)
            .set_system(SystemField::Battery1Model, model)
            .set_system(SystemField::Battery1Qty, quantity)
            .set_system(SystemField::Battery1MaxContinuousOutput, output)
    }

    pub(crate) fn sms(self, make: &str, model: &str) -> Self {
        self.set_system(SystemField::SmsMake, make)
            .set_system(SystemField::SmsModel, model)
    }

    pub(crate) fn backup_panel(self, make: &str, model: &str, bus_rating: Option<u32>) -> Self {
        let builder = self
            .set_system(SystemField::BackupPanelMake, make)
            .set_system(SystemField::BackupPanelModel, model);
        match bus_rating {
            Some(rating) => builder.set_system(SystemField::BackupPanelBusRating, rating),
            None => builder,
        }
    }

    pub(crate) fn backup_option(self, option: &str) -> Self {
        self.set_system(SystemField::BackupOption, option)
    }

    /// Stores existing equipment in a slot of the current system.  For the
    /// combine section, the current system number is used as the position.
    pub(crate) fn bos(self, section: BosSection, slot: u8, equipment_type: &str) -> Self {
        let address = SlotAddress::new(section, self.system, slot).unwrap();
        self.set(&address.field(FieldSuffix::EquipmentType), equipment_type)
    }

    pub(crate) fn build(self) -> RawFields {
        self.fields
    }
}

/// A builder for `EquipmentState`s.
pub(crate) struct StateBuilder {
    state: EquipmentState,
}

impl StateBuilder {
    pub(crate) fn new(system: u8, utility: &str) -> Self {
        Self {
            state: EquipmentState {
                system_number: system,
                utility_name: utility.to_string(),
                ..Default::default()
            },
        }
    }

    pub(crate) fn solar(mut self) -> Self {
        let solar = &mut self.state.solar;
        solar.present = true;
        solar.make = "REC".into();
        solar.model = "Alpha 405".into();
        solar.quantity = 20;
        solar.is_new = true;
        self
    }

    pub(crate) fn inverter(mut self, kind: InverterKind, make: &str, model: &str, output: f64) -> Self {
        let inverter = &mut self.state.inverter;
        inverter.present = true;
        inverter.kind = kind;
        inverter.make = make.into();
        inverter.model = model.into();
        inverter.max_continuous_output = output;
        inverter.quantity = 1;
        inverter.is_new = true;
        self
    }

    pub(crate) fn battery(mut self, make: &str, model: &str, quantity: u32, output: f64) -> Self {
        let battery = &mut self.state.battery;
        battery.present = quantity > 0;
        battery.make = make.into();
        battery.model = model.into();
        battery.quantity = quantity;
        battery.max_continuous_output = output;
        battery.is_new = true;
        self
    }

    pub(crate) fn coupling(mut self, coupling: CouplingType) -> Self {
        self.state.coupling = coupling;
        self
    }

    pub(crate) fn sms(mut self, make: &str, model: &str) -> Self {
        let sms = &mut self.state.sms;
        sms.present = true;
        sms.make = make.into();
        sms.model = model.into();
        sms.is_new = true;
        self
    }

    pub(crate) fn backup(mut self, make: &str, bus_rating: Option<u32>, option: BackupOption) -> Self {
        let backup = &mut self.state.backup;
        backup.present = true;
        backup.make = make.into();
        backup.model = "Load Center".into();
        backup.bus_rating = bus_rating;
        backup.is_new = true;
        backup.option = option;
        self
    }

    pub(crate) fn poi(mut self, poi: PoiType) -> Self {
        self.state.poi = Some(poi);
        self
    }

    /// Marks a slot as holding existing equipment.
    pub(crate) fn existing(mut self, section: BosSection, slot: u8) -> Self {
        self.state.existing_slots.insert(section, slot);
        self
    }

    pub(crate) fn build(self) -> EquipmentState {
        self.state
    }
}

/// Returns a new item without a catalog part.  Combine items belong to
/// system 0, all others to system 1.
pub(crate) fn item(
    section: BosSection,
    position: u8,
    equipment_type: &str,
    min_amps: u32,
) -> BosEquipmentItem {
    BosEquipmentItem {
        equipment_type: equipment_type.to_string(),
        position,
        section,
        system_number: if section == BosSection::Combine { 0 } else { 1 },
        min_amp_rating: min_amps,
        sizing_calculation: format!("{min_amps}A"),
        block_name: section.default_block_name().to_string(),
        is_new: true,
        make: None,
        model: None,
        amp_rating: None,
    }
}

/// A battery catalog over a fixed list, counting its lookups.
pub(crate) struct FakeBatteryCatalog {
    batteries: Vec<(String, BatteryRecord)>,
    calls: AtomicUsize,
}

impl FakeBatteryCatalog {
    pub(crate) fn new() -> Self {
        Self {
            batteries: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with(mut self, manufacturer: &str, record: BatteryRecord) -> Self {
        self.batteries.push((manufacturer.to_string(), record));
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BatteryCatalog for FakeBatteryCatalog {
    async fn batteries_by_manufacturer(
        &self,
        manufacturer: &str,
    ) -> Result<Vec<BatteryRecord>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .batteries
            .iter()
            .filter(|(make, _)| make == manufacturer)
            .map(|(_, record)| record.clone())
            .collect())
    }
}

/// Equipment specifications over a fixed list.
pub(crate) struct FakeEquipmentSpecs {
    specs: Vec<(String, String, EquipmentSpec)>,
}

impl FakeEquipmentSpecs {
    pub(crate) fn new() -> Self {
        Self { specs: Vec::new() }
    }

    pub(crate) fn with(mut self, make: &str, model: &str, spec: EquipmentSpec) -> Self {
        self.specs.push((make.to_string(), model.to_string(), spec));
        self
    }
}

#[async_trait]
impl EquipmentSpecs for FakeEquipmentSpecs {
    async fn specification(
        &self,
        _category: &str,
        make: &str,
        model: &str,
    ) -> Result<Option<EquipmentSpec>, Error> {
        Ok(self
            .specs
            .iter()
            .find(|(m, n, _)| m == make && n == model)
            .map(|(_, _, spec)| spec.clone()))
    }
}

/// Lookups that always fail.
pub(crate) struct FailingLookups;

#[async_trait]
impl BatteryCatalog for FailingLookups {
    async fn batteries_by_manufacturer(&self, _: &str) -> Result<Vec<BatteryRecord>, Error> {
        Err(Error::lookup_failed("battery catalog unavailable"))
    }
}

#[async_trait]
impl EquipmentSpecs for FailingLookups {
    async fn specification(&self, _: &str, _: &str, _: &str) -> Result<Option<EquipmentSpec>, Error> {
        Err(Error::lookup_failed("equipment specs unavailable"))
    }
}

#[async_trait]
impl RequirementsSource for FailingLookups {
    async fn requirements_for(&self, _: &str) -> Result<Option<UtilityRequirements>, Error> {
        Err(Error::lookup_failed("requirements unavailable"))
    }
}

/// A requirements source over a fixed list of rows, recording its queries.
///
/// Rows are found by abbreviation or by utility name, case-insensitively.
pub(crate) struct FakeRequirementsSource {
    rows: Vec<UtilityRequirements>,
    queries: Mutex<Vec<String>>,
}

impl FakeRequirementsSource {
    pub(crate) fn new() -> Self {
        Self {
            rows: Vec::new(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with(mut self, row: UtilityRequirements) -> Self {
        self.rows.push(row);
        self
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl RequirementsSource for FakeRequirementsSource {
    async fn requirements_for(&self, utility: &str) -> Result<Option<UtilityRequirements>, Error> {
        self.queries.lock().push(utility.to_string());
        Ok(self
            .rows
            .iter()
            .find(|row| {
                row.abbrev
                    .as_deref()
                    .is_some_and(|abbrev| abbrev.eq_ignore_ascii_case(utility))
                    || row.utility.eq_ignore_ascii_case(utility)
            })
            .cloned())
    }
}

/// A call made to the `RecordingStore`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum StoreCall {
    Patch(String, Payload),
    Update(String, Value),
}

/// A system details store that records its calls, and can be made to fail
/// either write.
pub(crate) struct RecordingStore {
    fail_patch: bool,
    fail_update: bool,
    calls: Mutex<Vec<StoreCall>>,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self::failing(false, false)
    }

    pub(crate) fn failing(fail_patch: bool, fail_update: bool) -> Self {
        Self {
            fail_patch,
            fail_update,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl SystemDetailsStore for RecordingStore {
    async fn patch_system_details(&self, project_id: &str, payload: &Payload) -> Result<(), Error> {
        self.calls
            .lock()
            .push(StoreCall::Patch(project_id.to_string(), payload.clone()));
        if self.fail_patch {
            return Err(Error::save_failed("system details endpoint returned 404"));
        }
        Ok(())
    }

    async fn update_project(&self, project_id: &str, body: &Value) -> Result<(), Error> {
        self.calls
            .lock()
            .push(StoreCall::Update(project_id.to_string(), body.clone()));
        if self.fail_update {
            return Err(Error::save_failed("project endpoint returned 500"));
        }
        Ok(())
    }
}

/// A clock that only moves when told to.
pub(crate) struct ManualClock {
    start: Instant,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub(crate) fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        *self.elapsed.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *self.elapsed.lock()
    }
}
