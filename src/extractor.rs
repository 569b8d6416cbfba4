// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Extracting the normalized [`EquipmentState`] of a system from a raw
//! field snapshot.

mod coupling;
mod hybrid;
mod inverter_kind;

use crate::collaborators::{BatteryCatalog, EquipmentSpecs};
use crate::equipment::{
    Battery, BackupOption, BackupPanel, EquipmentState, ExistingSlots, Inverter, PoiType,
    SolarPanels, StorageManagement,
};
use crate::fields::{
    flag, number, occupied_slots, site_utility, text, ProjectField, RawFields, SystemField,
};
use crate::section::MAX_SYSTEMS;
use crate::{BosSection, Error};
use coupling::{CouplingInputs, CouplingResolver};
pub(crate) use inverter_kind::{inverter_make, inverter_model};
use inverter_kind::resolve_inverter_kind;

/// Whether a system has any equipment: solar panels, an inverter or a
/// battery.
pub fn is_system_active(fields: &RawFields, system: u8) -> bool {
    text(fields, &SystemField::SolarPanelMake.key(system)).is_some()
        || inverter_make(fields, system).is_some()
        || text(fields, &SystemField::Battery1Make.key(system)).is_some()
}

/// Returns the utility name to use for a project: the given name if it isn't
/// blank, else the one stored on the project, else the one stored on its
/// site.
pub fn resolve_utility_name(fields: &RawFields, utility_name: Option<&str>) -> String {
    utility_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .or_else(|| text(fields, ProjectField::Utility.key()))
        .or_else(|| site_utility(fields))
        .unwrap_or_default()
        .to_string()
}

/// Extracts [`EquipmentState`]s from raw field snapshots.
///
/// Both lookups are optional.  Without them, the coupling type of every
/// system is inferred from its inverter model.
#[derive(Clone, Copy, Default)]
pub struct EquipmentStateExtractor<'a> {
    battery_catalog: Option<&'a dyn BatteryCatalog>,
    equipment_specs: Option<&'a dyn EquipmentSpecs>,
}

impl<'a> EquipmentStateExtractor<'a> {
    /// Creates an extractor that looks batteries up in the given catalog.
    pub fn new(battery_catalog: &'a dyn BatteryCatalog) -> Self {
        Self {
            battery_catalog: Some(battery_catalog),
            equipment_specs: None,
        }
    }

    /// Also look batteries up by specification when the catalog has no
    /// coupling type for them.
    pub fn with_equipment_specs(mut self, equipment_specs: &'a dyn EquipmentSpecs) -> Self {
        self.equipment_specs = Some(equipment_specs);
        self
    }

    /// Extracts the equipment state of `system` from `fields`.
    ///
    /// Fails only if the system number is outside `1..=4`.  Lookup failures
    /// are logged and fall back to inference.
    pub async fn extract(
        &self,
        fields: &RawFields,
        system: u8,
        utility_name: Option<&str>,
    ) -> Result<EquipmentState, Error> {
        if !(1..=MAX_SYSTEMS).contains(&system) {
            return Err(Error::invalid_system(format!(
                "System {system} is outside 1..={MAX_SYSTEMS}."
            )));
        }

        let text_of = |field: SystemField| {
            text(fields, &field.key(system))
                .unwrap_or_default()
                .to_string()
        };
        let number_of = |field: SystemField| number(fields, &field.key(system)).unwrap_or(0.0);
        let count_of = |field: SystemField| number_of(field).max(0.0) as u32;
        let is_new = |field: SystemField| !flag(fields, &field.key(system)).unwrap_or(false);

        let solar = SolarPanels {
            make: text_of(SystemField::SolarPanelMake),
            model: text_of(SystemField::SolarPanelModel),
            quantity: count_of(SystemField::SolarPanelQty),
            wattage: count_of(SystemField::SolarPanelWattage),
            is_new: is_new(SystemField::SolarPanelExisting),
            present: false,
        };
        let solar = SolarPanels {
            present: !solar.make.is_empty() && !solar.model.is_empty(),
            ..solar
        };

        let inverter = Inverter {
            kind: resolve_inverter_kind(fields, system),
            make: inverter_make(fields, system).unwrap_or_default().to_string(),
            model: inverter_model(fields, system).unwrap_or_default().to_string(),
            max_continuous_output: number_of(SystemField::InverterMaxContinuousOutput),
            quantity: count_of(SystemField::InverterQty).max(1),
            is_new: is_new(SystemField::InverterExisting),
            aggregate_breaker_amps: count_of(SystemField::AggregatePvBreaker),
            present: false,
        };
        let inverter = Inverter {
            present: !inverter.make.is_empty() && !inverter.model.is_empty(),
            ..inverter
        };

        let mut battery = Battery {
            make: text_of(SystemField::Battery1Make),
            model: text_of(SystemField::Battery1Model),
            quantity: count_of(SystemField::Battery1Qty),
            max_continuous_output: number_of(SystemField::Battery1MaxContinuousOutput),
            is_new: is_new(SystemField::Battery1Existing),
            present: false,
            couple_type: None,
        };
        battery.present =
            !battery.make.is_empty() && !battery.model.is_empty() && battery.quantity > 0;

        let resolver = CouplingResolver {
            battery_catalog: self.battery_catalog,
            equipment_specs: self.equipment_specs,
        };
        let resolved = resolver
            .resolve(&CouplingInputs {
                battery_make: &battery.make,
                battery_model: &battery.model,
                battery_quantity: battery.quantity,
                inverter_model: &inverter.model,
            })
            .await;
        battery.couple_type = resolved.reported;

        let mut sms = StorageManagement {
            make: text_of(SystemField::SmsMake),
            model: text_of(SystemField::SmsModel),
            is_new: is_new(SystemField::SmsExisting),
            present: false,
        };
        sms.present = !sms.make.is_empty()
            && !sms.model.is_empty()
            && !sms.make.eq_ignore_ascii_case("no sms")
            && !sms.model.eq_ignore_ascii_case("no sms");

        let mut backup = BackupPanel {
            make: text_of(SystemField::BackupPanelMake),
            model: text_of(SystemField::BackupPanelModel),
            bus_rating: Some(count_of(SystemField::BackupPanelBusRating)).filter(|r| *r > 0),
            is_new: is_new(SystemField::BackupPanelExisting),
            option: BackupOption::parse(text(fields, &SystemField::BackupOption.key(system))),
            present: false,
        };
        backup.present = !backup.make.is_empty() && !backup.model.is_empty();

        let mut existing_slots = ExistingSlots::default();
        for section in BosSection::PER_SYSTEM {
            for slot in occupied_slots(fields, section, system)? {
                existing_slots.insert(section, slot);
            }
        }

        let state = EquipmentState {
            system_number: system,
            utility_name: resolve_utility_name(fields, utility_name),
            solar,
            inverter,
            battery,
            coupling: resolved.coupling,
            sms,
            backup,
            poi: text(fields, ProjectField::InterconnectionMethod.key())
                .and_then(PoiType::classify),
            existing_slots,
        };
        tracing::debug!(
            "System {system}: solar={}, inverter={} ({}), batteries={}, coupling={}, sms={}, backup={}",
            state.solar.present,
            state.inverter.present,
            state.inverter.kind,
            state.battery.quantity,
            state.coupling,
            state.sms.present,
            state.backup.option,
        );
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::BatteryRecord;
    use crate::equipment::{CouplingType, InverterKind};
    use crate::test_utils::{FakeBatteryCatalog, FieldsBuilder};
    use serde_json::json;

    #[tokio::test]
    async fn test_full_extraction() -> Result<(), Error> {
        let fields = FieldsBuilder::new()
            .utility("Arizona Public Service")
            .interconnection("Line (Supply) Side Tap")
            .system(1)
            .solar("REC", "Alpha 405", 20)
            .inverter("SolarEdge", "SE7600H-US", 32.0)
            .battery("Tesla", "Powerwall 2", 1, 24.0)
            .sms("Tesla", "Backup Gateway 2")
            .backup_panel("Square D", "QO", Some(125))
            .backup_option("Whole Home")
            .set("sys1_battery_1_existing", true)
            .bos(BosSection::Utility, 1, "PV Meter")
            .bos(BosSection::PostSms, 2, "AC Disconnect")
            .build();
        let catalog = FakeBatteryCatalog::new().with(
            "Tesla",
            BatteryRecord {
                model: Some("Powerwall 2".into()),
                couple_type: Some("AC".into()),
                ..Default::default()
            },
        );

        let state = EquipmentStateExtractor::new(&catalog)
            .extract(&fields, 1, None)
            .await?;

        assert_eq!(state.utility_name, "Arizona Public Service");
        assert!(state.solar.present);
        assert_eq!(state.solar.quantity, 20);
        assert!(state.inverter.present);
        assert_eq!(state.inverter.kind, InverterKind::String);
        assert_eq!(state.inverter.max_continuous_output, 32.0);
        assert_eq!(state.inverter.quantity, 1);
        assert!(state.battery.present);
        assert!(!state.battery.is_new);
        assert_eq!(state.battery.couple_type, Some(CouplingType::Ac));
        assert_eq!(state.coupling, CouplingType::Ac);
        assert!(state.sms.present);
        assert!(state.backup.present);
        assert_eq!(state.backup.bus_rating, Some(125));
        assert_eq!(state.backup.option, BackupOption::WholeHome);
        assert_eq!(state.poi, Some(PoiType::SupplySide));
        assert!(state.existing_slots.contains(BosSection::Utility, 1));
        assert!(state.existing_slots.contains(BosSection::PostSms, 2));
        assert!(!state.existing_slots.contains(BosSection::Utility, 2));
        Ok(())
    }

    #[tokio::test]
    async fn test_sparse_extraction() -> Result<(), Error> {
        let fields = FieldsBuilder::new()
            .system(2)
            .inverter("Enphase", "IQ8X", 0.0)
            .sms("No SMS", "No SMS")
            .backup_panel("Eaton", "BR", None)
            .build();

        let state = EquipmentStateExtractor::default()
            .extract(&fields, 2, Some("  "))
            .await?;

        assert_eq!(state.utility_name, "");
        assert!(!state.solar.present);
        assert_eq!(state.inverter.kind, InverterKind::Microinverter);
        assert!(!state.battery.present);
        // IQ8 models are hybrid-capable.
        assert_eq!(state.coupling, CouplingType::Dc);
        assert_eq!(state.battery.couple_type, None);
        assert!(!state.sms.present);
        assert!(state.backup.present);
        assert_eq!(state.backup.bus_rating, None);
        assert_eq!(state.backup.option, BackupOption::Unset);
        assert_eq!(state.poi, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_system() {
        let extractor = EquipmentStateExtractor::default();
        assert!(extractor
            .extract(&RawFields::new(), 5, None)
            .await
            .is_err_and(|e| e == Error::invalid_system("System 5 is outside 1..=4.")));
    }

    #[test]
    fn test_utility_name_fallbacks() {
        let fields = json!({"site": {"utility": "SRP"}}).as_object().cloned().unwrap();
        assert_eq!(resolve_utility_name(&fields, None), "SRP");
        assert_eq!(resolve_utility_name(&fields, Some("TEP")), "TEP");

        let fields = json!({"utility": "Xcel Energy", "site": {"utility": "SRP"}})
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(resolve_utility_name(&fields, None), "Xcel Energy");
    }

    #[test]
    fn test_active_systems() {
        let fields = FieldsBuilder::new()
            .system(1)
            .solar("REC", "Alpha", 10)
            .system(3)
            .battery("Tesla", "Powerwall 3", 0, 0.0)
            .build();
        assert!(is_system_active(&fields, 1));
        assert!(!is_system_active(&fields, 2));
        assert!(is_system_active(&fields, 3));
        assert!(!is_system_active(&fields, 4));
    }
}
