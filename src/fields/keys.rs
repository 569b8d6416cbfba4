// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Names of the per-system and project-wide equipment fields.

/// A per-system equipment field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum SystemField {
    SolarPanelMake,
    SolarPanelModel,
    SolarPanelQty,
    SolarPanelWattage,
    SolarPanelExisting,

    /// Holds the make of both string inverters and microinverters.
    InverterMake,
    InverterModel,
    InverterQty,
    InverterExisting,
    InverterType,
    SelectedSystem,
    InverterMaxContinuousOutput,
    AggregatePvBreaker,
    /// Older projects store string inverters here instead.
    LegacyInverterMake,
    LegacyInverterModel,

    StringCombinerPanelMake,
    StringCombinerPanelModel,

    Battery1Make,
    Battery1Model,
    Battery1Qty,
    Battery1Existing,
    Battery1MaxContinuousOutput,
    Battery2Qty,
    /// Alternate spellings of the battery quantities, read by the section
    /// triggers.
    TriggerBattery1Qty,
    TriggerBattery1Quantity,
    TriggerBattery2Qty,
    TriggerBattery2Quantity,

    SmsMake,
    SmsModel,
    SmsExisting,
    NoSms,

    BackupPanelMake,
    BackupPanelModel,
    BackupPanelBusRating,
    BackupPanelExisting,
    BackupOption,
    EssBackupOption,
}

impl SystemField {
    /// Returns the key of the field for the given system.
    pub(crate) fn key(self, system: u8) -> String {
        // System 1's backup panel predates the per-system naming scheme.
        if system == 1 {
            match self {
                SystemField::BackupPanelMake => return "bls1_backup_load_sub_panel_make".into(),
                SystemField::BackupPanelModel => return "bls1_backup_load_sub_panel_model".into(),
                SystemField::BackupPanelBusRating => {
                    return "bls1_backuploader_bus_bar_rating".into()
                }
                SystemField::BackupPanelExisting => return "bls1_backuploader_existing".into(),
                _ => {}
            }
        }
        format!("sys{system}_{}", self.suffix())
    }

    fn suffix(self) -> &'static str {
        match self {
            SystemField::SolarPanelMake => "solar_panel_make",
            SystemField::SolarPanelModel => "solar_panel_model",
            SystemField::SolarPanelQty => "solar_panel_qty",
            SystemField::SolarPanelWattage => "solar_panel_wattage",
            SystemField::SolarPanelExisting => "solar_panel_existing",
            SystemField::InverterMake => "micro_inverter_make",
            SystemField::InverterModel => "micro_inverter_model",
            SystemField::InverterQty => "micro_inverter_qty",
            SystemField::InverterExisting => "micro_inverter_existing",
            SystemField::InverterType => "inverter_type",
            SystemField::SelectedSystem => "selectedsystem",
            SystemField::InverterMaxContinuousOutput => "inv_max_continuous_output",
            SystemField::AggregatePvBreaker => "aggregate_pv_breaker",
            SystemField::LegacyInverterMake => "inverter_make",
            SystemField::LegacyInverterModel => "inverter_model",
            SystemField::StringCombinerPanelMake => "string_combiner_panel_make",
            SystemField::StringCombinerPanelModel => "string_combiner_panel_model",
            SystemField::Battery1Make => "battery_1_make",
            SystemField::Battery1Model => "battery_1_model",
            SystemField::Battery1Qty => "battery_1_qty",
            SystemField::Battery1Existing => "battery_1_existing",
            SystemField::Battery1MaxContinuousOutput => "battery_1_max_continuous_output",
            SystemField::Battery2Qty => "battery_2_qty",
            SystemField::TriggerBattery1Qty => "battery1_qty",
            SystemField::TriggerBattery1Quantity => "battery_type1_quantity",
            SystemField::TriggerBattery2Qty => "battery2_qty",
            SystemField::TriggerBattery2Quantity => "battery_type2_quantity",
            SystemField::SmsMake => "sms_make",
            SystemField::SmsModel => "sms_model",
            SystemField::SmsExisting => "sms_existing",
            SystemField::NoSms => "no_sms",
            SystemField::BackupPanelMake => "backuploadsubpanel_make",
            SystemField::BackupPanelModel => "backuploadsubpanel_model",
            SystemField::BackupPanelBusRating => "backuploadsubpanel_bus_rating",
            SystemField::BackupPanelExisting => "backuploadsubpanel_existing",
            SystemField::BackupOption => "backup_option",
            SystemField::EssBackupOption => "ess_backup_option",
        }
    }
}

/// A project-wide field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ProjectField {
    Utility,
    InterconnectionMethod,
    CombinePositions,
}

impl ProjectField {
    pub(crate) fn key(self) -> &'static str {
        match self {
            ProjectField::Utility => "utility",
            ProjectField::InterconnectionMethod => "ele_method_of_interconnection",
            ProjectField::CombinePositions => "ele_combine_positions",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_keys() {
        assert_eq!(SystemField::SolarPanelMake.key(2), "sys2_solar_panel_make");
        assert_eq!(SystemField::InverterMake.key(1), "sys1_micro_inverter_make");
        assert_eq!(SystemField::Battery1Qty.key(3), "sys3_battery_1_qty");
        assert_eq!(SystemField::TriggerBattery1Qty.key(3), "sys3_battery1_qty");
    }

    #[test]
    fn test_backup_panel_keys() {
        assert_eq!(
            SystemField::BackupPanelBusRating.key(1),
            "bls1_backuploader_bus_bar_rating"
        );
        assert_eq!(
            SystemField::BackupPanelBusRating.key(2),
            "sys2_backuploadsubpanel_bus_rating"
        );
        assert_eq!(SystemField::BackupOption.key(1), "sys1_backup_option");
    }
}
