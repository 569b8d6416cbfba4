// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Building persistence payloads for slots.

use super::slot::{FieldSuffix, SlotAddress, SlotRecord};
use serde_json::{Map, Value};

/// A flat key to value payload, as accepted by the persistence
/// collaborator.
pub type Payload = Map<String, Value>;

const COMBINE_POSITION_LABEL: &str = "POST COMBINE";

/// Returns the payload that writes `record` into the slot at `address`.
///
/// Every field of the slot is written, so the payload fully replaces
/// whatever was stored there before.
pub fn slot_payload(address: &SlotAddress, record: &SlotRecord) -> Payload {
    let mut payload = Payload::new();
    for &suffix in address.suffixes() {
        let value = match suffix {
            FieldSuffix::EquipmentType => Value::from(record.equipment_type.as_str()),
            FieldSuffix::Make => Value::from(record.make.as_str()),
            FieldSuffix::Model => Value::from(record.model.as_str()),
            FieldSuffix::AmpRating => Value::from(record.amp_rating.as_str()),
            FieldSuffix::IsNew => Value::Bool(record.is_new),
            FieldSuffix::Existing => Value::Bool(!record.is_new),
            FieldSuffix::Position => Value::from(COMBINE_POSITION_LABEL),
            FieldSuffix::Trigger => address.trigger_value().map_or(Value::Null, Value::from),
            FieldSuffix::Active => Value::Bool(true),
            FieldSuffix::BlockName => Value::from(
                record
                    .block_name
                    .as_deref()
                    .unwrap_or(address.section().default_block_name()),
            ),
        };
        payload.insert(address.field(suffix), value);
    }
    payload
}

/// Returns the payload that explicitly clears the slot at `address`.
pub fn clear_payload(address: &SlotAddress) -> Payload {
    let mut payload = Payload::new();
    for &suffix in address.suffixes() {
        let value = match suffix {
            FieldSuffix::IsNew => Value::Bool(true),
            FieldSuffix::Active => Value::Bool(false),
            _ => Value::Null,
        };
        payload.insert(address.field(suffix), value);
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BosSection, Error};
    use serde_json::json;

    #[test]
    fn test_slot_payload() -> Result<(), Error> {
        let address = SlotAddress::new(BosSection::Utility, 1, 2)?;
        let record = SlotRecord {
            make: "EATON".into(),
            model: "DG222URB".into(),
            amp_rating: "60".into(),
            ..SlotRecord::new("AC Disconnect")
        };
        assert_eq!(
            Value::Object(slot_payload(&address, &record)),
            json!({
                "bos_sys1_type2_equipment_type": "AC Disconnect",
                "bos_sys1_type2_make": "EATON",
                "bos_sys1_type2_model": "DG222URB",
                "bos_sys1_type2_amp_rating": "60",
                "bos_sys1_type2_is_new": true,
                "bos_sys1_type2_trigger": "sys1_stringCombiner",
                "bos_sys1_type2_active": true,
                "bos_sys1_type2_block_name": "PRE COMBINE",
            })
        );
        Ok(())
    }

    #[test]
    fn test_combine_payload() -> Result<(), Error> {
        let address = SlotAddress::new(BosSection::Combine, 2, 1)?;
        let record = SlotRecord::new("AC Disconnect");
        assert_eq!(
            Value::Object(slot_payload(&address, &record)),
            json!({
                "postcombine_2_1_equipment_type": "AC Disconnect",
                "postcombine_2_1_make": "",
                "postcombine_2_1_model": "",
                "postcombine_2_1_amp_rating": "",
                "postcombine_2_1_existing": false,
                "postcombine_2_1_position": "POST COMBINE",
            })
        );
        Ok(())
    }

    #[test]
    fn test_clear_payload() -> Result<(), Error> {
        let address = SlotAddress::new(BosSection::Battery1, 3, 1)?;
        assert_eq!(
            Value::Object(clear_payload(&address)),
            json!({
                "bos_sys3_battery1_type1_equipment_type": null,
                "bos_sys3_battery1_type1_make": null,
                "bos_sys3_battery1_type1_model": null,
                "bos_sys3_battery1_type1_amp_rating": null,
                "bos_sys3_battery1_type1_is_new": true,
                "bos_sys3_battery1_type1_trigger": null,
                "bos_sys3_battery1_type1_block_name": null,
            })
        );

        let combine = clear_payload(&SlotAddress::new(BosSection::Combine, 1, 3)?);
        assert_eq!(combine.get("postcombine_1_3_existing"), Some(&Value::Null));
        assert_eq!(combine.get("postcombine_1_3_position"), Some(&Value::Null));
        Ok(())
    }
}
