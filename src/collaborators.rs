// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module contains the traits that need to be implemented by the
//! external services the engine talks to, and the records they exchange.

use crate::equipment::CouplingType;
use crate::requirements::UtilityRequirements;
use crate::{Error, Payload};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A battery, as listed by the battery catalog.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BatteryRecord {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub model_number: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub couple_type: Option<String>,
}

impl BatteryRecord {
    /// Whether any of the record's name fields is exactly `model`.
    pub(crate) fn matches_model(&self, model: &str) -> bool {
        [&self.model, &self.model_number, &self.name]
            .into_iter()
            .any(|name| name.as_deref() == Some(model))
    }
}

/**
This trait needs to be implemented by the service that lists the batteries
of a manufacturer.

It is used while extracting the equipment state of a system with batteries,
to find out whether the batteries are AC or DC coupled.  Errors are logged
and treated like an empty list.

<details>
<summary>Example implementation over a fixed list:</summary>

```ignore
struct FixedBatteries(Vec<(String, BatteryRecord)>);

#[async_trait::async_trait]
impl solar_bos_engine::BatteryCatalog for FixedBatteries {
    async fn batteries_by_manufacturer(
        &self,
        manufacturer: &str,
    ) -> Result<Vec<solar_bos_engine::BatteryRecord>, solar_bos_engine::Error> {
        Ok(self
            .0
            .iter()
            .filter(|(make, _)| make == manufacturer)
            .map(|(_, record)| record.clone())
            .collect())
    }
}
```

</details>
*/
#[async_trait]
pub trait BatteryCatalog: Send + Sync {
    async fn batteries_by_manufacturer(
        &self,
        manufacturer: &str,
    ) -> Result<Vec<BatteryRecord>, Error>;
}

/// The specification of a piece of equipment.  Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSpec {
    #[serde(default)]
    pub couple_type: Option<String>,
    #[serde(default, rename = "hasBuiltInBattery")]
    pub has_built_in_battery: Option<bool>,
    #[serde(default, rename = "hasDCCoupling")]
    pub has_dc_coupling: Option<bool>,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl EquipmentSpec {
    /// The coupling type the specification implies, if any.
    pub(crate) fn coupling(&self) -> Option<CouplingType> {
        if let Some(coupling) = self.couple_type.as_deref().and_then(CouplingType::parse) {
            return Some(coupling);
        }
        let dc_capability = self
            .capabilities
            .iter()
            .any(|c| c == "DC Coupling" || c == "Battery Integration");
        (dc_capability
            || self.has_built_in_battery == Some(true)
            || self.has_dc_coupling == Some(true))
        .then_some(CouplingType::Dc)
    }
}

/// This trait needs to be implemented by the service that returns equipment
/// specifications by category, make and model.
///
/// Implementing it is optional, see
/// [`EquipmentStateExtractor::with_equipment_specs`][crate::EquipmentStateExtractor::with_equipment_specs].
#[async_trait]
pub trait EquipmentSpecs: Send + Sync {
    async fn specification(
        &self,
        category: &str,
        make: &str,
        model: &str,
    ) -> Result<Option<EquipmentSpec>, Error>;
}

/**
This trait needs to be implemented by the service that stores a project's
equipment details.

The engine writes flat payloads through
[`patch_system_details`][SystemDetailsStore::patch_system_details].  If that
fails, it retries once through [`update_project`][SystemDetailsStore::update_project],
with the payload nested as `{"systemDetails": payload}`.

<details>
<summary>Example implementation with an HTTP client:</summary>

```ignore
#[async_trait::async_trait]
impl solar_bos_engine::SystemDetailsStore for ApiClient {
    async fn patch_system_details(
        &self,
        project_id: &str,
        payload: &solar_bos_engine::Payload,
    ) -> Result<(), solar_bos_engine::Error> {
        self.patch(&format!("/project/{project_id}/system-details"), payload)
            .await
            .map_err(|e| solar_bos_engine::Error::save_failed(e.to_string()))
    }

    async fn update_project(
        &self,
        project_id: &str,
        body: &serde_json::Value,
    ) -> Result<(), solar_bos_engine::Error> {
        self.put(&format!("/project/{project_id}"), body)
            .await
            .map_err(|e| solar_bos_engine::Error::save_failed(e.to_string()))
    }
}
```

</details>
*/
#[async_trait]
pub trait SystemDetailsStore: Send + Sync {
    /// Writes a flat payload to the project's equipment details.
    async fn patch_system_details(&self, project_id: &str, payload: &Payload)
        -> Result<(), Error>;

    /// Updates the project itself with a nested body.
    async fn update_project(&self, project_id: &str, body: &serde_json::Value)
        -> Result<(), Error>;
}

/// This trait needs to be implemented by the service that returns the BOS
/// requirements of utilities.
#[async_trait]
pub trait RequirementsSource: Send + Sync {
    /// Returns the requirements row for a utility abbreviation or name, or
    /// `None` if the utility has none.
    async fn requirements_for(&self, utility: &str) -> Result<Option<UtilityRequirements>, Error>;
}
