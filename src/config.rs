// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module contains the configuration options for the BOS engine.

use std::time::Duration;

/// Configuration options shared by the detectors, the project detector and
/// the utility requirements service.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// How long a utility requirements lookup, positive or negative, stays
    /// cached before the source is asked again.
    pub requirements_cache_ttl: Duration,

    /// The bus rating, in amps, assumed for a backup load sub panel that
    /// doesn't specify one.
    pub default_backup_bus_rating: u32,

    /// The continuous output, in amps, used for a Tesla Powerwall 3
    /// regardless of the battery quantity.
    pub tesla_pw3_output_amps: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            requirements_cache_ttl: Duration::from_secs(10 * 60),
            default_backup_bus_rating: 200,
            tesla_pw3_output_amps: 48.0,
        }
    }
}
