// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Amp sizing of BOS components.

/// The continuous-load factor applied to every derated rating.
const DERATING_FACTOR: f64 = 1.25;

/// Ratings the regional rules round up to.
const STANDARD_RATINGS: &[u32] = &[
    15, 20, 30, 40, 50, 60, 70, 80, 90, 100, 125, 150, 175, 200, 225, 250, 300, 350, 400,
];

/// Returns the minimum rating, in amps, for a component carrying `amps` of
/// continuous output: `ceil(amps × 1.25)`.
///
/// Products that are whole numbers up to floating point noise are not
/// rounded up any further.
pub fn derated_amps(amps: f64) -> u32 {
    let product = amps * DERATING_FACTOR;
    let rounded = product.round();
    let product = if (product - rounded).abs() < 1e-9 {
        rounded
    } else {
        product
    };
    product.ceil().max(0.0) as u32
}

/// Returns the smallest standard rating that is at least `min_amps`.  Past
/// the largest standard rating, returns the next multiple of 50.
pub fn standard_amp_rating(min_amps: u32) -> u32 {
    STANDARD_RATINGS
        .iter()
        .copied()
        .find(|&rating| rating >= min_amps)
        .unwrap_or_else(|| min_amps.div_ceil(50) * 50)
}

/// The minimum rating of an item and how it was arrived at.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Sizing {
    pub(crate) min_amps: u32,
    pub(crate) calculation: String,
}

impl Sizing {
    /// A rating that doesn't depend on the equipment.
    pub(crate) fn fixed(amps: u32, note: &str) -> Self {
        Self {
            min_amps: amps,
            calculation: format!("{amps}A ({note})"),
        }
    }

    /// `output × 1.25`.
    pub(crate) fn derated(output: f64) -> Self {
        let amps = derated_amps(output);
        Self {
            min_amps: amps,
            calculation: format!("{output}A × 1.25 = {amps}A"),
        }
    }

    /// `(inverter + battery) × 1.25`.  `label` names the inverter in the
    /// calculation.
    pub(crate) fn combined(inverter: f64, label: &str, battery: f64) -> Self {
        let amps = derated_amps(inverter + battery);
        Self {
            min_amps: amps,
            calculation: format!("({inverter}A {label} + {battery}A battery) × 1.25 = {amps}A"),
        }
    }

    /// The bus rating of a backup panel, without derating.
    pub(crate) fn bus_rating(amps: u32) -> Self {
        Self {
            min_amps: amps,
            calculation: format!("Backup Panel Bus Rating: {amps}A"),
        }
    }

    /// `output × 1.25`, rounded up to a standard rating.
    pub(crate) fn standard(output: f64) -> Self {
        let amps = derated_amps(output);
        let standard = standard_amp_rating(amps);
        Self {
            min_amps: standard,
            calculation: format!("{output}A × 1.25 = {amps}A (Standard: {standard}A)"),
        }
    }

    /// The sum of all combined systems' outputs × 1.25.
    pub(crate) fn combine_point(total_output: f64) -> Self {
        let amps = derated_amps(total_output);
        Self {
            min_amps: amps,
            calculation: format!("Combined systems × 1.25 = {amps}A"),
        }
    }
}
