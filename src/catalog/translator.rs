// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Translating utility-specific equipment names to the standard types the
//! part catalog is keyed by.

/// Utility-specific names and the standard types they stand for.  When a
/// name appears more than once, the last entry wins.
const UTILITY_NAMES: &[(&str, &str)] = &[
    // APS
    ("Utility Disconnect", "Fused AC Disconnect"),
    ("Uni-Directional Meter Line Side Disconnect", "AC Disconnect"),
    ("Dedicated Photovoltaic System Combiner Panel", "Combiner Panel"),
    ("Uni-Directional Meter", "PV Meter"),
    // SRP
    ("DER Meter Disconnect Switch", "AC Disconnect"),
    ("Utility AC Disconnect Switch", "Fused AC Disconnect"),
    ("Dedicated DER Meter", "PV Meter"),
    // TEP and UniSource
    ("Utility DG Disconnect", "AC Disconnect"),
    ("Utility DG Meter", "PV Meter"),
    ("DG Disconnect Switch", "AC Disconnect"),
    // TRICO
    ("Co-Generation System Utility Disconnect", "AC Disconnect"),
    ("Co-Generation Meter", "PV Meter"),
    // Xcel Energy.  The POI decides between the two, see
    // `requirements::resolve_standard_type`.
    ("Utility PV AC Disconnect", "AC Disconnect"),
    ("Utility PV AC Disconnect", "Fused AC Disconnect"),
    ("Production Meter", "PV Meter"),
    ("Non-Fused AC Disconnect", "AC Disconnect"),
];

/// Returns the standard type for an equipment name.  Names that aren't
/// utility-specific are returned unchanged.
pub fn standard_type(name: &str) -> &str {
    UTILITY_NAMES
        .iter()
        .rev()
        .find(|(utility_name, _)| *utility_name == name)
        .map_or(name, |&(_, standard)| standard)
}
