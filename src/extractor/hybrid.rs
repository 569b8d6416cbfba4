// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Recognizing hybrid inverters by model name.

use once_cell::sync::Lazy;
use regex::Regex;

/// Model name patterns of inverters that manage batteries on their DC side.
/// The brand-specific ones come first, the generic catch-alls last.
const HYBRID_PATTERNS: &[&str] = &[
    r"(?i)storedge",
    r"(?i)energy hub",
    r"(?i)SE\d+H",
    r"(?i)powerwall",
    r"(?i)IQ8",
    r"(?i)PWRcell",
    r"(?i)sunny boy storage",
    r"(?i)SBS",
    r"(?i)symo hybrid",
    r"(?i)primo hybrid",
    r"(?i)GEN24",
    r"(?i)SPH",
    r"(?i)RHI",
    r"(?i)conext",
    r"(?i)M\d+HV",
    r"(?i)hybrid",
    r"(?i)storage",
    r"(?i)battery.*inverter",
    r"(?i)inverter.*battery",
];

static HYBRID_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    HYBRID_PATTERNS
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
});

/// Whether an inverter model name looks like a hybrid inverter.
pub(crate) fn is_hybrid_model(model: &str) -> bool {
    HYBRID_REGEXES.iter().any(|re| re.is_match(model))
}
