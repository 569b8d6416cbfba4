// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Looking up the BOS equipment a utility requires.
//!
//! Lookups go through a [`RequirementsSource`] and are cached by resolved
//! utility abbreviation, negative results included.

use crate::collaborators::RequirementsSource;
use crate::EngineConfig;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A utility's row in the requirements table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UtilityRequirements {
    #[serde(default)]
    pub abbrev: Option<String>,
    pub utility: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub bos_1: Option<String>,
    #[serde(default)]
    pub bos_2: Option<String>,
    #[serde(default)]
    pub bos_3: Option<String>,
    #[serde(default)]
    pub bos_4: Option<String>,
    #[serde(default)]
    pub bos_5: Option<String>,
    /// The configuration the requirements describe, as free text.
    #[serde(default)]
    pub combination: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl UtilityRequirements {
    /// The `bos_1` to `bos_5` columns, in order.
    fn bos_columns(&self) -> [&Option<String>; 5] {
        [&self.bos_1, &self.bos_2, &self.bos_3, &self.bos_4, &self.bos_5]
    }

    /// Whether any of the `bos_1` to `bos_5` columns is filled in.
    pub fn has_bos(&self) -> bool {
        self.bos_columns()
            .into_iter()
            .any(|bos| bos.as_deref().is_some_and(|b| !b.is_empty()))
    }
}

/// One required piece of BOS equipment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BosRequirement {
    /// The name the utility uses.
    pub equipment_type: String,
    /// The catalog type the name maps to.
    pub standard_type: String,
    /// The 1-based column the requirement came from.
    pub order: u8,
    /// Whether the standard type depends on the point of interconnection,
    /// see [`resolve_standard_type`].
    #[serde(rename = "requiresPOICheck")]
    pub requires_poi_check: bool,
}

const XCEL_PV_DISCONNECT: &str = "utility pv ac disconnect";

/// Requirement names, lowercased, and the catalog types they map to.
const REQUIREMENT_TYPES: &[(&str, &str)] = &[
    ("ac disconnect", "AC Disconnect"),
    ("fused ac disconnect", "Fused AC Disconnect"),
    ("disconnect", "AC Disconnect"),
    ("utility disconnect", "AC Disconnect"),
    ("der disconnect", "AC Disconnect"),
    ("dg disconnect", "AC Disconnect"),
    (XCEL_PV_DISCONNECT, "AC Disconnect"),
    ("pv meter", "PV Meter"),
    ("production meter", "PV Meter"),
    ("meter", "PV Meter"),
    ("bi-directional meter", "Bi-Directional Meter"),
    ("rapid shutdown", "Rapid Shutdown Device"),
    ("combiner box", "Combiner Box"),
    ("load center", "Load Center"),
];

/// Interconnection methods for which Xcel requires a fused disconnect.
const XCEL_FUSED_POI_METHODS: &[&str] = &[
    "meter collar adapter",
    "line (supply) side tap",
    "load side tap",
];

/// Utility names, lowercased, and their abbreviations.  Also matched by
/// containment, in this order.
const KNOWN_UTILITIES: &[(&str, &str)] = &[
    ("arizona public service", "APS"),
    ("salt river project", "SRP"),
    ("tucson electric power", "TEP"),
    ("trico electric cooperative", "TRICO"),
    ("southern california edison", "SCE"),
    ("southern california edison co", "SCE"),
    ("pacific gas & electric", "PGE"),
    ("pacific gas & electric co.", "PGE"),
    ("pacific gas and electric", "PGE"),
    ("nevada energy", "NVE"),
    ("duke", "DUKE"),
    ("xcel energy", "Xcel Energy"),
    ("psco", "Xcel Energy"),
    ("psco (xcel energy)", "Xcel Energy"),
    ("public service company of colorado", "Xcel Energy"),
];

static TRAILING_CODE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\(([A-Za-z0-9\s]+)\)$").ok());

static ABBREVIATION: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[A-Z]{2,6}$").ok());

fn is_abbreviation(name: &str) -> bool {
    ABBREVIATION.as_ref().is_some_and(|re| re.is_match(name))
}

/// Returns the abbreviation to look a utility up by, or `None` for a blank
/// name.
///
/// In order: a trailing parenthesised code (`"Salt River Project (SRP)"`),
/// a name that already is an abbreviation, a known utility name, a known
/// utility name contained in the input or containing it.  Anything else is
/// returned trimmed, for the source to make sense of.
pub fn resolve_utility_abbrev(utility: &str) -> Option<String> {
    let trimmed = utility.trim();
    if trimmed.is_empty() {
        return None;
    }

    let extracted = TRAILING_CODE
        .as_ref()
        .and_then(|re| re.captures(trimmed))
        .and_then(|captures| captures.get(1))
        .map_or(trimmed, |code| code.as_str().trim());
    if is_abbreviation(extracted) {
        return Some(extracted.to_string());
    }

    let normalized = trimmed.to_lowercase();
    if let Some((_, abbrev)) = KNOWN_UTILITIES.iter().find(|(name, _)| *name == normalized) {
        return Some(abbrev.to_string());
    }
    if let Some((_, abbrev)) = KNOWN_UTILITIES
        .iter()
        .find(|(name, _)| normalized.contains(name) || name.contains(normalized.as_str()))
    {
        return Some(abbrev.to_string());
    }
    Some(extracted.to_string())
}

/// Returns the catalog type for a requirement name.  Unknown names are
/// returned trimmed.
pub fn requirement_standard_type(equipment_type: &str) -> String {
    let normalized = equipment_type.trim().to_lowercase();
    REQUIREMENT_TYPES
        .iter()
        .find(|(name, _)| *name == normalized)
        .map_or_else(|| equipment_type.trim().to_string(), |(_, t)| t.to_string())
}

/// Returns the catalog type for a requirement name at a given point of
/// interconnection.
///
/// Only Xcel's "Utility PV AC Disconnect" depends on it: it is a fused
/// disconnect for meter collar adapters and side taps, and a plain one
/// otherwise.
pub fn resolve_standard_type(equipment_type: &str, interconnection_method: Option<&str>) -> String {
    if equipment_type.trim().eq_ignore_ascii_case(XCEL_PV_DISCONNECT) {
        let fused = interconnection_method.is_some_and(|method| {
            XCEL_FUSED_POI_METHODS.contains(&method.trim().to_lowercase().as_str())
        });
        return if fused {
            "Fused AC Disconnect".to_string()
        } else {
            "AC Disconnect".to_string()
        };
    }
    requirement_standard_type(equipment_type)
}

/// Returns the filled in `bos_1` to `bos_5` columns of a row as ordered
/// requirements.
pub fn parse_requirements(row: &UtilityRequirements) -> Vec<BosRequirement> {
    row.bos_columns()
        .into_iter()
        .zip(1..)
        .filter_map(|(bos, order)| {
            let bos = bos.as_deref()?.trim();
            if bos.is_empty() {
                return None;
            }
            Some(BosRequirement {
                equipment_type: bos.to_string(),
                standard_type: requirement_standard_type(bos),
                order,
                requires_poi_check: bos.eq_ignore_ascii_case(XCEL_PV_DISCONNECT),
            })
        })
        .collect()
}

/// A source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The system's monotonic clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CacheEntry {
    stored_at: Instant,
    row: Option<UtilityRequirements>,
}

/// Looks up utility requirements, caching the results.
///
/// The cache is keyed by the uppercased resolved abbreviation, and entries
/// expire after [`EngineConfig::requirements_cache_ttl`].  Failed lookups
/// are logged and not cached.
pub struct UtilityRequirementsService<'a> {
    source: &'a dyn RequirementsSource,
    clock: &'a dyn Clock,
    ttl: Duration,
    cache: Mutex<HashMap<String, CacheEntry>>,
}

impl<'a> UtilityRequirementsService<'a> {
    pub fn new(source: &'a dyn RequirementsSource, config: &EngineConfig) -> Self {
        Self {
            source,
            clock: &SystemClock,
            ttl: config.requirements_cache_ttl,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Uses the given clock to expire cache entries.
    pub fn with_clock(mut self, clock: &'a dyn Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the requirements row of a utility, or `None` if it has none
    /// or the lookup failed.
    ///
    /// The source is asked for the resolved abbreviation first, then for the
    /// name as given if that is different.
    pub async fn requirements(&self, utility: &str) -> Option<UtilityRequirements> {
        let abbrev = resolve_utility_abbrev(utility)?;
        let key = abbrev.to_uppercase();

        if let Some(entry) = self.cache.lock().get(&key) {
            if self.clock.now().duration_since(entry.stored_at) < self.ttl {
                tracing::debug!("Utility requirements cache hit for {key}.");
                return entry.row.clone();
            }
        }
        tracing::debug!("Utility requirements cache miss for {key}.");

        let row = match self.lookup(&abbrev, utility).await {
            Ok(row) => row,
            Err(err) => {
                tracing::warn!("Utility requirements lookup for {utility} failed: {err}");
                return None;
            }
        };
        self.cache.lock().insert(
            key,
            CacheEntry {
                stored_at: self.clock.now(),
                row: row.clone(),
            },
        );
        row
    }

    async fn lookup(
        &self,
        abbrev: &str,
        utility: &str,
    ) -> Result<Option<UtilityRequirements>, crate::Error> {
        let row = self.source.requirements_for(abbrev).await?;
        if row.is_some() || abbrev == utility {
            return Ok(row);
        }
        tracing::debug!("No requirements for {abbrev}, trying {utility}.");
        self.source.requirements_for(utility).await
    }

    /// Returns the parsed requirements of a utility, empty if it has none.
    pub async fn bos_requirements(&self, utility: &str) -> Vec<BosRequirement> {
        self.requirements(utility)
            .await
            .map(|row| parse_requirements(&row))
            .unwrap_or_default()
    }

    /// Whether a utility requires any BOS equipment.
    pub async fn has_requirements(&self, utility: &str) -> bool {
        self.requirements(utility)
            .await
            .is_some_and(|row| row.has_bos())
    }

    /// Drops every cached lookup.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }
}
