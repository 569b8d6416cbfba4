// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The BOS part catalog, and resolving detected items to catalog parts.

mod translator;

pub use translator::standard_type;

use crate::BosEquipmentItem;
use serde::{Deserialize, Serialize};

/// A part in the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub standard_type: String,
    pub make: String,
    pub model: String,
    pub amp_rating: Option<u32>,
}

/// The parts the engine selects from.  Read-only once built.
#[derive(Clone, Debug)]
pub struct PartCatalog {
    entries: Vec<CatalogEntry>,
}

impl Default for PartCatalog {
    /// The built-in catalog.
    fn default() -> Self {
        Self::new(
            BUILT_IN
                .iter()
                .map(|&(standard_type, make, model, amp_rating)| CatalogEntry {
                    standard_type: standard_type.to_string(),
                    make: make.to_string(),
                    model: model.to_string(),
                    amp_rating,
                })
                .collect(),
        )
    }
}

impl PartCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Returns the entries of a standard type, in catalog order.  Types are
    /// compared case-insensitively.
    pub fn entries_of_type<'a>(
        &'a self,
        standard_type: &'a str,
    ) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.standard_type.eq_ignore_ascii_case(standard_type))
    }

    /// Returns the distinct makes of a standard type, in catalog order.
    pub fn makes_for_type<'a>(&'a self, standard_type: &'a str) -> Vec<&'a str> {
        let mut makes: Vec<&str> = Vec::new();
        for entry in self.entries_of_type(standard_type) {
            if !makes.contains(&entry.make.as_str()) {
                makes.push(&entry.make);
            }
        }
        makes
    }

    /// Returns the entries of a standard type from one make.
    pub fn models_for<'a>(&'a self, standard_type: &'a str, make: &str) -> Vec<&'a CatalogEntry> {
        self.entries_of_type(standard_type)
            .filter(|e| e.make.eq_ignore_ascii_case(make))
            .collect()
    }

    /// Returns the part of a standard type with the smallest amp rating that
    /// is at least `min_amps`.  Ties go to the part listed first.
    ///
    /// Parts without an amp rating only qualify when `min_amps` is zero, and
    /// then lose to every rated part.
    pub fn select<'a>(&'a self, standard_type: &'a str, min_amps: u32) -> Option<&'a CatalogEntry> {
        self.entries_of_type(standard_type)
            .filter(|e| match e.amp_rating {
                Some(amps) => amps >= min_amps,
                None => min_amps == 0,
            })
            .min_by_key(|e| e.amp_rating.unwrap_or(u32::MAX))
    }

    /// Fills in the make, model and amp rating of each item from the
    /// catalog.
    ///
    /// Item types are translated to standard types first.  Items without a
    /// qualifying part are returned as they are, for manual selection.
    pub fn resolve_items(&self, items: &[BosEquipmentItem]) -> Vec<BosEquipmentItem> {
        items
            .iter()
            .map(|item| {
                let standard = standard_type(&item.equipment_type);
                match self.select(standard, item.min_amp_rating) {
                    Some(entry) => BosEquipmentItem {
                        make: Some(entry.make.clone()),
                        model: Some(entry.model.clone()),
                        amp_rating: entry.amp_rating,
                        ..item.clone()
                    },
                    None => {
                        tracing::debug!(
                            "No {standard} of at least {}A in the catalog for {}.",
                            item.min_amp_rating,
                            item.equipment_type
                        );
                        item.clone()
                    }
                }
            })
            .collect()
    }
}

const BUILT_IN: &[(&str, &str, &str, Option<u32>)] = &[
    ("AC Disconnect", "CUTLER HAMMER", "DG221URB", Some(30)),
    ("AC Disconnect", "CUTLER HAMMER", "DG222URB", Some(60)),
    ("AC Disconnect", "CUTLER HAMMER", "DG323UGB", Some(100)),
    ("AC Disconnect", "CUTLER HAMMER", "DG324URK", Some(200)),
    ("AC Disconnect", "EATON", "DG221URB", Some(30)),
    ("AC Disconnect", "EATON", "DG222URB", Some(60)),
    ("AC Disconnect", "EATON", "DG223URB", Some(100)),
    ("AC Disconnect", "EATON", "DG324URK", Some(200)),
    ("AC Disconnect", "SIEMENS", "LNF221R", Some(30)),
    ("AC Disconnect", "SIEMENS", "LNF222R", Some(60)),
    ("AC Disconnect", "SIEMENS", "GNF323R", Some(100)),
    ("AC Disconnect", "SIEMENS", "DU324RB", Some(200)),
    ("AC Disconnect", "SQUARE D", "DU221RB", Some(30)),
    ("AC Disconnect", "SQUARE D", "DU222RB", Some(60)),
    ("AC Disconnect", "SQUARE D", "DTU223RB", Some(100)),
    ("AC Disconnect", "SQUARE D", "DU324RB", Some(200)),
    ("Fused AC Disconnect", "CUTLER HAMMER", "DG221NRB", Some(30)),
    ("Fused AC Disconnect", "CUTLER HAMMER", "DG222NRB", Some(60)),
    ("Fused AC Disconnect", "CUTLER HAMMER", "DG223NRB", Some(100)),
    ("Fused AC Disconnect", "CUTLER HAMMER", "DG324NRK", Some(200)),
    ("Fused AC Disconnect", "EATON", "DG221NRB", Some(30)),
    ("Fused AC Disconnect", "EATON", "DG222NRB", Some(60)),
    ("Fused AC Disconnect", "EATON", "DG223NRB", Some(100)),
    ("Fused AC Disconnect", "EATON", "DG324NRK", Some(200)),
    ("Fused AC Disconnect", "SIEMENS", "LF221R", Some(30)),
    ("Fused AC Disconnect", "SIEMENS", "LF222R", Some(60)),
    ("Fused AC Disconnect", "SIEMENS", "GF323", Some(100)),
    ("Fused AC Disconnect", "SIEMENS", "GF224NR", Some(200)),
    ("Fused AC Disconnect", "SIEMENS", "GNF324R", Some(200)),
    ("Fused AC Disconnect", "SQUARE D", "D221NRB", Some(30)),
    ("Fused AC Disconnect", "SQUARE D", "D222NRB", Some(60)),
    ("Combiner Panel", "EATON", "BR816L100RP", Some(100)),
    ("Combiner Panel", "EATON", "BR816L125RP", Some(125)),
    ("Combiner Panel", "EATON", "BR816L200RP", Some(200)),
    ("Combiner Panel", "SIEMENS", "W0816ML1125CU", Some(125)),
    ("PV Meter", "EATON", "011", Some(125)),
    ("PV Meter", "EATON", "1004455BCH", Some(200)),
    ("PV Meter", "MILBANK", "U5929XL", Some(100)),
    ("PV Meter", "MILBANK", "U4015-0", Some(200)),
    ("PV Meter", "MILBANK", "U4518-XL-W", Some(200)),
    ("PV Meter", "MILBANK", "U1104-RL-PG-KK", Some(200)),
    ("PV Meter", "SIEMENS", "UAT111-BPCC", Some(135)),
    ("Bi-Directional Meter", "ITRON", "C1SR", Some(200)),
    ("Bi-Directional Meter", "LANDIS+GYR", "FOCUS AXE-SD", Some(200)),
    ("Bi-Directional Meter", "SENSUS", "iCon A", Some(200)),
    ("Bi-Directional Meter DER Side Disconnect", "EATON", "DG221URB", Some(30)),
    ("Bi-Directional Meter DER Side Disconnect", "EATON", "DG222URB", Some(60)),
    ("Bi-Directional Meter DER Side Disconnect", "EATON", "DG223URB", Some(100)),
    ("Bi-Directional Meter DER Side Disconnect", "EATON", "DG324URK", Some(200)),
    ("Bi-Directional Meter Line Side Disconnect", "EATON", "DG221URB", Some(30)),
    ("Bi-Directional Meter Line Side Disconnect", "EATON", "DG222URB", Some(60)),
    ("Bi-Directional Meter Line Side Disconnect", "EATON", "DG223URB", Some(100)),
    ("Bi-Directional Meter Line Side Disconnect", "EATON", "DG324URK", Some(200)),
    ("Junction Box", "VYNCKIER", "RU2LP", None),
    ("Junction Box", "WILEY", "BR816L100RP", Some(100)),
];
