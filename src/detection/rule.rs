// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The detector rule records and the context they are evaluated in.

use super::builder::MatchBuilder;
use super::{Confidence, ConfigurationMatch};
use crate::equipment::{contains_ci, EquipmentState, PoiType};
use crate::EngineConfig;
use std::collections::BTreeMap;
use std::fmt::Display;

/// The utilities with their own detector rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Utility {
    Aps,
    Srp,
    Tep,
    Trico,
    Xcel,
}

impl Utility {
    /// Substrings that identify the utility in a utility name.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Utility::Aps => &["aps", "arizona public service"],
            Utility::Srp => &["srp", "salt river"],
            Utility::Tep => &["tep", "tucson electric"],
            Utility::Trico => &["trico"],
            Utility::Xcel => &["xcel", "public service company of colorado"],
        }
    }

    /// Whether `utility_name` names this utility.  Case-insensitive.
    pub(crate) fn matches(self, utility_name: &str) -> bool {
        self.aliases()
            .iter()
            .any(|alias| contains_ci(utility_name, alias))
    }
}

impl Display for Utility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Utility::Aps => write!(f, "APS"),
            Utility::Srp => write!(f, "SRP"),
            Utility::Tep => write!(f, "TEP"),
            Utility::Trico => write!(f, "TRICO"),
            Utility::Xcel => write!(f, "Xcel"),
        }
    }
}

/// What a rule can see besides the state of the system being detected.
pub(crate) struct DetectionContext<'a> {
    pub(crate) config: &'a EngineConfig,
    /// The states of the systems detected earlier in the same project, by
    /// system number.
    pub(crate) earlier_systems: &'a BTreeMap<u8, EquipmentState>,
}

impl DetectionContext<'_> {
    /// The bus rating of the system's backup panel, or the configured
    /// default.
    pub(crate) fn backup_bus_rating(&self, state: &EquipmentState) -> u32 {
        state
            .backup
            .bus_rating
            .unwrap_or(self.config.default_backup_bus_rating)
    }
}

pub(crate) type Precondition = fn(&EquipmentState, &DetectionContext) -> bool;
pub(crate) type Build = fn(&mut MatchBuilder, &DetectionContext);

/// A detector rule.
///
/// The id, name and description may contain placeholders that are filled in
/// from the state when the rule matches:
///  - `{backup}`: the backup option, e.g. `Whole Home`,
///  - `{poi}`: the point of interconnection, `Supply Side` or `Load Side`,
///  - `{poi_id}`: the same as `supply_side` or `load_side`.
///
/// A system without a known point of interconnection is treated as load
/// side.
pub(crate) struct DetectorRule {
    pub(crate) id: &'static str,
    pub(crate) name: &'static str,
    pub(crate) description: &'static str,
    pub(crate) confidence: Confidence,
    pub(crate) applies: Precondition,
    pub(crate) build: Build,
}

impl DetectorRule {
    /// Builds the rule's match for a state its precondition holds for.
    /// Returns `None` if all the sections it adds items to are full.
    pub(crate) fn build_match(
        &self,
        state: &EquipmentState,
        ctx: &DetectionContext,
    ) -> Option<ConfigurationMatch> {
        let mut builder = MatchBuilder::new(state);
        (self.build)(&mut builder, ctx);
        builder.finish(
            render(self.id, state),
            render(self.name, state),
            render(self.description, state),
            self.confidence,
        )
    }
}

/// The rules of one utility, in rank order.
pub(crate) struct UtilityTier {
    pub(crate) utility: Utility,
    pub(crate) rules: &'static [DetectorRule],
}

fn render(template: &str, state: &EquipmentState) -> String {
    if !template.contains('{') {
        return template.to_string();
    }
    let poi = state.poi.unwrap_or(PoiType::LoadSide);
    let poi_label = match poi {
        PoiType::SupplySide => "Supply Side",
        PoiType::LoadSide => "Load Side",
    };
    template
        .replace("{backup}", &state.backup.option.to_string())
        .replace("{poi_id}", &poi.to_string())
        .replace("{poi}", poi_label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::BackupOption;

    #[test]
    fn test_utility_aliases() {
        assert!(Utility::Aps.matches("Arizona Public Service"));
        assert!(Utility::Aps.matches("APS"));
        assert!(Utility::Srp.matches("Salt River Project"));
        assert!(Utility::Tep.matches("Tucson Electric Power"));
        assert!(Utility::Trico.matches("TRICO Electric Cooperative"));
        assert!(Utility::Xcel.matches("Public Service Company of Colorado"));
        assert!(!Utility::Xcel.matches("Arizona Public Service"));
        assert!(!Utility::Srp.matches(""));
    }

    #[test]
    fn test_render() {
        let mut state = EquipmentState::default();
        state.backup.option = BackupOption::PartialHome;
        assert_eq!(
            render("Tesla Powerwall 3 + APS {backup}", &state),
            "Tesla Powerwall 3 + APS Partial Home"
        );
        assert_eq!(render("xcel-{poi_id} ({poi})", &state), "xcel-load_side (Load Side)");
        state.poi = Some(PoiType::SupplySide);
        assert_eq!(render("xcel-{poi_id} ({poi})", &state), "xcel-supply_side (Supply Side)");
    }
}
