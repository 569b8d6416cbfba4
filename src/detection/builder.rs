// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Collecting the items of a match while allocating them free slots.

use super::sizing::Sizing;
use super::{BosEquipmentItem, Confidence, ConfigurationMatch};
use crate::equipment::EquipmentState;
use crate::BosSection;
use std::collections::{BTreeMap, BTreeSet};

/// Builds the item list of a match.
///
/// Each item gets the lowest slot of its section that is neither occupied
/// in the system's existing equipment nor already given to an earlier item
/// of the same match.  Items whose section is full are dropped.
pub(crate) struct MatchBuilder<'a> {
    state: &'a EquipmentState,
    allocated: BTreeMap<(u8, BosSection), BTreeSet<u8>>,
    items: Vec<BosEquipmentItem>,
}

impl<'a> MatchBuilder<'a> {
    pub(crate) fn new(state: &'a EquipmentState) -> Self {
        Self {
            state,
            allocated: BTreeMap::new(),
            items: Vec::new(),
        }
    }

    /// The state of the system being detected.
    pub(crate) fn state(&self) -> &'a EquipmentState {
        self.state
    }

    /// Adds an item to the system being detected.
    pub(crate) fn add(
        &mut self,
        section: BosSection,
        equipment_type: &str,
        sizing: &Sizing,
        block_name: &str,
    ) {
        let state = self.state;
        self.add_to(state, section, equipment_type, sizing, block_name);
    }

    /// Adds an item to another system, allocating from that system's
    /// existing equipment.
    pub(crate) fn add_to(
        &mut self,
        target: &EquipmentState,
        section: BosSection,
        equipment_type: &str,
        sizing: &Sizing,
        block_name: &str,
    ) {
        let system = target.system_number;
        let taken = self.allocated.entry((system, section)).or_default();
        let Some(slot) = (1..=section.capacity())
            .find(|slot| !target.existing_slots.contains(section, *slot) && !taken.contains(slot))
        else {
            tracing::debug!(
                "System {system}: no free {section} slot for {equipment_type}, skipping it."
            );
            return;
        };
        taken.insert(slot);
        self.items.push(BosEquipmentItem {
            equipment_type: equipment_type.to_string(),
            position: slot,
            section,
            system_number: system,
            min_amp_rating: sizing.min_amps,
            sizing_calculation: sizing.calculation.clone(),
            block_name: block_name.to_string(),
            is_new: true,
            make: None,
            model: None,
            amp_rating: None,
        });
    }

    /// Adds the same sizing and block to several items of one section, in
    /// order.
    pub(crate) fn add_all(
        &mut self,
        section: BosSection,
        equipment_types: &[&str],
        sizing: &Sizing,
        block_name: &str,
    ) {
        for equipment_type in equipment_types {
            self.add(section, equipment_type, sizing, block_name);
        }
    }

    /// Finishes the match.  Returns `None` if every item was dropped.
    pub(crate) fn finish(
        self,
        config_id: String,
        config_name: String,
        description: String,
        confidence: Confidence,
    ) -> Option<ConfigurationMatch> {
        if self.items.is_empty() {
            return None;
        }
        Some(ConfigurationMatch {
            config_id,
            config_name,
            description,
            confidence,
            bos_equipment: self.items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::ExistingSlots;

    fn state(system: u8, occupied: &[(BosSection, u8)]) -> EquipmentState {
        let mut existing_slots = ExistingSlots::default();
        for &(section, slot) in occupied {
            existing_slots.insert(section, slot);
        }
        EquipmentState {
            system_number: system,
            existing_slots,
            ..Default::default()
        }
    }

    fn positions(m: &ConfigurationMatch) -> Vec<(u8, BosSection, u8)> {
        m.bos_equipment
            .iter()
            .map(|i| (i.system_number, i.section, i.position))
            .collect()
    }

    fn finish(builder: MatchBuilder) -> Option<ConfigurationMatch> {
        builder.finish("id".into(), "name".into(), "".into(), Confidence::High)
    }

    #[test]
    fn test_skips_existing_and_allocated_slots() {
        let state = state(1, &[(BosSection::Utility, 1), (BosSection::Utility, 3)]);
        let mut builder = MatchBuilder::new(&state);
        let sizing = Sizing::derated(32.0);
        builder.add_all(BosSection::Utility, &["A", "B", "C"], &sizing, "PRE COMBINE");
        builder.add(BosSection::PostSms, "D", &sizing, "POST SMS");

        let m = finish(builder).unwrap();
        assert_eq!(
            positions(&m),
            [
                (1, BosSection::Utility, 2),
                (1, BosSection::Utility, 4),
                (1, BosSection::Utility, 5),
                (1, BosSection::PostSms, 1),
            ]
        );
        assert!(m.bos_equipment.iter().all(|i| i.is_new && i.make.is_none()));
        assert_eq!(m.bos_equipment[0].min_amp_rating, 40);
    }

    #[test]
    fn test_full_sections_drop_items() {
        let state = state(
            1,
            &[
                (BosSection::Backup, 1),
                (BosSection::Backup, 2),
                (BosSection::Backup, 3),
            ],
        );
        let mut builder = MatchBuilder::new(&state);
        builder.add(BosSection::Backup, "A", &Sizing::bus_rating(200), "ESS");
        assert_eq!(finish(builder), None);
    }

    #[test]
    fn test_other_system() {
        let sys2 = state(2, &[]);
        let sys1 = state(1, &[(BosSection::Utility, 1)]);
        let mut builder = MatchBuilder::new(&sys2);
        let sizing = Sizing::fixed(100, "standard microinverter");
        builder.add_to(&sys1, BosSection::Utility, "A", &sizing, "PRE COMBINE");
        builder.add(BosSection::Utility, "B", &sizing, "POST COMBINE");
        assert_eq!(
            positions(&finish(builder).unwrap()),
            [(1, BosSection::Utility, 2), (2, BosSection::Utility, 1)]
        );
    }
}
