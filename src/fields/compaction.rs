// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Keeping the populated slots of a section contiguous.
//!
//! Within a section, populated slots always start at slot 1 and have no
//! gaps, and every slot past the last populated one is explicitly cleared.
//! Both operations here return a payload covering every slot of the section,
//! so writing it re-establishes that invariant in one go.

use super::payload::{clear_payload, slot_payload, Payload};
use super::raw::RawFields;
use super::slot::{populated_slots, SlotAddress, SlotRecord};
use crate::{BosSection, Error};
use std::collections::BTreeSet;

/// Returns the payload that moves the populated slots of a section up to
/// close any gaps, preserving their relative order.
pub fn compact_section(
    fields: &RawFields,
    section: BosSection,
    system: u8,
) -> Result<Payload, Error> {
    if !section.is_compactable() {
        return Err(Error::invalid_section(format!(
            "Section {section} has fixed positions and can't be compacted."
        )));
    }
    let records = populated_slots(fields, section, system)?
        .into_iter()
        .map(|(_, record)| record)
        .collect();
    contiguous_payload(section, system, records)
}

/// Returns the payload that rewrites the populated slots of a draggable
/// section in a new order.
///
/// `order` lists the currently populated slot numbers in the order they
/// should end up in, and must mention each of them exactly once.
pub fn reorder_section(
    fields: &RawFields,
    section: BosSection,
    system: u8,
    order: &[u8],
) -> Result<Payload, Error> {
    if !section.is_draggable() {
        return Err(Error::invalid_section(format!(
            "Section {section} can't be reordered."
        )));
    }
    let mut populated = populated_slots(fields, section, system)?;

    let mut seen = BTreeSet::new();
    for slot in order {
        if !seen.insert(*slot) {
            return Err(Error::invalid_ordering(format!(
                "Slot {slot} appears more than once in the new order."
            )));
        }
        if !populated.iter().any(|(s, _)| s == slot) {
            return Err(Error::invalid_ordering(format!(
                "Slot {slot} of section {section} in system {system} is empty."
            )));
        }
    }
    if seen.len() != populated.len() {
        return Err(Error::invalid_ordering(format!(
            "The new order lists {} of the {} populated slots.",
            seen.len(),
            populated.len()
        )));
    }

    let mut records = Vec::with_capacity(order.len());
    for slot in order {
        if let Some(index) = populated.iter().position(|(s, _)| s == slot) {
            records.push(populated.swap_remove(index).1);
        }
    }
    contiguous_payload(section, system, records)
}

/// Writes `records` to slots `1..=records.len()` and clears the rest.
fn contiguous_payload(
    section: BosSection,
    system: u8,
    records: Vec<SlotRecord>,
) -> Result<Payload, Error> {
    if records.len() > section.capacity() as usize {
        return Err(Error::invalid_ordering(format!(
            "{} records don't fit in the {} slots of section {section}.",
            records.len(),
            section.capacity()
        )));
    }

    let mut payload = Payload::new();
    let mut records = records.into_iter();
    for slot in 1..=section.capacity() {
        let address = SlotAddress::new(section, system, slot)?;
        match records.next() {
            Some(record) => payload.extend(slot_payload(&address, &record)),
            None => payload.extend(clear_payload(&address)),
        }
    }
    Ok(payload)
}
