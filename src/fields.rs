// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The slot field mapper.
//!
//! Projects are persisted as a flat, string-keyed map.  This module is the
//! only place in the crate that knows how those keys are spelled: the rest
//! of the crate talks about typed [`SystemField`]s and [`SlotAddress`]es and
//! asks this module to turn them into keys, read their values, or build
//! payloads that write them.

mod compaction;
mod keys;
mod payload;
mod raw;
mod slot;

pub use compaction::{compact_section, reorder_section};
pub(crate) use keys::{ProjectField, SystemField};
pub use payload::{clear_payload, slot_payload, Payload};
pub use raw::RawFields;
pub(crate) use raw::{flag, number, site_utility, text};
pub use slot::{read_slot, FieldSuffix, SlotAddress, SlotRecord};
pub(crate) use slot::{occupied_slots, populated_slots};
