// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module defines the `BosSection` enum, which represents the logical
//! equipment groupings that BOS slots belong to.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The number of systems a project can have.
pub const MAX_SYSTEMS: u8 = 4;

/// The number of fixed positions at the combine point.
pub const COMBINE_POSITIONS: u8 = 3;

/// Represents a BOS section.
///
/// Every section except [`BosSection::Combine`] exists once per system.  The
/// combine section belongs to the project and is addressed by position
/// instead of by system number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BosSection {
    #[serde(rename = "utility")]
    Utility,
    #[serde(rename = "battery1")]
    Battery1,
    #[serde(rename = "battery2")]
    Battery2,
    #[serde(rename = "backup")]
    Backup,
    #[serde(rename = "postSMS")]
    PostSms,
    #[serde(rename = "combine")]
    Combine,
}

impl Display for BosSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BosSection::Utility => write!(f, "utility"),
            BosSection::Battery1 => write!(f, "battery1"),
            BosSection::Battery2 => write!(f, "battery2"),
            BosSection::Backup => write!(f, "backup"),
            BosSection::PostSms => write!(f, "postSMS"),
            BosSection::Combine => write!(f, "combine"),
        }
    }
}

impl BosSection {
    /// The sections that exist once per system.
    pub const PER_SYSTEM: [BosSection; 5] = [
        BosSection::Utility,
        BosSection::Battery1,
        BosSection::Battery2,
        BosSection::Backup,
        BosSection::PostSms,
    ];

    /// Returns the number of slots in the section.  For the combine section,
    /// this is the number of slots at each position.
    pub fn capacity(&self) -> u8 {
        match self {
            BosSection::Utility => 6,
            _ => 3,
        }
    }

    /// Whether the slots in the section can be reordered by dragging.
    pub fn is_draggable(&self) -> bool {
        matches!(
            self,
            BosSection::Battery1 | BosSection::Battery2 | BosSection::Backup
        )
    }

    /// Whether gaps in the section are closed up after a delete.  The
    /// combine positions are fixed, so they never move.
    pub fn is_compactable(&self) -> bool {
        *self != BosSection::Combine
    }

    /// Whether the section's slots carry an `active` flag.
    pub fn has_active_flag(&self) -> bool {
        matches!(
            self,
            BosSection::Utility | BosSection::Backup | BosSection::PostSms
        )
    }

    /// The block name written for slots that don't specify one.
    pub fn default_block_name(&self) -> &'static str {
        match self {
            BosSection::Utility => "PRE COMBINE",
            BosSection::Battery1 | BosSection::Battery2 => "ESS",
            BosSection::Backup => "BACKUP LOAD SUB PANEL",
            BosSection::PostSms => "POST SMS",
            BosSection::Combine => "POST COMBINE",
        }
    }
}
