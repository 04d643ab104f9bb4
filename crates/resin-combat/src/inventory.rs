//! Ability upgrade material inventory.
//!
//! Materials come in three tiers worth 1, 3 and 9 teachings. Costs are
//! quoted in teachings and paid lowest tier first; when exact change cannot
//! be made from the lower tiers, a single higher-tier unit overpays.

use resin_common::MaterialTier;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Inventory error types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    /// Not enough material value to cover a cost
    #[error("Not enough materials: need {needed}, have {have}")]
    NotEnough {
        /// Cost in teachings
        needed: u32,
        /// Total value held in teachings
        have: u32,
    },
}

/// Result type for inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Per-tier material counts, used both for drops and for payments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialDrop {
    /// Lowest-tier units.
    pub teachings: u32,
    /// Middle-tier units.
    pub guides: u32,
    /// Highest-tier units.
    pub philosophies: u32,
}

impl MaterialDrop {
    /// Create a drop from explicit counts.
    #[must_use]
    pub const fn new(teachings: u32, guides: u32, philosophies: u32) -> Self {
        Self {
            teachings,
            guides,
            philosophies,
        }
    }

    /// Count for one tier.
    #[must_use]
    pub const fn get(&self, tier: MaterialTier) -> u32 {
        match tier {
            MaterialTier::Teachings => self.teachings,
            MaterialTier::Guides => self.guides,
            MaterialTier::Philosophies => self.philosophies,
        }
    }

    /// Add units of one tier.
    pub fn add(&mut self, tier: MaterialTier, amount: u32) {
        let slot = match tier {
            MaterialTier::Teachings => &mut self.teachings,
            MaterialTier::Guides => &mut self.guides,
            MaterialTier::Philosophies => &mut self.philosophies,
        };
        *slot = slot.saturating_add(amount);
    }

    /// Merge another drop into this one.
    pub fn merge(&mut self, other: &Self) {
        for tier in MaterialTier::ALL {
            self.add(tier, other.get(tier));
        }
    }

    /// Total worth in teachings.
    #[must_use]
    pub fn value(&self) -> u32 {
        MaterialTier::ALL
            .iter()
            .map(|tier| self.get(*tier).saturating_mul(tier.value()))
            .fold(0u32, u32::saturating_add)
    }

    /// True when every count is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value() == 0
    }
}

impl fmt::Display for MaterialDrop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} teachings, {} guides, {} philosophies",
            self.teachings, self.guides, self.philosophies
        )
    }
}

/// Materials held by a combatant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialInventory {
    held: MaterialDrop,
}

impl MaterialInventory {
    /// Creates an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Units held of one tier.
    #[must_use]
    pub const fn count(&self, tier: MaterialTier) -> u32 {
        self.held.get(tier)
    }

    /// Snapshot of all counts.
    #[must_use]
    pub const fn held(&self) -> MaterialDrop {
        self.held
    }

    /// Add units of one tier.
    pub fn add(&mut self, tier: MaterialTier, amount: u32) {
        self.held.add(tier, amount);
    }

    /// Add a whole drop.
    pub fn add_drop(&mut self, drop: &MaterialDrop) {
        self.held.merge(drop);
    }

    /// Total worth in teachings.
    #[must_use]
    pub fn total_value(&self) -> u32 {
        self.held.value()
    }

    /// Whether the held value covers a cost.
    #[must_use]
    pub fn can_afford(&self, cost: u32) -> bool {
        self.total_value() >= cost
    }

    /// Pay a cost quoted in teachings.
    ///
    /// Each tier, lowest first, contributes as many whole units as fit in the
    /// remaining cost. Anything left is covered by one unit of the lowest tier
    /// whose value reaches the remainder. Returns the units consumed. The
    /// inventory is untouched on error.
    pub fn pay(&mut self, cost: u32) -> InventoryResult<MaterialDrop> {
        let have = self.total_value();
        if have < cost {
            return Err(InventoryError::NotEnough { needed: cost, have });
        }

        let mut remaining = cost;
        let mut spent = MaterialDrop::default();

        for tier in MaterialTier::ALL {
            let used = self.count(tier).min(remaining / tier.value());
            remaining -= used * tier.value();
            spent.add(tier, used);
        }

        if remaining > 0 {
            let overpay = MaterialTier::ALL
                .into_iter()
                .find(|tier| self.count(*tier) > spent.get(*tier) && tier.value() >= remaining);
            match overpay {
                Some(tier) => spent.add(tier, 1),
                None => return Err(InventoryError::NotEnough { needed: cost, have }),
            }
        }

        for tier in MaterialTier::ALL {
            let slot = match tier {
                MaterialTier::Teachings => &mut self.held.teachings,
                MaterialTier::Guides => &mut self.held.guides,
                MaterialTier::Philosophies => &mut self.held.philosophies,
            };
            *slot -= spent.get(tier);
        }

        Ok(spent)
    }
}
