//! Ability upgrade material tiers.

use serde::{Deserialize, Serialize};

/// Tier of ability upgrade material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MaterialTier {
    /// Lowest tier.
    Teachings,
    /// Middle tier, worth three teachings.
    Guides,
    /// Highest tier, worth three guides.
    Philosophies,
}

impl MaterialTier {
    /// All tiers, lowest first.
    pub const ALL: [Self; 3] = [Self::Teachings, Self::Guides, Self::Philosophies];

    /// Worth of one unit in teachings.
    #[must_use]
    pub const fn value(self) -> u32 {
        match self {
            Self::Teachings => 1,
            Self::Guides => 3,
            Self::Philosophies => 9,
        }
    }

    /// Position in [`MaterialTier::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Teachings => 0,
            Self::Guides => 1,
            Self::Philosophies => 2,
        }
    }
}
