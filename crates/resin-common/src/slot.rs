//! Ability slots, equipment slots and weapon classes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three levelled abilities of a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilitySlot {
    /// Normal and charged attacks.
    Basic,
    /// Elemental skill.
    Skill,
    /// Elemental burst (ultimate).
    Burst,
}

impl AbilitySlot {
    /// All slots in upgrade-search order.
    pub const ALL: [Self; 3] = [Self::Basic, Self::Skill, Self::Burst];

    /// Combo marker that casts this ability, if it has a single one.
    #[must_use]
    pub const fn marker(self) -> Option<char> {
        match self {
            Self::Basic => None,
            Self::Skill => Some('E'),
            Self::Burst => Some('Q'),
        }
    }
}

impl fmt::Display for AbilitySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Basic => "basic",
            Self::Skill => "skill",
            Self::Burst => "burst",
        })
    }
}

/// Equipment (artifact) slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EquipmentSlot {
    /// Always rolls flat HP as main stat.
    Flower,
    /// Always rolls flat ATK as main stat.
    Feather,
    /// Timepiece slot.
    Sands,
    /// Chalice slot.
    Goblet,
    /// Headpiece slot.
    Circlet,
}

impl EquipmentSlot {
    /// Every slot.
    pub const ALL: [Self; 5] = [
        Self::Flower,
        Self::Feather,
        Self::Sands,
        Self::Goblet,
        Self::Circlet,
    ];
}

impl fmt::Display for EquipmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Weapon class a combatant can wield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponClass {
    /// One-handed sword.
    Sword,
    /// Two-handed sword.
    Claymore,
    /// Spear.
    Polearm,
    /// Bow.
    Bow,
    /// Catalyst.
    Catalyst,
}
