//! Damage elements.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Element of a hit or a combatant's affinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    /// Fire.
    Pyro,
    /// Water.
    Hydro,
    /// Lightning.
    Electro,
    /// Ice.
    Cryo,
    /// Earth.
    Geo,
    /// Wind.
    Anemo,
    /// Nature.
    Dendro,
    /// Non-elemental weapon damage.
    Physical,
}

impl Element {
    /// Every element, in display order.
    pub const ALL: [Self; 8] = [
        Self::Pyro,
        Self::Hydro,
        Self::Electro,
        Self::Cryo,
        Self::Geo,
        Self::Anemo,
        Self::Dendro,
        Self::Physical,
    ];

    /// Display name as used in data files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pyro => "Pyro",
            Self::Hydro => "Hydro",
            Self::Electro => "Electro",
            Self::Cryo => "Cryo",
            Self::Geo => "Geo",
            Self::Anemo => "Anemo",
            Self::Dendro => "Dendro",
            Self::Physical => "Physical",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Element {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown element '{trimmed}'"))
    }
}
