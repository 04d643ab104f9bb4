//! Character and weapon catalog.
//!
//! Loaded from TOML with `[[character]]` and `[[weapon]]` arrays:
//!
//! ```toml
//! [[character]]
//! name = "Hu Tao"
//! element = "Pyro"
//! weapon_class = "Polearm"
//! hp = 15552
//! atk = 106
//! def = 876
//! ascension_stat = "CRIT DMG"
//! ascension_value = "38.4%"
//!
//! [[weapon]]
//! name = "Staff of Homa"
//! class = "Polearm"
//! base_atk = 608
//! substat = "CRIT DMG"
//! substat_value = "66.2%"
//! ```
//!
//! Stat values written as `"38.4%"` are divided by 100; plain numbers are
//! used as they are.

use resin_common::{ConfigError, Element, ResinResult, StatKind, WeaponClass};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::combatant::{AbilityLevels, Combatant, Weapon, DEFAULT_COMBO};
use crate::effects::AbilityEffect;
use crate::stats::StatTriple;

/// A stat value given either as a number or as a percent string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    /// Used as is.
    Number(f64),
    /// `"44.1%"` means 0.441; without `%` the number is used as is.
    Text(String),
}

impl StatValue {
    /// Value in fraction form.
    pub fn resolve(&self) -> Result<f64, ConfigError> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Text(text) => {
                let trimmed = text.trim();
                let (number, percent) = match trimmed.strip_suffix('%') {
                    Some(number) => (number.trim(), true),
                    None => (trimmed, false),
                };
                let value: f64 = number
                    .parse()
                    .map_err(|_| ConfigError::Invalid(format!("bad stat value '{text}'")))?;
                Ok(if percent { value / 100.0 } else { value })
            }
        }
    }
}

/// One character row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    /// Identity.
    pub name: String,
    /// Element.
    pub element: Element,
    /// Weapon class.
    pub weapon_class: WeaponClass,
    /// Base HP.
    pub hp: f64,
    /// Base ATK.
    pub atk: f64,
    /// Base DEF.
    pub def: f64,
    /// Ascension stat label.
    pub ascension_stat: StatKind,
    /// Ascension stat value.
    pub ascension_value: StatValue,
    /// Combo evaluated by default.
    #[serde(default)]
    pub default_combo: Option<String>,
    /// Ability effects of the kit.
    #[serde(default)]
    pub effects: Vec<AbilityEffect>,
}

/// One weapon row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponRecord {
    /// Display name.
    pub name: String,
    /// Weapon class.
    pub class: WeaponClass,
    /// Rarity in stars.
    #[serde(default = "default_rarity")]
    pub rarity: u8,
    /// Base attack.
    pub base_atk: f64,
    /// Secondary stat label.
    pub substat: StatKind,
    /// Secondary stat value.
    pub substat_value: StatValue,
    /// Passive description.
    #[serde(default)]
    pub passive: Option<String>,
}

fn default_rarity() -> u8 {
    5
}

impl WeaponRecord {
    /// Build the weapon.
    pub fn to_weapon(&self) -> Result<Weapon, ConfigError> {
        let mut weapon = Weapon::new(&self.name, self.class, self.base_atk)
            .with_rarity(self.rarity)
            .with_substat(self.substat.clone(), self.substat_value.resolve()?);
        weapon.passive.clone_from(&self.passive);
        Ok(weapon)
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    character: Vec<CharacterRecord>,
    #[serde(default)]
    weapon: Vec<WeaponRecord>,
}

/// Every known character and weapon.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    characters: Vec<CharacterRecord>,
    weapons: Vec<WeaponRecord>,
}

impl Catalog {
    /// Load from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> ResinResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&contents)?;
        info!(
            "Loaded {} characters and {} weapons from {:?}",
            catalog.characters.len(),
            catalog.weapons.len(),
            path
        );
        Ok(catalog)
    }

    /// Parse from TOML text.
    pub fn from_toml_str(contents: &str) -> ResinResult<Self> {
        let raw: RawCatalog = toml::from_str(contents)?;
        for record in &raw.character {
            warn_unsupported(&record.name, &record.ascension_stat);
        }
        for record in &raw.weapon {
            warn_unsupported(&record.name, &record.substat);
        }
        Ok(Self {
            characters: raw.character,
            weapons: raw.weapon,
        })
    }

    /// Character rows.
    #[must_use]
    pub fn characters(&self) -> &[CharacterRecord] {
        &self.characters
    }

    /// Weapon rows.
    #[must_use]
    pub fn weapons(&self) -> &[WeaponRecord] {
        &self.weapons
    }

    /// Character by name, ignoring case.
    #[must_use]
    pub fn character(&self, name: &str) -> Option<&CharacterRecord> {
        self.characters
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
    }

    /// First weapon whose name contains `query`, ignoring case.
    #[must_use]
    pub fn find_weapon(&self, query: &str) -> Option<&WeaponRecord> {
        let needle = query.trim().to_lowercase();
        self.weapons
            .iter()
            .find(|w| w.name.to_lowercase().contains(&needle))
    }

    /// Build a combatant with an optional weapon and the given levels.
    pub fn build_combatant(
        &self,
        name: &str,
        weapon_query: Option<&str>,
        levels: AbilityLevels,
    ) -> ResinResult<Combatant> {
        let record = self
            .character(name)
            .ok_or_else(|| ConfigError::UnknownCharacter(name.to_string()))?;

        let mut combatant = Combatant::new(&record.name, record.element, record.weapon_class)
            .with_base(StatTriple::new(record.hp, record.atk, record.def))
            .with_ascension(
                record.ascension_stat.clone(),
                record.ascension_value.resolve()?,
            )
            .with_levels(levels)
            .with_default_combo(
                record
                    .default_combo
                    .clone()
                    .unwrap_or_else(|| DEFAULT_COMBO.to_string()),
            );
        combatant.effects.clone_from(&record.effects);

        if let Some(query) = weapon_query {
            let weapon = self
                .find_weapon(query)
                .ok_or_else(|| ConfigError::UnknownWeapon(query.to_string()))?
                .to_weapon()?;
            if weapon.class != record.weapon_class {
                warn!(
                    character = %record.name,
                    weapon = %weapon.name,
                    "Weapon class {:?} does not match {:?}",
                    weapon.class,
                    record.weapon_class
                );
            }
            combatant.equip_weapon(weapon);
        }

        Ok(combatant)
    }
}

fn warn_unsupported(owner: &str, kind: &StatKind) {
    if let StatKind::Unsupported(label) = kind {
        warn!(owner, label = %label, "Unsupported stat label");
    }
}
