//! Ability multiplier tables.
//!
//! Keyed by (identity, ability slot, level, hit-tag). Each entry carries a
//! numeric value in percent (`46.89` means 46.89 %) and a scaling tag that
//! says what the hit reads: HP, ATK, DEF, physical ATK, a damage buff, or
//! nothing (plain data columns such as buff percentages).
//!
//! On disk the table is TOML with one series of per-level values per tag:
//!
//! ```toml
//! [characters."Hu Tao".basic.N1]
//! scaling = "ATK"
//! values = [46.89, 50.41, "33.27 + 35.2"]
//! ```
//!
//! String values are sums of their `+`-separated terms.

use resin_common::{AbilitySlot, ConfigError, ResinResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// What a multiplier entry scales with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scaling {
    /// Total HP.
    Hp,
    /// Total ATK, elemental.
    Atk,
    /// Total DEF.
    Def,
    /// Total ATK, physical damage.
    Physical,
    /// Adds a percent damage bonus to later hits.
    Buff,
    /// Plain data column, not a hit.
    #[default]
    Value,
    /// Unknown tag.
    Unsupported(String),
}

impl Scaling {
    /// Parse a scaling tag (case-insensitive, empty means [`Scaling::Value`]).
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim();
        match tag.to_ascii_uppercase().as_str() {
            "HP" => Self::Hp,
            "ATK" => Self::Atk,
            "DEF" => Self::Def,
            "PHYSICAL" => Self::Physical,
            "BUFF" => Self::Buff,
            "" | "VALUE" => Self::Value,
            _ => Self::Unsupported(tag.to_string()),
        }
    }

    /// Whether entries with this scaling are damage hits.
    #[must_use]
    pub const fn is_hit(&self) -> bool {
        matches!(self, Self::Hp | Self::Atk | Self::Def | Self::Physical)
    }
}

impl From<String> for Scaling {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<Scaling> for String {
    fn from(scaling: Scaling) -> Self {
        scaling.to_string()
    }
}

impl fmt::Display for Scaling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hp => "HP",
            Self::Atk => "ATK",
            Self::Def => "DEF",
            Self::Physical => "Physical",
            Self::Buff => "BUFF",
            Self::Value => "",
            Self::Unsupported(raw) => raw.as_str(),
        })
    }
}

/// One multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplierEntry {
    /// Value in percent.
    pub value: f64,
    /// What the value scales with.
    pub scaling: Scaling,
}

impl MultiplierEntry {
    /// Create an entry.
    #[must_use]
    pub fn new(value: f64, scaling: Scaling) -> Self {
        Self { value, scaling }
    }
}

/// Entries of one (identity, slot, level), keyed by hit-tag.
pub type LevelTable = BTreeMap<String, MultiplierEntry>;

type SlotTables = HashMap<AbilitySlot, BTreeMap<u8, LevelTable>>;

/// Multiplier lookup for every known identity.
#[derive(Debug, Clone, Default)]
pub struct MultiplierTable {
    identities: HashMap<String, SlotTables>,
}

impl MultiplierTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> ResinResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let table = Self::from_toml_str(&contents)?;
        info!(
            "Loaded multipliers for {} identities from {:?}",
            table.identities.len(),
            path
        );
        Ok(table)
    }

    /// Parse from TOML text.
    pub fn from_toml_str(contents: &str) -> ResinResult<Self> {
        let raw: RawTable = toml::from_str(contents)?;
        let mut table = Self::new();

        for (identity, kit) in raw.characters {
            for (slot, series_map) in [
                (AbilitySlot::Basic, kit.basic),
                (AbilitySlot::Skill, kit.skill),
                (AbilitySlot::Burst, kit.burst),
            ] {
                for (tag, series) in series_map {
                    for (index, raw_value) in series.values.iter().enumerate() {
                        let level = u8::try_from(index + 1).map_err(|_| {
                            ConfigError::Invalid(format!("too many levels for {identity} {tag}"))
                        })?;
                        let value = raw_value.resolve(&identity, &tag)?;
                        table.insert(
                            &identity,
                            slot,
                            level,
                            &tag,
                            MultiplierEntry::new(value, series.scaling.clone()),
                        );
                    }
                }
            }
        }

        debug!("Parsed multiplier table with {} identities", table.identities.len());
        Ok(table)
    }

    /// Insert or replace one entry.
    pub fn insert(
        &mut self,
        identity: &str,
        slot: AbilitySlot,
        level: u8,
        tag: &str,
        entry: MultiplierEntry,
    ) {
        self.identities
            .entry(identity.to_string())
            .or_default()
            .entry(slot)
            .or_default()
            .entry(level)
            .or_default()
            .insert(tag.to_string(), entry);
    }

    /// Whether any entries exist for an identity.
    #[must_use]
    pub fn contains(&self, identity: &str) -> bool {
        self.identities.contains_key(identity)
    }

    /// Entries of one (identity, slot, level), if any.
    #[must_use]
    pub fn entries_at(&self, identity: &str, slot: AbilitySlot, level: u8) -> Option<&LevelTable> {
        self.identities.get(identity)?.get(&slot)?.get(&level)
    }

    /// Entries of one (identity, slot, level), failing when absent.
    pub fn level_table(
        &self,
        identity: &str,
        slot: AbilitySlot,
        level: u8,
    ) -> Result<&LevelTable, ConfigError> {
        self.entries_at(identity, slot, level)
            .ok_or_else(|| ConfigError::MissingMultipliers {
                identity: identity.to_string(),
                slot,
                level,
            })
    }

    /// A single entry, if present.
    #[must_use]
    pub fn get(
        &self,
        identity: &str,
        slot: AbilitySlot,
        level: u8,
        tag: &str,
    ) -> Option<&MultiplierEntry> {
        self.entries_at(identity, slot, level)?.get(tag)
    }

    /// A named column that must exist.
    pub fn column(
        &self,
        identity: &str,
        slot: AbilitySlot,
        level: u8,
        column: &str,
    ) -> Result<&MultiplierEntry, ConfigError> {
        self.level_table(identity, slot, level)?
            .get(column)
            .ok_or_else(|| ConfigError::MissingColumn {
                identity: identity.to_string(),
                slot,
                level,
                column: column.to_string(),
            })
    }

    /// Highest level with data for an identity and slot.
    #[must_use]
    pub fn max_level(&self, identity: &str, slot: AbilitySlot) -> Option<u8> {
        self.identities
            .get(identity)?
            .get(&slot)?
            .keys()
            .next_back()
            .copied()
    }
}

// ============================================================================
// On-disk layout
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawTable {
    #[serde(default)]
    characters: HashMap<String, RawKit>,
}

#[derive(Debug, Default, Deserialize)]
struct RawKit {
    #[serde(default)]
    basic: BTreeMap<String, RawSeries>,
    #[serde(default)]
    skill: BTreeMap<String, RawSeries>,
    #[serde(default)]
    burst: BTreeMap<String, RawSeries>,
}

#[derive(Debug, Deserialize)]
struct RawSeries {
    #[serde(default)]
    scaling: Scaling,
    values: Vec<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Expr(String),
}

impl RawValue {
    fn resolve(&self, identity: &str, tag: &str) -> Result<f64, ConfigError> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Expr(expr) => expr
                .split('+')
                .map(|term| term.trim().trim_end_matches('%').parse::<f64>())
                .sum::<Result<f64, _>>()
                .map_err(|_| {
                    ConfigError::Invalid(format!("bad multiplier '{expr}' for {identity} {tag}"))
                }),
        }
    }
}
