//! Error types for the resin planner.

use thiserror::Error;

use crate::slot::AbilitySlot;

/// Top-level error type for planner operations.
#[derive(Debug, Error)]
pub enum ResinError {
    /// Required data is missing or inconsistent.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed combo string.
    #[error("Combo parse error: {0}")]
    Parse(#[from] ComboParseError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Data file could not be deserialized
    #[error("Data file error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Missing or invalid configuration detected at call time.
///
/// These never degrade to a zero contribution: the caller asked for a value
/// the loaded data cannot provide.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The multiplier table has no entries for this identity/slot/level.
    #[error("No multipliers for {identity} {slot} at level {level}")]
    MissingMultipliers {
        /// Combatant identity
        identity: String,
        /// Ability slot
        slot: AbilitySlot,
        /// Ability level
        level: u8,
    },

    /// A named column required by an ability effect is absent.
    #[error("Missing column '{column}' for {identity} {slot} at level {level}")]
    MissingColumn {
        /// Combatant identity
        identity: String,
        /// Ability slot
        slot: AbilitySlot,
        /// Ability level
        level: u8,
        /// Column (hit-tag) name
        column: String,
    },

    /// A summon entry scales with something other than HP or ATK.
    #[error("Unexpected scaling '{scaling}' on summon '{tag}'")]
    UnexpectedScaling {
        /// Hit-tag of the summon
        tag: String,
        /// Scaling tag found in the table
        scaling: String,
    },

    /// Character not present in the catalog.
    #[error("Unknown character: {0}")]
    UnknownCharacter(String),

    /// No weapon matched the query.
    #[error("Weapon '{0}' not found")]
    UnknownWeapon(String),

    /// Domain tier outside the supported range.
    #[error("Domain tier must be between 1 and 4, got {0}")]
    InvalidDomainTier(u8),

    /// A stat-gated policy was configured without thresholds.
    #[error("Stat gate policy requires at least one threshold")]
    MissingThresholds,

    /// Any other invalid value.
    #[error("Invalid value: {0}")]
    Invalid(String),
}

/// Malformed combo input. Always a caller bug, never missing data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComboParseError {
    /// A character outside the combo grammar.
    #[error("Unexpected '{found}' at position {position} in segment '{segment}'")]
    UnexpectedChar {
        /// Segment being parsed
        segment: String,
        /// Offending character
        found: char,
        /// Byte offset inside the segment
        position: usize,
    },

    /// `N` not followed by a hit count.
    #[error("Expected digits after 'N' at position {position} in segment '{segment}'")]
    MissingDigits {
        /// Segment being parsed
        segment: String,
        /// Byte offset of the `N`
        position: usize,
    },

    /// A repeat count with nothing to repeat.
    #[error("Segment '{0}' has a repeat count but no actions")]
    EmptyBody(String),

    /// A zero repeat count, or one that overflows.
    #[error("Invalid count in segment '{0}'")]
    InvalidCount(String),
}

/// Result type alias for planner operations.
pub type ResinResult<T> = Result<T, ResinError>;
