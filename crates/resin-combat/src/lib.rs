//! # Resin Combat
//!
//! Stat aggregation and combo damage for the resin planner.
//!
//! This crate provides:
//! - The combatant model (base stats, weapon, equipment, ability levels)
//! - Layered stat resolution with a transient overlay
//! - Ability multiplier tables loaded from TOML
//! - Combo notation parsing
//! - The damage, defense, resistance, reaction and healing formulas
//! - Ability-triggered buffs, summons and heals
//! - Combo evaluation and what-if scoring
//! - The character/weapon catalog

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod catalog;
pub mod combatant;
pub mod combo;
pub mod damage_calc;
pub mod effects;
pub mod evaluate;
pub mod inventory;
pub mod multipliers;
pub mod stats;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::catalog::*;
    pub use crate::combatant::*;
    pub use crate::combo::*;
    pub use crate::damage_calc::*;
    pub use crate::effects::*;
    pub use crate::evaluate::*;
    pub use crate::inventory::*;
    pub use crate::multipliers::*;
    pub use crate::stats::*;
}

pub use prelude::*;
