//! Damage and healing formulas.
//!
//! This module provides:
//! - The evaluation context (levels, enemy resistance, defense shred, reaction)
//! - Defense, resistance and reaction multipliers
//! - Expected (crit-averaged) damage per hit
//! - Healing per tick

use serde::{Deserialize, Serialize};

use crate::stats::StatSnapshot;

// ============================================================================
// Reactions
// ============================================================================

/// Family of elemental reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    /// Vaporize/melt style multiplier on the hit itself.
    Amplifying,
    /// Overloaded/swirl style reaction damage.
    Transformative,
}

/// Reaction applied to every hit of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    /// Reaction family.
    pub kind: ReactionKind,
    /// Base reaction multiplier (1.5 or 2.0 for amplifying reactions).
    pub base_multiplier: f64,
}

impl Reaction {
    /// Multiplier at a given elemental mastery.
    #[must_use]
    pub fn multiplier(&self, elemental_mastery: f64) -> f64 {
        let em = elemental_mastery.max(0.0);
        let bonus = match self.kind {
            ReactionKind::Amplifying => 2.78 * em / (em + 1400.0),
            ReactionKind::Transformative => 16.0 * em / (em + 2000.0),
        };
        self.base_multiplier * (1.0 + bonus)
    }
}

// ============================================================================
// Context
// ============================================================================

/// Everything about the fight that is not the attacker's stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalContext {
    /// Attacker level.
    pub attacker_level: u32,
    /// Target level.
    pub target_level: u32,
    /// Target elemental resistance as a fraction (may be negative).
    pub target_resistance: f64,
    /// Defense reduction applied to the target (0.0-1.0).
    pub def_reduction: f64,
    /// Defense ignored by the attacker (0.0-1.0).
    pub def_ignore: f64,
    /// Reaction applied to every hit, if any.
    pub reaction: Option<Reaction>,
    /// Replaces the resolved crit rate when set.
    pub crit_rate_override: Option<f64>,
    /// Replaces the resolved crit damage when set.
    pub crit_dmg_override: Option<f64>,
}

impl Default for EvalContext {
    fn default() -> Self {
        Self {
            attacker_level: 90,
            target_level: 100,
            target_resistance: 0.1,
            def_reduction: 0.0,
            def_ignore: 0.0,
            reaction: None,
            crit_rate_override: None,
            crit_dmg_override: None,
        }
    }
}

impl EvalContext {
    /// Create the default context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set target resistance.
    #[must_use]
    pub fn with_resistance(mut self, resistance: f64) -> Self {
        self.target_resistance = resistance;
        self
    }

    /// Set defense reduction and ignore.
    #[must_use]
    pub fn with_defense_shred(mut self, reduction: f64, ignore: f64) -> Self {
        self.def_reduction = reduction;
        self.def_ignore = ignore;
        self
    }

    /// Set a reaction.
    #[must_use]
    pub fn with_reaction(mut self, reaction: Reaction) -> Self {
        self.reaction = Some(reaction);
        self
    }

    /// Pin crit rate and crit damage.
    #[must_use]
    pub fn with_crit(mut self, rate: f64, dmg: f64) -> Self {
        self.crit_rate_override = Some(rate);
        self.crit_dmg_override = Some(dmg);
        self
    }

    /// Defense multiplier for this context.
    #[must_use]
    pub fn def_multiplier(&self) -> f64 {
        def_multiplier(
            self.attacker_level,
            self.target_level,
            self.def_reduction,
            self.def_ignore,
        )
    }

    /// Resistance multiplier for this context.
    #[must_use]
    pub fn res_multiplier(&self) -> f64 {
        res_multiplier(self.target_resistance)
    }

    /// Reaction multiplier at a given elemental mastery.
    #[must_use]
    pub fn reaction_multiplier(&self, elemental_mastery: f64) -> f64 {
        self.reaction
            .map_or(1.0, |reaction| reaction.multiplier(elemental_mastery))
    }

    /// Crit rate and damage to use, honouring overrides.
    #[must_use]
    pub fn crit(&self, snapshot: &StatSnapshot) -> (f64, f64) {
        (
            self.crit_rate_override.unwrap_or(snapshot.crit_rate),
            self.crit_dmg_override.unwrap_or(snapshot.crit_dmg),
        )
    }
}

/// Defense multiplier.
#[must_use]
pub fn def_multiplier(attacker_level: u32, target_level: u32, def_reduction: f64, def_ignore: f64) -> f64 {
    let attacker = f64::from(attacker_level) + 100.0;
    let target = f64::from(target_level) + 100.0;
    attacker / ((1.0 - def_reduction) * (1.0 - def_ignore) * target + attacker)
}

/// Resistance multiplier; continuous at 0 and at 0.75.
#[must_use]
pub fn res_multiplier(resistance: f64) -> f64 {
    if resistance < 0.0 {
        1.0 - resistance / 2.0
    } else if resistance < 0.75 {
        1.0 - resistance
    } else {
        1.0 / (4.0 * resistance + 1.0)
    }
}

// ============================================================================
// Hits
// ============================================================================

/// Attacker-side inputs of one hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageInput {
    /// Stat the hit scales with (total HP, ATK or DEF).
    pub base_stat: f64,
    /// Talent multiplier in percent.
    pub multiplier: f64,
    /// Crit rate as a fraction.
    pub crit_rate: f64,
    /// Crit damage as a fraction.
    pub crit_dmg: f64,
    /// Damage bonus as a fraction.
    pub dmg_bonus: f64,
    /// Elemental mastery, read by reactions.
    pub elemental_mastery: f64,
}

impl DamageInput {
    /// A hit with no crit, bonus or mastery.
    #[must_use]
    pub const fn new(base_stat: f64, multiplier: f64) -> Self {
        Self {
            base_stat,
            multiplier,
            crit_rate: 0.0,
            crit_dmg: 0.0,
            dmg_bonus: 0.0,
            elemental_mastery: 0.0,
        }
    }

    /// Set crit rate and damage.
    #[must_use]
    pub const fn with_crit(mut self, rate: f64, dmg: f64) -> Self {
        self.crit_rate = rate;
        self.crit_dmg = dmg;
        self
    }

    /// Set damage bonus.
    #[must_use]
    pub const fn with_bonus(mut self, bonus: f64) -> Self {
        self.dmg_bonus = bonus;
        self
    }

    /// Set elemental mastery.
    #[must_use]
    pub const fn with_mastery(mut self, em: f64) -> Self {
        self.elemental_mastery = em;
        self
    }

    /// Damage before crit, bonus and enemy mitigation.
    #[must_use]
    pub fn raw_damage(&self) -> f64 {
        self.base_stat * self.multiplier / 100.0
    }
}

/// Calculator for expected damage in one context.
#[derive(Debug, Clone, Default)]
pub struct DamageCalculator {
    /// Evaluation context.
    pub context: EvalContext,
}

impl DamageCalculator {
    /// Calculator for the default context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculator for a context.
    #[must_use]
    pub fn with_context(context: EvalContext) -> Self {
        Self { context }
    }

    /// Expected damage of one hit.
    #[must_use]
    pub fn calculate(&self, hit: &DamageInput) -> f64 {
        hit.raw_damage()
            * (1.0 + hit.crit_rate * hit.crit_dmg)
            * (1.0 + hit.dmg_bonus)
            * self.context.def_multiplier()
            * self.context.res_multiplier()
            * self.context.reaction_multiplier(hit.elemental_mastery)
    }
}

/// Healing of one tick.
#[must_use]
pub fn calculate_heal(hp: f64, heal_pct: f64, heal_flat: f64, healing_bonus: f64) -> f64 {
    (hp * heal_pct + heal_flat) * (1.0 + healing_bonus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_context_defaults() {
        let ctx = EvalContext::default();
        assert_eq!(ctx.attacker_level, 90);
        assert_eq!(ctx.target_level, 100);
        assert!((ctx.target_resistance - 0.1).abs() < 1e-12);
        assert!(ctx.reaction.is_none());
    }

    #[test]
    fn test_boundary_reduces_to_defense_only() {
        let calc = DamageCalculator::with_context(EvalContext::new().with_resistance(0.0));
        let hit = DamageInput::new(2000.0, 150.0);
        let expected = 2000.0 * 1.5 * def_multiplier(90, 100, 0.0, 0.0);
        assert!((calc.calculate(&hit) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_def_multiplier_level_90_vs_100() {
        // 190 / (200 + 190)
        assert!((def_multiplier(90, 100, 0.0, 0.0) - 190.0 / 390.0).abs() < 1e-12);
        // full shred leaves only the attacker term
        assert!((def_multiplier(90, 100, 1.0, 0.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_resistance_continuity_at_three_quarters() {
        let below = res_multiplier(0.75 - 1e-12);
        let at = res_multiplier(0.75);
        assert!((at - 0.25).abs() < 1e-12);
        assert!((below - at).abs() < 1e-9);
        assert!((res_multiplier(-0.2) - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_crit_and_bonus_scale_expected_damage() {
        let calc = DamageCalculator::with_context(EvalContext::new().with_resistance(0.0));
        let plain = calc.calculate(&DamageInput::new(1000.0, 100.0));
        let boosted = calc.calculate(
            &DamageInput::new(1000.0, 100.0)
                .with_crit(0.5, 1.0)
                .with_bonus(0.5),
        );
        assert!((boosted / plain - 1.5 * 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_reaction_multipliers() {
        let vape = Reaction {
            kind: ReactionKind::Amplifying,
            base_multiplier: 1.5,
        };
        assert!((vape.multiplier(0.0) - 1.5).abs() < 1e-12);
        assert!((vape.multiplier(1400.0) - 1.5 * (1.0 + 1.39)).abs() < 1e-9);

        let swirl = Reaction {
            kind: ReactionKind::Transformative,
            base_multiplier: 1.0,
        };
        assert!((swirl.multiplier(2000.0) - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_crit_overrides() {
        let ctx = EvalContext::new().with_crit(1.0, 2.0);
        let calc = DamageCalculator::with_context(ctx.clone());
        let hit = DamageInput::new(100.0, 100.0).with_crit(1.0, 2.0);
        assert!(calc.calculate(&hit) > 0.0);
        assert_eq!(ctx.crit_rate_override, Some(1.0));
    }

    #[test]
    fn test_heal_formula() {
        let heal = calculate_heal(20_000.0, 0.06, 577.0, 0.1);
        assert!((heal - (1200.0 + 577.0) * 1.1).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn test_resistance_multiplier_is_monotonic(a in -1.0f64..3.0, b in -1.0f64..3.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(res_multiplier(lo) >= res_multiplier(hi) - 1e-12);
        }
    }
}
