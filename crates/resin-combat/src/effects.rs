//! Ability-triggered effects.
//!
//! Effects hang off an ability slot and fire when the combo casts it. There
//! are two families:
//!
//! - One-shot buffs write a contribution into the evaluation overlay before
//!   any hit is resolved and subtract exactly that contribution afterwards.
//! - Timed emitters (summons, periodic heals) tick a fixed number of times
//!   against a snapshot taken at their trigger.
//!
//! Parameters are looked up in the multiplier table at the triggering slot's
//! current level; a missing column is a configuration error.

use resin_common::{AbilitySlot, ConfigError, Element, ResinResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::damage_calc::{calculate_heal, DamageCalculator, DamageInput};
use crate::multipliers::{MultiplierTable, Scaling};
use crate::stats::{BonusStat, StatOverlay, StatSnapshot};

/// Default lifetime of a summon, in seconds.
pub const DEFAULT_SUMMON_DURATION: f64 = 30.0;

// ============================================================================
// Effect definitions
// ============================================================================

/// What an ability does besides its own hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectKind {
    /// `column`% of a resolved stat becomes a flat bonus on another stat.
    StatConversion {
        /// Table column holding the percentage.
        column: String,
        /// Stat read from the snapshot (its final value).
        from: BonusStat,
        /// Stat receiving the flat bonus.
        to: BonusStat,
    },
    /// `column`% of base ATK (character plus weapon) becomes flat ATK.
    BaseAttackShare {
        /// Table column holding the percentage.
        column: String,
    },
    /// `column`% damage bonus to every element.
    DamageBonus {
        /// Table column holding the percentage.
        column: String,
    },
    /// Summoned entities that hit on an interval.
    Summons {
        /// Every summon the cast creates.
        summons: Vec<SummonSpec>,
        /// Extra delay added to each summon interval.
        #[serde(default)]
        global_cooldown: f64,
        /// HP-scaled bonus that only these summons receive.
        #[serde(default)]
        passive: Option<HpScaledBonus>,
    },
    /// Healing on an interval from `Heal%` and `HealFlat` columns.
    PeriodicHeal {
        /// Seconds between ticks.
        interval: f64,
        /// Seconds the effect lasts.
        duration: f64,
    },
}

impl EffectKind {
    /// True for buffs applied once before the hits.
    #[must_use]
    pub const fn is_one_shot(&self) -> bool {
        matches!(
            self,
            Self::StatConversion { .. } | Self::BaseAttackShare { .. } | Self::DamageBonus { .. }
        )
    }

    /// Column read by a one-shot buff.
    #[must_use]
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::StatConversion { column, .. }
            | Self::BaseAttackShare { column }
            | Self::DamageBonus { column } => Some(column),
            Self::Summons { .. } | Self::PeriodicHeal { .. } => None,
        }
    }

    /// Contribution of a one-shot buff given its column value in percent.
    ///
    /// Timed effects have none.
    #[must_use]
    pub fn contribution(&self, percent: f64, snapshot: &StatSnapshot) -> Option<BuffContribution> {
        let fraction = percent / 100.0;
        match self {
            Self::StatConversion { from, to, .. } => Some(BuffContribution::Flat {
                stat: *to,
                amount: fraction * snapshot.total(*from),
            }),
            Self::BaseAttackShare { .. } => Some(BuffContribution::Flat {
                stat: BonusStat::Atk,
                amount: fraction * snapshot.base.atk,
            }),
            Self::DamageBonus { .. } => Some(BuffContribution::DamageBonus(fraction)),
            Self::Summons { .. } | Self::PeriodicHeal { .. } => None,
        }
    }
}

/// An effect bound to the slot whose cast triggers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityEffect {
    /// Triggering slot; also selects the table and level for parameters.
    pub slot: AbilitySlot,
    /// The effect.
    #[serde(flatten)]
    pub kind: EffectKind,
}

impl AbilityEffect {
    /// Bind an effect to a slot.
    #[must_use]
    pub fn new(slot: AbilitySlot, kind: EffectKind) -> Self {
        Self { slot, kind }
    }
}

/// One summoned entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummonSpec {
    /// Table column of the summon's hit.
    pub tag: String,
    /// Seconds between hits, before the global cooldown.
    pub interval: f64,
    /// Seconds the summon stays.
    #[serde(default = "default_summon_duration")]
    pub duration: f64,
}

fn default_summon_duration() -> f64 {
    DEFAULT_SUMMON_DURATION
}

/// Damage bonus growing with total HP in steps, up to a cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HpScaledBonus {
    /// HP per step.
    pub hp_step: f64,
    /// Bonus per full step, as a fraction.
    pub bonus_per_step: f64,
    /// Maximum bonus, as a fraction.
    pub cap: f64,
}

impl Default for HpScaledBonus {
    fn default() -> Self {
        Self {
            hp_step: 1000.0,
            bonus_per_step: 0.007,
            cap: 0.28,
        }
    }
}

impl HpScaledBonus {
    /// Bonus at a given total HP.
    #[must_use]
    pub fn bonus(&self, total_hp: f64) -> f64 {
        if self.hp_step <= 0.0 {
            return 0.0;
        }
        ((total_hp / self.hp_step).floor() * self.bonus_per_step).min(self.cap)
    }
}

/// Interval/duration pair of anything that ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEmitter {
    /// Seconds between ticks.
    pub interval: f64,
    /// Seconds the emitter lasts.
    pub duration: f64,
}

impl TimedEmitter {
    /// Create an emitter.
    #[must_use]
    pub const fn new(interval: f64, duration: f64) -> Self {
        Self { interval, duration }
    }

    /// Number of ticks; at least one.
    #[must_use]
    pub fn ticks(&self) -> u32 {
        if self.interval.is_nan() || self.interval <= 0.0 || !self.duration.is_finite() {
            return 1;
        }
        let ticks = (self.duration / self.interval).floor();
        if ticks < 1.0 {
            1
        } else if ticks >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            ticks as u32
        }
    }
}

// ============================================================================
// One-shot buff lifecycle
// ============================================================================

/// Lifecycle of a one-shot buff during one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuffPhase {
    /// Trigger not seen.
    Idle,
    /// Trigger seen, nothing written yet.
    Armed,
    /// Contribution written to the overlay.
    Applied,
    /// Contribution subtracted again.
    Reverted,
}

/// What a one-shot buff writes into the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuffContribution {
    /// Flat bonus to HP, ATK or DEF.
    Flat {
        /// Receiving stat.
        stat: BonusStat,
        /// Amount added.
        amount: f64,
    },
    /// Universal damage bonus, as a fraction.
    DamageBonus(f64),
}

impl BuffContribution {
    /// Add this contribution to an overlay.
    pub fn add_to(&self, overlay: &mut StatOverlay) {
        self.write(overlay, 1.0);
    }

    fn write(&self, overlay: &mut StatOverlay, sign: f64) {
        match self {
            Self::Flat { stat, amount } => *overlay.flat.get_mut(*stat) += sign * amount,
            Self::DamageBonus(bonus) => overlay.damage_bonus += sign * bonus,
        }
    }
}

/// A one-shot buff moving through its phases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneShotBuff {
    /// Triggering slot.
    pub slot: AbilitySlot,
    /// Column the buff reads.
    pub column: String,
    /// Combo position of the trigger, once armed.
    pub trigger: Option<usize>,
    phase: BuffPhase,
    contribution: Option<BuffContribution>,
}

impl OneShotBuff {
    /// A buff that has not been triggered.
    #[must_use]
    pub fn new(slot: AbilitySlot, column: impl Into<String>) -> Self {
        Self {
            slot,
            column: column.into(),
            trigger: None,
            phase: BuffPhase::Idle,
            contribution: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> BuffPhase {
        self.phase
    }

    /// Contribution written, if any.
    #[must_use]
    pub const fn contribution(&self) -> Option<BuffContribution> {
        self.contribution
    }

    /// Record that the trigger was seen at `position`.
    pub fn arm(&mut self, position: usize) {
        if self.phase == BuffPhase::Idle {
            self.trigger = Some(position);
            self.phase = BuffPhase::Armed;
        }
    }

    /// Write the contribution into the overlay. Only an armed buff applies.
    pub fn apply(&mut self, contribution: BuffContribution, overlay: &mut StatOverlay) {
        if self.phase != BuffPhase::Armed {
            warn!(column = %self.column, phase = ?self.phase, "Ignoring apply outside Armed");
            return;
        }
        contribution.write(overlay, 1.0);
        self.contribution = Some(contribution);
        self.phase = BuffPhase::Applied;
    }

    /// Subtract exactly what [`OneShotBuff::apply`] added.
    pub fn revert(&mut self, overlay: &mut StatOverlay) {
        if self.phase != BuffPhase::Applied {
            return;
        }
        if let Some(contribution) = &self.contribution {
            contribution.write(overlay, -1.0);
        }
        self.phase = BuffPhase::Reverted;
    }
}

// ============================================================================
// Timed effect output
// ============================================================================

/// Where a timed effect looks up its parameters.
#[derive(Debug, Clone, Copy)]
pub struct EffectScope<'a> {
    /// Combatant identity.
    pub identity: &'a str,
    /// Triggering slot.
    pub slot: AbilitySlot,
    /// Level of the triggering slot.
    pub level: u8,
    /// Element of the combatant.
    pub element: Element,
}

/// Damage and healing produced by one timed effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimedOutput {
    /// Total damage over all ticks.
    pub damage: f64,
    /// Total healing over all ticks.
    pub healing: f64,
}

impl EffectKind {
    /// Total output of a timed effect against a snapshot.
    ///
    /// One-shot buffs produce nothing here.
    pub fn timed_output(
        &self,
        scope: &EffectScope<'_>,
        snapshot: &StatSnapshot,
        tables: &MultiplierTable,
        calculator: &DamageCalculator,
    ) -> ResinResult<TimedOutput> {
        match self {
            Self::Summons {
                summons,
                global_cooldown,
                passive,
            } => {
                let passive_bonus = passive.map_or(0.0, |p| p.bonus(snapshot.total_hp));
                let mut damage = 0.0;
                for summon in summons {
                    damage += summon_damage(
                        scope,
                        summon,
                        *global_cooldown,
                        passive_bonus,
                        snapshot,
                        tables,
                        calculator,
                    )?;
                }
                Ok(TimedOutput {
                    damage,
                    healing: 0.0,
                })
            }
            Self::PeriodicHeal { interval, duration } => {
                let emitter = TimedEmitter::new(*interval, *duration);
                let healing = periodic_heal(scope, &emitter, snapshot, tables)?;
                Ok(TimedOutput {
                    damage: 0.0,
                    healing,
                })
            }
            Self::StatConversion { .. } | Self::BaseAttackShare { .. } | Self::DamageBonus { .. } => {
                Ok(TimedOutput::default())
            }
        }
    }
}

fn summon_damage(
    scope: &EffectScope<'_>,
    summon: &SummonSpec,
    global_cooldown: f64,
    passive_bonus: f64,
    snapshot: &StatSnapshot,
    tables: &MultiplierTable,
    calculator: &DamageCalculator,
) -> ResinResult<f64> {
    let entry = tables.column(scope.identity, scope.slot, scope.level, &summon.tag)?;
    let base_stat = match entry.scaling {
        Scaling::Hp => snapshot.total_hp,
        Scaling::Atk => snapshot.total_atk,
        ref other => {
            return Err(ConfigError::UnexpectedScaling {
                tag: summon.tag.clone(),
                scaling: other.to_string(),
            }
            .into())
        }
    };

    let emitter = TimedEmitter::new(summon.interval + global_cooldown, summon.duration);
    let (crit_rate, crit_dmg) = calculator.context.crit(snapshot);
    let hit = DamageInput::new(base_stat, entry.value)
        .with_crit(crit_rate, crit_dmg)
        .with_bonus(snapshot.damage_bonus_for(scope.element) + passive_bonus)
        .with_mastery(snapshot.elemental_mastery);
    let per_tick = calculator.calculate(&hit);
    let ticks = emitter.ticks();

    debug!(
        summon = %summon.tag,
        ticks,
        per_tick,
        "Summon damage"
    );
    Ok(per_tick * f64::from(ticks))
}

fn periodic_heal(
    scope: &EffectScope<'_>,
    emitter: &TimedEmitter,
    snapshot: &StatSnapshot,
    tables: &MultiplierTable,
) -> ResinResult<f64> {
    let entries = tables.level_table(scope.identity, scope.slot, scope.level)?;

    let mut per_tick = 0.0;
    for (tag, entry) in entries {
        if tag.contains("Heal%") {
            per_tick += calculate_heal(
                snapshot.total_hp,
                entry.value / 100.0,
                0.0,
                snapshot.healing_bonus,
            );
        } else if tag.contains("HealFlat") {
            per_tick += calculate_heal(0.0, 0.0, entry.value, snapshot.healing_bonus);
        }
    }

    if per_tick <= 0.0 {
        debug!(identity = scope.identity, slot = %scope.slot, "No heal columns");
    }
    Ok(per_tick * f64::from(emitter.ticks()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::Combatant;
    use crate::damage_calc::EvalContext;
    use crate::multipliers::MultiplierEntry;
    use crate::stats::{resolve, StatTriple};
    use resin_common::WeaponClass;

    #[test]
    fn test_tick_counts() {
        assert_eq!(TimedEmitter::new(2.9, 30.0).ticks(), 10);
        assert_eq!(TimedEmitter::new(9999.0, 0.1).ticks(), 1);
        assert_eq!(TimedEmitter::new(0.0, 30.0).ticks(), 1);
        assert_eq!(TimedEmitter::new(1.0, 12.0).ticks(), 12);
    }

    #[test]
    fn test_hp_scaled_bonus_caps() {
        let passive = HpScaledBonus::default();
        assert!((passive.bonus(15_999.0) - 15.0 * 0.007).abs() < 1e-12);
        assert!((passive.bonus(80_000.0) - 0.28).abs() < 1e-12);
    }

    #[test]
    fn test_buff_phases_and_exact_revert() {
        let mut overlay = StatOverlay::new();
        let mut a = OneShotBuff::new(AbilitySlot::Skill, "ATK_Bonus%HP");
        let mut b = OneShotBuff::new(AbilitySlot::Burst, "InspirationBuff");
        assert_eq!(a.phase(), BuffPhase::Idle);

        a.arm(0);
        b.arm(5);
        a.apply(
            BuffContribution::Flat {
                stat: BonusStat::Atk,
                amount: 300.0,
            },
            &mut overlay,
        );
        b.apply(
            BuffContribution::Flat {
                stat: BonusStat::Atk,
                amount: 120.0,
            },
            &mut overlay,
        );
        assert!((overlay.flat.atk - 420.0).abs() < 1e-12);

        a.revert(&mut overlay);
        assert!((overlay.flat.atk - 120.0).abs() < 1e-12);
        b.revert(&mut overlay);
        assert_eq!(a.phase(), BuffPhase::Reverted);
        assert!(overlay.flat.atk.abs() < 1e-12);
    }

    #[test]
    fn test_unarmed_buff_does_not_apply() {
        let mut overlay = StatOverlay::new();
        let mut buff = OneShotBuff::new(AbilitySlot::Burst, "Fanfare");
        buff.apply(BuffContribution::DamageBonus(0.2), &mut overlay);
        assert_eq!(buff.phase(), BuffPhase::Idle);
        assert_eq!(overlay, StatOverlay::new());
    }

    #[test]
    fn test_contributions() {
        let c = Combatant::new("X", Element::Pyro, WeaponClass::Polearm)
            .with_base(StatTriple::new(30_000.0, 100.0, 800.0));
        let snap = resolve(&c);
        let conversion = EffectKind::StatConversion {
            column: "ATK_Bonus%HP".into(),
            from: BonusStat::Hp,
            to: BonusStat::Atk,
        };
        match conversion.contribution(6.26, &snap) {
            Some(BuffContribution::Flat { stat, amount }) => {
                assert_eq!(stat, BonusStat::Atk);
                assert!((amount - 1878.0).abs() < 1e-9);
            }
            other => panic!("unexpected contribution {other:?}"),
        }
        let share = EffectKind::BaseAttackShare {
            column: "InspirationBuff".into(),
        };
        assert_eq!(
            share.contribution(50.0, &snap),
            Some(BuffContribution::Flat {
                stat: BonusStat::Atk,
                amount: 50.0
            })
        );
    }

    #[test]
    fn test_summon_with_unexpected_scaling_fails() {
        let mut tables = MultiplierTable::new();
        tables.insert(
            "X",
            AbilitySlot::Skill,
            1,
            "Bubble",
            MultiplierEntry::new(10.0, Scaling::Def),
        );
        let c = Combatant::new("X", Element::Hydro, WeaponClass::Sword)
            .with_base(StatTriple::new(10_000.0, 100.0, 500.0));
        let kind = EffectKind::Summons {
            summons: vec![SummonSpec {
                tag: "Bubble".into(),
                interval: 1.0,
                duration: 30.0,
            }],
            global_cooldown: 0.0,
            passive: None,
        };
        let scope = EffectScope {
            identity: "X",
            slot: AbilitySlot::Skill,
            level: 1,
            element: Element::Hydro,
        };
        let calc = DamageCalculator::with_context(EvalContext::default());
        let err = kind
            .timed_output(&scope, &resolve(&c), &tables, &calc)
            .unwrap_err();
        assert!(err.to_string().contains("Unexpected scaling"));
    }

    #[test]
    fn test_periodic_heal_reads_heal_columns() {
        let mut tables = MultiplierTable::new();
        tables.insert("X", AbilitySlot::Burst, 1, "Heal%", MultiplierEntry::new(6.0, Scaling::Value));
        tables.insert("X", AbilitySlot::Burst, 1, "HealFlat", MultiplierEntry::new(500.0, Scaling::Value));
        tables.insert("X", AbilitySlot::Burst, 1, "Q", MultiplierEntry::new(200.0, Scaling::Atk));
        let c = Combatant::new("X", Element::Pyro, WeaponClass::Sword)
            .with_base(StatTriple::new(10_000.0, 100.0, 500.0));
        let scope = EffectScope {
            identity: "X",
            slot: AbilitySlot::Burst,
            level: 1,
            element: Element::Pyro,
        };
        let kind = EffectKind::PeriodicHeal {
            interval: 1.0,
            duration: 12.0,
        };
        let out = kind
            .timed_output(&scope, &resolve(&c), &tables, &DamageCalculator::new())
            .expect("heal columns present");
        assert!((out.healing - 12.0 * (600.0 + 500.0)).abs() < 1e-9);
        assert!(out.damage.abs() < 1e-12);
    }

    #[test]
    fn test_effect_toml_shape() {
        #[derive(Deserialize)]
        struct Doc {
            effects: Vec<AbilityEffect>,
        }
        let doc: Doc = toml::from_str(
            r#"
[[effects]]
slot = "skill"
kind = "stat_conversion"
column = "ATK_Bonus%HP"
from = "hp"
to = "atk"

[[effects]]
slot = "burst"
kind = "periodic_heal"
interval = 1.0
duration = 12.0
"#,
        )
        .expect("valid effects");
        assert_eq!(doc.effects.len(), 2);
        assert!(doc.effects[0].kind.is_one_shot());
        assert_eq!(doc.effects[1].slot, AbilitySlot::Burst);
    }
}
