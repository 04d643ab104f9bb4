//! Combo evaluation.
//!
//! Turns a combatant and a parsed combo into expected damage and healing:
//!
//! 1. One-shot buffs whose trigger appears in the combo are armed and applied
//!    to a fresh copy of the combatant's overlay, in trigger order.
//! 2. Timed effects are resolved against a snapshot that includes only the
//!    buffs triggered before them.
//! 3. Every hit is resolved against the fully buffed snapshot. `BUFF` entries
//!    raise the damage bonus of later hits.
//! 4. Buffs are reverted.
//!
//! The combatant itself is never mutated.

use resin_common::{AbilitySlot, Element, ResinResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::combatant::{Combatant, Upgrade};
use crate::combo::{Combo, HitTag};
use crate::damage_calc::{DamageCalculator, DamageInput, EvalContext};
use crate::effects::{EffectScope, OneShotBuff};
use crate::multipliers::{MultiplierTable, Scaling};
use crate::stats::resolve_with;

/// Scalar an optimizer maximises.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Total damage.
    #[default]
    Damage,
    /// Total healing.
    Healing,
    /// Damage plus healing.
    Total,
}

impl Metric {
    /// Read this metric from an evaluation.
    #[must_use]
    pub fn of(&self, evaluation: &Evaluation) -> f64 {
        match self {
            Self::Damage => evaluation.damage,
            Self::Healing => evaluation.healing,
            Self::Total => evaluation.damage + evaluation.healing,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Damage => "damage",
            Self::Healing => "healing",
            Self::Total => "damage+healing",
        })
    }
}

/// One resolved hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitRecord {
    /// Hit-tag.
    pub tag: HitTag,
    /// Table the tag resolved against.
    pub slot: AbilitySlot,
    /// Element of the hit.
    pub element: Element,
    /// Expected damage.
    pub damage: f64,
}

/// Output of one timed effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedRecord {
    /// Triggering slot.
    pub slot: AbilitySlot,
    /// Combo position of the trigger.
    pub trigger: usize,
    /// Total damage.
    pub damage: f64,
    /// Total healing.
    pub healing: f64,
}

/// Result of evaluating a combo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Hit damage plus timed-effect damage.
    pub damage: f64,
    /// Timed-effect healing.
    pub healing: f64,
    /// Resolved hits in combo order.
    pub hits: Vec<HitRecord>,
    /// Steps that produced no damage (missing tag, data column, buff entry).
    pub skipped: usize,
    /// One-shot buffs and the phase each ended in.
    pub buffs: Vec<OneShotBuff>,
    /// Timed effects that fired.
    pub timed: Vec<TimedRecord>,
}

impl Evaluation {
    /// Read a metric.
    #[must_use]
    pub fn metric(&self, metric: Metric) -> f64 {
        metric.of(self)
    }
}

/// Evaluates combos against one multiplier table and context.
#[derive(Debug, Clone)]
pub struct Evaluator<'a> {
    tables: &'a MultiplierTable,
    calculator: DamageCalculator,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator.
    #[must_use]
    pub fn new(tables: &'a MultiplierTable, context: EvalContext) -> Self {
        Self {
            tables,
            calculator: DamageCalculator::with_context(context),
        }
    }

    /// Multiplier table in use.
    #[must_use]
    pub const fn tables(&self) -> &'a MultiplierTable {
        self.tables
    }

    /// Evaluation context in use.
    #[must_use]
    pub const fn context(&self) -> &EvalContext {
        &self.calculator.context
    }

    /// Evaluate the combatant's default combo.
    pub fn evaluate_default(&self, combatant: &Combatant) -> ResinResult<Evaluation> {
        let combo = Combo::parse(&combatant.default_combo)?;
        self.evaluate(combatant, &combo)
    }

    /// Evaluate a combo.
    pub fn evaluate(&self, combatant: &Combatant, combo: &Combo) -> ResinResult<Evaluation> {
        let identity = combatant.name.as_str();
        let mut evaluation = Evaluation::default();
        let mut overlay = combatant.overlay().clone();

        // One-shot buffs, in trigger order.
        let mut one_shots: Vec<_> = combatant
            .effects
            .iter()
            .filter(|effect| effect.kind.is_one_shot())
            .map(|effect| (combo.first_cast(effect.slot), effect))
            .collect();
        one_shots.sort_by_key(|(position, _)| position.unwrap_or(usize::MAX));

        for (position, effect) in one_shots {
            let column = effect.kind.column().unwrap_or_default();
            let mut buff = OneShotBuff::new(effect.slot, column);
            if let Some(position) = position {
                let level = combatant.level(effect.slot);
                let entry = self.tables.column(identity, effect.slot, level, column)?;
                let snapshot = resolve_with(combatant, &overlay);
                buff.arm(position);
                if let Some(contribution) = effect.kind.contribution(entry.value, &snapshot) {
                    debug!(
                        identity,
                        column,
                        ?contribution,
                        "Applying one-shot buff"
                    );
                    buff.apply(contribution, &mut overlay);
                }
            }
            evaluation.buffs.push(buff);
        }

        // Timed effects, each against the buffs triggered before it.
        for effect in combatant.effects.iter().filter(|e| !e.kind.is_one_shot()) {
            let Some(trigger) = combo.first_cast(effect.slot) else {
                continue;
            };
            let mut at_trigger = combatant.overlay().clone();
            for buff in &evaluation.buffs {
                if buff.trigger.is_some_and(|p| p < trigger) {
                    if let Some(contribution) = buff.contribution() {
                        contribution.add_to(&mut at_trigger);
                    }
                }
            }
            let snapshot = resolve_with(combatant, &at_trigger);
            let scope = EffectScope {
                identity,
                slot: effect.slot,
                level: combatant.level(effect.slot),
                element: combatant.element,
            };
            let output = effect
                .kind
                .timed_output(&scope, &snapshot, self.tables, &self.calculator)?;
            evaluation.damage += output.damage;
            evaluation.healing += output.healing;
            evaluation.timed.push(TimedRecord {
                slot: effect.slot,
                trigger,
                damage: output.damage,
                healing: output.healing,
            });
        }

        // Hits.
        let snapshot = resolve_with(combatant, &overlay);
        let (crit_rate, crit_dmg) = self.calculator.context.crit(&snapshot);
        let mut talent_bonus = 0.0;

        for step in combo.steps() {
            let level = combatant.level(step.slot);
            let table = self.tables.level_table(identity, step.slot, level)?;
            let key = step.tag.key();
            let Some(entry) = table.get(&key) else {
                debug!(identity, tag = %key, slot = %step.slot, "Skipping unknown hit-tag");
                evaluation.skipped += 1;
                continue;
            };

            let (base_stat, element) = match &entry.scaling {
                Scaling::Hp => (snapshot.total_hp, combatant.element),
                Scaling::Atk => (snapshot.total_atk, combatant.element),
                Scaling::Def => (snapshot.total_def, combatant.element),
                Scaling::Physical => (snapshot.total_atk, Element::Physical),
                Scaling::Buff => {
                    talent_bonus += entry.value / 100.0;
                    evaluation.skipped += 1;
                    continue;
                }
                Scaling::Value => {
                    evaluation.skipped += 1;
                    continue;
                }
                Scaling::Unsupported(tag) => {
                    warn!(identity, hit = %key, scaling = %tag, "Skipping hit with unsupported scaling");
                    evaluation.skipped += 1;
                    continue;
                }
            };

            let hit = DamageInput::new(base_stat, entry.value)
                .with_crit(crit_rate, crit_dmg)
                .with_bonus(snapshot.damage_bonus_for(element) + talent_bonus)
                .with_mastery(snapshot.elemental_mastery);
            let damage = self.calculator.calculate(&hit);
            evaluation.damage += damage;
            evaluation.hits.push(HitRecord {
                tag: step.tag,
                slot: step.slot,
                element,
                damage,
            });
        }

        for buff in evaluation.buffs.iter_mut().rev() {
            buff.revert(&mut overlay);
        }

        debug!(
            identity,
            damage = evaluation.damage,
            healing = evaluation.healing,
            hits = evaluation.hits.len(),
            skipped = evaluation.skipped,
            "Evaluated combo"
        );
        Ok(evaluation)
    }

    /// Evaluate a combo and read one metric.
    pub fn score(&self, combatant: &Combatant, combo: &Combo, metric: Metric) -> ResinResult<f64> {
        Ok(self.evaluate(combatant, combo)?.metric(metric))
    }

    /// Metric after a hypothetical upgrade; the combatant is untouched.
    pub fn what_if(
        &self,
        combatant: &Combatant,
        upgrade: &Upgrade,
        combo: &Combo,
        metric: Metric,
    ) -> ResinResult<f64> {
        let candidate = combatant.with_upgrade(upgrade);
        self.score(&candidate, combo, metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{AbilityLevels, Equipment};
    use crate::damage_calc::def_multiplier;
    use crate::effects::{AbilityEffect, BuffPhase, EffectKind, SummonSpec};
    use crate::multipliers::MultiplierEntry;
    use crate::stats::{resolve, BonusStat, StatTriple};
    use resin_common::{ConfigError, EquipmentSlot, ResinError, StatKind, WeaponClass};

    fn entry(value: f64, scaling: Scaling) -> MultiplierEntry {
        MultiplierEntry::new(value, scaling)
    }

    fn tables() -> MultiplierTable {
        let mut t = MultiplierTable::new();
        t.insert("Ember", AbilitySlot::Basic, 1, "N1", entry(100.0, Scaling::Atk));
        t.insert("Ember", AbilitySlot::Basic, 1, "N2", entry(100.0, Scaling::Atk));
        t.insert("Ember", AbilitySlot::Basic, 1, "C", entry(200.0, Scaling::Physical));
        t.insert("Ember", AbilitySlot::Basic, 1, "Boost", entry(0.0, Scaling::Value));
        t.insert("Ember", AbilitySlot::Skill, 1, "E", entry(150.0, Scaling::Hp));
        t.insert("Ember", AbilitySlot::Skill, 1, "ATK_Bonus%HP", entry(5.0, Scaling::Value));
        t.insert("Ember", AbilitySlot::Skill, 1, "Bubble", entry(10.0, Scaling::Hp));
        t.insert("Ember", AbilitySlot::Burst, 1, "Q", entry(300.0, Scaling::Atk));
        t.insert("Ember", AbilitySlot::Burst, 1, "Fanfare", entry(20.0, Scaling::Value));
        t.insert("Ember", AbilitySlot::Burst, 2, "Q", entry(330.0, Scaling::Atk));
        t.insert("Ember", AbilitySlot::Burst, 2, "Fanfare", entry(22.0, Scaling::Value));
        t
    }

    fn ember() -> Combatant {
        Combatant::new("Ember", Element::Pyro, WeaponClass::Polearm)
            .with_base(StatTriple::new(20_000.0, 1000.0, 800.0))
    }

    fn neutral() -> EvalContext {
        EvalContext::new().with_resistance(0.0).with_crit(0.0, 0.0)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6 * b.abs().max(1.0)
    }

    #[test]
    fn test_plain_hits_follow_formula() {
        let t = tables();
        let eval = Evaluator::new(&t, neutral());
        let combo = Combo::parse("N2").expect("valid combo");
        let result = eval.evaluate(&ember(), &combo).expect("evaluates");
        let expected = 2.0 * 1000.0 * def_multiplier(90, 100, 0.0, 0.0);
        assert!(approx(result.damage, expected));
        assert_eq!(result.hits.len(), 2);
    }

    #[test]
    fn test_physical_hit_uses_physical_bonus() {
        let t = tables();
        let eval = Evaluator::new(&t, neutral());
        let mut c = ember();
        c.equip(Equipment::new(
            EquipmentSlot::Goblet,
            StatKind::DamageBonus(Element::Physical),
            58.3,
        ));
        let result = eval
            .evaluate(&c, &Combo::parse("C").expect("valid combo"))
            .expect("evaluates");
        assert_eq!(result.hits[0].element, Element::Physical);
        let expected = 2000.0 * 1.583 * def_multiplier(90, 100, 0.0, 0.0);
        assert!(approx(result.damage, expected));
    }

    #[test]
    fn test_missing_tag_is_skipped_but_missing_table_fails() {
        let t = tables();
        let eval = Evaluator::new(&t, neutral());
        let result = eval
            .evaluate(&ember(), &Combo::parse("N4").expect("valid combo"))
            .expect("evaluates");
        assert_eq!(result.hits.len(), 2);
        assert_eq!(result.skipped, 2);

        let mut c = ember();
        c.set_level(AbilitySlot::Basic, 7);
        let err = eval
            .evaluate(&c, &Combo::parse("N1").expect("valid combo"))
            .unwrap_err();
        assert!(matches!(
            err,
            ResinError::Config(ConfigError::MissingMultipliers { level: 7, .. })
        ));
    }

    #[test]
    fn test_buff_entries_only_affect_later_hits() {
        let mut t = tables();
        t.insert("Ember", AbilitySlot::Basic, 1, "N2", entry(50.0, Scaling::Buff));
        let eval = Evaluator::new(&t, neutral());
        // N1 N2(buff) N1 N2(buff) N1
        let combo = Combo::parse("2N2 N1").expect("valid combo");
        let result = eval.evaluate(&ember(), &combo).expect("evaluates");
        let d = def_multiplier(90, 100, 0.0, 0.0) * 1000.0;
        assert!(approx(result.hits[0].damage, d));
        assert!(approx(result.hits[1].damage, d * 1.5));
        assert!(approx(result.hits[2].damage, d * 2.0));
    }

    #[test]
    fn test_stat_conversion_buff_is_applied_and_reverted() {
        let t = tables();
        let eval = Evaluator::new(&t, neutral());
        let c = ember().with_effect(AbilityEffect::new(
            AbilitySlot::Skill,
            EffectKind::StatConversion {
                column: "ATK_Bonus%HP".into(),
                from: BonusStat::Hp,
                to: BonusStat::Atk,
            },
        ));
        let before = resolve(&c);

        let result = eval
            .evaluate(&c, &Combo::parse("E N1").expect("valid combo"))
            .expect("evaluates");
        let d = def_multiplier(90, 100, 0.0, 0.0);
        // N1 at 1000 + 5% of 20000 HP
        assert!(approx(result.hits[1].damage, 2000.0 * d));
        assert_eq!(result.buffs[0].phase(), BuffPhase::Reverted);
        assert_eq!(resolve(&c), before);
        assert_eq!(c.overlay(), &crate::stats::StatOverlay::new());
    }

    #[test]
    fn test_untriggered_buff_stays_idle() {
        let t = tables();
        let eval = Evaluator::new(&t, neutral());
        let c = ember().with_effect(AbilityEffect::new(
            AbilitySlot::Burst,
            EffectKind::DamageBonus {
                column: "Fanfare".into(),
            },
        ));
        let result = eval
            .evaluate(&c, &Combo::parse("N1").expect("valid combo"))
            .expect("evaluates");
        assert_eq!(result.buffs[0].phase(), BuffPhase::Idle);
    }

    #[test]
    fn test_missing_buff_column_is_config_error() {
        let t = tables();
        let eval = Evaluator::new(&t, neutral());
        let c = ember().with_effect(AbilityEffect::new(
            AbilitySlot::Burst,
            EffectKind::BaseAttackShare {
                column: "InspirationBuff".into(),
            },
        ));
        let err = eval
            .evaluate(&c, &Combo::parse("Q").expect("valid combo"))
            .unwrap_err();
        assert!(matches!(
            err,
            ResinError::Config(ConfigError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_summons_see_only_earlier_buffs() {
        let t = tables();
        let eval = Evaluator::new(&t, neutral());
        let c = ember()
            .with_effect(AbilityEffect::new(
                AbilitySlot::Burst,
                EffectKind::DamageBonus {
                    column: "Fanfare".into(),
                },
            ))
            .with_effect(AbilityEffect::new(
                AbilitySlot::Skill,
                EffectKind::Summons {
                    summons: vec![SummonSpec {
                        tag: "Bubble".into(),
                        interval: 3.0,
                        duration: 30.0,
                    }],
                    global_cooldown: 0.0,
                    passive: None,
                },
            ));

        let q_first = eval
            .evaluate(&c, &Combo::parse("Q E").expect("valid combo"))
            .expect("evaluates");
        let e_first = eval
            .evaluate(&c, &Combo::parse("E Q").expect("valid combo"))
            .expect("evaluates");

        let d = def_multiplier(90, 100, 0.0, 0.0);
        let summon_plain = 10.0 * 2000.0 * d;
        assert!(approx(e_first.timed[0].damage, summon_plain));
        assert!(approx(q_first.timed[0].damage, summon_plain * 1.2));
    }

    #[test]
    fn test_what_if_does_not_touch_combatant() {
        let t = tables();
        let eval = Evaluator::new(&t, neutral());
        let c = ember().with_levels(AbilityLevels::uniform(1));
        let combo = Combo::parse("Q").expect("valid combo");
        let now = eval.score(&c, &combo, Metric::Damage).expect("evaluates");
        let next = eval
            .what_if(&c, &Upgrade::LevelUp(AbilitySlot::Burst), &combo, Metric::Damage)
            .expect("evaluates");
        assert!(next > now);
        assert_eq!(c.level(AbilitySlot::Burst), 1);
    }

    #[test]
    fn test_metric_selection() {
        let evaluation = Evaluation {
            damage: 10.0,
            healing: 5.0,
            ..Evaluation::default()
        };
        assert!(approx(Metric::Damage.of(&evaluation), 10.0));
        assert!(approx(Metric::Healing.of(&evaluation), 5.0));
        assert!(approx(evaluation.metric(Metric::Total), 15.0));
    }
}
