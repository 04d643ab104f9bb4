//! Greedy resin allocation.
//!
//! Each spend unit buys one attempt on a track. Equipment attempts roll an
//! item for a random slot and keep it only when the metric strictly rises.
//! Ability attempts farm materials, then level the slot with the largest
//! positive gain for as long as something is affordable and improving.
//! Policies decide which track the next unit goes to and when to stop.

use resin_combat::{
    AbilityLevels, Combatant, Combo, Equipment, Evaluator, MaterialDrop, Metric, Upgrade,
};
use resin_common::{AbilitySlot, ConfigError, EquipmentSlot, ResinResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use crate::drops::{DropTable, MaterialSource};
use crate::generator::EquipmentGenerator;
use crate::policy::{Policy, Track};
use crate::rng::SimRng;

/// Resin cost of one domain run.
pub const RESIN_PER_RUN: u32 = 20;

/// Teachings-equivalent cost of raising a slot from level `n` (index `n - 1`).
pub const DEFAULT_LEVEL_COSTS: [u32; 9] = [3, 6, 12, 18, 27, 36, 54, 108, 144];

// ============================================================================
// Configuration
// ============================================================================

/// Optimizer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Resin consumed per attempt.
    pub spend_unit: u32,
    /// Domain tier for ability material runs (1-4).
    pub domain_tier: u8,
    /// Highest reachable ability level.
    pub max_level: u8,
    /// Cost of each level-up, starting at level 1.
    pub level_costs: Vec<u32>,
    /// Scalar being maximised.
    pub metric: Metric,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            spend_unit: RESIN_PER_RUN,
            domain_tier: 4,
            max_level: 10,
            level_costs: DEFAULT_LEVEL_COSTS.to_vec(),
            metric: Metric::Damage,
        }
    }
}

impl OptimizerConfig {
    /// Cost of raising a slot from `level`, if one is defined.
    #[must_use]
    pub fn cost_for(&self, level: u8) -> Option<u32> {
        let index = usize::from(level).checked_sub(1)?;
        self.level_costs.get(index).copied()
    }

    /// Domain runs bought by one spend unit.
    #[must_use]
    pub fn runs_per_unit(&self) -> u32 {
        (self.spend_unit / RESIN_PER_RUN).max(1)
    }

    /// Whether `slot` can still be levelled at all.
    #[must_use]
    pub fn can_level(&self, combatant: &Combatant, slot: AbilitySlot) -> bool {
        let level = combatant.level(slot);
        level < self.max_level && self.cost_for(level).is_some()
    }

    /// Whether every slot is at its cap.
    #[must_use]
    pub fn all_capped(&self, combatant: &Combatant) -> bool {
        !AbilitySlot::ALL
            .into_iter()
            .any(|slot| self.can_level(combatant, slot))
    }

    /// Reject settings the optimizer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spend_unit == 0 {
            return Err(ConfigError::Invalid("spend unit must be positive".into()));
        }
        if self.max_level == 0 {
            return Err(ConfigError::Invalid("max level must be at least 1".into()));
        }
        DropTable::for_tier(self.domain_tier)?;
        Ok(())
    }
}

// ============================================================================
// Step records
// ============================================================================

/// Label of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    /// Regular equipment attempt.
    EquipmentFarm,
    /// Regular ability attempt.
    AbilityFarm,
    /// Ability attempt pushing the burst to its cap.
    BurstFocus,
    /// Equipment attempt after every other option ran dry.
    EquipmentFallback,
}

impl Activity {
    /// Track this activity spends on.
    #[must_use]
    pub const fn track(self) -> Track {
        match self {
            Self::EquipmentFarm | Self::EquipmentFallback => Track::Equipment,
            Self::AbilityFarm | Self::BurstFocus => Track::Ability,
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::EquipmentFarm => "equipment farm",
            Self::AbilityFarm => "ability farm",
            Self::BurstFocus => "burst focus",
            Self::EquipmentFallback => "equipment fallback",
        })
    }
}

/// Track-specific part of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "track", rename_all = "snake_case")]
pub enum StepDetail {
    /// Generated item and its slot.
    Equipment {
        /// Slot rolled.
        slot: EquipmentSlot,
        /// Item generated, kept only when the step was accepted.
        item: Equipment,
    },
    /// Materials farmed and levels bought.
    Ability {
        /// Materials gained from the runs.
        drop: MaterialDrop,
        /// Slots raised by one level, in order.
        levels_gained: Vec<AbilitySlot>,
        /// Levels after the step.
        levels: AbilityLevels,
    },
}

/// One spend unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// What the unit was spent on.
    pub activity: Activity,
    /// Resin consumed.
    pub resin_spent: u32,
    /// Resin left after the step.
    pub resin_remaining: u32,
    /// Whether the combatant changed.
    pub accepted: bool,
    /// Metric before the step.
    pub metric_before: f64,
    /// Metric after the step.
    pub metric_after: f64,
    /// Track-specific detail.
    pub detail: StepDetail,
}

impl StepRecord {
    /// Metric change.
    #[must_use]
    pub fn gain(&self) -> f64 {
        self.metric_after - self.metric_before
    }

    /// Track of this step.
    #[must_use]
    pub const fn track(&self) -> Track {
        self.activity.track()
    }
}

/// Outcome of one optimizer run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Policy name.
    pub policy: String,
    /// Metric maximised.
    pub metric: Metric,
    /// Starting budget.
    pub budget: u32,
    /// Budget left unspent.
    pub resin_remaining: u32,
    /// Metric before the first step.
    pub initial_metric: f64,
    /// Metric after the last step.
    pub final_metric: f64,
    /// Ability levels at the end.
    pub final_levels: AbilityLevels,
    /// Every step in order.
    pub steps: Vec<StepRecord>,
}

impl RunReport {
    /// Total metric change.
    #[must_use]
    pub fn gain(&self) -> f64 {
        self.final_metric - self.initial_metric
    }

    /// Number of accepted steps.
    #[must_use]
    pub fn accepted_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.accepted).count()
    }

    /// Resin spent on a track.
    #[must_use]
    pub fn spent_on(&self, track: Track) -> u32 {
        self.steps
            .iter()
            .filter(|s| s.track() == track)
            .map(|s| s.resin_spent)
            .sum()
    }
}

// ============================================================================
// Optimizer
// ============================================================================

/// Greedy resin optimizer over one evaluator.
pub struct ResinOptimizer<'a, G, M> {
    evaluator: Evaluator<'a>,
    combo: Combo,
    config: OptimizerConfig,
    generator: G,
    drops: M,
    rng: SimRng,
}

impl<'a, G: EquipmentGenerator, M: MaterialSource> ResinOptimizer<'a, G, M> {
    /// Create an optimizer scoring `combo`.
    #[must_use]
    pub fn new(
        evaluator: Evaluator<'a>,
        combo: Combo,
        config: OptimizerConfig,
        generator: G,
        drops: M,
    ) -> Self {
        Self {
            evaluator,
            combo,
            config,
            generator,
            drops,
            rng: SimRng::new(),
        }
    }

    /// Seed the slot picker.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SimRng::with_seed(seed);
        self
    }

    /// Settings in use.
    #[must_use]
    pub const fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Combo being scored.
    #[must_use]
    pub const fn combo(&self) -> &Combo {
        &self.combo
    }

    /// Current metric of a combatant.
    pub fn score(&self, combatant: &Combatant) -> ResinResult<f64> {
        self.evaluator
            .score(combatant, &self.combo, self.config.metric)
    }

    /// Equipment attempt on a uniformly chosen slot.
    pub fn equipment_attempt(&mut self, combatant: &mut Combatant) -> ResinResult<StepRecord> {
        let slot = EquipmentSlot::ALL[self.rng.index(EquipmentSlot::ALL.len())];
        self.equipment_attempt_in(combatant, slot)
    }

    /// Equipment attempt on a given slot.
    pub fn equipment_attempt_in(
        &mut self,
        combatant: &mut Combatant,
        slot: EquipmentSlot,
    ) -> ResinResult<StepRecord> {
        let before = self.score(combatant)?;
        let item = self.generator.generate(slot);
        let upgrade = Upgrade::Equip(item.clone());
        let candidate = self
            .evaluator
            .what_if(combatant, &upgrade, &self.combo, self.config.metric)?;

        let accepted = candidate > before;
        if accepted {
            combatant.apply_upgrade(upgrade);
            combatant.refresh_stats();
            info!(%slot, item = %item, before, after = candidate, "Equipped upgrade");
        } else {
            debug!(%slot, before, candidate, "Discarded equipment roll");
        }

        Ok(StepRecord {
            activity: Activity::EquipmentFarm,
            resin_spent: self.config.spend_unit,
            resin_remaining: 0,
            accepted,
            metric_before: before,
            metric_after: if accepted { candidate } else { before },
            detail: StepDetail::Equipment { slot, item },
        })
    }

    /// Ability attempt. With `focus`, only that slot is levelled and the gain
    /// need not be positive.
    pub fn ability_attempt(
        &mut self,
        combatant: &mut Combatant,
        focus: Option<AbilitySlot>,
    ) -> ResinResult<StepRecord> {
        let before = self.score(combatant)?;
        let drop = self
            .drops
            .simulate_runs(self.config.runs_per_unit(), self.config.domain_tier)?;
        combatant.materials_mut().add_drop(&drop);

        let candidates: Vec<AbilitySlot> =
            focus.map_or_else(|| AbilitySlot::ALL.to_vec(), |slot| vec![slot]);
        let mut current = before;
        let mut levels_gained = Vec::new();

        loop {
            let mut best: Option<(AbilitySlot, u32, f64)> = None;
            for &slot in &candidates {
                if !self.config.can_level(combatant, slot) {
                    continue;
                }
                let Some(cost) = self.config.cost_for(combatant.level(slot)) else {
                    continue;
                };
                if !combatant.materials().can_afford(cost) {
                    continue;
                }
                let after = self.evaluator.what_if(
                    combatant,
                    &Upgrade::LevelUp(slot),
                    &self.combo,
                    self.config.metric,
                )?;
                let gain = after - current;
                if focus.is_none() && gain <= 0.0 {
                    continue;
                }
                if best.map_or(true, |(_, _, best_after)| after > best_after) {
                    best = Some((slot, cost, after));
                }
            }

            let Some((slot, cost, after)) = best else {
                break;
            };
            if let Err(err) = combatant.materials_mut().pay(cost) {
                warn!(%slot, cost, %err, "Level-up payment failed");
                break;
            }
            combatant.apply_upgrade(Upgrade::LevelUp(slot));
            combatant.refresh_stats();
            info!(
                %slot,
                level = combatant.level(slot),
                cost,
                gain = after - current,
                "Levelled ability"
            );
            current = after;
            levels_gained.push(slot);
        }

        debug!(
            drop = %drop,
            levels = %combatant.levels(),
            gained = levels_gained.len(),
            "Ability attempt"
        );
        Ok(StepRecord {
            activity: if focus.is_some() {
                Activity::BurstFocus
            } else {
                Activity::AbilityFarm
            },
            resin_spent: self.config.spend_unit,
            resin_remaining: 0,
            accepted: !levels_gained.is_empty(),
            metric_before: before,
            metric_after: current,
            detail: StepDetail::Ability {
                drop,
                levels_gained,
                levels: combatant.levels(),
            },
        })
    }

    fn attempt(&mut self, combatant: &mut Combatant, track: Track) -> ResinResult<StepRecord> {
        match track {
            Track::Equipment => self.equipment_attempt(combatant),
            Track::Ability => self.ability_attempt(combatant, None),
        }
    }

    /// Spend `budget` resin on `combatant` under `policy`.
    pub fn run(
        &mut self,
        combatant: &mut Combatant,
        budget: u32,
        policy: &Policy,
    ) -> ResinResult<RunReport> {
        self.config.validate()?;
        policy.validate()?;

        let unit = self.config.spend_unit;
        let initial_metric = self.score(combatant)?;
        let mut ledger = Ledger::new(budget, unit);

        match policy {
            Policy::EquipmentOnly => {
                while ledger.can_spend() {
                    let step = self.equipment_attempt(combatant)?;
                    ledger.charge(step);
                }
            }
            Policy::AbilityOnly => {
                while ledger.can_spend() && !self.config.all_capped(combatant) {
                    let step = self.ability_attempt(combatant, None)?;
                    ledger.charge(step);
                }
            }
            Policy::GreedySwap => {
                while ledger.can_spend() {
                    let step = self.equipment_attempt(combatant)?;
                    if ledger.charge(step) > 0.0 || !ledger.can_spend() {
                        continue;
                    }
                    let step = self.ability_attempt(combatant, None)?;
                    if ledger.charge(step) > 0.0 {
                        continue;
                    }

                    debug!(remaining = ledger.remaining, "No track improves; burst fallback");
                    while ledger.can_spend() && self.config.can_level(combatant, AbilitySlot::Burst)
                    {
                        let step = self.ability_attempt(combatant, Some(AbilitySlot::Burst))?;
                        ledger.charge(step);
                    }
                    while ledger.can_spend() {
                        let mut step = self.equipment_attempt(combatant)?;
                        step.activity = Activity::EquipmentFallback;
                        ledger.charge(step);
                    }
                }
            }
            Policy::ThresholdSwitch { threshold, primary } => {
                let mut track = *primary;
                while ledger.can_spend() {
                    if track == Track::Ability && self.config.all_capped(combatant) {
                        track = Track::Equipment;
                    }
                    let step = self.attempt(combatant, track)?;
                    let per_point = ledger.charge(step) / f64::from(unit);
                    if per_point < *threshold {
                        debug!(from = %track, per_point, "Gain below threshold; switching track");
                        track = track.other();
                    }
                }
            }
            Policy::StatGate {
                primary,
                thresholds,
            } => {
                while ledger.can_spend() {
                    let snapshot = combatant.snapshot();
                    if thresholds.iter().all(|t| t.is_met(&snapshot)) {
                        break;
                    }
                    if *primary == Track::Ability && self.config.all_capped(combatant) {
                        break;
                    }
                    let step = self.attempt(combatant, *primary)?;
                    ledger.charge(step);
                }
                let secondary = primary.other();
                while ledger.can_spend() {
                    if secondary == Track::Ability && self.config.all_capped(combatant) {
                        break;
                    }
                    let step = self.attempt(combatant, secondary)?;
                    if ledger.charge(step) <= 0.0 {
                        break;
                    }
                }
            }
        }

        let final_metric = self.score(combatant)?;
        let report = RunReport {
            policy: policy.name().to_string(),
            metric: self.config.metric,
            budget,
            resin_remaining: ledger.remaining,
            initial_metric,
            final_metric,
            final_levels: combatant.levels(),
            steps: ledger.steps,
        };
        info!(
            policy = %policy,
            budget,
            steps = report.steps.len(),
            accepted = report.accepted_steps(),
            initial = initial_metric,
            final_metric,
            "Run finished"
        );
        Ok(report)
    }
}

/// Budget bookkeeping for one run.
struct Ledger {
    remaining: u32,
    unit: u32,
    steps: Vec<StepRecord>,
}

impl Ledger {
    fn new(budget: u32, unit: u32) -> Self {
        Self {
            remaining: budget,
            unit,
            steps: Vec::new(),
        }
    }

    fn can_spend(&self) -> bool {
        self.unit > 0 && self.remaining >= self.unit
    }

    /// Deduct one unit, record the step and return its gain.
    fn charge(&mut self, mut step: StepRecord) -> f64 {
        self.remaining = self.remaining.saturating_sub(self.unit);
        step.resin_spent = self.unit;
        step.resin_remaining = self.remaining;
        let gain = step.gain();
        self.steps.push(step);
        gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::StatThreshold;
    use resin_combat::{
        EvalContext, MultiplierEntry, MultiplierTable, Scaling, SnapshotStat, StatTriple,
    };
    use resin_common::{Element, StatKind, WeaponClass};

    /// Always rolls the same main stat.
    struct FixedGenerator(StatKind, f64);

    impl EquipmentGenerator for FixedGenerator {
        fn generate(&mut self, slot: EquipmentSlot) -> Equipment {
            Equipment::new(slot, self.0.clone(), self.1)
        }
    }

    /// Always drops the same materials.
    struct FixedDrops(MaterialDrop);

    impl MaterialSource for FixedDrops {
        fn simulate_runs(&mut self, runs: u32, tier: u8) -> Result<MaterialDrop, ConfigError> {
            DropTable::for_tier(tier)?;
            let mut total = MaterialDrop::default();
            for _ in 0..runs {
                total.merge(&self.0);
            }
            Ok(total)
        }
    }

    fn tables() -> MultiplierTable {
        let mut t = MultiplierTable::new();
        for level in 1..=10u8 {
            let step = f64::from(level - 1);
            t.insert(
                "Ember",
                AbilitySlot::Basic,
                level,
                "N1",
                MultiplierEntry::new(100.0 + step * 5.0, Scaling::Atk),
            );
            t.insert(
                "Ember",
                AbilitySlot::Skill,
                level,
                "E",
                MultiplierEntry::new(150.0, Scaling::Atk),
            );
            t.insert(
                "Ember",
                AbilitySlot::Burst,
                level,
                "Q",
                MultiplierEntry::new(300.0 + step * 100.0, Scaling::Atk),
            );
        }
        t
    }

    fn ember() -> Combatant {
        Combatant::new("Ember", Element::Pyro, WeaponClass::Sword)
            .with_base(StatTriple::new(10_000.0, 800.0, 600.0))
    }

    fn optimizer<'a, G: EquipmentGenerator, M: MaterialSource>(
        t: &'a MultiplierTable,
        generator: G,
        drops: M,
    ) -> ResinOptimizer<'a, G, M> {
        let evaluator = Evaluator::new(t, EvalContext::new());
        let combo = Combo::parse("N1 Q").expect("valid combo");
        ResinOptimizer::new(evaluator, combo, OptimizerConfig::default(), generator, drops)
            .with_seed(7)
    }

    #[test]
    fn test_worse_item_is_discarded() {
        let t = tables();
        let mut opt = optimizer(
            &t,
            FixedGenerator(StatKind::HpPercent, 46.6),
            FixedDrops(MaterialDrop::default()),
        );
        let mut c = ember();
        let current = Equipment::new(EquipmentSlot::Sands, StatKind::AtkPercent, 46.6);
        c.equip(current.clone());

        let step = opt
            .equipment_attempt_in(&mut c, EquipmentSlot::Sands)
            .expect("attempt runs");
        assert!(!step.accepted);
        assert!(step.gain().abs() < 1e-12);
        assert_eq!(c.equipment().get(EquipmentSlot::Sands), Some(&current));
    }

    #[test]
    fn test_better_item_is_equipped() {
        let t = tables();
        let mut opt = optimizer(
            &t,
            FixedGenerator(StatKind::AtkPercent, 46.6),
            FixedDrops(MaterialDrop::default()),
        );
        let mut c = ember();
        let step = opt
            .equipment_attempt_in(&mut c, EquipmentSlot::Circlet)
            .expect("attempt runs");
        assert!(step.accepted);
        assert!(step.gain() > 0.0);
        assert!(c.equipment().get(EquipmentSlot::Circlet).is_some());
        assert!(c.stats().is_some());
    }

    #[test]
    fn test_greedy_picks_higher_gain_slot() {
        let t = tables();
        // 3 teachings: exactly one level-up from level 1.
        let mut opt = optimizer(
            &t,
            FixedGenerator(StatKind::FlatHp, 4780.0),
            FixedDrops(MaterialDrop::new(3, 0, 0)),
        );
        let mut c = ember();
        let step = opt.ability_attempt(&mut c, None).expect("attempt runs");

        assert!(step.accepted);
        assert_eq!(c.level(AbilitySlot::Burst), 2);
        assert_eq!(c.level(AbilitySlot::Basic), 1);
        assert_eq!(c.level(AbilitySlot::Skill), 1);
        assert_eq!(c.materials().total_value(), 0);
        match step.detail {
            StepDetail::Ability { levels_gained, .. } => {
                assert_eq!(levels_gained, vec![AbilitySlot::Burst]);
            }
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn test_no_gain_slot_is_never_bought() {
        let t = tables();
        let mut opt = optimizer(
            &t,
            FixedGenerator(StatKind::FlatHp, 4780.0),
            FixedDrops(MaterialDrop::new(0, 0, 100)),
        );
        let mut c = ember();
        opt.ability_attempt(&mut c, None).expect("attempt runs");
        // The combo never casts the skill.
        assert_eq!(c.level(AbilitySlot::Skill), 1);
        assert!(c.level(AbilitySlot::Burst) > 1);
    }

    #[test]
    fn test_unaffordable_attempt_changes_nothing() {
        let t = tables();
        let mut opt = optimizer(
            &t,
            FixedGenerator(StatKind::FlatHp, 4780.0),
            FixedDrops(MaterialDrop::new(1, 0, 0)),
        );
        let mut c = ember();
        let step = opt.ability_attempt(&mut c, None).expect("attempt runs");
        assert!(!step.accepted);
        assert_eq!(c.levels(), AbilityLevels::uniform(1));
        assert_eq!(c.materials().total_value(), 1);
    }

    #[test]
    fn test_equipment_only_spends_whole_budget() {
        let t = tables();
        let mut opt = optimizer(
            &t,
            FixedGenerator(StatKind::HpPercent, 46.6),
            FixedDrops(MaterialDrop::default()),
        );
        let mut c = ember();
        let report = opt
            .run(&mut c, 110, &Policy::EquipmentOnly)
            .expect("run completes");
        assert_eq!(report.steps.len(), 5);
        assert_eq!(report.resin_remaining, 10);
        assert_eq!(report.spent_on(Track::Equipment), 100);
        assert_eq!(report.steps[4].resin_remaining, 10);
    }

    #[test]
    fn test_ability_only_stops_when_capped() {
        let t = tables();
        let mut opt = optimizer(
            &t,
            FixedGenerator(StatKind::FlatHp, 4780.0),
            FixedDrops(MaterialDrop::new(0, 0, 1000)),
        );
        let mut c = ember();
        let report = opt
            .run(&mut c, 2000, &Policy::AbilityOnly)
            .expect("run completes");
        assert_eq!(c.level(AbilitySlot::Burst), 10);
        assert_eq!(c.level(AbilitySlot::Basic), 10);
        // Skill never improves the combo, so it is never capped and the
        // policy keeps farming until the budget runs out.
        assert_eq!(c.level(AbilitySlot::Skill), 1);
        assert_eq!(report.resin_remaining, 0);
    }

    #[test]
    fn test_greedy_swap_falls_back_to_burst_then_equipment() {
        let t = tables();
        let mut opt = optimizer(
            &t,
            FixedGenerator(StatKind::HpPercent, 46.6),
            FixedDrops(MaterialDrop::new(1, 0, 0)),
        );
        let mut c = ember();
        let report = opt
            .run(&mut c, 200, &Policy::GreedySwap)
            .expect("run completes");

        assert_eq!(report.steps[0].activity, Activity::EquipmentFarm);
        assert_eq!(report.steps[1].activity, Activity::AbilityFarm);
        assert!(report
            .steps
            .iter()
            .any(|s| s.activity == Activity::BurstFocus));
        assert_eq!(report.resin_remaining, 0);
        assert_eq!(report.steps.len(), 10);
    }

    #[test]
    fn test_stat_gate_switches_once_met() {
        let t = tables();
        let mut opt = optimizer(
            &t,
            FixedGenerator(StatKind::AtkPercent, 46.6),
            FixedDrops(MaterialDrop::new(0, 0, 0)),
        );
        let mut c = ember();
        let policy = Policy::StatGate {
            primary: Track::Equipment,
            thresholds: vec![StatThreshold {
                stat: SnapshotStat::TotalAtk,
                min: 1000.0,
            }],
        };
        let report = opt.run(&mut c, 200, &policy).expect("run completes");
        // One ATK% piece clears the gate, then an ability step without
        // materials brings nothing and ends the run.
        assert_eq!(report.steps.len(), 2);
        assert_eq!(report.steps[0].track(), Track::Equipment);
        assert_eq!(report.steps[1].track(), Track::Ability);
        assert_eq!(report.resin_remaining, 160);
    }

    #[test]
    fn test_threshold_switch_alternates_without_gain() {
        let t = tables();
        let mut opt = optimizer(
            &t,
            FixedGenerator(StatKind::HpPercent, 46.6),
            FixedDrops(MaterialDrop::default()),
        );
        let mut c = ember();
        let policy = Policy::ThresholdSwitch {
            threshold: 1.0,
            primary: Track::Ability,
        };
        let report = opt.run(&mut c, 80, &policy).expect("run completes");
        let tracks: Vec<Track> = report.steps.iter().map(StepRecord::track).collect();
        assert_eq!(
            tracks,
            vec![
                Track::Ability,
                Track::Equipment,
                Track::Ability,
                Track::Equipment
            ]
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let t = tables();
        let mut opt = optimizer(
            &t,
            FixedGenerator(StatKind::FlatHp, 4780.0),
            FixedDrops(MaterialDrop::default()),
        );
        opt.config.domain_tier = 9;
        let err = opt
            .run(&mut ember(), 100, &Policy::EquipmentOnly)
            .unwrap_err();
        assert!(err.to_string().contains('9'));
    }

    #[test]
    fn test_cost_table_lookup() {
        let config = OptimizerConfig::default();
        assert_eq!(config.cost_for(1), Some(3));
        assert_eq!(config.cost_for(9), Some(144));
        assert_eq!(config.cost_for(10), None);
        assert_eq!(config.cost_for(0), None);
        assert_eq!(config.runs_per_unit(), 1);
    }
}
