//! Equipment-only versus ability-only investment.

use resin_combat::{AbilityLevels, Combatant, StatSnapshot};
use resin_common::ResinResult;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::drops::MaterialSource;
use crate::generator::EquipmentGenerator;
use crate::optimizer::{ResinOptimizer, RunReport};
use crate::policy::{Policy, Track};

/// Result of spending the budget on one track only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    /// Track spent on.
    pub track: Track,
    /// Metric before spending.
    pub start: f64,
    /// Metric after spending.
    pub end: f64,
    /// Absolute gain.
    pub gain: f64,
    /// Gain relative to the start, in percent.
    pub percent_gain: f64,
    /// Ability levels at the end.
    pub final_levels: AbilityLevels,
    /// Resolved stats at the end.
    pub final_snapshot: StatSnapshot,
    /// Full run.
    pub report: RunReport,
}

impl TrackSummary {
    fn from_run(track: Track, report: RunReport, combatant: &Combatant) -> Self {
        let gain = report.gain();
        let percent_gain = if report.initial_metric > 0.0 {
            gain / report.initial_metric * 100.0
        } else {
            0.0
        };
        Self {
            track,
            start: report.initial_metric,
            end: report.final_metric,
            gain,
            percent_gain,
            final_levels: combatant.levels(),
            final_snapshot: combatant.snapshot(),
            report,
        }
    }
}

/// Both tracks side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackComparison {
    /// Equipment-only run.
    pub equipment: TrackSummary,
    /// Ability-only run.
    pub ability: TrackSummary,
    /// Track with the larger gain, `None` on a tie.
    pub winner: Option<Track>,
}

impl<G: EquipmentGenerator, M: MaterialSource> ResinOptimizer<'_, G, M> {
    /// Spend `budget` on each track using independent copies of `combatant`.
    pub fn compare_tracks(
        &mut self,
        combatant: &Combatant,
        budget: u32,
    ) -> ResinResult<TrackComparison> {
        let mut equipment_copy = combatant.clone();
        let equipment_run = self.run(&mut equipment_copy, budget, &Policy::EquipmentOnly)?;
        let equipment = TrackSummary::from_run(Track::Equipment, equipment_run, &equipment_copy);

        let mut ability_copy = combatant.clone();
        let ability_run = self.run(&mut ability_copy, budget, &Policy::AbilityOnly)?;
        let ability = TrackSummary::from_run(Track::Ability, ability_run, &ability_copy);

        let winner = if equipment.gain > ability.gain {
            Some(Track::Equipment)
        } else if ability.gain > equipment.gain {
            Some(Track::Ability)
        } else {
            None
        };

        info!(
            budget,
            equipment_gain = equipment.gain,
            ability_gain = ability.gain,
            winner = ?winner,
            "Compared tracks"
        );
        Ok(TrackComparison {
            equipment,
            ability,
            winner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drops::DomainDrops;
    use crate::generator::RandomEquipmentGenerator;
    use crate::optimizer::OptimizerConfig;
    use resin_combat::{
        Combo, EvalContext, Evaluator, MultiplierEntry, MultiplierTable, Scaling, StatTriple,
    };
    use resin_common::{AbilitySlot, Element, WeaponClass};

    fn tables() -> MultiplierTable {
        let mut t = MultiplierTable::new();
        for level in 1..=10u8 {
            let value = 200.0 + f64::from(level) * 20.0;
            for (slot, tag) in [
                (AbilitySlot::Basic, "N1"),
                (AbilitySlot::Skill, "E"),
                (AbilitySlot::Burst, "Q"),
            ] {
                t.insert("Ember", slot, level, tag, MultiplierEntry::new(value, Scaling::Atk));
            }
        }
        t
    }

    #[test]
    fn test_tracks_run_on_independent_copies() {
        let t = tables();
        let evaluator = Evaluator::new(&t, EvalContext::new());
        let combo = Combo::parse("E N1 Q").expect("valid combo");
        let mut opt = ResinOptimizer::new(
            evaluator,
            combo,
            OptimizerConfig::default(),
            RandomEquipmentGenerator::with_seed(1),
            DomainDrops::with_seed(2),
        )
        .with_seed(3);
        let c = Combatant::new("Ember", Element::Pyro, WeaponClass::Sword)
            .with_base(StatTriple::new(12_000.0, 900.0, 700.0));

        let comparison = opt.compare_tracks(&c, 400).expect("comparison runs");

        assert_eq!(c.levels(), AbilityLevels::uniform(1));
        assert!(c.equipment().is_empty());
        assert_eq!(comparison.equipment.final_levels, AbilityLevels::uniform(1));
        assert!((comparison.equipment.start - comparison.ability.start).abs() < 1e-9);
        assert!(comparison.ability.gain > 0.0);
        assert!(comparison.equipment.gain >= 0.0);
        assert_eq!(comparison.ability.report.spent_on(Track::Equipment), 0);
        match comparison.winner {
            Some(Track::Ability) => assert!(comparison.ability.gain > comparison.equipment.gain),
            Some(Track::Equipment) => assert!(comparison.equipment.gain > comparison.ability.gain),
            None => assert!((comparison.ability.gain - comparison.equipment.gain).abs() < 1e-12),
        }
    }
}
