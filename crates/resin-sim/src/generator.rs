//! Equipment generation.
//!
//! The random generator rolls five-star items at their maximum main-stat
//! value: the main stat is fixed for flowers and feathers and weighted for
//! the other slots, four distinct substats are drawn by weight (never the
//! main stat), and upgrade rolls land on uniformly chosen lines.

use resin_combat::{Equipment, Substat};
use resin_common::{Element, EquipmentSlot, StatKind};
use tracing::debug;

use crate::rng::SimRng;

/// Chance that an item starts with three substats instead of four.
pub const THREE_LINE_CHANCE: f64 = 0.8;

/// Produces equipment for a slot.
pub trait EquipmentGenerator {
    /// Generate one item for `slot`.
    fn generate(&mut self, slot: EquipmentSlot) -> Equipment;
}

/// Maximum five-star main-stat value in display units.
#[must_use]
pub fn main_stat_value(kind: &StatKind) -> f64 {
    match kind {
        StatKind::FlatHp => 4780.0,
        StatKind::FlatAtk => 311.0,
        StatKind::HpPercent | StatKind::AtkPercent => 46.6,
        StatKind::DefPercent => 58.3,
        StatKind::ElementalMastery => 186.5,
        StatKind::EnergyRecharge => 51.8,
        StatKind::CritRate => 31.1,
        StatKind::CritDmg => 62.2,
        StatKind::HealingBonus => 35.9,
        StatKind::DamageBonus(Element::Physical) => 58.3,
        StatKind::DamageBonus(_) => 46.6,
        StatKind::FlatDef | StatKind::Unsupported(_) => 0.0,
    }
}

/// Main-stat weights for a slot.
#[must_use]
pub fn main_stat_weights(slot: EquipmentSlot) -> Vec<(StatKind, f64)> {
    match slot {
        EquipmentSlot::Flower => vec![(StatKind::FlatHp, 1.0)],
        EquipmentSlot::Feather => vec![(StatKind::FlatAtk, 1.0)],
        EquipmentSlot::Sands => vec![
            (StatKind::HpPercent, 26.68),
            (StatKind::AtkPercent, 26.66),
            (StatKind::DefPercent, 26.66),
            (StatKind::EnergyRecharge, 10.0),
            (StatKind::ElementalMastery, 10.0),
        ],
        EquipmentSlot::Goblet => {
            let mut weights = vec![
                (StatKind::HpPercent, 19.25),
                (StatKind::AtkPercent, 19.25),
                (StatKind::DefPercent, 19.0),
            ];
            weights.extend(
                Element::ALL
                    .iter()
                    .map(|element| (StatKind::DamageBonus(*element), 5.0)),
            );
            weights.push((StatKind::ElementalMastery, 2.5));
            weights
        }
        EquipmentSlot::Circlet => vec![
            (StatKind::HpPercent, 19.25),
            (StatKind::AtkPercent, 19.25),
            (StatKind::DefPercent, 19.0),
            (StatKind::CritRate, 10.0),
            (StatKind::CritDmg, 10.0),
            (StatKind::HealingBonus, 10.0),
            (StatKind::ElementalMastery, 4.0),
        ],
    }
}

/// Substat kinds with their draw weights.
#[must_use]
pub fn substat_weights() -> [(StatKind, f64); 10] {
    [
        (StatKind::FlatHp, 6.0),
        (StatKind::FlatAtk, 6.0),
        (StatKind::FlatDef, 6.0),
        (StatKind::HpPercent, 4.0),
        (StatKind::AtkPercent, 4.0),
        (StatKind::DefPercent, 4.0),
        (StatKind::EnergyRecharge, 4.0),
        (StatKind::ElementalMastery, 4.0),
        (StatKind::CritRate, 3.0),
        (StatKind::CritDmg, 3.0),
    ]
}

/// The four possible values of one substat roll.
#[must_use]
pub fn roll_tiers(kind: &StatKind) -> [f64; 4] {
    match kind {
        StatKind::FlatHp => [209.13, 239.0, 268.88, 298.75],
        StatKind::FlatAtk => [13.62, 15.56, 17.51, 19.45],
        StatKind::FlatDef => [16.2, 18.52, 20.83, 23.15],
        StatKind::HpPercent | StatKind::AtkPercent => [4.08, 4.66, 5.25, 5.83],
        StatKind::DefPercent => [5.10, 5.83, 6.56, 7.29],
        StatKind::ElementalMastery => [16.32, 18.65, 20.98, 23.31],
        StatKind::EnergyRecharge => [4.53, 5.18, 5.83, 6.48],
        StatKind::CritRate => [2.72, 3.11, 3.50, 3.89],
        StatKind::CritDmg => [5.44, 6.22, 6.99, 7.77],
        _ => [0.0; 4],
    }
}

/// Generator backed by a seedable RNG.
#[derive(Debug, Clone, Default)]
pub struct RandomEquipmentGenerator {
    rng: SimRng,
}

impl RandomEquipmentGenerator {
    /// Entropy-seeded generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deterministic generator.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SimRng::with_seed(seed),
        }
    }

    /// Generator over an existing RNG.
    #[must_use]
    pub fn with_rng(rng: SimRng) -> Self {
        Self { rng }
    }

    fn roll_main_stat(&mut self, slot: EquipmentSlot) -> StatKind {
        let table = main_stat_weights(slot);
        let weights: Vec<f64> = table.iter().map(|(_, w)| *w).collect();
        let index = self.rng.weighted_index(&weights).unwrap_or(0);
        table
            .into_iter()
            .nth(index)
            .map_or(StatKind::FlatHp, |(kind, _)| kind)
    }

    fn draw_substats(&mut self, main_stat: &StatKind) -> Vec<StatKind> {
        let mut pool: Vec<(StatKind, f64)> = substat_weights()
            .into_iter()
            .filter(|(kind, _)| kind != main_stat)
            .collect();
        let mut picked = Vec::with_capacity(4);
        while picked.len() < 4 && !pool.is_empty() {
            let weights: Vec<f64> = pool.iter().map(|(_, w)| *w).collect();
            let Some(index) = self.rng.weighted_index(&weights) else {
                break;
            };
            picked.push(pool.swap_remove(index).0);
        }
        picked
    }

    fn roll(&mut self, kind: &StatKind) -> f64 {
        let tiers = roll_tiers(kind);
        tiers[self.rng.index(tiers.len())]
    }
}

impl EquipmentGenerator for RandomEquipmentGenerator {
    fn generate(&mut self, slot: EquipmentSlot) -> Equipment {
        let main_stat = self.roll_main_stat(slot);
        let main_value = main_stat_value(&main_stat);
        let kinds = self.draw_substats(&main_stat);

        let starts_with_three = self.rng.chance(THREE_LINE_CHANCE);
        let upgrades = if starts_with_three { 4 } else { 5 };

        // With three starting lines the fourth arrives on the first upgrade,
        // which is not counted as a roll on an existing line.
        let mut substats: Vec<Substat> = kinds
            .iter()
            .map(|kind| Substat::new(kind.clone(), self.roll(kind)))
            .collect();

        if !substats.is_empty() {
            for _ in 0..upgrades {
                let line = self.rng.index(substats.len());
                let kind = substats[line].kind.clone();
                substats[line].value += self.roll(&kind);
                substats[line].upgrades += 1;
            }
        }

        debug!(
            %slot,
            main = %main_stat,
            starts_with_three,
            "Generated equipment"
        );
        Equipment::new(slot, main_stat, main_value).with_substats(substats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fixed_main_stats() {
        let mut generator = RandomEquipmentGenerator::with_seed(11);
        let flower = generator.generate(EquipmentSlot::Flower);
        assert_eq!(flower.main_stat, StatKind::FlatHp);
        assert!((flower.main_value - 4780.0).abs() < 1e-9);
        let feather = generator.generate(EquipmentSlot::Feather);
        assert_eq!(feather.main_stat, StatKind::FlatAtk);
        assert!((feather.main_value - 311.0).abs() < 1e-9);
    }

    #[test]
    fn test_substats_distinct_and_exclude_main() {
        let mut generator = RandomEquipmentGenerator::with_seed(42);
        for _ in 0..200 {
            for slot in EquipmentSlot::ALL {
                let item = generator.generate(slot);
                assert_eq!(item.substats.len(), 4);
                let kinds: HashSet<_> = item.substats.iter().map(|s| s.kind.clone()).collect();
                assert_eq!(kinds.len(), 4);
                assert!(!kinds.contains(&item.main_stat));
            }
        }
    }

    #[test]
    fn test_upgrade_totals() {
        let mut generator = RandomEquipmentGenerator::with_seed(5);
        let mut seen = HashSet::new();
        for _ in 0..300 {
            let total = generator.generate(EquipmentSlot::Circlet).total_upgrades();
            assert!(total == 4 || total == 5);
            seen.insert(total);
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_values_are_sums_of_tier_rolls() {
        let mut generator = RandomEquipmentGenerator::with_seed(9);
        for _ in 0..100 {
            let item = generator.generate(EquipmentSlot::Sands);
            for sub in &item.substats {
                let tiers = roll_tiers(&sub.kind);
                let rolls = f64::from(sub.upgrades + 1);
                assert!(sub.value >= tiers[0] * rolls - 1e-9);
                assert!(sub.value <= tiers[3] * rolls + 1e-9);
            }
        }
    }

    #[test]
    fn test_main_stat_values() {
        assert!((main_stat_value(&StatKind::DamageBonus(Element::Physical)) - 58.3).abs() < 1e-9);
        assert!((main_stat_value(&StatKind::DamageBonus(Element::Hydro)) - 46.6).abs() < 1e-9);
        assert!((main_stat_value(&StatKind::CritDmg) - 62.2).abs() < 1e-9);
    }

    #[test]
    fn test_same_seed_same_item() {
        let a = RandomEquipmentGenerator::with_seed(77).generate(EquipmentSlot::Goblet);
        let b = RandomEquipmentGenerator::with_seed(77).generate(EquipmentSlot::Goblet);
        assert_eq!(a, b);
    }
}
