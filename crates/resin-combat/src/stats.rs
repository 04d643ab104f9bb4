//! Stat aggregation.
//!
//! This module provides:
//! - The transient [`StatOverlay`] layered on top of permanent stats
//! - The resolved [`StatSnapshot`] the damage formula reads
//! - [`resolve`] and [`resolve_with`], which fold overlay, ascension,
//!   weapon and equipment contributions into a snapshot

use resin_common::{Element, StatKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

use crate::combatant::Combatant;

/// Critical hit rate every combatant starts with.
pub const BASE_CRIT_RATE: f64 = 0.05;
/// Critical hit damage every combatant starts with.
pub const BASE_CRIT_DMG: f64 = 0.5;
/// Energy recharge every combatant starts with.
pub const BASE_ENERGY_RECHARGE: f64 = 1.0;

// ============================================================================
// Stat triple
// ============================================================================

/// HP, ATK and DEF values, used for base stats as well as percent and flat
/// bonus accumulators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatTriple {
    /// Hit points.
    pub hp: f64,
    /// Attack.
    pub atk: f64,
    /// Defense.
    pub def: f64,
}

impl StatTriple {
    /// Create a triple.
    #[must_use]
    pub const fn new(hp: f64, atk: f64, def: f64) -> Self {
        Self { hp, atk, def }
    }

    /// Read one component.
    #[must_use]
    pub const fn get(&self, stat: BonusStat) -> f64 {
        match stat {
            BonusStat::Hp => self.hp,
            BonusStat::Atk => self.atk,
            BonusStat::Def => self.def,
        }
    }

    /// Mutable access to one component.
    pub fn get_mut(&mut self, stat: BonusStat) -> &mut f64 {
        match stat {
            BonusStat::Hp => &mut self.hp,
            BonusStat::Atk => &mut self.atk,
            BonusStat::Def => &mut self.def,
        }
    }
}

/// One of the three scaling base stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BonusStat {
    /// Hit points.
    Hp,
    /// Attack.
    Atk,
    /// Defense.
    Def,
}

impl fmt::Display for BonusStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hp => "HP",
            Self::Atk => "ATK",
            Self::Def => "DEF",
        })
    }
}

// ============================================================================
// Overlay
// ============================================================================

/// Transient stat contributions, all in fraction form.
///
/// Applied before the permanent layers during resolution. Buffs add to it
/// while a combo is evaluated and subtract their contribution afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatOverlay {
    /// Percent bonuses to base HP/ATK/DEF.
    pub percent: StatTriple,
    /// Flat bonuses to HP/ATK/DEF.
    pub flat: StatTriple,
    /// Additional crit rate.
    pub crit_rate: f64,
    /// Additional crit damage.
    pub crit_dmg: f64,
    /// Additional elemental mastery.
    pub elemental_mastery: f64,
    /// Additional energy recharge.
    pub energy_recharge: f64,
    /// Additional healing bonus.
    pub healing_bonus: f64,
    /// Per-element damage bonus.
    pub element_bonus: BTreeMap<Element, f64>,
    /// Damage bonus applying to every element.
    pub damage_bonus: f64,
}

impl StatOverlay {
    /// Create an empty overlay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a contribution of `kind` in fraction form.
    ///
    /// Returns `false` (and changes nothing) for unsupported kinds.
    pub fn add(&mut self, kind: &StatKind, value: f64) -> bool {
        match kind {
            StatKind::HpPercent => self.percent.hp += value,
            StatKind::FlatHp => self.flat.hp += value,
            StatKind::AtkPercent => self.percent.atk += value,
            StatKind::FlatAtk => self.flat.atk += value,
            StatKind::DefPercent => self.percent.def += value,
            StatKind::FlatDef => self.flat.def += value,
            StatKind::CritRate => self.crit_rate += value,
            StatKind::CritDmg => self.crit_dmg += value,
            StatKind::ElementalMastery => self.elemental_mastery += value,
            StatKind::EnergyRecharge => self.energy_recharge += value,
            StatKind::HealingBonus => self.healing_bonus += value,
            StatKind::DamageBonus(element) => {
                *self.element_bonus.entry(*element).or_insert(0.0) += value;
            }
            StatKind::Unsupported(_) => return false,
        }
        true
    }

    /// Add the same damage bonus to every element.
    #[must_use]
    pub fn with_damage_bonus(mut self, value: f64) -> Self {
        self.damage_bonus += value;
        self
    }

    /// Add a flat bonus.
    #[must_use]
    pub fn with_flat(mut self, stat: BonusStat, value: f64) -> Self {
        *self.flat.get_mut(stat) += value;
        self
    }

    fn element(&self, element: Element) -> f64 {
        self.element_bonus.get(&element).copied().unwrap_or(0.0)
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Fully resolved stats of a combatant at one moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSnapshot {
    /// Base HP/ATK/DEF, ATK including the weapon's base attack.
    pub base: StatTriple,
    /// Final HP.
    pub total_hp: f64,
    /// Final ATK.
    pub total_atk: f64,
    /// Final DEF.
    pub total_def: f64,
    /// Crit rate as a fraction.
    pub crit_rate: f64,
    /// Crit damage as a fraction.
    pub crit_dmg: f64,
    /// Elemental mastery.
    pub elemental_mastery: f64,
    /// Energy recharge as a fraction.
    pub energy_recharge: f64,
    /// Healing bonus as a fraction.
    pub healing_bonus: f64,
    /// Damage bonus per element; every element is present.
    pub element_bonus: BTreeMap<Element, f64>,
    /// Damage bonus applying to every element.
    pub damage_bonus: f64,
}

impl StatSnapshot {
    /// Damage bonus applied to hits of `element`.
    #[must_use]
    pub fn damage_bonus_for(&self, element: Element) -> f64 {
        self.element_bonus.get(&element).copied().unwrap_or(0.0) + self.damage_bonus
    }

    /// Final value of one of HP/ATK/DEF.
    #[must_use]
    pub const fn total(&self, stat: BonusStat) -> f64 {
        match stat {
            BonusStat::Hp => self.total_hp,
            BonusStat::Atk => self.total_atk,
            BonusStat::Def => self.total_def,
        }
    }

    /// Read a stat for thresholds and reports.
    #[must_use]
    pub fn get(&self, stat: SnapshotStat) -> f64 {
        match stat {
            SnapshotStat::TotalHp => self.total_hp,
            SnapshotStat::TotalAtk => self.total_atk,
            SnapshotStat::TotalDef => self.total_def,
            SnapshotStat::CritRate => self.crit_rate,
            SnapshotStat::CritDmg => self.crit_dmg,
            SnapshotStat::ElementalMastery => self.elemental_mastery,
            SnapshotStat::EnergyRecharge => self.energy_recharge,
            SnapshotStat::HealingBonus => self.healing_bonus,
            SnapshotStat::DamageBonus(element) => self.damage_bonus_for(element),
        }
    }
}

/// Addressable snapshot fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStat {
    /// Final HP.
    TotalHp,
    /// Final ATK.
    TotalAtk,
    /// Final DEF.
    TotalDef,
    /// Crit rate.
    CritRate,
    /// Crit damage.
    CritDmg,
    /// Elemental mastery.
    ElementalMastery,
    /// Energy recharge.
    EnergyRecharge,
    /// Healing bonus.
    HealingBonus,
    /// Damage bonus for one element.
    DamageBonus(Element),
}

impl fmt::Display for SnapshotStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TotalHp => f.write_str("HP"),
            Self::TotalAtk => f.write_str("ATK"),
            Self::TotalDef => f.write_str("DEF"),
            Self::CritRate => f.write_str("CRIT Rate"),
            Self::CritDmg => f.write_str("CRIT DMG"),
            Self::ElementalMastery => f.write_str("Elemental Mastery"),
            Self::EnergyRecharge => f.write_str("Energy Recharge"),
            Self::HealingBonus => f.write_str("Healing Bonus"),
            Self::DamageBonus(element) => write!(f, "{element} DMG Bonus"),
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve a combatant's stats with its own overlay.
#[must_use]
pub fn resolve(combatant: &Combatant) -> StatSnapshot {
    resolve_with(combatant, combatant.overlay())
}

/// Resolve a combatant's stats on top of an explicit overlay.
///
/// Layers are applied in order: overlay, ascension bonus, weapon substat,
/// then every equipped item's main stat and substats. Nothing is mutated.
#[must_use]
pub fn resolve_with(combatant: &Combatant, overlay: &StatOverlay) -> StatSnapshot {
    let weapon_atk = combatant.weapon().map_or(0.0, |w| w.base_atk);
    let raw = combatant.base();
    let base = StatTriple::new(raw.hp, raw.atk + weapon_atk, raw.def);

    let mut acc = overlay.clone();

    if let Some(ascension) = combatant.ascension() {
        apply(&mut acc, &ascension.kind, ascension.value, "ascension");
    }

    if let Some(weapon) = combatant.weapon() {
        if let Some(bonus) = &weapon.substat {
            apply(&mut acc, &bonus.kind, bonus.value, &weapon.name);
        }
    }

    for item in combatant.equipment().iter() {
        let source = item.slot.to_string();
        for (kind, value) in item.contributions() {
            apply(&mut acc, kind, value, &source);
        }
    }

    let element_bonus = Element::ALL
        .iter()
        .map(|element| (*element, acc.element(*element)))
        .collect();

    StatSnapshot {
        base,
        total_hp: base.hp * (1.0 + acc.percent.hp) + acc.flat.hp,
        total_atk: base.atk * (1.0 + acc.percent.atk) + acc.flat.atk,
        total_def: base.def * (1.0 + acc.percent.def) + acc.flat.def,
        crit_rate: BASE_CRIT_RATE + acc.crit_rate,
        crit_dmg: BASE_CRIT_DMG + acc.crit_dmg,
        elemental_mastery: acc.elemental_mastery,
        energy_recharge: BASE_ENERGY_RECHARGE + acc.energy_recharge,
        healing_bonus: acc.healing_bonus,
        element_bonus,
        damage_bonus: acc.damage_bonus,
    }
}

fn apply(acc: &mut StatOverlay, kind: &StatKind, value: f64, source: &str) {
    if !acc.add(kind, value) {
        warn!(stat = %kind, source, "Ignoring unsupported stat");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{Equipment, Substat, Weapon};
    use resin_common::{EquipmentSlot, WeaponClass};

    fn sample() -> Combatant {
        Combatant::new("Tester", Element::Pyro, WeaponClass::Polearm)
            .with_base(StatTriple::new(10_000.0, 100.0, 500.0))
            .with_ascension(StatKind::CritDmg, 0.384)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_baselines_with_nothing_equipped() {
        let snap = resolve(&sample());
        assert!(approx(snap.total_hp, 10_000.0));
        assert!(approx(snap.total_atk, 100.0));
        assert!(approx(snap.crit_rate, 0.05));
        assert!(approx(snap.crit_dmg, 0.5 + 0.384));
        assert!(approx(snap.energy_recharge, 1.0));
        assert_eq!(snap.element_bonus.len(), Element::ALL.len());
    }

    #[test]
    fn test_weapon_base_attack_joins_base() {
        let weapon = Weapon::new("Test Spear", WeaponClass::Polearm, 600.0)
            .with_substat(StatKind::AtkPercent, 0.5);
        let mut c = sample();
        c.equip_weapon(weapon);
        let snap = resolve(&c);
        assert!(approx(snap.base.atk, 700.0));
        assert!(approx(snap.total_atk, 700.0 * 1.5));
    }

    #[test]
    fn test_equipment_display_units_are_divided() {
        let mut c = sample();
        c.equip(Equipment::new(EquipmentSlot::Sands, StatKind::HpPercent, 46.6).with_substats(vec![
            Substat::new(StatKind::FlatHp, 298.75),
            Substat::new(StatKind::CritRate, 3.89),
        ]));
        let snap = resolve(&c);
        assert!(approx(snap.total_hp, 10_000.0 * 1.466 + 298.75));
        assert!(approx(snap.crit_rate, 0.05 + 0.0389));
    }

    #[test]
    fn test_overlay_layer_and_universal_bonus() {
        let overlay = StatOverlay::new()
            .with_flat(BonusStat::Atk, 50.0)
            .with_damage_bonus(0.2);
        let snap = resolve_with(&sample(), &overlay);
        assert!(approx(snap.total_atk, 150.0));
        assert!(approx(snap.damage_bonus_for(Element::Hydro), 0.2));
        assert!(approx(snap.get(SnapshotStat::DamageBonus(Element::Pyro)), 0.2));
    }

    #[test]
    fn test_unsupported_stats_are_skipped() {
        let mut c = sample();
        c.equip(Equipment::new(
            EquipmentSlot::Goblet,
            StatKind::from_label("Shield Strength%"),
            10.0,
        ));
        let before = resolve(&sample());
        let after = resolve(&c);
        assert_eq!(before, after);
    }

    #[test]
    fn test_resolution_is_pure() {
        let c = sample();
        assert_eq!(resolve(&c), resolve(&c));
        assert!(c.stats().is_none());
    }
}
