//! Combatant model.
//!
//! A combatant owns its permanent layers (base stats, ascension bonus,
//! weapon, equipment, ability levels), a material inventory, a transient
//! [`StatOverlay`] and the ability effects its kit carries. Resolved stats are
//! cached; every mutator that can change them drops the cache.

use resin_common::{AbilitySlot, Element, EquipmentSlot, StatKind, WeaponClass};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::effects::AbilityEffect;
use crate::inventory::MaterialInventory;
use crate::stats::{self, StatOverlay, StatSnapshot, StatTriple};

/// Combo used when a combatant does not name its own.
pub const DEFAULT_COMBO: &str = "E12N1C";

// ============================================================================
// Building blocks
// ============================================================================

/// A single stat bonus in fraction form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatBonus {
    /// Stat the bonus applies to.
    pub kind: StatKind,
    /// Bonus value (fraction for percent kinds).
    pub value: f64,
}

/// Levels of the three abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityLevels {
    /// Basic attack level.
    pub basic: u8,
    /// Skill level.
    pub skill: u8,
    /// Burst level.
    pub burst: u8,
}

impl Default for AbilityLevels {
    fn default() -> Self {
        Self::uniform(1)
    }
}

impl AbilityLevels {
    /// Same level for every slot.
    #[must_use]
    pub const fn uniform(level: u8) -> Self {
        Self {
            basic: level,
            skill: level,
            burst: level,
        }
    }

    /// Level of one slot.
    #[must_use]
    pub const fn get(&self, slot: AbilitySlot) -> u8 {
        match slot {
            AbilitySlot::Basic => self.basic,
            AbilitySlot::Skill => self.skill,
            AbilitySlot::Burst => self.burst,
        }
    }

    /// Set the level of one slot (never below 1).
    pub fn set(&mut self, slot: AbilitySlot, level: u8) {
        let level = level.max(1);
        match slot {
            AbilitySlot::Basic => self.basic = level,
            AbilitySlot::Skill => self.skill = level,
            AbilitySlot::Burst => self.burst = level,
        }
    }
}

impl fmt::Display for AbilityLevels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.basic, self.skill, self.burst)
    }
}

/// An equipped weapon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    /// Display name.
    pub name: String,
    /// Weapon class.
    pub class: WeaponClass,
    /// Rarity in stars.
    pub rarity: u8,
    /// Base attack, added to the wielder's base ATK.
    pub base_atk: f64,
    /// Secondary stat (fraction form for percent kinds).
    pub substat: Option<StatBonus>,
    /// Passive description; informational only.
    pub passive: Option<String>,
}

impl Weapon {
    /// Create a weapon with no substat.
    #[must_use]
    pub fn new(name: impl Into<String>, class: WeaponClass, base_atk: f64) -> Self {
        Self {
            name: name.into(),
            class,
            rarity: 5,
            base_atk,
            substat: None,
            passive: None,
        }
    }

    /// Set the secondary stat.
    #[must_use]
    pub fn with_substat(mut self, kind: StatKind, value: f64) -> Self {
        self.substat = Some(StatBonus { kind, value });
        self
    }

    /// Set rarity.
    #[must_use]
    pub fn with_rarity(mut self, rarity: u8) -> Self {
        self.rarity = rarity;
        self
    }
}

/// A secondary stat line on an equipment item, in display units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Substat {
    /// Stat kind.
    pub kind: StatKind,
    /// Value in display units (`3.89` for 3.89 %).
    pub value: f64,
    /// Number of upgrade rolls that landed on this line.
    pub upgrades: u32,
}

impl Substat {
    /// Create a substat with no upgrades.
    #[must_use]
    pub fn new(kind: StatKind, value: f64) -> Self {
        Self {
            kind,
            value,
            upgrades: 0,
        }
    }
}

/// An equipment item. Values are in display units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    /// Slot the item occupies.
    pub slot: EquipmentSlot,
    /// Main stat kind.
    pub main_stat: StatKind,
    /// Main stat value in display units.
    pub main_value: f64,
    /// Secondary stat lines.
    pub substats: Vec<Substat>,
}

impl Equipment {
    /// Create an item without substats.
    #[must_use]
    pub fn new(slot: EquipmentSlot, main_stat: StatKind, main_value: f64) -> Self {
        Self {
            slot,
            main_stat,
            main_value,
            substats: Vec::new(),
        }
    }

    /// Set the substats.
    #[must_use]
    pub fn with_substats(mut self, substats: Vec<Substat>) -> Self {
        self.substats = substats;
        self
    }

    /// Every stat line converted to fraction form, main stat first.
    pub fn contributions(&self) -> impl Iterator<Item = (&StatKind, f64)> + '_ {
        std::iter::once((&self.main_stat, self.main_stat.to_fraction(self.main_value))).chain(
            self.substats
                .iter()
                .map(|sub| (&sub.kind, sub.kind.to_fraction(sub.value))),
        )
    }

    /// Total upgrade rolls across substats.
    #[must_use]
    pub fn total_upgrades(&self) -> u32 {
        self.substats.iter().map(|s| s.upgrades).sum()
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{} {:.2}]", self.slot, self.main_stat, self.main_value)?;
        for sub in &self.substats {
            write!(f, " {} {:.2}", sub.kind, sub.value)?;
        }
        Ok(())
    }
}

/// Equipped items, at most one per slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSet {
    items: BTreeMap<EquipmentSlot, Equipment>,
}

impl EquipmentSet {
    /// Item in a slot.
    #[must_use]
    pub fn get(&self, slot: EquipmentSlot) -> Option<&Equipment> {
        self.items.get(&slot)
    }

    /// Put an item in its slot, returning the one it replaced.
    pub fn equip(&mut self, item: Equipment) -> Option<Equipment> {
        self.items.insert(item.slot, item)
    }

    /// Equipped items in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Equipment> {
        self.items.values()
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing is equipped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A candidate permanent change to a combatant.
#[derive(Debug, Clone, PartialEq)]
pub enum Upgrade {
    /// Replace the item in the equipment's slot.
    Equip(Equipment),
    /// Raise an ability by one level.
    LevelUp(AbilitySlot),
}

// ============================================================================
// Combatant
// ============================================================================

/// A playable character with everything that feeds stat resolution.
#[derive(Debug, Clone)]
pub struct Combatant {
    /// Identity; also the key into multiplier tables.
    pub name: String,
    /// Element of non-physical hits.
    pub element: Element,
    /// Weapon class the combatant wields.
    pub weapon_class: WeaponClass,
    /// Combo evaluated when none is given.
    pub default_combo: String,
    /// Ability effects of the kit.
    pub effects: Vec<AbilityEffect>,
    base: StatTriple,
    ascension: Option<StatBonus>,
    levels: AbilityLevels,
    weapon: Option<Weapon>,
    equipment: EquipmentSet,
    materials: MaterialInventory,
    overlay: StatOverlay,
    cached_stats: Option<StatSnapshot>,
}

impl Combatant {
    /// Create a combatant with zero base stats and level 1 abilities.
    #[must_use]
    pub fn new(name: impl Into<String>, element: Element, weapon_class: WeaponClass) -> Self {
        Self {
            name: name.into(),
            element,
            weapon_class,
            default_combo: DEFAULT_COMBO.to_string(),
            effects: Vec::new(),
            base: StatTriple::default(),
            ascension: None,
            levels: AbilityLevels::default(),
            weapon: None,
            equipment: EquipmentSet::default(),
            materials: MaterialInventory::new(),
            overlay: StatOverlay::new(),
            cached_stats: None,
        }
    }

    /// Set base HP/ATK/DEF.
    #[must_use]
    pub fn with_base(mut self, base: StatTriple) -> Self {
        self.base = base;
        self
    }

    /// Set the ascension bonus (fraction form for percent kinds).
    #[must_use]
    pub fn with_ascension(mut self, kind: StatKind, value: f64) -> Self {
        self.ascension = Some(StatBonus { kind, value });
        self
    }

    /// Set ability levels.
    #[must_use]
    pub fn with_levels(mut self, levels: AbilityLevels) -> Self {
        self.levels = levels;
        self
    }

    /// Set the weapon.
    #[must_use]
    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = Some(weapon);
        self
    }

    /// Set the default combo.
    #[must_use]
    pub fn with_default_combo(mut self, combo: impl Into<String>) -> Self {
        self.default_combo = combo.into();
        self
    }

    /// Add an ability effect.
    #[must_use]
    pub fn with_effect(mut self, effect: AbilityEffect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Base HP/ATK/DEF, without the weapon.
    #[must_use]
    pub const fn base(&self) -> &StatTriple {
        &self.base
    }

    /// Ascension bonus.
    #[must_use]
    pub const fn ascension(&self) -> Option<&StatBonus> {
        self.ascension.as_ref()
    }

    /// Ability levels.
    #[must_use]
    pub const fn levels(&self) -> AbilityLevels {
        self.levels
    }

    /// Level of one ability.
    #[must_use]
    pub const fn level(&self, slot: AbilitySlot) -> u8 {
        self.levels.get(slot)
    }

    /// Set the level of one ability.
    pub fn set_level(&mut self, slot: AbilitySlot, level: u8) {
        self.levels.set(slot, level);
        self.invalidate_cache();
    }

    /// Equipped weapon.
    #[must_use]
    pub const fn weapon(&self) -> Option<&Weapon> {
        self.weapon.as_ref()
    }

    /// Replace the weapon, returning the previous one.
    pub fn equip_weapon(&mut self, weapon: Weapon) -> Option<Weapon> {
        self.invalidate_cache();
        self.weapon.replace(weapon)
    }

    /// Equipped items.
    #[must_use]
    pub const fn equipment(&self) -> &EquipmentSet {
        &self.equipment
    }

    /// Equip an item in its slot, returning the item it replaced.
    pub fn equip(&mut self, item: Equipment) -> Option<Equipment> {
        self.invalidate_cache();
        self.equipment.equip(item)
    }

    /// Held upgrade materials.
    #[must_use]
    pub const fn materials(&self) -> &MaterialInventory {
        &self.materials
    }

    /// Mutable access to held materials. Materials never affect stats.
    pub fn materials_mut(&mut self) -> &mut MaterialInventory {
        &mut self.materials
    }

    /// Transient overlay.
    #[must_use]
    pub const fn overlay(&self) -> &StatOverlay {
        &self.overlay
    }

    /// Replace the transient overlay.
    pub fn set_overlay(&mut self, overlay: StatOverlay) {
        self.overlay = overlay;
        self.invalidate_cache();
    }

    /// Cached resolved stats, if fresh.
    #[must_use]
    pub const fn stats(&self) -> Option<&StatSnapshot> {
        self.cached_stats.as_ref()
    }

    /// Resolved stats, from cache when fresh.
    #[must_use]
    pub fn snapshot(&self) -> StatSnapshot {
        self.cached_stats
            .clone()
            .unwrap_or_else(|| stats::resolve(self))
    }

    /// Re-resolve and cache stats.
    pub fn refresh_stats(&mut self) -> &StatSnapshot {
        self.cached_stats.insert(stats::resolve(self))
    }

    /// Copy with an upgrade applied; the receiver is untouched.
    #[must_use]
    pub fn with_upgrade(&self, upgrade: &Upgrade) -> Self {
        let mut candidate = self.clone();
        candidate.apply_upgrade(upgrade.clone());
        candidate
    }

    /// Commit an upgrade.
    pub fn apply_upgrade(&mut self, upgrade: Upgrade) {
        match upgrade {
            Upgrade::Equip(item) => {
                self.equip(item);
            }
            Upgrade::LevelUp(slot) => {
                let next = self.level(slot).saturating_add(1);
                self.set_level(slot, next);
            }
        }
    }

    fn invalidate_cache(&mut self) {
        self.cached_stats = None;
    }
}
