//! Stat kinds carried by ascension bonuses, weapons and equipment.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::element::Element;

/// A stat a bonus can be applied to.
///
/// Parsed leniently from data labels: a trailing `%` is optional and a bare
/// `HP`/`ATK`/`DEF` (as used on ascension rows) means the percent variant.
/// Labels outside the mapping are kept as [`StatKind::Unsupported`] so loading
/// never fails on them; aggregation skips them with a warning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatKind {
    /// Percent of base HP.
    HpPercent,
    /// Flat HP.
    FlatHp,
    /// Percent of base ATK.
    AtkPercent,
    /// Flat ATK.
    FlatAtk,
    /// Percent of base DEF.
    DefPercent,
    /// Flat DEF.
    FlatDef,
    /// Critical hit rate.
    CritRate,
    /// Critical hit damage.
    CritDmg,
    /// Elemental mastery (flat points).
    ElementalMastery,
    /// Energy recharge.
    EnergyRecharge,
    /// Outgoing healing bonus.
    HealingBonus,
    /// Damage bonus for one element.
    DamageBonus(Element),
    /// Anything the aggregation does not know how to apply.
    Unsupported(String),
}

impl StatKind {
    /// Parse a data label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        let key = trimmed.trim_end_matches('%').trim();
        let is = |candidate: &str| key.eq_ignore_ascii_case(candidate);

        if is("HP") {
            Self::HpPercent
        } else if is("Flat HP") {
            Self::FlatHp
        } else if is("ATK") {
            Self::AtkPercent
        } else if is("Flat ATK") {
            Self::FlatAtk
        } else if is("DEF") {
            Self::DefPercent
        } else if is("Flat DEF") {
            Self::FlatDef
        } else if is("CRIT Rate") {
            Self::CritRate
        } else if is("CRIT DMG") {
            Self::CritDmg
        } else if is("Elemental Mastery") {
            Self::ElementalMastery
        } else if is("Energy Recharge") {
            Self::EnergyRecharge
        } else if is("Healing Bonus") {
            Self::HealingBonus
        } else if let Some(element) = key
            .strip_suffix("DMG Bonus")
            .and_then(|e| e.trim().parse::<Element>().ok())
        {
            Self::DamageBonus(element)
        } else {
            Self::Unsupported(trimmed.to_string())
        }
    }

    /// Canonical label, the inverse of [`StatKind::from_label`].
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::HpPercent => "HP%".into(),
            Self::FlatHp => "Flat HP".into(),
            Self::AtkPercent => "ATK%".into(),
            Self::FlatAtk => "Flat ATK".into(),
            Self::DefPercent => "DEF%".into(),
            Self::FlatDef => "Flat DEF".into(),
            Self::CritRate => "CRIT Rate%".into(),
            Self::CritDmg => "CRIT DMG%".into(),
            Self::ElementalMastery => "Elemental Mastery".into(),
            Self::EnergyRecharge => "Energy Recharge%".into(),
            Self::HealingBonus => "Healing Bonus%".into(),
            Self::DamageBonus(element) => format!("{element} DMG Bonus%"),
            Self::Unsupported(raw) => raw.clone(),
        }
    }

    /// Whether display values of this kind are percentages.
    #[must_use]
    pub fn is_percent(&self) -> bool {
        !matches!(
            self,
            Self::FlatHp
                | Self::FlatAtk
                | Self::FlatDef
                | Self::ElementalMastery
                | Self::Unsupported(_)
        )
    }

    /// Convert a display value (`46.6` for 46.6 %) into the fraction used by
    /// the formulas. Flat kinds pass through unchanged.
    #[must_use]
    pub fn to_fraction(&self, display_value: f64) -> f64 {
        if self.is_percent() {
            display_value / 100.0
        } else {
            display_value
        }
    }
}

impl From<&str> for StatKind {
    fn from(label: &str) -> Self {
        Self::from_label(label)
    }
}

impl From<String> for StatKind {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<StatKind> for String {
    fn from(kind: StatKind) -> Self {
        kind.label()
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
