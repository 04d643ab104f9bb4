//! Spending policies.

use resin_combat::{SnapshotStat, StatSnapshot};
use resin_common::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a spend unit buys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    /// Equipment farming.
    #[default]
    Equipment,
    /// Ability material farming.
    Ability,
}

impl Track {
    /// The other track.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Equipment => Self::Ability,
            Self::Ability => Self::Equipment,
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Equipment => "equipment",
            Self::Ability => "ability",
        })
    }
}

/// A minimum value for one resolved stat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatThreshold {
    /// Stat to check.
    pub stat: SnapshotStat,
    /// Minimum value (fraction form for percent stats).
    pub min: f64,
}

impl StatThreshold {
    /// Whether the snapshot meets this threshold.
    #[must_use]
    pub fn is_met(&self, snapshot: &StatSnapshot) -> bool {
        snapshot.get(self.stat) >= self.min
    }
}

/// How the optimizer divides the budget between tracks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Policy {
    /// Every unit goes to equipment.
    EquipmentOnly,
    /// Every unit goes to ability materials until all slots are capped.
    AbilityOnly,
    /// Equipment first, ability when equipment did not help; once neither
    /// helps, drive the burst to its cap and spend the rest on equipment.
    #[default]
    GreedySwap,
    /// Stay on a track while its gain per resin point reaches `threshold`.
    ThresholdSwitch {
        /// Minimum gain per resin point.
        threshold: f64,
        /// Track tried first.
        #[serde(default)]
        primary: Track,
    },
    /// Spend on `primary` until every threshold is met, then on the other
    /// track until a step brings no gain.
    StatGate {
        /// Track used until the thresholds are met.
        #[serde(default)]
        primary: Track,
        /// Stats that must be reached.
        #[serde(default)]
        thresholds: Vec<StatThreshold>,
    },
}

impl Policy {
    /// Reject configurations that cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::StatGate { thresholds, .. } if thresholds.is_empty() => {
                Err(ConfigError::MissingThresholds)
            }
            Self::ThresholdSwitch { threshold, .. } if !threshold.is_finite() => Err(
                ConfigError::Invalid(format!("threshold must be finite, got {threshold}")),
            ),
            _ => Ok(()),
        }
    }

    /// Short name for reports.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::EquipmentOnly => "equipment_only",
            Self::AbilityOnly => "ability_only",
            Self::GreedySwap => "greedy_swap",
            Self::ThresholdSwitch { .. } => "threshold_switch",
            Self::StatGate { .. } => "stat_gate",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resin_common::Element;

    #[test]
    fn test_stat_gate_needs_thresholds() {
        let policy = Policy::StatGate {
            primary: Track::Equipment,
            thresholds: Vec::new(),
        };
        assert_eq!(policy.validate(), Err(ConfigError::MissingThresholds));
        assert!(Policy::GreedySwap.validate().is_ok());
    }

    #[test]
    fn test_policy_toml_shapes() {
        #[derive(Deserialize)]
        struct Doc {
            policy: Policy,
        }
        let doc: Doc = toml::from_str(
            r#"
[policy]
kind = "stat_gate"
primary = "equipment"

[[policy.thresholds]]
stat = "crit_rate"
min = 0.6

[[policy.thresholds]]
stat = { damage_bonus = "Pyro" }
min = 0.466
"#,
        )
        .expect("valid policy");
        match doc.policy {
            Policy::StatGate { primary, thresholds } => {
                assert_eq!(primary, Track::Equipment);
                assert_eq!(thresholds[1].stat, SnapshotStat::DamageBonus(Element::Pyro));
            }
            other => panic!("unexpected policy {other:?}"),
        }

        let doc: Doc = toml::from_str("[policy]\nkind = \"threshold_switch\"\nthreshold = 5.0\n")
            .expect("valid policy");
        assert_eq!(
            doc.policy,
            Policy::ThresholdSwitch {
                threshold: 5.0,
                primary: Track::Equipment
            }
        );
    }

    #[test]
    fn test_track_other() {
        assert_eq!(Track::Equipment.other(), Track::Ability);
        assert_eq!(Track::Ability.to_string(), "ability");
    }
}
