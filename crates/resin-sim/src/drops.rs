//! Ability material drops.

use resin_combat::MaterialDrop;
use resin_common::{ConfigError, MaterialTier};
use tracing::debug;

use crate::rng::SimRng;

/// Produces material drops for domain runs.
pub trait MaterialSource {
    /// Combined drops of `runs` runs at domain `tier` (1-4).
    fn simulate_runs(&mut self, runs: u32, tier: u8) -> Result<MaterialDrop, ConfigError>;
}

/// Drop table of one domain tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropTable {
    /// Inclusive teachings range.
    pub teachings: (u32, u32),
    /// Inclusive guaranteed guides range.
    pub guides: (u32, u32),
    /// Chance of one guide on top of the range.
    pub guide_chance: f64,
    /// Chance of one philosophy.
    pub philosophy_chance: f64,
}

impl DropTable {
    /// Table for a domain tier.
    pub fn for_tier(tier: u8) -> Result<Self, ConfigError> {
        let table = match tier {
            1 => Self {
                teachings: (1, 2),
                guides: (0, 0),
                guide_chance: 0.10,
                philosophy_chance: 0.0,
            },
            2 => Self {
                teachings: (2, 3),
                guides: (0, 0),
                guide_chance: 0.25,
                philosophy_chance: 0.0,
            },
            3 => Self {
                teachings: (2, 3),
                guides: (1, 2),
                guide_chance: 0.0,
                philosophy_chance: 0.05,
            },
            4 => Self {
                teachings: (2, 3),
                guides: (1, 3),
                guide_chance: 0.0,
                philosophy_chance: 0.10,
            },
            other => return Err(ConfigError::InvalidDomainTier(other)),
        };
        Ok(table)
    }

    fn roll(&self, rng: &mut SimRng) -> MaterialDrop {
        let mut drop = MaterialDrop::new(
            rng.range_inclusive(self.teachings.0, self.teachings.1),
            rng.range_inclusive(self.guides.0, self.guides.1),
            0,
        );
        if self.guide_chance > 0.0 && rng.chance(self.guide_chance) {
            drop.add(MaterialTier::Guides, 1);
        }
        if self.philosophy_chance > 0.0 && rng.chance(self.philosophy_chance) {
            drop.add(MaterialTier::Philosophies, 1);
        }
        drop
    }
}

/// Random drops following the domain tables.
#[derive(Debug, Clone, Default)]
pub struct DomainDrops {
    rng: SimRng,
}

impl DomainDrops {
    /// Entropy-seeded source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deterministic source.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SimRng::with_seed(seed),
        }
    }

    /// Source over an existing RNG.
    #[must_use]
    pub fn with_rng(rng: SimRng) -> Self {
        Self { rng }
    }
}

impl MaterialSource for DomainDrops {
    fn simulate_runs(&mut self, runs: u32, tier: u8) -> Result<MaterialDrop, ConfigError> {
        let table = DropTable::for_tier(tier)?;
        let mut total = MaterialDrop::default();
        for _ in 0..runs {
            total.merge(&table.roll(&mut self.rng));
        }
        debug!(runs, tier, drop = %total, "Domain runs");
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_tier_is_config_error() {
        let mut drops = DomainDrops::with_seed(1);
        assert_eq!(
            drops.simulate_runs(1, 5),
            Err(ConfigError::InvalidDomainTier(5))
        );
        assert_eq!(
            drops.simulate_runs(0, 0),
            Err(ConfigError::InvalidDomainTier(0))
        );
    }

    #[test]
    fn test_tier_four_ranges() {
        let mut drops = DomainDrops::with_seed(2);
        for _ in 0..200 {
            let drop = drops.simulate_runs(1, 4).expect("valid tier");
            assert!((2..=3).contains(&drop.teachings));
            assert!((1..=3).contains(&drop.guides));
            assert!(drop.philosophies <= 1);
        }
    }

    #[test]
    fn test_tier_one_never_drops_philosophies() {
        let mut drops = DomainDrops::with_seed(3);
        let total = drops.simulate_runs(500, 1).expect("valid tier");
        assert_eq!(total.philosophies, 0);
        assert!(total.teachings >= 500);
        assert!(total.guides <= 500);
    }

    #[test]
    fn test_zero_runs_is_empty() {
        let mut drops = DomainDrops::with_seed(4);
        assert!(drops.simulate_runs(0, 2).expect("valid tier").is_empty());
    }
}
