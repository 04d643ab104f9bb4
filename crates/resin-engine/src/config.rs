//! Planner configuration.
//!
//! Selects the combatant, the budget and policy, and the fight the combo is
//! evaluated against. Loaded from and saved to TOML.

use resin_combat::{AbilityLevels, EvalContext, Metric};
use resin_common::AbilitySlot;
use resin_sim::{OptimizerConfig, Policy, DEFAULT_LEVEL_COSTS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
const CONFIG_FILE: &str = "resin-planner.toml";

/// How the report is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summary.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Planner configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    // === Data ===
    /// Directory holding `catalog.toml` and `multipliers.toml`
    pub data_dir: PathBuf,

    // === Combatant ===
    /// Character name
    pub character: String,
    /// Weapon name or name fragment (None = unarmed)
    pub weapon: Option<String>,
    /// Combo override (None = character default)
    pub combo: Option<String>,

    // === Optimizer ===
    /// Resin budget
    pub budget: u32,
    /// Resin per attempt
    pub spend_unit: u32,
    /// Domain tier for ability materials (1-4)
    pub domain_tier: u8,
    /// Highest ability level
    pub max_level: u8,
    /// Scalar being maximised
    pub metric: Metric,
    /// Also run equipment-only versus ability-only
    pub compare_tracks: bool,

    // === Run ===
    /// RNG seed (None = random)
    pub seed: Option<u64>,
    /// Report format
    pub output: OutputFormat,

    // === Tables ===
    /// Starting ability levels
    pub levels: AbilityLevels,
    /// Spending policy
    pub policy: Policy,
    /// Enemy and evaluation context
    pub context: EvalContext,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            // Data
            data_dir: PathBuf::from("data"),

            // Combatant
            character: "Hu Tao".to_string(),
            weapon: Some("Staff of Homa".to_string()),
            combo: None,

            // Optimizer
            budget: 1600, // ten days of natural resin
            spend_unit: 20,
            domain_tier: 4,
            max_level: 10,
            metric: Metric::Damage,
            compare_tracks: false,

            // Run
            seed: None,
            output: OutputFormat::Text,

            // Tables
            levels: AbilityLevels::uniform(1),
            policy: Policy::GreedySwap,
            context: EvalContext::default(),
        }
    }
}

impl PlannerConfig {
    /// Load configuration from the default file location.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Default configuration file path.
    pub fn config_path() -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from(CONFIG_FILE),
            |dir| dir.join("resin-planner").join(CONFIG_FILE),
        )
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        // Optimizer
        self.spend_unit = self.spend_unit.clamp(1, 200);
        self.domain_tier = self.domain_tier.clamp(1, 4);
        self.max_level = self.max_level.clamp(1, 15);

        for slot in AbilitySlot::ALL {
            let level = self.levels.get(slot).clamp(1, self.max_level);
            self.levels.set(slot, level);
        }

        // Context
        self.context.attacker_level = self.context.attacker_level.clamp(1, 100);
        self.context.target_level = self.context.target_level.clamp(1, 200);
        self.context.def_reduction = self.context.def_reduction.clamp(0.0, 1.0);
        self.context.def_ignore = self.context.def_ignore.clamp(0.0, 1.0);

        if let Some(weapon) = &self.weapon {
            if weapon.trim().is_empty() {
                self.weapon = None;
            }
        }
    }

    /// Optimizer settings derived from this configuration.
    #[must_use]
    pub fn optimizer(&self) -> OptimizerConfig {
        OptimizerConfig {
            spend_unit: self.spend_unit,
            domain_tier: self.domain_tier,
            max_level: self.max_level,
            level_costs: DEFAULT_LEVEL_COSTS.to_vec(),
            metric: self.metric,
        }
    }

    /// Path of the character/weapon catalog.
    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join("catalog.toml")
    }

    /// Path of the multiplier table.
    #[must_use]
    pub fn multipliers_path(&self) -> PathBuf {
        self.data_dir.join("multipliers.toml")
    }
}
