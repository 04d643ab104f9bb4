//! One planning session: load data, build the combatant, spend the budget.

use anyhow::{Context, Result};
use resin_combat::{Catalog, Combo, Evaluation, Evaluator, MultiplierTable, StatSnapshot};
use resin_sim::{
    DomainDrops, RandomEquipmentGenerator, ResinOptimizer, RunReport, SimRng, TrackComparison,
};
use serde::Serialize;
use tracing::info;

use crate::config::PlannerConfig;

/// Everything a session produced.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    /// Character planned for.
    pub character: String,
    /// Equipped weapon, if any.
    pub weapon: Option<String>,
    /// Combo scored.
    pub combo: String,
    /// Evaluation before spending.
    pub initial: Evaluation,
    /// Evaluation after spending.
    pub result: Evaluation,
    /// Resolved stats after spending.
    pub final_stats: StatSnapshot,
    /// Optimizer run.
    pub run: RunReport,
    /// Equipment-only versus ability-only, when requested.
    pub comparison: Option<TrackComparison>,
}

/// Run a full session for `config`.
pub fn execute(config: &PlannerConfig) -> Result<PlanReport> {
    let catalog_path = config.catalog_path();
    let catalog = Catalog::load(&catalog_path)
        .with_context(|| format!("loading catalog {}", catalog_path.display()))?;
    let multipliers_path = config.multipliers_path();
    let tables = MultiplierTable::load(&multipliers_path)
        .with_context(|| format!("loading multipliers {}", multipliers_path.display()))?;

    let mut combatant = catalog
        .build_combatant(&config.character, config.weapon.as_deref(), config.levels)
        .with_context(|| format!("building {}", config.character))?;
    let combo_text = config
        .combo
        .clone()
        .unwrap_or_else(|| combatant.default_combo.clone());
    let combo = Combo::parse(&combo_text).with_context(|| format!("parsing combo '{combo_text}'"))?;

    let evaluator = Evaluator::new(&tables, config.context.clone());
    let initial = evaluator.evaluate(&combatant, &combo)?;
    let start = combatant.clone();

    info!(
        character = %combatant.name,
        combo = %combo,
        policy = %config.policy,
        budget = config.budget,
        "Planning"
    );

    let seed = |offset: u64| config.seed.map(|s| s.wrapping_add(offset));
    let generator = RandomEquipmentGenerator::with_rng(SimRng::from_seed(seed(0)));
    let drops = DomainDrops::with_rng(SimRng::from_seed(seed(1)));
    let mut optimizer = ResinOptimizer::new(
        evaluator.clone(),
        combo.clone(),
        config.optimizer(),
        generator,
        drops,
    );
    if let Some(s) = seed(2) {
        optimizer = optimizer.with_seed(s);
    }

    let run = optimizer.run(&mut combatant, config.budget, &config.policy)?;
    let comparison = if config.compare_tracks {
        Some(optimizer.compare_tracks(&start, config.budget)?)
    } else {
        None
    };

    let result = evaluator.evaluate(&combatant, &combo)?;
    Ok(PlanReport {
        character: combatant.name.clone(),
        weapon: combatant.weapon().map(|w| w.name.clone()),
        combo: combo.to_string(),
        initial,
        result,
        final_stats: combatant.snapshot(),
        run,
        comparison,
    })
}
