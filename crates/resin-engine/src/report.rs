//! Report rendering.

use anyhow::Result;
use resin_sim::{StepDetail, TrackComparison, TrackSummary};
use std::fmt::Write;

use crate::config::OutputFormat;
use crate::planner::PlanReport;

/// Render a report in the requested format.
pub fn render(report: &PlanReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

/// Human-readable summary.
#[must_use]
pub fn render_text(report: &PlanReport) -> String {
    let mut out = String::new();
    let run = &report.run;

    let _ = writeln!(
        out,
        "{} ({})",
        report.character,
        report.weapon.as_deref().unwrap_or("no weapon")
    );
    let _ = writeln!(out, "Combo:   {}", report.combo);
    let _ = writeln!(out, "Policy:  {} on {}", run.policy, run.metric);
    let _ = writeln!(
        out,
        "Budget:  {} resin, {} left",
        run.budget, run.resin_remaining
    );
    let _ = writeln!(
        out,
        "Damage:  {:.0} -> {:.0}",
        report.initial.damage, report.result.damage
    );
    if report.initial.healing > 0.0 || report.result.healing > 0.0 {
        let _ = writeln!(
            out,
            "Healing: {:.0} -> {:.0}",
            report.initial.healing, report.result.healing
        );
    }
    let _ = writeln!(out, "Levels:  {}", run.final_levels);

    let stats = &report.final_stats;
    let _ = writeln!(
        out,
        "Stats:   HP {:.0}  ATK {:.0}  DEF {:.0}  CR {:.1}%  CD {:.1}%  ER {:.1}%",
        stats.total_hp,
        stats.total_atk,
        stats.total_def,
        stats.crit_rate * 100.0,
        stats.crit_dmg * 100.0,
        stats.energy_recharge * 100.0
    );

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} steps, {} accepted",
        run.steps.len(),
        run.accepted_steps()
    );
    for (index, step) in run.steps.iter().enumerate().filter(|(_, s)| s.accepted) {
        let what = match &step.detail {
            StepDetail::Equipment { item, .. } => item.to_string(),
            StepDetail::Ability {
                levels_gained,
                levels,
                ..
            } => {
                let slots: Vec<String> = levels_gained.iter().map(ToString::to_string).collect();
                format!("{} -> {}", slots.join(", "), levels)
            }
        };
        let _ = writeln!(
            out,
            "  #{:<3} {:<18} {:>+10.0}  {}",
            index + 1,
            step.activity.to_string(),
            step.gain(),
            what
        );
    }

    if let Some(comparison) = &report.comparison {
        let _ = writeln!(out);
        write_comparison(&mut out, comparison);
    }

    out
}

fn write_comparison(out: &mut String, comparison: &TrackComparison) {
    let _ = writeln!(out, "Track comparison");
    for summary in [&comparison.equipment, &comparison.ability] {
        write_summary(out, summary);
    }
    let _ = match comparison.winner {
        Some(track) => writeln!(out, "  Winner: {track}"),
        None => writeln!(out, "  Winner: tie"),
    };
}

fn write_summary(out: &mut String, summary: &TrackSummary) {
    let _ = writeln!(
        out,
        "  {:<10} {:.0} -> {:.0} ({:+.1}%), levels {}",
        summary.track.to_string(),
        summary.start,
        summary.end,
        summary.percent_gain,
        summary.final_levels
    );
}
