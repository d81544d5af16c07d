use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use h2_model::results::H2SystemDesign;
use indexmap::IndexMap;
use tracing::info;

use crate::hydrogen::h2_opt::OptimizationOutcome;

/// Prints the sized system and its economics.
pub fn print_design_summary(design: &H2SystemDesign) {
    let financial = &design.financial;

    println!("=== HYDROGEN SYSTEM OPTIMIZATION RESULTS ===");
    println!("Horizon: {} h", design.horizon_hours);
    println!("H2 Target (horizon): {:.2} kg", design.horizon_h2_target_kg);
    println!("H2 Produced (horizon): {:.2} kg", design.dispatch.total_h2_kg());
    println!("Objective Value: {:.2}", design.objective_value);
    println!("--- Capacities ---");
    for cost in &financial.asset_costs {
        println!("{}: {:.2} kW", cost.asset, cost.capacity_kw);
    }
    println!("--- Costs ---");
    for cost in &financial.asset_costs {
        println!(
            "{}: investment {:.2}, annualized {:.2}, O&M {:.2}/year",
            cost.asset, cost.capital_cost, cost.annualized_cost, cost.yearly_maintenance
        );
    }
    println!("Total Investment: {:.2}", financial.total_investment);
    println!("Yearly O&M: {:.2}", financial.yearly_om);
    println!(
        "Present Value O&M ({} years): {:.2}",
        financial.system_lifetime_years, financial.present_value_om
    );
    println!("Lifecycle Cost: {:.2}", financial.lifecycle_cost);
    println!("Lifetime H2 Production: {:.2} kg", financial.lifetime_h2_kg);
    match financial.levelized_cost_per_kg {
        Some(lcoh) => println!("Levelized Cost of Hydrogen: {:.2} per kg", lcoh),
        None => println!("Levelized Cost of Hydrogen: n/a (no hydrogen produced)"),
    }
    if let Some(cost) = financial.horizon_cost_per_kg {
        println!("Horizon Cost of Hydrogen: {:.2} per kg", cost);
    }
    println!(
        "Electrolyzer Utilization: {:.1}%",
        financial.electrolyzer_utilization * 100.0
    );
    println!("Curtailed Energy: {:.2} kWh", design.dispatch.total_excess_kwh());
    println!("Optimization Duration: {:.0} ms", design.solve_time_ms);
    println!("============================================");
}

/// Prints the result of a single run, including runs that ended without a solution.
pub fn print_outcome(outcome: &OptimizationOutcome) {
    match outcome.solution() {
        Some(design) => {
            if !outcome.is_optimal() {
                println!("Warning: solver stopped at a limit, the design may not be optimal");
            }
            print_design_summary(design);
        }
        None => println!("Optimization finished without a solution: {}", outcome.status()),
    }
}

/// Prints a sweep table with one row per target.
pub fn print_sweep_table(table: &IndexMap<&'static str, Vec<f64>>) {
    let header: Vec<String> = table.keys().map(|name| format!("{:>14}", name)).collect();
    println!("{}", header.join(""));

    let rows = table.values().map(Vec::len).max().unwrap_or(0);
    for row in 0..rows {
        let line: Vec<String> = table
            .values()
            .map(|column| format!("{:>14.3}", column.get(row).copied().unwrap_or(f64::NAN)))
            .collect();
        println!("{}", line.join(""));
    }
}

/// Writes the design as pretty JSON, creating parent directories as needed.
pub fn write_design_json(design: &H2SystemDesign, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(design).context("failed to serialize design")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "design written");
    Ok(())
}

/// Reads a design written by [`write_design_json`].
pub fn read_design_json(path: &Path) -> Result<H2SystemDesign> {
    let json = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("invalid design file {}", path.display()))
}
