use h2_model::results::H2SystemDesign;
use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::general::profiles::RenewableProfiles;
use crate::hydrogen::h2_opt::{OptimizationOutcome, optimize};
use crate::hydrogen::h2_system_utils::{OptimizationConfig, ValidationError};

/// Result of one annual target in a sweep.
#[derive(Debug, Clone)]
pub struct SweepPoint {
    pub target_kg: f64,
    pub outcome: OptimizationOutcome,
}

impl SweepPoint {
    pub fn design(&self) -> Option<&H2SystemDesign> {
        self.outcome.solution()
    }
}

/// Optimizes the system for every annual hydrogen target.
///
/// Each target builds and solves its own model on a rayon worker, so nothing mutable is shared.
/// Points come back in the order of `targets`. Any invalid target fails the whole sweep before
/// results are returned; solver failures are kept per point.
pub fn run_target_sweep(
    config: &OptimizationConfig,
    profiles: &RenewableProfiles,
    targets: &[f64],
) -> Result<Vec<SweepPoint>, ValidationError> {
    info!(points = targets.len(), "starting hydrogen target sweep");

    targets
        .par_iter()
        .map(|&target_kg| -> Result<SweepPoint, ValidationError> {
            let point_config = config.with_target(target_kg);
            let outcome = optimize(&point_config, profiles)?;
            match outcome.solution() {
                Some(design) => info!(
                    target_kg,
                    objective = design.objective_value,
                    "sweep point solved"
                ),
                None => warn!(target_kg, status = %outcome.status(), "sweep point has no solution"),
            }
            Ok(SweepPoint { target_kg, outcome })
        })
        .collect()
}

/// Column table of a sweep, one entry per point. Points without a solution show NaN.
pub fn summarize_sweep(points: &[SweepPoint]) -> IndexMap<&'static str, Vec<f64>> {
    let mut results: IndexMap<&'static str, Vec<f64>> = IndexMap::new();
    for column in [
        "TARGET",
        "WIND",
        "PV",
        "STORAGE",
        "ELECTROLYZER",
        "OBJEC",
        "LCOH",
        "UTIL",
    ] {
        results.insert(column, Vec::with_capacity(points.len()));
    }

    for point in points {
        let row = match point.design() {
            Some(design) => [
                point.target_kg,
                design.capacities.wind_kw,
                design.capacities.solar_pv_kw,
                design.capacities.storage_kw,
                design.capacities.electrolyzer_kw,
                design.objective_value,
                design.financial.levelized_cost_per_kg.unwrap_or(f64::NAN),
                design.financial.electrolyzer_utilization,
            ],
            None => {
                let mut row = [f64::NAN; 8];
                row[0] = point.target_kg;
                row
            }
        };
        for (column, value) in results.values_mut().zip(row) {
            column.push(value);
        }
    }

    results
}
