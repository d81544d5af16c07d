pub mod dispatch;
pub mod financial;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::general::technology::Asset;
use crate::results::dispatch::DispatchTrajectories;
use crate::results::financial::FinancialSummary;

/// Installed capacities chosen by the optimizer, in kW.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export, export_to = "./results.ts")]
pub struct AssetCapacities {
    pub wind_kw: f64,
    pub solar_pv_kw: f64,
    /// Battery capacity, bounding both stored energy and combined charge/discharge power.
    pub storage_kw: f64,
    pub electrolyzer_kw: f64,
}

impl AssetCapacities {
    pub fn get(&self, asset: Asset) -> f64 {
        match asset {
            Asset::Wind => self.wind_kw,
            Asset::SolarPv => self.solar_pv_kw,
            Asset::Storage => self.storage_kw,
            Asset::Electrolyzer => self.electrolyzer_kw,
        }
    }

    /// Combined wind and PV capacity.
    pub fn renewable_kw(&self) -> f64 {
        self.wind_kw + self.solar_pv_kw
    }
}

/// Result bundle of one solved sizing run, handed to reporting and plotting consumers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export, export_to = "./results.ts")]
pub struct H2SystemDesign {
    /// Length of the simulated window in hours.
    pub horizon_hours: usize,
    /// Hydrogen target prorated to the simulated window (kg).
    pub horizon_h2_target_kg: f64,
    /// Objective value of the solved model.
    pub objective_value: f64,
    pub capacities: AssetCapacities,
    pub dispatch: DispatchTrajectories,
    pub financial: FinancialSummary,
    /// Wall-clock time of the solver call.
    pub solve_time_ms: f64,
}
