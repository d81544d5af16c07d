use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// Hour-by-hour operation of the sized system.
///
/// The first five series are the operational decision variables; the remaining ones are
/// derived from them and the input profiles for plotting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export, export_to = "./results.ts")]
pub struct DispatchTrajectories {
    /// Energy held in the battery at the end of each hour (kWh).
    pub storage_energy: Vec<f64>,
    /// Battery charging power (kW).
    pub charge_power: Vec<f64>,
    /// Battery discharging power (kW).
    pub discharge_power: Vec<f64>,
    /// Electrical load of the electrolyzer (kW).
    pub electrolyzer_load: Vec<f64>,
    /// Curtailed renewable generation (kW).
    pub excess_power: Vec<f64>,

    /// Wind generation, profile times installed capacity (kW).
    pub wind_output: Vec<f64>,
    /// PV generation, profile times installed capacity (kW).
    pub pv_output: Vec<f64>,
    /// Electrolyzer load times conversion efficiency (kW).
    pub electrolyzer_power: Vec<f64>,
    /// Hydrogen produced in each hour (kg).
    pub h2_production_kg: Vec<f64>,
}

impl DispatchTrajectories {
    pub fn hours(&self) -> usize {
        self.electrolyzer_load.len()
    }

    pub fn total_h2_kg(&self) -> f64 {
        self.h2_production_kg.iter().sum()
    }

    pub fn total_excess_kwh(&self) -> f64 {
        self.excess_power.iter().sum()
    }

    pub fn peak_electrolyzer_load(&self) -> f64 {
        self.electrolyzer_load.iter().fold(0.0, |a, &b| a.max(b))
    }
}
