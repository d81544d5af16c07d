use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::general::technology::Asset;

/// Cost figures of a single asset at its optimal capacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export, export_to = "./financial.ts")]
pub struct AssetCost {
    pub asset: Asset,
    pub capacity_kw: f64,
    pub capital_cost: f64,
    pub yearly_maintenance: f64,
    /// Annuity plus maintenance, the asset's share of the investment term of the objective.
    pub annualized_cost: f64,
}

/// Lifecycle economics derived from a solved design.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export, export_to = "./financial.ts")]
pub struct FinancialSummary {
    /// Electrolyzer lifetime, used as the system lifetime.
    pub system_lifetime_years: u32,
    pub total_investment: f64,
    pub yearly_om: f64,
    /// Present value of O&M over the system lifetime, discounted year by year.
    pub present_value_om: f64,
    /// Investment plus discounted O&M.
    pub lifecycle_cost: f64,
    /// Annual target times system lifetime (kg).
    pub lifetime_h2_kg: f64,
    /// Lifecycle cost per kg, absent when no hydrogen is produced.
    pub levelized_cost_per_kg: Option<f64>,
    /// Objective value per kg of the prorated target, absent for a zero target.
    pub horizon_cost_per_kg: Option<f64>,
    /// Share of electrolyzer capability used over the window, 0 without an electrolyzer.
    pub electrolyzer_utilization: f64,
    pub asset_costs: Vec<AssetCost>,
}
