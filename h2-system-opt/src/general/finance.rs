use h2_model::general::technology::{Asset, TechnologyCatalog};
use h2_model::results::AssetCapacities;
use h2_model::results::financial::{AssetCost, FinancialSummary};
use indexmap::IndexMap;

use crate::hydrogen::h2_system_utils::OptimizationConfig;

pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Electrical energy equivalent of one kg of hydrogen (kWh/kg), used for utilization.
pub const H2_ENERGY_EQUIVALENT_KWH_PER_KG: f64 = 33.33;

/// Scales an annual quantity down to a window of `horizon_hours`.
pub fn prorate_to_horizon(annual: f64, horizon_hours: usize) -> f64 {
    annual * (horizon_hours as f64 / HOURS_PER_YEAR)
}

/// Annualized cost per kW of every asset, in objective order.
pub fn annualized_unit_costs(catalog: &TechnologyCatalog, discount_rate: f64) -> IndexMap<Asset, f64> {
    catalog
        .iter()
        .map(|(asset, technology)| (asset, technology.annualized_unit_cost(discount_rate)))
        .collect()
}

/// Present value of a constant yearly cost paid at the end of years `1..=years`.
///
/// Discounted one year at a time rather than through the closed-form annuity.
pub fn present_value_of_annual_cost(annual_cost: f64, discount_rate: f64, years: u32) -> f64 {
    let mut present_value = 0.0;
    for year in 1..=years {
        present_value += annual_cost / (1.0 + discount_rate).powi(year as i32);
    }
    present_value
}

/// Ratio of the hydrogen energy delivered in the window to what the installed electrolyzer
/// could convert running flat out. Zero when no electrolyzer is installed.
pub fn electrolyzer_utilization(
    horizon_target_kg: f64,
    electrolyzer_kw: f64,
    efficiency: f64,
    horizon_hours: usize,
) -> f64 {
    let h2_energy_equivalent = horizon_target_kg * H2_ENERGY_EQUIVALENT_KWH_PER_KG;
    let capability = electrolyzer_kw * efficiency * horizon_hours as f64;
    if electrolyzer_kw > 0.0 && capability > 0.0 {
        h2_energy_equivalent / capability
    } else {
        0.0
    }
}

/// Derives the lifecycle economics of a solved design.
///
/// The electrolyzer lifetime sets the evaluation period for discounted O&M and for the
/// lifetime hydrogen output, which is the annual target times that lifetime regardless of the
/// simulated window.
pub fn calculate_financial_summary(
    config: &OptimizationConfig,
    capacities: &AssetCapacities,
    objective_value: f64,
) -> FinancialSummary {
    let catalog = &config.technologies;
    let annualized = annualized_unit_costs(catalog, config.discount_rate);

    let asset_costs: Vec<AssetCost> = catalog
        .iter()
        .map(|(asset, technology)| {
            let capacity_kw = capacities.get(asset);
            AssetCost {
                asset,
                capacity_kw,
                capital_cost: technology.capital_cost * capacity_kw,
                yearly_maintenance: technology.maintenance_cost * capacity_kw,
                annualized_cost: annualized[&asset] * capacity_kw,
            }
        })
        .collect();

    let total_investment: f64 = asset_costs.iter().map(|cost| cost.capital_cost).sum();
    let yearly_om: f64 = asset_costs.iter().map(|cost| cost.yearly_maintenance).sum();

    let system_lifetime_years = catalog.electrolyzer.lifetime_years;
    let present_value_om =
        present_value_of_annual_cost(yearly_om, config.discount_rate, system_lifetime_years);
    let lifecycle_cost = total_investment + present_value_om;

    let lifetime_h2_kg = config.h2_annual_target_kg * system_lifetime_years as f64;
    let levelized_cost_per_kg = (lifetime_h2_kg > 0.0).then(|| lifecycle_cost / lifetime_h2_kg);

    let horizon_target_kg = prorate_to_horizon(config.h2_annual_target_kg, config.horizon_hours);
    let horizon_cost_per_kg = (horizon_target_kg > 0.0).then(|| objective_value / horizon_target_kg);

    FinancialSummary {
        system_lifetime_years,
        total_investment,
        yearly_om,
        present_value_om,
        lifecycle_cost,
        lifetime_h2_kg,
        levelized_cost_per_kg,
        horizon_cost_per_kg,
        electrolyzer_utilization: electrolyzer_utilization(
            horizon_target_kg,
            capacities.electrolyzer_kw,
            catalog.electrolyzer.efficiency,
            config.horizon_hours,
        ),
        asset_costs,
    }
}
