use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// Asset classes whose capacity is sized by the optimizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "./technology.ts")]
pub enum Asset {
    Wind,
    SolarPv,
    Storage,
    Electrolyzer,
}

impl Asset {
    /// All assets in objective and report order.
    pub const ALL: [Asset; 4] = [
        Asset::Wind,
        Asset::SolarPv,
        Asset::Storage,
        Asset::Electrolyzer,
    ];

    /// Get the display name of the asset
    pub fn name(&self) -> &'static str {
        match self {
            Asset::Wind => "Wind farm",
            Asset::SolarPv => "Solar PV",
            Asset::Storage => "Battery storage",
            Asset::Electrolyzer => "Electrolyzer",
        }
    }

    /// Get the configuration key of the asset
    pub fn key(&self) -> &'static str {
        match self {
            Asset::Wind => "wind",
            Asset::SolarPv => "solar_pv",
            Asset::Storage => "storage",
            Asset::Electrolyzer => "electrolyzer",
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cost, efficiency and lifetime figures of one technology.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[serde(deny_unknown_fields)]
#[ts(export, export_to = "./technology.ts")]
pub struct Technology {
    /// Capital cost per kW of installed capacity.
    pub capital_cost: f64,
    /// Maintenance cost per kW of installed capacity and year.
    pub maintenance_cost: f64,
    /// Round-trip (storage) or conversion (electrolyzer) efficiency, 1.0 for generators.
    pub efficiency: f64,
    /// Operational lifetime in years.
    pub lifetime_years: u32,
}

impl Technology {
    pub fn new(capital_cost: f64, maintenance_cost: f64, efficiency: f64, lifetime_years: u32) -> Self {
        Self {
            capital_cost,
            maintenance_cost,
            efficiency,
            lifetime_years,
        }
    }

    /// Capital recovery factor of this technology at the given discount rate.
    pub fn capital_recovery_factor(&self, discount_rate: f64) -> f64 {
        capital_recovery_factor(self.lifetime_years, discount_rate)
    }

    /// Yearly cost of one kW: annuity of the capital cost plus maintenance.
    ///
    /// `capital_cost * r / (1 - (1 + r)^-life) + maintenance_cost`
    pub fn annualized_unit_cost(&self, discount_rate: f64) -> f64 {
        self.capital_cost * self.capital_recovery_factor(discount_rate) + self.maintenance_cost
    }
}

/// Calculates the capital recovery factor for a lifetime and discount rate.
///
/// A zero rate falls back to straight-line recovery `1 / lifetime`, the limit of the
/// annuity formula. A zero lifetime yields zero.
pub fn capital_recovery_factor(lifetime_years: u32, discount_rate: f64) -> f64 {
    if lifetime_years == 0 {
        return 0.0;
    }
    if discount_rate == 0.0 {
        return 1.0 / lifetime_years as f64;
    }
    discount_rate / (1.0 - (1.0 + discount_rate).powi(-(lifetime_years as i32)))
}

/// The technology records of all four assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[serde(default, deny_unknown_fields)]
#[ts(export, export_to = "./technology.ts")]
pub struct TechnologyCatalog {
    pub wind: Technology,
    pub solar_pv: Technology,
    pub storage: Technology,
    pub electrolyzer: Technology,
}

impl Default for TechnologyCatalog {
    fn default() -> Self {
        Self {
            wind: Technology::new(500.0, 20.0, 1.0, 20),
            solar_pv: Technology::new(300.0, 15.0, 1.0, 25),
            storage: Technology::new(150.0, 10.0, 0.9, 10),
            electrolyzer: Technology::new(300.0, 25.0, 0.7, 15),
        }
    }
}

impl TechnologyCatalog {
    pub fn get(&self, asset: Asset) -> &Technology {
        match asset {
            Asset::Wind => &self.wind,
            Asset::SolarPv => &self.solar_pv,
            Asset::Storage => &self.storage,
            Asset::Electrolyzer => &self.electrolyzer,
        }
    }

    /// Iterate over `(asset, technology)` pairs in [`Asset::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Asset, &Technology)> {
        Asset::ALL.into_iter().map(move |asset| (asset, self.get(asset)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capital_recovery_factor() {
        let crf = capital_recovery_factor(20, 0.07);
        assert!((crf - 0.094_392_925_743_255_67).abs() < 1e-12);
    }

    #[test]
    fn test_capital_recovery_factor_zero_rate() {
        assert_eq!(capital_recovery_factor(10, 0.0), 0.1);
        assert_eq!(capital_recovery_factor(0, 0.07), 0.0);
    }

    #[test]
    fn test_default_annualized_costs() {
        let catalog = TechnologyCatalog::default();
        let expected = [
            (Asset::Wind, 67.196_462_871_627_83),
            (Asset::SolarPv, 40.743_155_166_199_685),
            (Asset::Storage, 31.356_625_409_104_698),
            (Asset::Electrolyzer, 57.938_387_410_301_94),
        ];
        for (asset, cost) in expected {
            let annualized = catalog.get(asset).annualized_unit_cost(0.07);
            assert!(
                (annualized - cost).abs() < 1e-9,
                "{asset}: {annualized} != {cost}"
            );
        }
    }

    #[test]
    fn test_catalog_iter_order() {
        let catalog = TechnologyCatalog::default();
        let assets: Vec<Asset> = catalog.iter().map(|(asset, _)| asset).collect();
        assert_eq!(assets, Asset::ALL.to_vec());
    }
}
