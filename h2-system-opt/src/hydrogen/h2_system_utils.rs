use std::fmt;
use std::fs;
use std::path::Path;

use h2_model::general::technology::{Asset, TechnologyCatalog};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration bundle holding every constant of a sizing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizationConfig {
    // Technology costs, efficiencies and lifetimes
    pub technologies: TechnologyCatalog,

    // Economic parameters
    pub discount_rate: f64,         // Discount rate for annuities and present values
    pub excess_penalty: f64,        // Cost per kWh of curtailed renewable generation
    pub charge_cost: f64,           // Cost per kWh charged into the battery
    pub discharge_cost: f64,        // Cost per kWh discharged from the battery

    // Hydrogen production
    pub h2_annual_target_kg: f64,      // Annual hydrogen production target (kg)
    pub electrolyzer_flexibility: f64, // Maximum relative load change per hour

    // Model parameters
    pub horizon_hours: usize,           // Length of the simulated window
    pub min_renewable_capacity_kw: f64, // Floor on combined wind and PV capacity
    pub wind_derating: f64,             // Applied to raw wind profiles by the loader

    pub solver: SolverSettings,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            technologies: TechnologyCatalog::default(),

            // Economic parameters
            discount_rate: 0.07,
            excess_penalty: 0.0,
            charge_cost: 0.001,
            discharge_cost: 0.001,

            // Hydrogen production
            h2_annual_target_kg: 10.0 * 1000.0,
            electrolyzer_flexibility: 0.2,

            // One week
            horizon_hours: 24 * 7,
            min_renewable_capacity_kw: 0.1,
            wind_derating: 0.8,

            solver: SolverSettings::default(),
        }
    }
}

/// LP backend used to solve the sizing model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackendKind {
    #[default]
    Highs,
    Clarabel,
}

/// Algorithm for the continuous relaxation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LpMethod {
    Choose,
    Simplex,
    #[default]
    Ipm,
}

impl LpMethod {
    /// Value of the HiGHS `solver` option.
    pub fn highs_name(&self) -> &'static str {
        match self {
            LpMethod::Choose => "choose",
            LpMethod::Simplex => "simplex",
            LpMethod::Ipm => "ipm",
        }
    }
}

impl fmt::Display for LpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.highs_name())
    }
}

/// HiGHS stores its thread count as a C int.
pub const MAX_SOLVER_THREADS: u32 = i32::MAX as u32;

/// Solver budget and strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverSettings {
    pub backend: SolverBackendKind,
    /// Wall-clock budget of a single solve.
    pub time_limit_secs: f64,
    /// Relative optimality gap accepted as solved.
    pub mip_rel_gap: f64,
    pub threads: u32,
    pub method: LpMethod,
    /// Whether to run crossover after the interior point method.
    pub crossover: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            backend: SolverBackendKind::Highs,
            time_limit_secs: 100.0,
            mip_rel_gap: 0.1,
            threads: 1,
            method: LpMethod::Ipm,
            crossover: false,
        }
    }
}

/// Input that cannot produce a meaningful model; raised before any variable is created.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("horizon must cover at least one hour")]
    EmptyHorizon,
    #[error("{profile} profile has {len} hours but the horizon needs {horizon}")]
    ProfileTooShort {
        profile: &'static str,
        len: usize,
        horizon: usize,
    },
    #[error("{profile} profile value at hour {hour} is {value}, expected a finite non-negative number")]
    InvalidProfileValue {
        profile: &'static str,
        hour: usize,
        value: f64,
    },
    #[error("{asset} lifetime must be at least one year")]
    NonPositiveLifetime { asset: Asset },
    #[error("{field} is {value}, expected a finite non-negative number")]
    NegativeValue { field: String, value: f64 },
    #[error("{field} is {value}, expected a value in {range}")]
    OutOfRange {
        field: String,
        value: f64,
        range: &'static str,
    },
    #[error("solver.{field} {message}")]
    InvalidSolverSetting {
        field: &'static str,
        message: String,
    },
}

/// Failure to load a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read \"{path}\": {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

fn non_negative(field: impl Into<String>, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NegativeValue {
            field: field.into(),
            value,
        })
    }
}

fn within(
    field: impl Into<String>,
    value: f64,
    valid: bool,
    range: &'static str,
) -> Result<(), ValidationError> {
    if valid && value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: field.into(),
            value,
            range,
        })
    }
}

impl OptimizationConfig {
    /// Parses a configuration from a TOML file. Missing fields keep their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Returns a copy with a different annual hydrogen target.
    pub fn with_target(&self, h2_annual_target_kg: f64) -> Self {
        Self {
            h2_annual_target_kg,
            ..self.clone()
        }
    }

    /// Checks every constant and fails on the first one that would make the model meaningless.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.horizon_hours == 0 {
            return Err(ValidationError::EmptyHorizon);
        }

        for (asset, technology) in self.technologies.iter() {
            let key = asset.key();
            if technology.lifetime_years == 0 {
                return Err(ValidationError::NonPositiveLifetime { asset });
            }
            non_negative(format!("technologies.{key}.capital_cost"), technology.capital_cost)?;
            non_negative(
                format!("technologies.{key}.maintenance_cost"),
                technology.maintenance_cost,
            )?;
            within(
                format!("technologies.{key}.efficiency"),
                technology.efficiency,
                technology.efficiency > 0.0 && technology.efficiency <= 1.0,
                "(0, 1]",
            )?;
        }

        non_negative("discount_rate", self.discount_rate)?;
        non_negative("excess_penalty", self.excess_penalty)?;
        non_negative("charge_cost", self.charge_cost)?;
        non_negative("discharge_cost", self.discharge_cost)?;
        non_negative("h2_annual_target_kg", self.h2_annual_target_kg)?;
        non_negative("min_renewable_capacity_kw", self.min_renewable_capacity_kw)?;
        within(
            "electrolyzer_flexibility",
            self.electrolyzer_flexibility,
            (0.0..=1.0).contains(&self.electrolyzer_flexibility),
            "[0, 1]",
        )?;
        within(
            "wind_derating",
            self.wind_derating,
            (0.0..=1.0).contains(&self.wind_derating),
            "[0, 1]",
        )?;

        self.solver.validate()
    }
}

impl SolverSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.time_limit_secs.is_finite() && self.time_limit_secs > 0.0) {
            return Err(ValidationError::InvalidSolverSetting {
                field: "time_limit_secs",
                message: format!("must be a positive number of seconds, got {}", self.time_limit_secs),
            });
        }
        if !(self.mip_rel_gap.is_finite() && self.mip_rel_gap >= 0.0) {
            return Err(ValidationError::InvalidSolverSetting {
                field: "mip_rel_gap",
                message: format!("must be non-negative, got {}", self.mip_rel_gap),
            });
        }
        if self.threads == 0 || self.threads > MAX_SOLVER_THREADS {
            return Err(ValidationError::InvalidSolverSetting {
                field: "threads",
                message: format!("must be between 1 and {MAX_SOLVER_THREADS}, got {}", self.threads),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = OptimizationConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.horizon_hours, 168);
        assert_eq!(config.solver.method, LpMethod::Ipm);
        assert!(!config.solver.crossover);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml = r#"
h2_annual_target_kg = 5000.0
horizon_hours = 48

[solver]
threads = 2
"#;
        let config = OptimizationConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.h2_annual_target_kg, 5000.0);
        assert_eq!(config.horizon_hours, 48);
        assert_eq!(config.solver.threads, 2);
        assert_eq!(config.solver.time_limit_secs, 100.0);
        assert_eq!(config.discount_rate, 0.07);
        assert_eq!(config.technologies, TechnologyCatalog::default());
    }

    #[test]
    fn test_technology_override_from_toml() {
        let toml = r#"
[technologies.storage]
capital_cost = 120.0
maintenance_cost = 8.0
efficiency = 0.92
lifetime_years = 12

[solver]
backend = "clarabel"
method = "simplex"
"#;
        let config = OptimizationConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.technologies.storage.capital_cost, 120.0);
        assert_eq!(config.technologies.storage.lifetime_years, 12);
        assert_eq!(config.technologies.wind.capital_cost, 500.0);
        assert_eq!(config.solver.backend, SolverBackendKind::Clarabel);
        assert_eq!(config.solver.method, LpMethod::Simplex);
    }

    #[test]
    fn test_reference_scenario_matches_defaults() {
        let config =
            OptimizationConfig::from_toml_str(include_str!("../../../scenarios/default.toml")).unwrap();
        assert_eq!(config, OptimizationConfig::default());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let toml = r#"
horizon_hours = 24
bogus_field = true
"#;
        let result = OptimizationConfig::from_toml_str(toml);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_toml_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "electrolyzer_flexibility = 0.5\n").unwrap();

        let config = OptimizationConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.electrolyzer_flexibility, 0.5);

        let missing = OptimizationConfig::from_toml_file(Path::new("does/not/exist.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_validation_catches_zero_lifetime() {
        let mut config = OptimizationConfig::default();
        config.technologies.storage.lifetime_years = 0;
        assert_eq!(
            config.validate(),
            Err(ValidationError::NonPositiveLifetime {
                asset: Asset::Storage
            })
        );
    }

    #[test]
    fn test_validation_catches_negative_cost() {
        let mut config = OptimizationConfig::default();
        config.technologies.wind.capital_cost = -1.0;
        match config.validate() {
            Err(ValidationError::NegativeValue { field, value }) => {
                assert_eq!(field, "technologies.wind.capital_cost");
                assert_eq!(value, -1.0);
            }
            other => panic!("unexpected validation result: {other:?}"),
        }
    }

    #[test]
    fn test_validation_catches_bad_efficiency_and_flexibility() {
        let mut config = OptimizationConfig::default();
        config.technologies.electrolyzer.efficiency = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::OutOfRange { .. })
        ));

        let mut config = OptimizationConfig::default();
        config.electrolyzer_flexibility = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validation_catches_empty_horizon_and_solver_settings() {
        let mut config = OptimizationConfig::default();
        config.horizon_hours = 0;
        assert_eq!(config.validate(), Err(ValidationError::EmptyHorizon));

        let mut config = OptimizationConfig::default();
        config.solver.threads = 0;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidSolverSetting { field: "threads", .. })
        ));

        let mut config = OptimizationConfig::default();
        config.solver.threads = MAX_SOLVER_THREADS + 1;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidSolverSetting { field: "threads", .. })
        ));

        let mut config = OptimizationConfig::default();
        config.solver.time_limit_secs = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidSolverSetting {
                field: "time_limit_secs",
                ..
            })
        ));
    }

    #[test]
    fn test_with_target() {
        let config = OptimizationConfig::default().with_target(2500.0);
        assert_eq!(config.h2_annual_target_kg, 2500.0);
        assert_eq!(config.horizon_hours, 168);
    }
}
