use std::time::{Duration, Instant};

use good_lp::{Constraint, Expression, Solution, Variable, constraint, variable};
use h2_model::general::technology::Asset;
use h2_model::results::dispatch::DispatchTrajectories;
use h2_model::results::{AssetCapacities, H2SystemDesign};
use tracing::{info, warn};

use crate::general::finance::{annualized_unit_costs, calculate_financial_summary, prorate_to_horizon};
use crate::general::profiles::{ProfileWindow, RenewableProfiles};
use crate::hydrogen::backend::{ClarabelBackend, HighsBackend, LpBackend, SolveOutcome};
use crate::hydrogen::h2_system_utils::{OptimizationConfig, SolverBackendKind, ValidationError};

pub const MJ_PER_KWH: f64 = 3.6;
/// Lower heating value of hydrogen.
pub const H2_MJ_PER_KG: f64 = 120.0;
/// Hydrogen produced per kWh of electrolyzer output.
pub const H2_KG_PER_KWH: f64 = MJ_PER_KWH / H2_MJ_PER_KG;

pub type OptimizationOutcome = SolveOutcome<H2SystemDesign>;

struct OptimizationVariables {
    cap_wind: Variable,
    cap_pv: Variable,
    cap_storage: Variable,
    cap_electrolyzer: Variable,
    // storage energy level
    e_storage: Vec<Variable>,
    // battery charge and discharge power
    p_charge: Vec<Variable>,
    p_discharge: Vec<Variable>,
    // electrical load of the electrolyzer
    p_load: Vec<Variable>,
    // curtailed generation
    p_excess: Vec<Variable>,
}

impl OptimizationVariables {
    fn capacity(&self, asset: Asset) -> Variable {
        match asset {
            Asset::Wind => self.cap_wind,
            Asset::SolarPv => self.cap_pv,
            Asset::Storage => self.cap_storage,
            Asset::Electrolyzer => self.cap_electrolyzer,
        }
    }
}

/// Builds the objective: annualized investment of every asset plus the operating terms of the
/// simulated window. The excess penalty is averaged over the window, while charge and discharge
/// costs are summed.
fn generate_objective(config: &OptimizationConfig, vars: &OptimizationVariables, hours: usize) -> Expression {
    let mut objective = Expression::default();

    // Investment costs
    for (asset, unit_cost) in annualized_unit_costs(&config.technologies, config.discount_rate) {
        objective += unit_cost * vars.capacity(asset);
    }

    // Operating costs
    let excess_penalty_per_hour = config.excess_penalty / hours as f64;
    for t in 0..hours {
        objective += excess_penalty_per_hour * vars.p_excess[t];
        objective += config.charge_cost * vars.p_charge[t];
        objective += config.discharge_cost * vars.p_discharge[t];
    }

    objective
}

/// One-shot builder of the sizing model over a backend.
///
/// Construction validates the configuration and the profiles, then creates every variable.
/// `solve` consumes the builder, so a model instance is never reused.
pub struct H2ModelBuilder<'a, B: LpBackend> {
    backend: B,
    config: &'a OptimizationConfig,
    profiles: ProfileWindow<'a>,
    vars: OptimizationVariables,
}

impl<'a, B: LpBackend> H2ModelBuilder<'a, B> {
    pub fn new(
        mut backend: B,
        config: &'a OptimizationConfig,
        profiles: &'a RenewableProfiles,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        let profiles = profiles.window(config.horizon_hours)?;
        let hours = profiles.hours();

        let mut non_negative = || backend.add_variable(variable().min(0.0));
        let cap_wind = non_negative();
        let cap_pv = non_negative();
        let cap_storage = non_negative();
        let cap_electrolyzer = non_negative();

        let mut e_storage = Vec::with_capacity(hours);
        let mut p_charge = Vec::with_capacity(hours);
        let mut p_discharge = Vec::with_capacity(hours);
        let mut p_load = Vec::with_capacity(hours);
        let mut p_excess = Vec::with_capacity(hours);
        for _t in 0..hours {
            e_storage.push(non_negative());
            p_charge.push(non_negative());
            p_discharge.push(non_negative());
            p_load.push(non_negative());
            p_excess.push(non_negative());
        }

        Ok(Self {
            backend,
            config,
            profiles,
            vars: OptimizationVariables {
                cap_wind,
                cap_pv,
                cap_storage,
                cap_electrolyzer,
                e_storage,
                p_charge,
                p_discharge,
                p_load,
                p_excess,
            },
        })
    }

    pub fn hours(&self) -> usize {
        self.profiles.hours()
    }

    /// Constraints of hour `t`: storage bounds, power balance, state of charge, electrolyzer
    /// capacity and, from the second hour on, the two ramp limits.
    pub fn hourly_constraints(&self, t: usize) -> Vec<Constraint> {
        let vars = &self.vars;
        let eta_storage = self.config.technologies.storage.efficiency;
        let flex = self.config.electrolyzer_flexibility;
        let wind_t = self.profiles.wind[t];
        let solar_t = self.profiles.solar[t];

        let mut constraints = Vec::with_capacity(7);

        // Storage level and throughput are both bounded by the battery capacity
        constraints.push(constraint!(vars.e_storage[t] <= vars.cap_storage));
        constraints.push(constraint!(
            vars.p_charge[t] + vars.p_discharge[t] <= vars.cap_storage
        ));

        // Power balance: wind + PV + discharge = electrolyzer + charge + excess
        constraints.push(constraint!(
            wind_t * vars.cap_wind + solar_t * vars.cap_pv + vars.p_discharge[t]
                == vars.p_load[t] + vars.p_charge[t] + vars.p_excess[t]
        ));

        // State of charge. Discharge is divided by the efficiency in the first hour only.
        if t == 0 {
            constraints.push(constraint!(
                vars.e_storage[0] == eta_storage * vars.p_charge[0] - (1.0 / eta_storage) * vars.p_discharge[0]
            ));
        } else {
            constraints.push(constraint!(
                vars.e_storage[t]
                    == vars.e_storage[t - 1] + eta_storage * vars.p_charge[t]
                        - eta_storage * vars.p_discharge[t]
            ));
        }

        constraints.push(constraint!(vars.cap_electrolyzer >= vars.p_load[t]));

        // Ramp limits on the load shifted by 1 kW
        if t > 0 {
            constraints.push(constraint!(
                vars.p_load[t] + 1.0 <= (1.0 + flex) * vars.p_load[t - 1] + (1.0 + flex)
            ));
            constraints.push(constraint!(
                vars.p_load[t] + 1.0 >= (1.0 - flex) * vars.p_load[t - 1] + (1.0 - flex)
            ));
        }

        constraints
    }

    /// Constraints spanning the whole window: the hydrogen target and the renewable floor.
    pub fn fixed_constraints(&self) -> Vec<Constraint> {
        let vars = &self.vars;
        let eta_electrolyzer = self.config.technologies.electrolyzer.efficiency;
        let horizon_target_kg = prorate_to_horizon(self.config.h2_annual_target_kg, self.hours());

        let total_load: Expression = vars.p_load.iter().map(|&var| Expression::from(var)).sum();

        vec![
            constraint!(total_load * (eta_electrolyzer * H2_KG_PER_KWH) == horizon_target_kg),
            constraint!(vars.cap_wind + vars.cap_pv >= self.config.min_renewable_capacity_kw),
        ]
    }

    /// Adds every constraint and the objective, runs the backend and post-processes the point.
    pub fn solve(mut self) -> OptimizationOutcome {
        let hours = self.hours();
        for t in 0..hours {
            for constraint in self.hourly_constraints(t) {
                self.backend.add_linear_constraint(constraint);
            }
        }
        for constraint in self.fixed_constraints() {
            self.backend.add_linear_constraint(constraint);
        }

        let Self {
            mut backend,
            config,
            profiles,
            vars,
        } = self;

        let objective = generate_objective(config, &vars, hours);
        backend.set_objective(objective.clone());

        info!(
            hours,
            constraints = backend.constraint_count(),
            target_kg = config.h2_annual_target_kg,
            backend = ?config.solver.backend,
            "solving hydrogen sizing model"
        );

        let start_time = Instant::now();
        let outcome = backend.solve(&config.solver);
        let optimization_duration = start_time.elapsed();

        match &outcome {
            SolveOutcome::Optimal(_) => {
                info!(elapsed_ms = optimization_duration.as_millis() as u64, "solved to optimality")
            }
            SolveOutcome::FeasibleSuboptimal(_) => warn!(
                elapsed_ms = optimization_duration.as_millis() as u64,
                "solver stopped at a limit, returning a feasible point"
            ),
            other => warn!(status = %other.status(), "no solution"),
        }

        outcome.map(|solution| {
            format_solution_results(&solution, config, profiles, &vars, objective, optimization_duration)
        })
    }
}

/// Largest negative value accepted as solver round-off.
const NEGATIVE_NOISE_TOLERANCE: f64 = 1e-6;

/// Interior point solutions can carry tiny negative noise on non-negative variables.
fn clamp_non_negative(raw: f64) -> f64 {
    if raw < -NEGATIVE_NOISE_TOLERANCE {
        warn!(value = raw, "solver returned a negative value for a non-negative variable");
    }
    raw.max(0.0)
}

/// Formats the optimization solution into an `H2SystemDesign`
fn format_solution_results<S: Solution>(
    solution: &S,
    config: &OptimizationConfig,
    profiles: ProfileWindow<'_>,
    vars: &OptimizationVariables,
    objective: Expression,
    optimization_duration: Duration,
) -> H2SystemDesign {
    let value = |var: Variable| clamp_non_negative(solution.value(var));
    let series = |hourly: &[Variable]| -> Vec<f64> { hourly.iter().map(|&var| value(var)).collect() };

    let capacities = AssetCapacities {
        wind_kw: value(vars.cap_wind),
        solar_pv_kw: value(vars.cap_pv),
        storage_kw: value(vars.cap_storage),
        electrolyzer_kw: value(vars.cap_electrolyzer),
    };

    let electrolyzer_load = series(&vars.p_load);
    let eta_electrolyzer = config.technologies.electrolyzer.efficiency;

    let wind_output = profiles
        .wind
        .iter()
        .map(|&wind_t| wind_t * capacities.wind_kw)
        .collect();
    let pv_output = profiles
        .solar
        .iter()
        .map(|&solar_t| solar_t * capacities.solar_pv_kw)
        .collect();
    let electrolyzer_power: Vec<f64> = electrolyzer_load
        .iter()
        .map(|&load| load * eta_electrolyzer)
        .collect();
    let h2_production_kg = electrolyzer_power
        .iter()
        .map(|&power| power * H2_KG_PER_KWH)
        .collect();

    let objective_value = solution.eval(objective);
    let horizon_hours = profiles.hours();

    H2SystemDesign {
        horizon_hours,
        horizon_h2_target_kg: prorate_to_horizon(config.h2_annual_target_kg, horizon_hours),
        objective_value,
        capacities,
        dispatch: DispatchTrajectories {
            storage_energy: series(&vars.e_storage),
            charge_power: series(&vars.p_charge),
            discharge_power: series(&vars.p_discharge),
            electrolyzer_load,
            excess_power: series(&vars.p_excess),
            wind_output,
            pv_output,
            electrolyzer_power,
            h2_production_kg,
        },
        financial: calculate_financial_summary(config, &capacities, objective_value),
        solve_time_ms: optimization_duration.as_secs_f64() * 1000.0,
    }
}

/// Builds and solves the sizing model on the given backend.
pub fn run_h2_opt<B: LpBackend>(
    config: &OptimizationConfig,
    profiles: &RenewableProfiles,
    backend: B,
) -> Result<OptimizationOutcome, ValidationError> {
    Ok(H2ModelBuilder::new(backend, config, profiles)?.solve())
}

/// Builds and solves the sizing model on the backend named in the configuration.
pub fn optimize(
    config: &OptimizationConfig,
    profiles: &RenewableProfiles,
) -> Result<OptimizationOutcome, ValidationError> {
    match config.solver.backend {
        SolverBackendKind::Highs => run_h2_opt(config, profiles, HighsBackend::new()),
        SolverBackendKind::Clarabel => run_h2_opt(config, profiles, ClarabelBackend::new()),
    }
}
