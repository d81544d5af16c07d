use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use h2_system_opt::general::profiles::RenewableProfiles;
use h2_system_opt::hydrogen::h2_system_utils::OptimizationConfig;
use h2_system_opt::hydrogen::report::{print_outcome, print_sweep_table, write_design_json};
use h2_system_opt::hydrogen::sweep::summarize_sweep;
use h2_system_opt::{optimize, run_target_sweep};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Size the system for a single hydrogen target
    Run {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Annual hydrogen target in kg
        #[arg(short, long)]
        target: Option<f64>,

        /// Write the full design as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Size the system for several hydrogen targets in parallel
    Sweep {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Annual hydrogen targets in kg
        #[arg(long, value_delimiter = ',', num_args = 1.., default_values_t = vec![2500.0, 5000.0, 10000.0, 20000.0])]
        targets: Vec<f64>,
    },
}

#[derive(Args, Debug)]
struct ScenarioArgs {
    /// TOML configuration; defaults apply to every missing field
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Simulated window in hours
    #[arg(long)]
    hours: Option<usize>,

    /// Constant PV output per kW installed
    #[arg(long, default_value_t = 0.5)]
    solar: f64,

    /// Constant raw wind output per kW installed, before derating
    #[arg(long, default_value_t = 0.5)]
    wind: f64,
}

impl ScenarioArgs {
    fn load(&self) -> Result<(OptimizationConfig, RenewableProfiles)> {
        let mut config = match &self.config {
            Some(path) => OptimizationConfig::from_toml_file(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?,
            None => OptimizationConfig::default(),
        };
        if let Some(hours) = self.hours {
            config.horizon_hours = hours;
        }

        let hours = config.horizon_hours;
        let profiles = RenewableProfiles::from_raw(
            vec![self.solar; hours],
            vec![self.wind; hours],
            config.wind_derating,
        );
        Ok((config, profiles))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Run {
            scenario,
            target,
            output,
        } => {
            let (mut config, profiles) = scenario.load()?;
            if let Some(target) = target {
                config.h2_annual_target_kg = target;
            }

            let outcome = optimize(&config, &profiles).context("invalid optimization input")?;
            print_outcome(&outcome);

            let Some(design) = outcome.solution() else {
                bail!("no feasible design: {}", outcome.status());
            };
            if let Some(path) = output {
                write_design_json(design, &path)?;
                println!("Design written to {}", path.display());
            }
        }
        Command::Sweep { scenario, targets } => {
            let (config, profiles) = scenario.load()?;
            let points =
                run_target_sweep(&config, &profiles, &targets).context("invalid sweep input")?;
            print_sweep_table(&summarize_sweep(&points));
        }
    }

    println!("Optimization complete!");
    Ok(())
}
