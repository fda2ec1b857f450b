//! Command-line driver: one periodic Euler run with optional verification.

use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use dg_hex::simulation::{run_simulation, ProblemKind, RunConfig, RunReport};

/// Curvilinear periodic DG solver for the 3D compressible Euler equations
#[derive(Parser, Debug)]
#[command(name = "dg-hex")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Curvilinear periodic DG solver for the 3D Euler equations", long_about = None)]
struct Cli {
    /// Polynomial order N
    #[arg(default_value_t = 3)]
    order: usize,

    /// Elements along the short axis (K1D)
    #[arg(default_value_t = 8)]
    elements_per_axis: usize,

    /// CFL number
    #[arg(default_value_t = 1.0)]
    cfl: f64,

    /// Final time T
    #[arg(default_value_t = 1.0)]
    final_time: f64,

    /// Curved warp amplitude (0 = straight-sided)
    #[arg(default_value_t = 0.5)]
    amplitude: f64,

    /// Test problem (vortex, taylor-green)
    #[arg(long, default_value = "vortex")]
    problem: ProblemKind,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Skip the L2 error against the analytic solution
    #[arg(long)]
    no_verify: bool,

    /// Report every this many steps
    #[arg(long)]
    report_interval: Option<usize>,

    /// Kernel backend (cpu, or burn when built with `burn-ndarray`)
    #[arg(long, default_value = "cpu")]
    backend: String,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        let config = RunConfig::new()
            .with_order(self.order)
            .with_elements_per_axis(self.elements_per_axis)
            .with_cfl(self.cfl)
            .with_final_time(self.final_time)
            .with_amplitude(self.amplitude)
            .with_problem(self.problem)
            .with_verify(!self.no_verify);
        match self.report_interval {
            Some(interval) => config.with_report_interval(interval),
            None => config,
        }
    }
}

fn run(backend: &str, config: &RunConfig) -> anyhow::Result<RunReport> {
    match backend {
        "cpu" => Ok(run_simulation(config)?),
        #[cfg(feature = "burn-ndarray")]
        "burn" => {
            use dg_hex::device::burn::BurnAccelerator;
            let accelerator = BurnAccelerator::<burn_ndarray::NdArray<f64>>::default();
            Ok(dg_hex::simulation::run_with(config, accelerator)?)
        }
        other => anyhow::bail!("unknown backend `{}`", other),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = cli.run_config();
    let report = run(&cli.backend, &config)?;

    let elapsed = report.summary.elapsed.as_secs_f64();
    match report.l2_error {
        Some(err) => println!(
            "{} steps in {:.3} s, L2 error = {:.6e} (regression bound {:.3e})",
            report.summary.n_steps,
            elapsed,
            err,
            report.regression_bound()
        ),
        None => println!("{} steps in {:.3} s", report.summary.n_steps, elapsed),
    }
    Ok(())
}
