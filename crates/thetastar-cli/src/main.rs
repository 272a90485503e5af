//! CLI for theta-star: seeded sweeps of θ★ ansätze and analysis of recorded runs.

mod commands;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use thetastar_core::MassOrdering;
use thetastar_core::analysis::{DEFAULT_CHI2_MAX, DEFAULT_POSTERIOR_OUTPUT};
use thetastar_core::sweep::DEFAULT_BASE_DIR;

#[derive(Parser)]
#[command(name = "thetastar")]
#[command(about = "thetastar — is one angle enough to explain the mixing matrices?")]
#[command(version = thetastar_core::VERSION)]
struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Joint PMNS + CKM random sweep for one ansatz.
    /// Writes <base-dir>/<run-id>/results.csv and run_meta.json.
    Sweep {
        /// Ansatz registry key or alias (delta_only, v1, v2)
        #[arg(long, default_value = "theta_star_delta_only")]
        ansatz: String,

        /// Neutrino mass ordering: NO or IO (case-insensitive)
        #[arg(long, default_value = "NO")]
        ordering: MassOrdering,

        /// Number of random samples
        #[arg(long, default_value = "2000")]
        samples: usize,

        /// RNG seed
        #[arg(long, default_value = "123")]
        seed: u64,

        /// Run identifier (default: <ORDERING>_<ansatz>_N<samples>)
        #[arg(long)]
        run_id: Option<String>,

        /// Leave the PMNS sector out of the χ²
        #[arg(long)]
        no_pmns: bool,

        /// Leave the CKM sector out of the χ²
        #[arg(long)]
        no_ckm: bool,

        /// Directory holding one sub-directory per run
        #[arg(long, default_value = DEFAULT_BASE_DIR)]
        base_dir: PathBuf,

        /// Target catalog JSON (default: built-in NuFIT 5.2 / PDG values)
        #[arg(long)]
        targets: Option<PathBuf>,
    },

    /// CKM-only sweep (PMNS sector off, ordering NO).
    CkmSweep {
        #[arg(long, default_value = "theta_star_delta_only")]
        ansatz: String,

        #[arg(long, default_value = "2000")]
        samples: usize,

        #[arg(long, default_value = "123")]
        seed: u64,

        #[arg(long)]
        run_id: Option<String>,

        #[arg(long, default_value = DEFAULT_BASE_DIR)]
        base_dir: PathBuf,

        #[arg(long)]
        targets: Option<PathBuf>,
    },

    /// List registered ansätze with their parameters and sampling bounds
    Ansatze {
        #[arg(long, default_value = "NO")]
        ordering: MassOrdering,

        #[arg(long)]
        targets: Option<PathBuf>,
    },

    /// Show the active target catalog
    Targets {
        /// Print as JSON (loadable with --targets)
        #[arg(long)]
        json: bool,

        #[arg(long)]
        targets: Option<PathBuf>,
    },

    /// χ² statistics, best-fit p-value and θ★ spread of a recorded run
    Inspect {
        /// Run identifier (directory name under --base-dir)
        run_id: String,

        #[arg(long, default_value = DEFAULT_BASE_DIR)]
        base_dir: PathBuf,
    },

    /// θ★ distribution in the good-χ² region of a recorded run
    Analyze {
        run_id: String,

        #[arg(long, default_value = DEFAULT_BASE_DIR)]
        base_dir: PathBuf,

        /// Keep samples with chi2_total <= CHI2_MAX
        #[arg(long, conflicts_with_all = ["delta_chi2", "cl"])]
        chi2_max: Option<f64>,

        /// Keep samples with chi2_total <= chi2_min + DELTA_CHI2
        #[arg(long, conflicts_with = "cl")]
        delta_chi2: Option<f64>,

        /// Like --delta-chi2, with the threshold of this confidence level (1 dof)
        #[arg(long)]
        cl: Option<f64>,
    },

    /// Combine several runs into one θ★ posterior summary (JSON)
    Posterior {
        /// Run to include (repeatable)
        #[arg(long = "run-id", required = true)]
        run_ids: Vec<String>,

        /// Only samples with chi2_total <= CHI2_MAX are used
        #[arg(long, default_value_t = DEFAULT_CHI2_MAX)]
        chi2_max: f64,

        #[arg(long, default_value = DEFAULT_BASE_DIR)]
        base_dir: PathBuf,

        /// Output JSON path
        #[arg(long, default_value = DEFAULT_POSTERIOR_OUTPUT)]
        output: PathBuf,
    },

    /// One CSV line per recorded run
    Rollup {
        #[arg(long, default_value = DEFAULT_BASE_DIR)]
        base_dir: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Sweep {
            ansatz,
            ordering,
            samples,
            seed,
            run_id,
            no_pmns,
            no_ckm,
            base_dir,
            targets,
        } => commands::sweep::run(commands::sweep::SweepCommandConfig {
            ansatz: &ansatz,
            ordering,
            samples,
            seed,
            run_id: run_id.as_deref(),
            include_pmns: !no_pmns,
            include_ckm: !no_ckm,
            base_dir,
            targets_path: targets.as_deref(),
        }),
        Commands::CkmSweep {
            ansatz,
            samples,
            seed,
            run_id,
            base_dir,
            targets,
        } => commands::sweep::run(commands::sweep::SweepCommandConfig {
            ansatz: &ansatz,
            ordering: MassOrdering::Normal,
            samples,
            seed,
            run_id: run_id.as_deref(),
            include_pmns: false,
            include_ckm: true,
            base_dir,
            targets_path: targets.as_deref(),
        }),
        Commands::Ansatze { ordering, targets } => {
            commands::ansatze::run(ordering, targets.as_deref())
        }
        Commands::Targets { json, targets } => commands::targets::run(json, targets.as_deref()),
        Commands::Inspect { run_id, base_dir } => commands::inspect::run(&run_id, &base_dir),
        Commands::Analyze {
            run_id,
            base_dir,
            chi2_max,
            delta_chi2,
            cl,
        } => commands::analyze::run(&run_id, &base_dir, chi2_max, delta_chi2, cl),
        Commands::Posterior {
            run_ids,
            chi2_max,
            base_dir,
            output,
        } => commands::posterior::run(&run_ids, chi2_max, &base_dir, &output),
        Commands::Rollup { base_dir } => commands::rollup::run(&base_dir),
    }
}
