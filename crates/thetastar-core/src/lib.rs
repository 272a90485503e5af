//! # thetastar-core
//!
//! **Is one angle enough to explain the mixing matrices?**
//!
//! `thetastar-core` scores parametric hypotheses ("ansätze") that tie the
//! neutrino (PMNS) and quark (CKM) mixing observables to a single master
//! phase θ★. It draws seeded uniform samples over an ansatz's parameter box,
//! scores every sample with a weighted χ² against experimental targets, and
//! records the full sample table plus a best-fit summary.
//!
//! ## Quick Start
//!
//! ```no_run
//! use thetastar_core::{SweepConfig, TargetCatalog, record_sweep};
//!
//! let config = SweepConfig {
//!     ansatz_name: "theta_star_v2".to_string(),
//!     n_samples: 2000,
//!     seed: Some(123),
//!     ..SweepConfig::default()
//! };
//! let run = record_sweep(&config, &TargetCatalog::builtin(), None).unwrap();
//! println!(
//!     "{}: best chi2 = {:.3} at theta* = {:?}",
//!     run.run_id,
//!     run.outcome.summary.best_loss.chi2_total,
//!     run.outcome.summary.best_params.get("theta_star"),
//! );
//! ```
//!
//! ## Architecture
//!
//! Targets → Ansatz (params → predictions) → Loss (χ²) → Sweep → results.csv + run_meta.json
//!
//! Every ansatz implements the [`Ansatz`] trait and is resolved by name
//! through [`get_ansatz`]. The [`TargetCatalog`] is built once and passed
//! explicitly to everything that needs it. Recorded runs are read back by
//! the [`analysis`] module.

pub mod analysis;
pub mod ansatz;
pub mod error;
pub mod loss;
pub mod results;
pub mod runlog;
pub mod sweep;
pub mod targets;

pub use analysis::{
    Chi2Stats, PosteriorSummary, RollupEntry, RunSamples, Selection, ThetaSummary, chi2_p_value,
    chi2_stats, delta_chi2_for_cl, load_run, rollup_runs, select_theta_column,
    summarize_posterior, theta_summary,
};
pub use ansatz::{
    Ansatz, Bound, ParamAssignment, ParamBounds, Prediction, THETA_STAR, all_ansatze,
    available_ansatze, get_ansatz,
};
pub use error::{Error, Result};
pub use loss::{LossBreakdown, SectorChi2, ckm_chi2, joint_chi2, pmns_chi2};
pub use results::{ResultsTable, read_results_table, write_results_table};
pub use runlog::{MachineInfo, RunMeta, read_run_meta, write_run_meta};
pub use sweep::{
    RecordedRun, SampleRow, SweepConfig, SweepOutcome, SweepSummary, default_run_id,
    record_sweep, run_sweep,
};
pub use targets::{
    MassOrdering, TAU, Target, TargetCatalog, TargetMap, angle_distance, wrap_to_interval,
};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
