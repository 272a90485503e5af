//! δ_CP-only projection of θ★.
//!
//! `theta_star` is identified with the Dirac phase. The remaining PMNS
//! observables are direct free parameters sampled around their targets.
//! Useful for seeing how neutrino data alone constrains the phase; not a
//! structural model.

use super::{Ansatz, ParamAssignment, Prediction, THETA_STAR};
use crate::targets::{DELTA_CP, MassOrdering, Target, TargetCatalog, TargetMap};

pub const NAME: &str = "theta_star_delta_only";

/// Direct PMNS parameters, one per non-phase observable.
const PMNS_DIRECT: [&str; 5] = ["s12_2", "s13_2", "s23_2", "dm21", "dm3l"];

/// Width of the sampling window in units of σ.
const SIGMA_SPAN: f64 = 5.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct DeltaOnly;

/// Sampling window around a target: `value ± 5σ`, or ±20% of the value when
/// σ is unset (`[0, 1]` for a zero value), intersected with `[hard_min, hard_max]`.
fn around(t: Option<&Target>, hard_min: Option<f64>, hard_max: Option<f64>) -> (f64, f64) {
    let (mut lo, mut hi) = match t {
        Some(t) if t.is_constrained() => {
            (t.value - SIGMA_SPAN * t.sigma, t.value + SIGMA_SPAN * t.sigma)
        }
        Some(t) if t.value != 0.0 => {
            let (a, b) = (0.8 * t.value, 1.2 * t.value);
            (a.min(b), a.max(b))
        }
        _ => (0.0, 1.0),
    };
    if let Some(m) = hard_min {
        lo = lo.max(m);
    }
    if let Some(m) = hard_max {
        hi = hi.min(m);
    }
    (lo, hi)
}

fn is_mixing_angle(key: &str) -> bool {
    key.ends_with("_2")
}

impl Ansatz for DeltaOnly {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "theta_star = deltaCP; other PMNS observables are direct parameters"
    }

    fn pmns_params(&self) -> &'static [&'static str] {
        &PMNS_DIRECT
    }

    fn pmns_bounds(&self, pmns: &TargetMap) -> Vec<(&'static str, f64, f64)> {
        PMNS_DIRECT
            .iter()
            .map(|&key| {
                let (lo, hi) = if is_mixing_angle(key) {
                    around(pmns.get(key), Some(0.0), Some(1.0))
                } else {
                    around(pmns.get(key), None, None)
                };
                (key, lo, hi)
            })
            .collect()
    }

    fn predict_pmns(
        &self,
        params: &ParamAssignment,
        targets: &TargetCatalog,
        ordering: MassOrdering,
    ) -> Prediction {
        let mut out = Prediction::new();
        let theta_star = params.resolve(THETA_STAR, targets.pmns_center(ordering, DELTA_CP));
        out.insert(DELTA_CP.to_string(), theta_star);
        for key in PMNS_DIRECT {
            let value = params.resolve(key, targets.pmns_center(ordering, key));
            out.insert(key.to_string(), value);
        }
        out
    }
}
