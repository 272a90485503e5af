//! θ★ v1: cosine modulations of the PMNS angles plus a common mass shift.
//!
//! - `deltaCP ≡ theta_star`
//! - each mixing angle is its target center times `1 + eps·cos(φ)`, with
//!   `φ = theta_star + {0, 2π/3, 4π/3}` for `s12_2, s13_2, s23_2`
//! - both mass splittings scale by `1 + k_mass`
//!
//! Angle predictions saturate into `[0, 1]`.

use super::{Ansatz, ParamAssignment, Prediction, THETA_STAR, clamp_unit};
use crate::targets::{DELTA_CP, MassOrdering, TAU, TargetCatalog, TargetMap};

pub const NAME: &str = "theta_star_v1";

const PARAMS: [&str; 4] = ["eps12", "eps13", "eps23", "k_mass"];

/// Angle and mass amplitudes are both fractional, up to ±50%.
const AMPLITUDE: f64 = 0.5;

#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseModulated;

/// Resolved v1 parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct V1Params {
    pub theta_star: f64,
    pub eps12: f64,
    pub eps13: f64,
    pub eps23: f64,
    pub k_mass: f64,
}

impl V1Params {
    /// `theta_star` defaults to the target phase, amplitudes to zero.
    pub fn resolve(params: &ParamAssignment, delta_cp_center: f64) -> Self {
        Self {
            theta_star: params.resolve(THETA_STAR, delta_cp_center),
            eps12: params.resolve("eps12", 0.0),
            eps13: params.resolve("eps13", 0.0),
            eps23: params.resolve("eps23", 0.0),
            k_mass: params.resolve("k_mass", 0.0),
        }
    }
}

impl Ansatz for PhaseModulated {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "three-phase cosine modulation of PMNS angles, common mass shift"
    }

    fn pmns_params(&self) -> &'static [&'static str] {
        &PARAMS
    }

    fn pmns_bounds(&self, _pmns: &TargetMap) -> Vec<(&'static str, f64, f64)> {
        PARAMS
            .iter()
            .map(|&name| (name, -AMPLITUDE, AMPLITUDE))
            .collect()
    }

    fn predict_pmns(
        &self,
        params: &ParamAssignment,
        targets: &TargetCatalog,
        ordering: MassOrdering,
    ) -> Prediction {
        let center = |key: &str| targets.pmns_center(ordering, key);
        let p = V1Params::resolve(params, center(DELTA_CP));

        let phi12 = p.theta_star;
        let phi13 = p.theta_star + TAU / 3.0;
        let phi23 = p.theta_star + 2.0 * TAU / 3.0;

        let s12_2 = center("s12_2") * (1.0 + p.eps12 * phi12.cos());
        let s13_2 = center("s13_2") * (1.0 + p.eps13 * phi13.cos());
        let s23_2 = center("s23_2") * (1.0 + p.eps23 * phi23.cos());

        let scale = 1.0 + p.k_mass;

        let mut out = Prediction::new();
        out.insert(DELTA_CP.to_string(), p.theta_star);
        out.insert("s12_2".to_string(), clamp_unit(s12_2));
        out.insert("s13_2".to_string(), clamp_unit(s13_2));
        out.insert("s23_2".to_string(), clamp_unit(s23_2));
        out.insert("dm21".to_string(), center("dm21") * scale);
        out.insert("dm3l".to_string(), center("dm3l") * scale);
        out
    }
}
