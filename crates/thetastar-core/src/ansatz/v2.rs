//! θ★ v2: one coherent shift for all PMNS angles, phase-locked mass scale.
//!
//! With `c = cos(theta_star - THETA0)`:
//!
//! - `deltaCP ≡ theta_star`
//! - `s_ij = center_ij + eps_angle · σ_ij · c`, clamped into `[0, 1]`
//! - `dm21, dm3l` scale by `1 + k_mass · c`
//!
//! `eps_angle` is measured in units of each target's 1σ, so a target with
//! unset σ is not shifted at all.

use super::{Ansatz, ParamAssignment, Prediction, THETA_STAR, clamp_unit};
use crate::targets::{DELTA_CP, MassOrdering, TargetCatalog, TargetMap};

pub const NAME: &str = "theta_star_v2";

/// Reference phase (rad) at which the shifts peak.
pub const THETA0: f64 = 4.0;

const PARAMS: [&str; 2] = ["eps_angle", "k_mass"];
const ANGLES: [&str; 3] = ["s12_2", "s13_2", "s23_2"];

#[derive(Debug, Clone, Copy, Default)]
pub struct CoherentShift;

impl Ansatz for CoherentShift {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "coherent sigma-scaled shift of PMNS angles, correlated mass shift"
    }

    fn pmns_params(&self) -> &'static [&'static str] {
        &PARAMS
    }

    fn pmns_bounds(&self, _pmns: &TargetMap) -> Vec<(&'static str, f64, f64)> {
        vec![("eps_angle", -0.7, 0.7), ("k_mass", -0.3, 0.3)]
    }

    fn predict_pmns(
        &self,
        params: &ParamAssignment,
        targets: &TargetCatalog,
        ordering: MassOrdering,
    ) -> Prediction {
        let pmns = targets.pmns(ordering);
        let theta_star = params.resolve(THETA_STAR, targets.pmns_center(ordering, DELTA_CP));
        let eps_angle = params.resolve("eps_angle", 0.0);
        let k_mass = params.resolve("k_mass", 0.0);

        let c = (theta_star - THETA0).cos();

        let mut out = Prediction::new();
        out.insert(DELTA_CP.to_string(), theta_star);
        for key in ANGLES {
            let (center, sigma) = pmns.get(key).map_or((0.0, 0.0), |t| (t.value, t.sigma));
            out.insert(key.to_string(), clamp_unit(center + eps_angle * sigma * c));
        }

        let scale = 1.0 + k_mass * c;
        for key in ["dm21", "dm3l"] {
            out.insert(key.to_string(), targets.pmns_center(ordering, key) * scale);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::Target;

    #[test]
    fn peak_shift_at_reference_phase() {
        let targets = TargetCatalog::builtin();
        let params = ParamAssignment::from([(THETA_STAR, THETA0), ("eps_angle", 0.5)]);
        let pred = CoherentShift.predict_pmns(&params, &targets, MassOrdering::Normal);
        let no = targets.pmns(MassOrdering::Normal);
        for key in ANGLES {
            let expect = no[key].value + 0.5 * no[key].sigma;
            assert!((pred[key] - expect).abs() < 1e-15, "{key}");
        }
    }

    #[test]
    fn quarter_turn_from_reference_is_neutral() {
        let targets = TargetCatalog::builtin();
        let theta = THETA0 + std::f64::consts::FRAC_PI_2;
        let params = ParamAssignment::from([
            (THETA_STAR, theta),
            ("eps_angle", 0.7),
            ("k_mass", 0.3),
        ]);
        let pred = CoherentShift.predict_pmns(&params, &targets, MassOrdering::Inverted);
        let io = targets.pmns(MassOrdering::Inverted);
        for key in ["s12_2", "s13_2", "s23_2", "dm21", "dm3l"] {
            let rel = (pred[key] - io[key].value).abs() / io[key].value.abs();
            assert!(rel < 1e-12, "{key}");
        }
        assert_eq!(pred[DELTA_CP], theta);
    }

    #[test]
    fn mass_scale_follows_phase() {
        let targets = TargetCatalog::builtin();
        let theta = THETA0 + std::f64::consts::PI;
        let params = ParamAssignment::from([(THETA_STAR, theta), ("k_mass", 0.2)]);
        let pred = CoherentShift.predict_pmns(&params, &targets, MassOrdering::Normal);
        let no = targets.pmns(MassOrdering::Normal);
        // c = -1 → scale 0.8
        assert!((pred["dm21"] - no["dm21"].value * 0.8).abs() < 1e-18);
        assert!((pred["dm3l"] - no["dm3l"].value * 0.8).abs() < 1e-15);
    }

    #[test]
    fn unset_sigma_freezes_angle() {
        let base = TargetCatalog::builtin();
        let mut no: TargetMap = base.pmns(MassOrdering::Normal).clone();
        no.insert("s13_2".to_string(), Target::new(0.022, 0.0, "s13", "", ""));
        let io = base.pmns(MassOrdering::Inverted).clone();
        let targets = TargetCatalog::new(no, io, TargetMap::new()).unwrap();
        let params = ParamAssignment::from([(THETA_STAR, THETA0), ("eps_angle", 0.7)]);
        let pred = CoherentShift.predict_pmns(&params, &targets, MassOrdering::Normal);
        assert_eq!(pred["s13_2"], 0.022);
    }

    #[test]
    fn nuisance_bounds() {
        let targets = TargetCatalog::builtin();
        let bounds = CoherentShift
            .param_bounds(&targets, MassOrdering::Normal)
            .unwrap();
        assert_eq!(bounds.get("eps_angle").unwrap().high, 0.7);
        assert_eq!(bounds.get("k_mass").unwrap().low, -0.3);
        assert_eq!(&bounds.names()[..3], &["theta_star", "eps_angle", "k_mass"]);
    }
}
