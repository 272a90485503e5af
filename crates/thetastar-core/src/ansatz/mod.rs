//! Ansatz trait, parameter types and the ansatz registry.
//!
//! An ansatz maps a small set of free parameters (always including the
//! master phase `theta_star`) to predictions for PMNS and CKM observables.
//! Every variant implements the [`Ansatz`] trait; [`get_ansatz`] resolves a
//! registry key to a boxed instance.
//!
//! Variants hold no state. Predictions are pure functions of the parameter
//! assignment, the target catalog and the mass ordering, so one instance can
//! serve any number of samples and sweeps.

pub mod delta_only;
pub mod v1;
pub mod v2;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::targets::{MassOrdering, TAU, TargetCatalog, TargetMap};

pub use delta_only::DeltaOnly;
pub use v1::PhaseModulated;
pub use v2::CoherentShift;

/// Name of the master phase parameter shared by every variant.
pub const THETA_STAR: &str = "theta_star";

/// Observable name → predicted value.
pub type Prediction = BTreeMap<String, f64>;

// ---------------------------------------------------------------------------
// Parameter bounds
// ---------------------------------------------------------------------------

/// Inclusive sampling interval for one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bound {
    pub low: f64,
    pub high: f64,
}

impl Bound {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// Ordered parameter name → [`Bound`] mapping.
///
/// Order follows insertion, which the sampler uses to draw values, so the
/// random stream of a seeded sweep depends on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParamBounds {
    entries: Vec<(String, Bound)>,
}

impl ParamBounds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bound. Fails if `low > high`, either end is not finite, or
    /// `name` already has a bound.
    pub fn insert(&mut self, name: &str, low: f64, high: f64) -> Result<()> {
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(Error::InvalidBounds {
                param: name.to_string(),
                low,
                high,
            });
        }
        if self.get(name).is_some() {
            return Err(Error::DuplicateParam(name.to_string()));
        }
        self.entries.push((name.to_string(), Bound { low, high }));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Bound> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, b)| *b)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Bound)> {
        self.entries.iter().map(|(n, b)| (n.as_str(), *b))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Parameter assignment
// ---------------------------------------------------------------------------

/// One sampled value per parameter, in sampling order.
///
/// Lookups never fail: [`ParamAssignment::resolve`] is the explicit
/// default-resolution step each variant uses for parameters the caller left
/// out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamAssignment {
    values: Vec<(String, f64)>,
}

impl ParamAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing an earlier one of the same name.
    pub fn set(&mut self, name: &str, value: f64) {
        match self.values.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.values.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Value of `name`, or `fallback` when the assignment does not carry it.
    pub fn resolve(&self, name: &str, fallback: f64) -> f64 {
        self.get(name).unwrap_or(fallback)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.values.iter().cloned().collect()
    }
}

impl<const N: usize> From<[(&str, f64); N]> for ParamAssignment {
    fn from(entries: [(&str, f64); N]) -> Self {
        let mut out = Self::new();
        for (name, value) in entries {
            out.set(name, value);
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Ansatz trait
// ---------------------------------------------------------------------------

/// A parametric hypothesis mapping free parameters to mixing observables.
pub trait Ansatz: Send + Sync {
    /// Registry key (e.g. `"theta_star_v1"`).
    fn name(&self) -> &'static str;

    /// One-line human-readable description.
    fn description(&self) -> &'static str;

    /// PMNS-side parameters that follow `theta_star`, in column order.
    fn pmns_params(&self) -> &'static [&'static str];

    /// `(name, low, high)` for every entry of [`Ansatz::pmns_params`].
    fn pmns_bounds(&self, pmns: &TargetMap) -> Vec<(&'static str, f64, f64)>;

    /// Predict PMNS observables. Always carries a `deltaCP` entry.
    fn predict_pmns(
        &self,
        params: &ParamAssignment,
        targets: &TargetCatalog,
        ordering: MassOrdering,
    ) -> Prediction;

    /// Full ordered parameter list: `theta_star`, PMNS parameters, then one
    /// direct parameter per CKM target.
    fn param_names(&self, targets: &TargetCatalog) -> Vec<String> {
        std::iter::once(THETA_STAR)
            .chain(self.pmns_params().iter().copied())
            .map(str::to_string)
            .chain(targets.ckm_targets().keys().cloned())
            .collect()
    }

    /// Sampling bounds for every name in [`Ansatz::param_names`].
    fn param_bounds(&self, targets: &TargetCatalog, ordering: MassOrdering) -> Result<ParamBounds> {
        let mut bounds = ParamBounds::new();
        bounds.insert(THETA_STAR, 0.0, TAU)?;
        for (name, low, high) in self.pmns_bounds(targets.pmns(ordering)) {
            bounds.insert(name, low, high)?;
        }
        for (name, (low, high)) in ckm_bounds(targets.ckm_targets()) {
            bounds.insert(&name, low, high)?;
        }
        Ok(bounds)
    }

    /// Predict CKM observables.
    ///
    /// No variant links CKM to `theta_star` yet: each observable is its own
    /// direct parameter, falling back to the target center. Empty when the
    /// catalog has no CKM targets.
    fn predict_ckm(&self, params: &ParamAssignment, targets: &TargetCatalog) -> Prediction {
        targets
            .ckm_targets()
            .iter()
            .map(|(key, t)| (key.clone(), params.resolve(key, t.value)))
            .collect()
    }
}

/// `value ± 5σ` per CKM target, `[0, 1]` when σ is unset.
fn ckm_bounds(ckm: &TargetMap) -> Vec<(String, (f64, f64))> {
    ckm.iter()
        .map(|(name, t)| {
            let bound = if t.is_constrained() {
                let span = 5.0 * t.sigma;
                (t.value - span, t.value + span)
            } else {
                (0.0, 1.0)
            };
            (name.clone(), bound)
        })
        .collect()
}

/// Saturate a `sin²θ` prediction into the physical range.
pub(crate) fn clamp_unit(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// All ansatz constructors. Each returns a boxed variant.
pub fn all_ansatze() -> Vec<Box<dyn Ansatz>> {
    vec![
        Box::new(DeltaOnly),
        Box::new(PhaseModulated),
        Box::new(CoherentShift),
    ]
}

/// `theta_star` plus every PMNS-side parameter of every variant.
///
/// CKM target keys become parameter names too, so a catalog may not use
/// any of these as a CKM key.
pub fn reserved_param_names() -> Vec<&'static str> {
    let mut names = vec![THETA_STAR];
    for ansatz in all_ansatze() {
        for &name in ansatz.pmns_params() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Sorted registry keys.
pub fn available_ansatze() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = all_ansatze().iter().map(|a| a.name()).collect();
    names.sort_unstable();
    names
}

/// Instantiate an ansatz by registry key or short alias
/// (`delta_only`, `v1`, `v2`; case-insensitive, `-` and `_` interchangeable).
pub fn get_ansatz(name: &str) -> Result<Box<dyn Ansatz>> {
    let key = name.trim().to_ascii_lowercase().replace('-', "_");
    let canonical = match key.as_str() {
        "delta_only" => delta_only::NAME,
        "v1" => v1::NAME,
        "v2" => v2::NAME,
        other => other,
    };
    all_ansatze()
        .into_iter()
        .find(|a| a.name() == canonical)
        .ok_or_else(|| Error::UnknownAnsatz {
            name: name.to_string(),
            known: available_ansatze().join(", "),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::{DELTA_CP, PMNS_KEYS, Target};

    #[test]
    fn registry_keys_sorted_and_unique() {
        let names = available_ansatze();
        assert_eq!(
            names,
            vec!["theta_star_delta_only", "theta_star_v1", "theta_star_v2"]
        );
    }

    #[test]
    fn get_ansatz_resolves_aliases() {
        assert_eq!(get_ansatz("theta_star_v1").unwrap().name(), "theta_star_v1");
        assert_eq!(get_ansatz(" v2 ").unwrap().name(), "theta_star_v2");
        assert_eq!(
            get_ansatz("delta-only").unwrap().name(),
            "theta_star_delta_only"
        );
        assert_eq!(
            get_ansatz("Theta_Star_Delta_Only").unwrap().name(),
            "theta_star_delta_only"
        );
    }

    #[test]
    fn get_ansatz_unknown_lists_known_set() {
        let err = get_ansatz("example_minimal").err().unwrap();
        match err {
            Error::UnknownAnsatz { name, known } => {
                assert_eq!(name, "example_minimal");
                assert!(known.contains("theta_star_v2"));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn every_variant_bounds_every_param() {
        let targets = TargetCatalog::builtin();
        for ansatz in all_ansatze() {
            for ordering in [MassOrdering::Normal, MassOrdering::Inverted] {
                let bounds = ansatz.param_bounds(&targets, ordering).unwrap();
                let names = ansatz.param_names(&targets);
                assert_eq!(bounds.names(), names, "{}", ansatz.name());
                let angle = bounds.get(THETA_STAR).unwrap();
                assert_eq!((angle.low, angle.high), (0.0, TAU));
            }
        }
    }

    #[test]
    fn every_variant_predicts_delta_cp() {
        let targets = TargetCatalog::builtin();
        let empty = ParamAssignment::new();
        for ansatz in all_ansatze() {
            for ordering in [MassOrdering::Normal, MassOrdering::Inverted] {
                let pred = ansatz.predict_pmns(&empty, &targets, ordering);
                for key in PMNS_KEYS {
                    assert!(pred.contains_key(key), "{} missing {key}", ansatz.name());
                }
                // With nothing sampled every variant sits on the target centers.
                let center = targets.pmns_center(ordering, DELTA_CP);
                assert_eq!(pred[DELTA_CP], center);
            }
        }
    }

    #[test]
    fn ckm_passthrough_and_fallback() {
        let targets = TargetCatalog::builtin();
        let ansatz = get_ansatz("v1").unwrap();
        let params = ParamAssignment::from([("lambda", 0.23)]);
        let pred = ansatz.predict_ckm(&params, &targets);
        assert_eq!(pred["lambda"], 0.23);
        assert_eq!(pred["A"], targets.ckm_targets()["A"].value);
        assert_eq!(pred.len(), targets.ckm_targets().len());
    }

    #[test]
    fn ckm_empty_catalog_predicts_nothing() {
        let targets = TargetCatalog::builtin().without_ckm();
        for ansatz in all_ansatze() {
            let params = ParamAssignment::from([("lambda", 0.23)]);
            assert!(ansatz.predict_ckm(&params, &targets).is_empty());
            assert!(
                !ansatz
                    .param_names(&targets)
                    .iter()
                    .any(|n| n == "lambda")
            );
        }
    }

    #[test]
    fn ckm_unset_sigma_uses_unit_interval() {
        let mut ckm = TargetMap::new();
        ckm.insert("lambda".to_string(), Target::new(0.22, 0.0, "lambda", "", ""));
        let targets = TargetCatalog::builtin().with_ckm(ckm).unwrap();
        let bounds = DeltaOnly
            .param_bounds(&targets, MassOrdering::Normal)
            .unwrap();
        let b = bounds.get("lambda").unwrap();
        assert_eq!((b.low, b.high), (0.0, 1.0));
    }

    #[test]
    fn bounds_reject_inverted_interval() {
        let mut bounds = ParamBounds::new();
        let err = bounds.insert("x", 1.0, 0.5).unwrap_err();
        assert!(matches!(err, Error::InvalidBounds { ref param, .. } if param == "x"));
        assert!(bounds.insert("y", f64::NAN, 1.0).is_err());
        assert!(bounds.insert("z", 0.5, 0.5).is_ok());
    }

    #[test]
    fn bounds_reject_duplicate_name() {
        let mut bounds = ParamBounds::new();
        bounds.insert("b", 0.0, 1.0).unwrap();
        bounds.insert("a", 0.0, 2.0).unwrap();
        let err = bounds.insert("b", -1.0, 1.0).unwrap_err();
        assert!(matches!(err, Error::DuplicateParam(ref n) if n == "b"));
        assert_eq!(bounds.names(), vec!["b", "a"]);
        assert_eq!(bounds.get("b").unwrap().low, 0.0);
    }

    #[test]
    fn reserved_names_cover_every_variant() {
        let reserved = reserved_param_names();
        assert_eq!(reserved[0], THETA_STAR);
        for ansatz in all_ansatze() {
            for name in ansatz.pmns_params() {
                assert!(reserved.contains(name), "{name}");
            }
        }
        assert_eq!(reserved.iter().filter(|n| **n == "k_mass").count(), 1);
    }

    #[test]
    fn theta_star_bound_is_full_turn_for_any_catalog() {
        let targets = TargetCatalog::builtin();
        for ansatz in all_ansatze() {
            for ordering in [MassOrdering::Normal, MassOrdering::Inverted] {
                let b = ansatz
                    .param_bounds(&targets, ordering)
                    .unwrap()
                    .get(THETA_STAR)
                    .unwrap();
                assert_eq!((b.low, b.high), (0.0, TAU));
            }
        }
    }

    #[test]
    fn assignment_resolve_falls_back() {
        let mut params = ParamAssignment::new();
        params.set("eps12", 0.25);
        assert_eq!(params.resolve("eps12", 0.0), 0.25);
        assert_eq!(params.resolve("eps13", -1.0), -1.0);
        params.set("eps12", 0.5);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("eps12"), Some(0.5));
    }

    #[test]
    fn clamp_unit_saturates() {
        assert_eq!(clamp_unit(-0.2), 0.0);
        assert_eq!(clamp_unit(1.7), 1.0);
        assert_eq!(clamp_unit(0.3), 0.3);
    }
}
