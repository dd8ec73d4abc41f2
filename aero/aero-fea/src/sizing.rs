//! Stress-ratio thickness sizing, smoothing and binning.

use hashbrown::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the thickness ratio is derived from the element stress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SizingRule {
    /// `stress_factor · opt_factor · σ / σ_allow`.
    #[default]
    FullyStressed,
    /// `σ_allow / σ`.
    AllowableOverActual,
}

/// Parameters for thickness sizing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SizingParams {
    /// Allowable stress.
    pub allowable_stress: f64,
    /// Lower thickness bound.
    pub min_thickness: f64,
    /// Upper thickness bound.
    pub max_thickness: f64,
    /// Multiplier on the stress ratio for [`SizingRule::FullyStressed`].
    pub stress_factor: f64,
    /// Second multiplier, kept separate for tuning runs.
    pub opt_factor: f64,
    /// Ratio rule.
    pub rule: SizingRule,
    /// Smoothing passes.
    pub smoothing_iterations: usize,
    /// Number of thickness groups in the resized deck.
    pub groups: usize,
}

impl Default for SizingParams {
    fn default() -> Self {
        Self {
            allowable_stress: 12.96e6,
            min_thickness: 0.013_333_33,
            max_thickness: 0.05,
            stress_factor: 3.0,
            opt_factor: 1.0,
            rule: SizingRule::FullyStressed,
            smoothing_iterations: 50,
            groups: 11,
        }
    }
}

impl SizingParams {
    /// Set the allowable stress.
    #[must_use]
    pub const fn with_allowable_stress(mut self, stress: f64) -> Self {
        self.allowable_stress = stress;
        self
    }

    /// Set the thickness bounds.
    #[must_use]
    pub const fn with_thickness_range(mut self, min: f64, max: f64) -> Self {
        self.min_thickness = min;
        self.max_thickness = max;
        self
    }

    /// Set the optimisation factor.
    #[must_use]
    pub const fn with_opt_factor(mut self, factor: f64) -> Self {
        self.opt_factor = factor;
        self
    }

    /// Set the ratio rule.
    #[must_use]
    pub const fn with_rule(mut self, rule: SizingRule) -> Self {
        self.rule = rule;
        self
    }

    /// Set the smoothing pass count.
    #[must_use]
    pub const fn with_smoothing_iterations(mut self, iterations: usize) -> Self {
        self.smoothing_iterations = iterations;
        self
    }

    /// Set the group count.
    #[must_use]
    pub const fn with_groups(mut self, groups: usize) -> Self {
        self.groups = groups;
        self
    }

    /// Bring `t` into `[min_thickness, max_thickness]`; NaN gives the minimum.
    #[must_use]
    pub fn bound(&self, t: f64) -> f64 {
        t.max(self.min_thickness).min(self.max_thickness)
    }
}

/// Resized thickness for an element of thickness `t` carrying `stress`.
///
/// The result always lies in `[min_thickness, max_thickness]`. An
/// infinite product resolves to the bound it points at and an undefined
/// one (`0 · ∞`) to the minimum.
///
/// # Example
///
/// ```
/// use aero_fea::{SizingParams, size_thickness};
///
/// let params = SizingParams::default();
/// let t = size_thickness(0.02, params.allowable_stress / 3.0, &params);
/// assert!((t - 0.02).abs() < 1e-12);
/// ```
#[must_use]
pub fn size_thickness(t: f64, stress: f64, params: &SizingParams) -> f64 {
    let ratio = match params.rule {
        SizingRule::FullyStressed => {
            params.stress_factor * params.opt_factor * stress / params.allowable_stress
        }
        SizingRule::AllowableOverActual => params.allowable_stress / stress,
    };
    params.bound(t * ratio)
}

/// Area-weighted smoothing over shared corner nodes.
///
/// Each pass averages `t · area` onto the three corner nodes of every
/// element, then raises each element to the mean of its corner values.
/// Thickness never decreases. `corners` and `areas` are indexed like
/// `thickness`.
#[must_use]
pub fn smooth_thickness(
    thickness: &[f64],
    corners: &[[u32; 3]],
    areas: &[f64],
    iterations: usize,
) -> Vec<f64> {
    let mut t = thickness.to_vec();
    let mut nodal: HashMap<u32, (f64, f64)> = HashMap::new();
    for _ in 0..iterations {
        nodal.clear();
        for ((element, &ti), &area) in corners.iter().zip(&t).zip(areas) {
            for node in element {
                let acc = nodal.entry(*node).or_insert((0.0, 0.0));
                acc.0 += ti * area;
                acc.1 += area;
            }
        }
        for (ti, element) in t.iter_mut().zip(corners) {
            let mean = element
                .iter()
                .map(|n| match nodal.get(n) {
                    Some(&(ta, a)) if a > 0.0 => ta / a,
                    _ => *ti,
                })
                .sum::<f64>()
                / 3.0;
            *ti = ti.max(mean);
        }
    }
    t
}

/// Equal-width thickness groups over `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Binning {
    /// Thickness of group 0.
    pub min: f64,
    /// Width `dT` of one group.
    pub step: f64,
    /// Number of groups.
    pub groups: usize,
}

impl Binning {
    /// `groups` levels from `min` to `max` inclusive.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(min: f64, max: f64, groups: usize) -> Self {
        let groups = groups.max(1);
        let step = if groups > 1 {
            (max - min) / (groups - 1) as f64
        } else {
            0.0
        };
        Self { min, step, groups }
    }

    /// Smallest group whose thickness is at least `t`, the last group if none is.
    #[must_use]
    pub fn group_of(&self, t: f64) -> usize {
        (0..self.groups)
            .find(|&g| t <= self.thickness(g))
            .unwrap_or(self.groups - 1)
    }

    /// `min + g · dT`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn thickness(&self, group: usize) -> f64 {
        self.min + group as f64 * self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fully_stressed_ratio() {
        let params = SizingParams::default().with_thickness_range(0.0, 1.0);
        let t = size_thickness(0.01, params.allowable_stress, &params);
        assert_relative_eq!(t, 0.03, epsilon = 1e-12);
    }

    #[test]
    fn allowable_over_actual_ratio() {
        let params = SizingParams::default()
            .with_thickness_range(0.0, 1.0)
            .with_rule(SizingRule::AllowableOverActual);
        let t = size_thickness(0.02, params.allowable_stress * 4.0, &params);
        assert_relative_eq!(t, 0.005, epsilon = 1e-12);
    }

    #[test]
    fn extremes_stay_in_bounds() {
        let params = SizingParams::default();
        assert_eq!(size_thickness(0.02, 0.0, &params), params.min_thickness);
        assert_eq!(size_thickness(0.02, f64::MAX, &params), params.max_thickness);
        let inverse = params.clone().with_rule(SizingRule::AllowableOverActual);
        assert_eq!(size_thickness(0.02, 0.0, &inverse), inverse.max_thickness);
        assert_eq!(size_thickness(0.0, 0.0, &inverse), inverse.min_thickness);
    }

    #[test]
    fn smoothing_spreads_thick_element() {
        let corners = [[1, 2, 3], [2, 3, 4], [10, 11, 12]];
        let t = smooth_thickness(&[0.04, 0.01, 0.02], &corners, &[1.0, 1.0, 1.0], 5);
        assert!(t[1] > 0.01);
        assert_relative_eq!(t[0], 0.04);
        assert_relative_eq!(t[2], 0.02);
    }

    #[test]
    fn zero_iterations_is_identity() {
        let t = smooth_thickness(&[0.3, 0.1], &[[1, 2, 3], [3, 4, 5]], &[1.0, 2.0], 0);
        assert_eq!(t, vec![0.3, 0.1]);
    }

    #[test]
    fn binning_levels() {
        let b = Binning::new(0.01, 0.05, 5);
        assert_relative_eq!(b.step, 0.01);
        assert_eq!(b.group_of(0.01), 0);
        assert_eq!(b.group_of(0.0101), 1);
        assert_eq!(b.group_of(0.05), 4);
        assert_eq!(b.group_of(0.07), 4);
        assert_relative_eq!(b.thickness(2), 0.03);
    }
}
