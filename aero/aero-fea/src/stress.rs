//! Principal stresses of a symmetric 3x3 tensor.

use std::f64::consts::PI;

/// Principal stresses of `[s11, s22, s33, s12, s23, s31]`, largest first.
///
/// Uses the closed-form trigonometric solution of the characteristic
/// polynomial in the invariants `I1`, `I2`, `I3`. A hydrostatic tensor
/// gives three equal values.
///
/// # Example
///
/// ```
/// use aero_fea::principal_stresses;
///
/// let s = principal_stresses([1.0, 3.0, 2.0, 0.0, 0.0, 0.0]);
/// assert!((s[0] - 3.0).abs() < 1e-12);
/// assert!((s[1] - 2.0).abs() < 1e-12);
/// assert!((s[2] - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn principal_stresses(tensor: [f64; 6]) -> [f64; 3] {
    let [s11, s22, s33, s12, s23, s31] = tensor;
    let i1 = s11 + s22 + s33;
    let i2 = s11 * s22 + s22 * s33 + s33 * s11 - s12 * s12 - s23 * s23 - s31 * s31;
    let i3 = s11 * s22 * s33 - s11 * s23 * s23 - s22 * s31 * s31 - s33 * s12 * s12
        + 2.0 * s12 * s23 * s31;

    let mean = i1 / 3.0;
    let q = i1 * i1 - 3.0 * i2;
    let scale = tensor.iter().map(|s| s * s).sum::<f64>();
    if q <= 1.0e-14 * scale || q <= 0.0 {
        return [mean; 3];
    }

    let cos_phi = (0.5 * (2.0 * i1 * i1 * i1 - 9.0 * i1 * i2 + 27.0 * i3) / q.powf(1.5))
        .max(-1.0)
        .min(1.0);
    let phi = cos_phi.acos() / 3.0;
    let radius = 2.0 * q.sqrt() / 3.0;

    let mut s = [0.0, 2.0, 4.0].map(|k| mean + radius * (phi + k * PI / 3.0).cos());
    s.sort_by(|a, b| b.total_cmp(a));
    s
}

/// Magnitude `sqrt(s1² + s2² + s3²)` of the principal stresses.
#[must_use]
pub fn stress_magnitude(tensor: [f64; 6]) -> f64 {
    principal_stresses(tensor)
        .iter()
        .map(|s| s * s)
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn uniaxial() {
        let s = principal_stresses([5.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_relative_eq!(s[0], 5.0, epsilon = 1e-12);
        assert_relative_eq!(s[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(s[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn hydrostatic_gives_equal_values() {
        assert_eq!(principal_stresses([-2.0, -2.0, -2.0, 0.0, 0.0, 0.0]), [-2.0; 3]);
        assert_eq!(principal_stresses([0.0; 6]), [0.0; 3]);
    }

    #[test]
    fn pure_shear() {
        let s = principal_stresses([0.0, 0.0, 0.0, 4.0, 0.0, 0.0]);
        assert_relative_eq!(s[0], 4.0, epsilon = 1e-12);
        assert_relative_eq!(s[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(s[2], -4.0, epsilon = 1e-12);
    }

    #[test]
    fn invariants_are_preserved() {
        let t = [12.0, -3.0, 7.5, 2.0, -1.5, 4.0];
        let s = principal_stresses(t);
        assert_relative_eq!(s.iter().sum::<f64>(), t[0] + t[1] + t[2], epsilon = 1e-9);
        let magnitude = stress_magnitude(t);
        let frobenius =
            (t[0] * t[0] + t[1] * t[1] + t[2] * t[2] + 2.0 * (t[3] * t[3] + t[4] * t[4] + t[5] * t[5]))
                .sqrt();
        assert_relative_eq!(magnitude, frobenius, epsilon = 1e-9);
    }
}
