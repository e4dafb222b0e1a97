//! Angular momentum quantum numbers and the Wigner 3j coupling coefficient.

use wigner_symbols::Wigner3jm;

/// A single total-spin quantum number.
///
/// This type is backed by a single `u32` representing the number of halves,
/// so that nuclear spins like `I = 3/2` are stored exactly.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpinTotal(u32);

impl SpinTotal {
    /// Create a new total spin from a number of halves.
    pub fn new(j: u32) -> Self { Self(j) }

    /// Return `self` as a bare number of halves.
    pub fn halves(self) -> u32 { self.0 }

    /// Return `self` as an `f64`.
    ///
    /// This reflects the "true" numerical value of the total-spin quantum
    /// number; i.e. there is a relative factor of 2 between this and
    /// [`Self::halves`].
    pub fn f(self) -> f64 { f64::from(self.0) / 2.0 }

    /// Create a new total-spin quantum number from a `f64` value, rounding
    /// to the nearest half-integer.
    ///
    /// Negative inputs are passed through [`f64::abs`] before rounding.
    pub fn from_f64(f: f64) -> Self { Self((2.0 * f.abs()).round() as u32) }

    /// Return `true` if the spin is nonzero.
    pub fn is_active(self) -> bool { self.0 > 0 }

    /// Multiplicity `2j + 1` of the spin.
    pub fn multiplicity(self) -> f64 { f64::from(self.0) + 1.0 }

    /// Angular momentum ladder factor for a change of coherence order in the
    /// spin-pair basis, `sqrt(j (j + 1) - t (t - 2) / 4)`.
    pub fn ladder(self, t: i32) -> f64 {
        let j = self.f();
        let t = f64::from(t);
        (j * (j + 1.0) - t * (t - 2.0) / 4.0).sqrt()
    }
}

impl<J> From<J> for SpinTotal
where J: Into<u32>
{
    fn from(j: J) -> Self { Self(j.into()) }
}

impl From<SpinTotal> for f64 {
    fn from(j: SpinTotal) -> Self { j.f() }
}

/// Calculate the Wigner 3j symbol
/// ```text
/// ( j1 j2 j3 )
/// ( m1 m2 m3 )
/// ```
/// for integer angular momenta.
///
/// Returns zero wherever the symbol vanishes by selection rule: any
/// `|m_i| > j_i`, a nonzero projection sum, or `(j1, j2, j3)` violating the
/// triangle condition. Negative ranks also give zero.
pub fn w3j(j1: i32, j2: i32, j3: i32, m1: i32, m2: i32, m3: i32) -> f64 {
    if j1 < 0 || j2 < 0 || j3 < 0 { return 0.0; }
    if m1.abs() > j1 || m2.abs() > j2 || m3.abs() > j3 { return 0.0; }
    if m1 + m2 + m3 != 0 { return 0.0; }
    if j3 < (j1 - j2).abs() || j3 > j1 + j2 { return 0.0; }
    Wigner3jm {
        tj1: 2 * j1,
        tm1: 2 * m1,
        tj2: 2 * j2,
        tm2: 2 * m2,
        tj3: 2 * j3,
        tm3: 2 * m3,
    }
    .value()
    .into()
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;
    use super::*;

    #[test]
    fn spin_total_halves() {
        let i = SpinTotal::from_f64(1.5);
        assert_eq!(i.halves(), 3);
        assert_eq!(i.f(), 1.5);
        assert_eq!(i.multiplicity(), 4.0);
        assert!(!SpinTotal::from_f64(0.0).is_active());
    }

    #[test]
    fn w3j_known_values() {
        // (j j 0; m -m 0) = (-1)^(j - m) / sqrt(2j + 1)
        assert_abs_diff_eq!(w3j(1, 1, 0, 0, 0, 0), -(1.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(w3j(2, 2, 0, 1, -1, 0), -(1.0_f64 / 5.0).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(w3j(0, 8, 8, 0, 0, 0), (1.0_f64 / 17.0).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(w3j(0, 0, 0, 0, 0, 0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn w3j_selection_rules() {
        assert_eq!(w3j(1, 2, 1, 2, -2, 0), 0.0);
        assert_eq!(w3j(1, 1, 1, 1, 1, 0), 0.0);
        assert_eq!(w3j(1, 1, 3, 0, 0, 0), 0.0);
        assert_eq!(w3j(2, 2, 2, 3, -3, 0), 0.0);
    }

    #[test]
    fn w3j_even_permutation_symmetry() {
        let a = w3j(2, 2, 2, 1, -2, 1);
        let b = w3j(2, 2, 2, -2, 1, 1);
        let c = w3j(2, 2, 2, 1, 1, -2);
        assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        assert_abs_diff_eq!(a, c, epsilon = 1e-12);
    }

    #[test]
    fn ladder_factor() {
        // I = 1/2, t = 1: sqrt(3/4 + 1/4) = 1
        assert_abs_diff_eq!(SpinTotal::new(1).ladder(1), 1.0, epsilon = 1e-12);
    }
}
