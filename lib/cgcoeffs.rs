//! Fixed Clebsch-Gordan coefficients `(l1 l2 l | m1 m2 m)` weighting the
//! rank-0 and rank-2 parts of the spin operators in the spin-pair basis.
//!
//! Both coupled operators are rank 1 (`l1 = l2 = 1`), so every value appearing
//! in the Liouville matrix is one of the constants below.

// (110|000)
pub const CG_110_000: f64 = -0.5773502691896258;
// (110|1-10), (110|-110)
pub const CG_110_1M10: f64 = 0.5773502691896258;
// (112|000)
pub const CG_112_000: f64 = 0.816496580927726;
// (112|101), (112|-10-1), (112|011), (112|0-1-1)
pub const CG_112_101: f64 = std::f64::consts::FRAC_1_SQRT_2;
// (112|1-10), (112|-110)
pub const CG_112_1M10: f64 = 0.4082482904638631;
// (112|112), (112|-1-1-2)
pub const CG_112_112: f64 = 1.0;

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;
    use super::*;

    #[test]
    fn closed_forms() {
        assert_abs_diff_eq!(CG_110_000, -(1.0_f64 / 3.0).sqrt(), epsilon = 1e-15);
        assert_abs_diff_eq!(CG_110_1M10, (1.0_f64 / 3.0).sqrt(), epsilon = 1e-15);
        assert_abs_diff_eq!(CG_112_000, (2.0_f64 / 3.0).sqrt(), epsilon = 1e-15);
        assert_abs_diff_eq!(CG_112_101, (1.0_f64 / 2.0).sqrt(), epsilon = 1e-15);
        assert_abs_diff_eq!(CG_112_1M10, (1.0_f64 / 6.0).sqrt(), epsilon = 1e-15);
    }
}
