//! Orbital coupling factors shared by every row/column pair with the same
//! `(L, jK, K)` labels.
//!
//! Equation numbers follow Meirovitch, Igner, Igner, Moro, and Freed,
//! J. Chem. Phys. 77, 3915 (1982).

use crate::{
    basis::BasisIndex,
    params::{ DiffusionParams, PotentialTable, Rank2Tensor, SleParams },
    spin::w3j,
    utils::{ parity, parity_f, K_BAND, L_BAND },
};

/// Potential-independent part of the diffusion operator for a row's
/// `(L, K)`, Eq. (A15).
///
/// Diagonal in everything except `K`, which is coupled to `K ± 2` only for a
/// rhombic diffusion tensor.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct IsoDiffusion {
    /// `K`-diagonal term.
    pub Kdiag: f64,
    /// Coupling to `K - 2`.
    pub Km2: f64,
    /// Coupling to `K + 2`.
    pub Kp2: f64,
}

fn sqrt_product(a: i32, b: i32, c: i32, d: i32) -> f64 {
    let prod = i64::from(a) * i64::from(b) * i64::from(c) * i64::from(d);
    (prod as f64).sqrt()
}

impl IsoDiffusion {
    /// Compute the terms for orbital rank `L1` and projection `K1`.
    pub fn new(diff: &DiffusionParams, L1: i32, K1: i32) -> Self {
        let Rperp = (diff.Rxx + diff.Ryy) / 2.0;
        let Kdiag
            = Rperp * f64::from(L1 * (L1 + 1))
            + f64::from(K1 * K1) * (diff.Rzz - Rperp);
        if !diff.is_rhombic() {
            return Self { Kdiag, Km2: 0.0, Kp2: 0.0 };
        }
        let Rdiff = (diff.Rxx - diff.Ryy) / 4.0;
        let KK = K1 - 2;
        let Km2 = Rdiff * sqrt_product(L1 - KK - 1, L1 - KK, L1 + KK + 1, L1 + KK + 2);
        let KK = K1 + 2;
        let Kp2 = Rdiff * sqrt_product(L1 + KK - 1, L1 + KK, L1 - KK + 1, L1 - KK + 2);
        Self { Kdiag, Km2, Kp2 }
    }

    /// Matrix element between `K1` and `K2 = K1 - Kd` for a pair with
    /// normalization factor `N_K`.
    pub fn element(&self, Kd: i32, N_K: f64) -> f64 {
        match Kd {
            0 => self.Kdiag,
            2 => self.Km2 / N_K,
            -2 => self.Kp2 / N_K,
            _ => 0.0,
        }
    }
}

/// Quantities fixed by the orbital labels of a row and the `(L, jK, K)` labels
/// of a column.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct OrbitalCoupling {
    /// `K`-symmetrization normalization, Eq. (A43).
    pub N_K: f64,
    /// Prefactor `N_L N_K (-1)^(M1 + K1)` of Eqs. (A40) and (A41).
    pub norm: f64,
    /// Reduced rank-2 electron Zeeman coupling, Eqs. (A42) and (A44).
    pub R_EZI2: f64,
    /// Reduced rank-2 hyperfine coupling, first nucleus.
    pub R_HFI2: f64,
    /// Reduced rank-2 hyperfine coupling, second nucleus.
    pub R_HFI2b: f64,
    /// Potential-dependent diffusion term, Eq. (A40), including `norm`.
    pub pot_diff: f64,
}

/// Evaluates orbital coupling factors for a fixed parameter bundle.
#[derive(Copy, Clone, Debug)]
pub struct CouplingEvaluator<'a> {
    params: &'a SleParams,
}

impl<'a> CouplingEvaluator<'a> {
    /// Create a new `CouplingEvaluator`.
    pub fn new(params: &'a SleParams) -> Self { Self { params } }

    /// Potential-independent diffusion terms for the row's `(L, K)`.
    pub fn iso_diffusion(&self, row: &BasisIndex) -> IsoDiffusion {
        IsoDiffusion::new(&self.params.diffusion, row.L, row.K)
    }

    /// Compute all orbital factors between a row and a column.
    ///
    /// Only the `(L, jK, K)` labels of `col` are used.
    pub fn orbital(&self, row: &BasisIndex, col: &BasisIndex) -> OrbitalCoupling {
        let (L1, jK1, K1) = row.orbital();
        let (L2, jK2, K2) = col.orbital();
        let N_L = (f64::from(2 * L1 + 1) * f64::from(2 * L2 + 1)).sqrt();
        let mut N_K = 1.0;
        if K1 == 0 { N_K /= 2.0_f64.sqrt(); }
        if K2 == 0 { N_K /= 2.0_f64.sqrt(); }
        let norm = N_L * N_K * parity_f(row.M + K1);

        let sys = &self.params.system;
        let (R_EZI2, R_HFI2, R_HFI2b)
            = if (L1 - L2).abs() <= 2 {
                let reduced = ReducedCoupling::new(row, col);
                (
                    reduced.apply(&sys.EZ2),
                    reduced.apply(&sys.HF2),
                    reduced.apply(&sys.HF2b),
                )
            } else {
                (0.0, 0.0, 0.0)
            };

        let pot_diff
            = self.params.diffusion.potential.as_ref()
            .map(|table| potential_term(table, row, col) * norm)
            .unwrap_or(0.0);

        OrbitalCoupling { N_K, norm, R_EZI2, R_HFI2, R_HFI2b, pot_diff }
    }
}

/// The two 3j coefficients entering a reduced rank-2 coupling: one for the
/// `K`-difference channel and one for the `K`-sum channel.
#[derive(Copy, Clone, Debug)]
struct ReducedCoupling {
    jK1: i32,
    same_jK: bool,
    Kd: i32,
    Ks: i32,
    coeff_d: Option<f64>,
    coeff_s: Option<f64>,
    sign_s: f64,
}

impl ReducedCoupling {
    fn new(row: &BasisIndex, col: &BasisIndex) -> Self {
        let (L1, jK1, K1) = row.orbital();
        let (L2, jK2, K2) = col.orbital();
        let Kd = K1 - K2;
        let Ks = K1 + K2;
        let coeff_d = (Kd.abs() <= 2).then(|| w3j(L1, 2, L2, K1, -Kd, -K2));
        let coeff_s = (Ks.abs() <= 2).then(|| w3j(L1, 2, L2, K1, -Ks, K2));
        Self {
            jK1,
            same_jK: jK1 == jK2,
            Kd,
            Ks,
            coeff_d,
            coeff_s,
            sign_s: f64::from(jK2 * parity(L2 + K2)),
        }
    }

    fn channel(&self, tensor: &Rank2Tensor, coeff: Option<f64>, m: i32) -> f64 {
        let Some(coeff) = coeff else { return 0.0; };
        if self.same_jK {
            coeff * tensor.re_at(m)
        } else {
            tensor.im_at(m)
                .map(|im| coeff * im * f64::from(self.jK1))
                .unwrap_or(0.0)
        }
    }

    fn apply(&self, tensor: &Rank2Tensor) -> f64 {
        self.channel(tensor, self.coeff_d, self.Kd)
            + self.sign_s * self.channel(tensor, self.coeff_s, self.Ks)
    }
}

/// Sum over even potential ranks in Eq. (A40), without the normalization
/// prefactor.
fn potential_term(table: &PotentialTable, row: &BasisIndex, col: &BasisIndex)
    -> f64
{
    let (L1, jK1, K1) = row.orbital();
    let (L2, jK2, K2) = col.orbital();
    let M1 = row.M;
    let Ld = L1 - L2;
    let Kd = K1 - K2;
    let Ks = K1 + K2;
    let in_band
        = Ld.abs() <= L_BAND
        && parity(Ks) == 1
        && jK1 == jK2
        && Kd.abs() <= K_BAND
        && Ks.abs() <= K_BAND;
    if !in_band { return 0.0; }
    let sign_s = f64::from(parity(L2 + K2) * jK2);
    let mut acc = 0.0;
    for L in (0..=L_BAND).step_by(2) {
        let mut term_d = 0.0;
        if Kd >= -L {
            let X = table.get(L, Kd);
            if X != 0.0 { term_d = X * w3j(L1, L, L2, K1, -Kd, -K2); }
        }
        let mut term_s = 0.0;
        if Ks <= L {
            let X = table.get(L, Ks);
            if X != 0.0 { term_s = sign_s * X * w3j(L1, L, L2, K1, -Ks, K2); }
        }
        if term_d != 0.0 || term_s != 0.0 {
            acc += (term_d + term_s) * w3j(L1, L, L2, M1, 0, -M1);
        }
    }
    acc
}
