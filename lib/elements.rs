//! Liouville (coherent) and diffusion (relaxation) matrix elements for a single
//! row/column pair of basis functions.
//!
//! The Liouville element collects the rank-0 and rank-2 parts of the electron
//! Zeeman, hyperfine, and nuclear Zeeman interactions, Eq. (A41), with spin
//! operator matrix elements from Eqs. (B7) and (B8). The diffusion element
//! collects Eqs. (A15) and (A40) plus Heisenberg exchange.

use crate::{
    basis::BasisIndex,
    cgcoeffs::*,
    coupling::{ IsoDiffusion, OrbitalCoupling },
    params::SleParams,
    spin::SpinTotal,
};

/// Differences `row - col` of all basis labels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PairDiffs {
    pub Ld: i32,
    pub jKd: i32,
    pub Kd: i32,
    pub Md: i32,
    pub pSd: i32,
    pub qSd: i32,
    pub pId: i32,
    pub qId: i32,
    pub pIbd: i32,
    pub qIbd: i32,
}

impl PairDiffs {
    pub fn new(row: &BasisIndex, col: &BasisIndex) -> Self {
        Self {
            Ld: row.L - col.L,
            jKd: row.jK - col.jK,
            Kd: row.K - col.K,
            Md: row.M - col.M,
            pSd: row.pS - col.pS,
            qSd: row.qS - col.qS,
            pId: row.pI - col.pI,
            qId: row.qI - col.qI,
            pIbd: row.pIb - col.pIb,
            qIbd: row.qIb - col.qIb,
        }
    }

    /// Change in total coherence order.
    // sign combination taken as-is from Misra (A11a)
    pub fn pd(&self) -> i32 { self.pSd + self.pId + self.pIbd }

    /// Diagonal in the electron spin subspace.
    pub fn diag_s(&self) -> bool { self.pSd == 0 && self.qSd == 0 }

    /// Diagonal in both nuclear spin subspaces.
    pub fn diag_i(&self) -> bool {
        self.pId == 0 && self.qId == 0 && self.pIbd == 0 && self.qIbd == 0
    }

    /// Diagonal in `L`, `jK`, `K`, and `M`.
    pub fn diag_lkm(&self) -> bool {
        self.Ld == 0 && self.Kd == 0 && self.jKd == 0 && self.Md == 0
    }
}

/// Spin operator weights `(C0, C2, S_A)` for the hyperfine coupling of the
/// electron to one nucleus, Eq. (B7).
///
/// `C0` and `C2` weight the rank-0 and rank-2 parts; `S_A` is the spin
/// operator matrix element between the electron/nucleus pair states.
fn hyperfine_weights(
    spin: SpinTotal,
    row: (i32, i32, i32, i32),
    pSd: i32,
    qSd: i32,
    pId: i32,
    qId: i32,
) -> (f64, f64, f64)
{
    let (pS1, qS1, pI1, qI1) = row;
    if pId == 0 {
        if pSd == 0 {
            let S_A = f64::from(pS1 * qI1 + pI1 * qS1) / 2.0;
            (CG_110_000, CG_112_000, S_A)
        } else {
            let S_A = f64::from(-(pI1 * pSd + qI1 * qSd)) / 8.0_f64.sqrt();
            (0.0, CG_112_101, S_A)
        }
    } else {
        let KI = spin.ladder(qI1 * qId + pI1 * pId);
        if pSd == 0 {
            let S_A = f64::from(-(pS1 * pId + qS1 * qId)) * KI / 8.0_f64.sqrt();
            (0.0, CG_112_101, S_A)
        } else {
            let S_A = f64::from(pSd * qId) * KI / 2.0;
            let C2 = if pSd + pId == 0 { CG_112_1M10 } else { CG_112_112 };
            (CG_110_1M10, C2, S_A)
        }
    }
}

/// Compute the Liouville matrix element between `row` and `col`.
///
/// `liou3j` is the 3j symbol `(L1 2 L2; M1 -Md -M2)`, zero when
/// `|L1 - L2| > 2`.
pub fn liouville_element(
    params: &SleParams,
    row: &BasisIndex,
    d: &PairDiffs,
    orb: &OrbitalCoupling,
    liou3j: f64,
) -> f64
{
    let sys = &params.system;
    let pd = d.pd();
    let coupled
        = d.Ld.abs() <= 2
        && d.Md.abs() <= 2
        // no tilt: d2 is diagonal
        && (sys.dir_tilt != 0.0 || pd == d.Md)
        && d.pSd.abs() <= 1
        && d.pId.abs() <= 1
        && d.pIbd.abs() <= 1
        && d.pSd.abs() == d.qSd.abs()
        && d.pId.abs() == d.qId.abs()
        && d.pIbd.abs() == d.qIbd.abs();
    if !coupled { return 0.0; }

    // rank-0 parts need L1 == L2, K1 == K2, M1 == M2; the N_L, N_K, and
    // (-1)^(M1 + K1) prefactors cancel against the l = 0 3j symbols
    let rank0 = d.diag_lkm() && pd == 0;
    let d2jjj = sys.d2(pd, d.Md) * liou3j;
    let mut element = 0.0;

    // electron Zeeman
    if d.diag_i() {
        let (C2, S_g)
            = if d.pSd == 0 {
                (CG_112_000, f64::from(row.pS))
            } else {
                (CG_112_101, f64::from(-d.qSd) / 2.0_f64.sqrt())
            };
        element += orb.norm * d2jjj * orb.R_EZI2 * (C2 * S_g);
        if rank0 {
            element += sys.EZ0 * (CG_110_000 * f64::from(row.pS));
        }
    }

    // hyperfine, first nucleus
    let spin_a = sys.spin_a();
    if
        spin_a.is_active()
        && d.pSd * d.pId == d.qSd * d.qId
        && d.pIbd == 0
        && d.qIbd == 0
    {
        let (C0, C2, S_A)
            = hyperfine_weights(
                spin_a, (row.pS, row.qS, row.pI, row.qI), d.pSd, d.qSd, d.pId, d.qId);
        element += orb.norm * d2jjj * orb.R_HFI2 * (C2 * S_A);
        if rank0 { element += sys.HF0 * (C0 * S_A); }
    }

    // hyperfine, second nucleus
    let spin_b = sys.spin_b();
    if
        spin_b.is_active()
        && d.pSd * d.pIbd == d.qSd * d.qIbd
        && d.pId == 0
        && d.qId == 0
    {
        let (C0, C2, S_A)
            = hyperfine_weights(
                spin_b, (row.pS, row.qS, row.pIb, row.qIb), d.pSd, d.qSd, d.pIbd, d.qIbd);
        element += orb.norm * d2jjj * orb.R_HFI2b * (C2 * S_A);
        if rank0 { element += sys.HF0b * (C0 * S_A); }
    }

    // nuclear Zeeman; rank 0 only
    if d.diag_s() && d.diag_i() && rank0 {
        element += sys.NZ0 * CG_110_000 * f64::from(row.pI);
        element += sys.NZ0b * CG_110_000 * f64::from(row.pIb);
    }

    element
}

/// Compute the diffusion matrix element between `row` and `col`, including
/// Heisenberg exchange.
pub fn diffusion_element(
    params: &SleParams,
    row: &BasisIndex,
    d: &PairDiffs,
    orb: &OrbitalCoupling,
    iso: &IsoDiffusion,
) -> f64
{
    let diff = &params.diffusion;
    let mut element = 0.0;
    // rotational diffusion is diagonal in spin space
    if d.diag_s() && d.diag_i() {
        if d.Ld == 0 && d.Md == 0 && d.jKd == 0 {
            element += iso.element(d.Kd, orb.N_K);
        }
        if diff.potential.is_some() && d.Md == 0 && d.jKd == 0 {
            element += orb.pot_diff;
        }
    }

    if diff.exchange != 0.0 && d.pSd == 0 && d.pId == 0 && d.pIbd == 0 && d.diag_lkm() {
        let sys = &params.system;
        let mut t = 0.0;
        if d.qId == 0 && d.qIbd == 0 && d.qSd == 0 { t += 1.0; }
        if d.qId == 0 && d.qIbd == 0 && row.pS == 0 { t -= 0.5; }
        if row.pI == 0 && row.pIb == 0 && d.qSd == 0 {
            t -= 1.0 / sys.spin_a().multiplicity() / sys.spin_b().multiplicity();
        }
        element += t * diff.exchange;
    }

    element
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;
    use crate::params::{ BasisTruncation, DiffusionParams, SystemParams };
    use super::*;

    fn params(I: f64, Ib: f64) -> SleParams {
        let system = SystemParams { I, Ib, ..SystemParams::default() };
        let basis = BasisTruncation {
            Lemax: 2,
            Lomax: 0,
            Kmax: 0,
            Mmax: 1,
            jKmin: 1,
            pSmin: 1,
            deltaK: 1,
            meirovitch_symm: false,
            pImax: 1,
            pIbmax: 1,
        };
        SleParams::new(system, DiffusionParams::isotropic(1.0), basis).unwrap()
    }

    fn state(M: i32, pI: i32, qI: i32, pIb: i32, qIb: i32) -> BasisIndex {
        BasisIndex { L: 2, jK: 1, K: 0, M, pS: 1, qS: 0, pI, qI, pIb, qIb }
    }

    #[test]
    fn pair_diffs() {
        let row = BasisIndex { L: 2, jK: 1, K: 2, M: 1, pS: 1, qS: 0, pI: 0, qI: 1, pIb: 0, qIb: 0 };
        let col = BasisIndex { L: 4, jK: 1, K: 0, M: 0, pS: 0, qS: -1, pI: 1, qI: 0, pIb: 0, qIb: 0 };
        let d = PairDiffs::new(&row, &col);
        assert_eq!((d.Ld, d.Kd, d.Md), (-2, 2, 1));
        assert_eq!(d.pd(), 0);
        assert!(!d.diag_s());
        assert!(!d.diag_i());
        assert!(!d.diag_lkm());
        assert!(PairDiffs::new(&row, &row).diag_lkm());
    }

    #[test]
    fn hyperfine_weights_spin_half() {
        let half = SpinTotal::new(1);
        // diagonal: (pS, qS, pI, qI) = (1, 0, 0, 1) gives S_A = 1/2
        let (C0, C2, S_A) = hyperfine_weights(half, (1, 0, 0, 1), 0, 0, 0, 0);
        assert_eq!(C0, CG_110_000);
        assert_eq!(C2, CG_112_000);
        assert_abs_diff_eq!(S_A, 0.5, epsilon = 1e-15);

        // flip-flop with pSd + pId == 0
        let (C0, C2, S_A) = hyperfine_weights(half, (1, 0, 0, 1), 1, 1, -1, 1);
        assert_eq!(C0, CG_110_1M10);
        assert_eq!(C2, CG_112_1M10);
        // t = 1 * 1 + 0 * -1 = 1, KI = 1
        assert_abs_diff_eq!(S_A, 0.5, epsilon = 1e-15);

        // electron coherence change only: no rank-0 part
        let (C0, C2, _) = hyperfine_weights(half, (1, 0, 0, 1), 1, 1, 0, 0);
        assert_eq!(C0, 0.0);
        assert_eq!(C2, CG_112_101);
    }

    #[test]
    fn pseudo_secular_hyperfine() {
        // nuclear flip with pS = 1, qS = 0: S_A = -1 / sqrt(8), C2 = (112|101)
        let orb = |R_HFI2: f64, R_HFI2b: f64| OrbitalCoupling {
            N_K: 1.0,
            norm: 1.5,
            R_EZI2: 100.0,
            R_HFI2,
            R_HFI2b,
            pot_diff: 0.0,
        };
        let expected = -1.5 * 0.5 * 0.8 / 4.0;

        let p = params(0.5, 0.0);
        let row = state(1, 0, 1, 0, 0);
        let col = state(0, -1, 0, 0, 0);
        let d = PairDiffs::new(&row, &col);
        assert_eq!((d.pd(), d.Md), (1, 1));
        let elem = liouville_element(&p, &row, &d, &orb(0.8, 100.0), 0.5);
        assert_abs_diff_eq!(elem, expected, epsilon = 1e-12);

        let p = params(0.0, 0.5);
        let row = state(1, 0, 0, 0, 1);
        let col = state(0, 0, 0, -1, 0);
        let d = PairDiffs::new(&row, &col);
        let elem = liouville_element(&p, &row, &d, &orb(100.0, 0.8), 0.5);
        assert_abs_diff_eq!(elem, expected, epsilon = 1e-12);

        // no coupling when the coherence change does not match Md
        let col = state(1, 0, 0, -1, 0);
        let d = PairDiffs::new(&row, &col);
        assert_eq!(liouville_element(&p, &row, &d, &orb(100.0, 0.8), 0.5), 0.0);
    }

    #[test]
    fn rank_zero_second_nucleus() {
        let mut p = params(0.0, 0.5);
        p.system.HF0b = 2.0;
        p.system.NZ0b = 0.3;
        // first-nucleus rank-0 terms have nothing to act on
        p.system.HF0 = 50.0;
        p.system.NZ0 = 7.0;
        let orb = OrbitalCoupling { N_K: 0.5, norm: 2.5, ..OrbitalCoupling::default() };
        let c0 = -(1.0_f64 / 3.0).sqrt();

        // S_A = (pS qIb + pIb qS) / 2 = qIb / 2
        let row = state(0, 0, 0, 0, 1);
        let d = PairDiffs::new(&row, &row);
        let elem = liouville_element(&p, &row, &d, &orb, 0.0);
        assert_abs_diff_eq!(elem, 2.0 * c0 * 0.5, epsilon = 1e-12);

        let row = state(0, 0, 0, 1, 0);
        let d = PairDiffs::new(&row, &row);
        let elem = liouville_element(&p, &row, &d, &orb, 0.0);
        assert_abs_diff_eq!(elem, 0.3 * c0, epsilon = 1e-12);
    }
}
