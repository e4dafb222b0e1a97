//! Enumeration of the truncated, symmetry-adapted rotational and spin basis.
//!
//! Basis functions are labeled by ten integers: the orbital rank `L`, the
//! `K`-symmetrization label `jK`, the projections `K` and `M`, and one
//! coherence-order/population pair `(p, q)` for each of the electron spin and
//! the two nuclear spins. Row and column indices of the superoperator are
//! positions in the sequence produced by [`Basis::iter`], so the order of that
//! sequence is part of the output contract.

use crate::{
    error::SleResult,
    params::{ BasisTruncation, SleParams },
    utils::{ is_odd, parity },
};

/// A single basis function.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BasisIndex {
    pub L: i32,
    pub jK: i32,
    pub K: i32,
    pub M: i32,
    pub pS: i32,
    pub qS: i32,
    pub pI: i32,
    pub qI: i32,
    pub pIb: i32,
    pub qIb: i32,
}

impl BasisIndex {
    /// Return the `(L, jK, K)` labels, which fix all orbital couplings except
    /// those depending on `M`.
    pub fn orbital(&self) -> (i32, i32, i32) { (self.L, self.jK, self.K) }
}

/// Iterate over `(p, q)` coherence-order/population pairs of a spin with `tj`
/// halves for `p` in `pmin..=pmax`.
///
/// For each `p`, `q` runs over `-(tj - |p|)..=(tj - |p|)` in steps of 2, which
/// is empty when `|p| > tj`.
fn coherence_pairs(pmin: i32, pmax: i32, tj: i32)
    -> impl Iterator<Item = (i32, i32)> + Clone
{
    (pmin..=pmax)
        .flat_map(move |p| {
            let qmax = tj - p.abs();
            (-qmax..=qmax).step_by(2).map(move |q| (p, q))
        })
}

/// The ordered set of basis functions admitted by a [`BasisTruncation`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Basis {
    trunc: BasisTruncation,
    tI: i32,
    tIb: i32,
    symm: bool,
}

impl Basis {
    /// Create a new `Basis` from a parameter bundle, validating it first.
    ///
    /// The symmetry-reduction filter is only active for an untilted director.
    pub fn new(params: &SleParams) -> SleResult<Self> {
        params.validate()?;
        Ok(Self {
            trunc: params.basis,
            tI: params.system.spin_a().halves() as i32,
            tIb: params.system.spin_b().halves() as i32,
            symm: params.basis.meirovitch_symm && params.system.dir_tilt == 0.0,
        })
    }

    fn orbital_iter(self) -> impl Iterator<Item = (i32, i32, i32, i32)> + Clone {
        let t = self.trunc;
        (0..=t.Lemax)
            .filter(move |&L| !(is_odd(L) && L > t.Lomax))
            .flat_map(move |L| {
                (t.jKmin..=1).step_by(2)
                    .flat_map(move |jK| {
                        (0..=t.Kmax.min(L)).step_by(t.deltaK as usize)
                            .filter(move |&K| K != 0 || parity(L) == jK)
                            .flat_map(move |K| {
                                let Mmax = t.Mmax.min(L);
                                (-Mmax..=Mmax).map(move |M| (L, jK, K, M))
                            })
                    })
            })
    }

    /// Iterate over all basis functions in matrix order.
    ///
    /// The iterator is cheap to clone; a clone taken mid-sequence resumes from
    /// the same position.
    pub fn iter(&self) -> impl Iterator<Item = BasisIndex> + Clone {
        let this = *self;
        let t = self.trunc;
        this.orbital_iter()
            .flat_map(move |(L, jK, K, M)| {
                coherence_pairs(t.pSmin, 1, 1)
                    .flat_map(move |(pS, qS)| {
                        coherence_pairs(-t.pImax, t.pImax, this.tI)
                            .flat_map(move |(pI, qI)| {
                                coherence_pairs(-t.pIbmax, t.pIbmax, this.tIb)
                                    .filter(move |&(pIb, _)| {
                                        !this.symm || pI + pIb + pS - M == 1
                                    })
                                    .map(move |(pIb, qIb)| BasisIndex {
                                        L, jK, K, M, pS, qS, pI, qI, pIb, qIb,
                                    })
                            })
                    })
            })
    }

    /// Count the basis functions without storing them.
    pub fn count(&self) -> usize { self.iter().count() }

    /// Get the `n`-th basis function, i.e. the labels of the `n`-th row.
    pub fn get(&self, n: usize) -> Option<BasisIndex> { self.iter().nth(n) }
}
