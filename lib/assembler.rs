//! Assembly of the sparse superoperator `Γ - i L` over the truncated basis.
//!
//! Rows are visited in basis order. For each row, columns run from the row
//! itself through every later basis function whose orbital rank is at most
//! eight above the row's; only this upper triangle is evaluated, and each
//! nonzero off-diagonal element is mirrored into the lower triangle without
//! conjugation.

use log::debug;
use num_complex::Complex64 as C64;
use crate::{
    basis::{ Basis, BasisIndex },
    coupling::{ CouplingEvaluator, OrbitalCoupling },
    elements::{ diffusion_element, liouville_element, PairDiffs },
    error::{ SleError, SleResult },
    params::{ AllocationLimits, SleParams },
    sparse::SparseOutput,
    spin::w3j,
    utils::L_BAND,
};

/// Drives the row/column sweep for a fixed parameter bundle.
#[derive(Copy, Clone, Debug)]
pub struct Assembler<'a> {
    params: &'a SleParams,
    basis: Basis,
    coupling: CouplingEvaluator<'a>,
}

impl<'a> Assembler<'a> {
    /// Validate `params` and prepare an assembler.
    pub fn new(params: &'a SleParams) -> SleResult<Self> {
        Ok(Self {
            params,
            basis: Basis::new(params)?,
            coupling: CouplingEvaluator::new(params),
        })
    }

    /// Get the basis whose order fixes the matrix indices.
    pub fn basis(&self) -> &Basis { &self.basis }

    /// Get the parameter bundle.
    pub fn params(&self) -> &SleParams { self.params }

    /// Compute all elements and append them to `out`, returning the number
    /// of rows.
    ///
    /// Fails on the first push that would fill the element buffer, or when
    /// the running row or column index reaches `out.max_rows()`. Elements
    /// appended before a failure are left in `out`.
    pub fn assemble_into(&self, out: &mut SparseOutput) -> SleResult<usize> {
        let max_rows = out.max_rows();
        let mut iRow: usize = 0;
        let mut rows = self.basis.iter();
        while let Some(row) = rows.next() {
            let later = rows.clone();
            self.assemble_row(out, iRow, row, later)?;
            iRow += 1;
            out.set_n_rows(iRow);
            if iRow >= max_rows {
                return Err(SleError::RowCapacity { max: max_rows });
            }
        }
        Ok(iRow)
    }

    fn assemble_row<I>(
        &self,
        out: &mut SparseOutput,
        iRow: usize,
        row: BasisIndex,
        later: I,
    ) -> SleResult<()>
    where I: Iterator<Item = BasisIndex>
    {
        let max_rows = out.max_rows();
        let iso = self.coupling.iso_diffusion(&row);
        // consecutive columns share (L, jK, K) over whole M/spin blocks
        let mut orb_cache: Option<((i32, i32, i32), OrbitalCoupling)> = None;
        let mut liou_cache: Option<((i32, i32), f64)> = None;

        let cols
            = std::iter::once(row)
            .chain(later)
            .take_while(|col| col.L <= row.L + L_BAND);
        let mut iCol = iRow;
        for col in cols {
            let orb
                = match orb_cache {
                    Some((key, orb)) if key == col.orbital() => orb,
                    _ => {
                        let orb = self.coupling.orbital(&row, &col);
                        orb_cache = Some((col.orbital(), orb));
                        orb
                    },
                };
            let liou3j
                = match liou_cache {
                    Some((key, val)) if key == (col.L, col.M) => val,
                    _ => {
                        let val
                            = if (row.L - col.L).abs() <= 2 {
                                w3j(row.L, 2, col.L, row.M, col.M - row.M, -col.M)
                            } else {
                                0.0
                            };
                        liou_cache = Some(((col.L, col.M), val));
                        val
                    },
                };

            let d = PairDiffs::new(&row, &col);
            let liou = liouville_element(self.params, &row, &d, &orb, liou3j);
            let gamma = diffusion_element(self.params, &row, &d, &orb, &iso);
            if gamma != 0.0 || liou != 0.0 {
                let value = C64::new(gamma, -liou);
                out.push(iRow, iCol, value)?;
                if iCol != iRow { out.push(iCol, iRow, value)?; }
            }

            iCol += 1;
            if iCol >= max_rows {
                return Err(SleError::RowCapacity { max: max_rows });
            }
        }
        Ok(())
    }
}

/// Count the basis, allocate output buffers for `limits`, and assemble.
///
/// The basis dimension is checked against `limits.max_rows` before anything
/// is allocated, and fails with [`SleError::RowCapacity`] if it is not
/// strictly smaller. The row limit is never raised to fit the basis: a caller
/// expecting a dimension of `n` must pass `max_rows > n`.
pub fn build(params: &SleParams, limits: AllocationLimits)
    -> SleResult<SparseOutput>
{
    let assembler = Assembler::new(params)?;
    let n = assembler.basis().count();
    debug!("basis dimension: {}", n);
    debug!(
        "potential: {}; exchange: {}",
        params.diffusion.potential.is_some(),
        params.diffusion.exchange != 0.0,
    );
    debug!(
        "rank-2 couplings: EZ2 {}; HF2 {}; HF2b {}",
        !params.system.EZ2.is_zero(),
        !params.system.HF2.is_zero(),
        !params.system.HF2b.is_zero(),
    );
    if n >= limits.max_rows {
        return Err(SleError::RowCapacity { max: limits.max_rows });
    }
    let mut out = SparseOutput::new(limits);
    let n_rows = assembler.assemble_into(&mut out)?;
    debug!("assembled {} elements over {} rows", out.len(), n_rows);
    Ok(out)
}
