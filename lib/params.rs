//! Immutable parameter records describing the spin system, its rotational
//! diffusion, the basis truncation, and output allocation limits.
//!
//! All records can be read from a TOML file via [`SleConfig`]:
//! ```toml
//! [system]
//! I = 1.0
//! EZ0 = 59.2
//! HF0 = 0.11
//! HF2 = { re = [0.0, 0.0, 0.09, 0.0, 0.0] }
//!
//! [diffusion]
//! Rxx = 0.03
//! Ryy = 0.03
//! Rzz = 0.03
//!
//! [basis]
//! Lemax = 14
//! Lomax = 7
//! Kmax = 6
//! Mmax = 2
//! jKmin = 1
//! pSmin = 0
//! deltaK = 2
//! pImax = 2
//!
//! [allocation]
//! max_elements = 1000000
//! max_rows = 20000
//! ```

use std::path::Path;
use ndarray as nd;
use serde::{ Deserialize, Serialize };
use crate::{
    error::{ SleError, SleResult },
    spin::SpinTotal,
};

/// Rank-2 spherical tensor components of an interaction, indexed by
/// projection `m = -2..=2` at position `m + 2`.
///
/// The imaginary part is optional; when absent, imaginary contributions
/// vanish rather than being read as zero components.
#[derive(Copy, Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Rank2Tensor {
    pub re: [f64; 5],
    #[serde(default)]
    pub im: Option<[f64; 5]>,
}

impl Rank2Tensor {
    /// Create a purely real tensor.
    pub fn real(re: [f64; 5]) -> Self { Self { re, im: None } }

    /// Create a tensor with explicit real and imaginary parts.
    pub fn complex(re: [f64; 5], im: [f64; 5]) -> Self {
        Self { re, im: Some(im) }
    }

    /// Real part of the `m`-th component, or zero if `|m| > 2`.
    pub fn re_at(&self, m: i32) -> f64 {
        usize::try_from(m + 2).ok()
            .and_then(|k| self.re.get(k).copied())
            .unwrap_or(0.0)
    }

    /// Imaginary part of the `m`-th component, or `None` if no imaginary part
    /// was given or `|m| > 2`.
    pub fn im_at(&self, m: i32) -> Option<f64> {
        let im = self.im.as_ref()?;
        usize::try_from(m + 2).ok().and_then(|k| im.get(k).copied())
    }

    /// Return `true` if all components are zero.
    pub fn is_zero(&self) -> bool {
        self.re.iter().all(|x| *x == 0.0)
            && self.im.map_or(true, |im| im.iter().all(|x| *x == 0.0))
    }
}

/// Magnetic interaction parameters of one electron spin coupled to up to two
/// nuclei, all in units of angular frequency.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemParams {
    /// Spin of the first nucleus.
    pub I: f64,
    /// Spin of the second nucleus.
    pub Ib: f64,
    /// Rank-0 electron Zeeman interaction.
    pub EZ0: f64,
    /// Rank-0 nuclear Zeeman interaction, first nucleus.
    pub NZ0: f64,
    /// Rank-0 hyperfine interaction, first nucleus.
    pub HF0: f64,
    /// Rank-0 nuclear Zeeman interaction, second nucleus.
    pub NZ0b: f64,
    /// Rank-0 hyperfine interaction, second nucleus.
    pub HF0b: f64,
    /// Rank-2 electron Zeeman interaction.
    pub EZ2: Rank2Tensor,
    /// Rank-2 hyperfine interaction, first nucleus.
    pub HF2: Rank2Tensor,
    /// Rank-2 hyperfine interaction, second nucleus.
    pub HF2b: Rank2Tensor,
    /// Tilt angle between the director and the static field.
    pub dir_tilt: f64,
    /// Reduced Wigner rotation matrix `d^2_{p,m}` at the director tilt,
    /// stored as `d2psi[p + 2][m + 2]`.
    pub d2psi: [[f64; 5]; 5],
}

impl Default for SystemParams {
    fn default() -> Self {
        let mut d2psi = [[0.0; 5]; 5];
        d2psi.iter_mut().enumerate().for_each(|(k, row)| { row[k] = 1.0; });
        Self {
            I: 0.0,
            Ib: 0.0,
            EZ0: 0.0,
            NZ0: 0.0,
            HF0: 0.0,
            NZ0b: 0.0,
            HF0b: 0.0,
            EZ2: Rank2Tensor::default(),
            HF2: Rank2Tensor::default(),
            HF2b: Rank2Tensor::default(),
            dir_tilt: 0.0,
            d2psi,
        }
    }
}

impl SystemParams {
    /// Spin of the first nucleus.
    pub fn spin_a(&self) -> SpinTotal { SpinTotal::from_f64(self.I) }

    /// Spin of the second nucleus.
    pub fn spin_b(&self) -> SpinTotal { SpinTotal::from_f64(self.Ib) }

    /// Reduced rotation matrix element `d^2_{p,m}`, or zero outside
    /// `|p|, |m| <= 2`.
    pub fn d2(&self, p: i32, m: i32) -> f64 {
        let (Ok(i), Ok(j)) = (usize::try_from(p + 2), usize::try_from(m + 2))
            else { return 0.0; };
        self.d2psi.get(i).and_then(|row| row.get(j)).copied().unwrap_or(0.0)
    }

    fn validate(&self) -> SleResult<()> {
        for (name, spin) in [("I", self.I), ("Ib", self.Ib)] {
            if !spin.is_finite() || spin < 0.0 {
                return Err(SleError::InvalidParams(
                    format!("nuclear spin {name} must be non-negative, got {spin}")
                ));
            }
            if (2.0 * spin).fract() != 0.0 {
                return Err(SleError::InvalidParams(
                    format!("nuclear spin {name} must be a half-integer, got {spin}")
                ));
            }
        }
        Ok(())
    }
}

/// Orienting potential coefficients `X^L_K` entering the diffusion operator.
///
/// Stored as a `(maxL + 1) x (2 maxL + 1)` array with `X^L_K` at `[L, K + L]`.
/// Reads outside the table are zero.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "PotentialRows", into = "PotentialRows")]
pub struct PotentialTable {
    xlk: nd::Array2<f64>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct PotentialRows {
    xlk: Vec<Vec<f64>>,
}

impl TryFrom<PotentialRows> for PotentialTable {
    type Error = SleError;

    fn try_from(rows: PotentialRows) -> SleResult<Self> {
        let nrows = rows.xlk.len();
        let ncols = rows.xlk.first().map(|row| row.len()).unwrap_or(0);
        if rows.xlk.iter().any(|row| row.len() != ncols) {
            return Err(SleError::InvalidParams(
                "potential table rows must have equal length".into()
            ));
        }
        let data: Vec<f64> = rows.xlk.into_iter().flatten().collect();
        let xlk = nd::Array2::from_shape_vec((nrows, ncols), data)
            .map_err(|err| SleError::InvalidParams(err.to_string()))?;
        Self::new(xlk)
    }
}

impl From<PotentialTable> for PotentialRows {
    fn from(table: PotentialTable) -> Self {
        Self {
            xlk: table.xlk.outer_iter().map(|row| row.to_vec()).collect(),
        }
    }
}

impl PotentialTable {
    /// Create a new table, checking that it has shape
    /// `(maxL + 1, 2 maxL + 1)`.
    pub fn new(xlk: nd::Array2<f64>) -> SleResult<Self> {
        let (nrows, ncols) = xlk.dim();
        if nrows == 0 || ncols != 2 * nrows - 1 {
            return Err(SleError::InvalidParams(
                format!(
                    "potential table must have shape (maxL + 1, 2 maxL + 1), \
                    got ({nrows}, {ncols})"
                )
            ));
        }
        Ok(Self { xlk })
    }

    /// Build a table of rank `max_l` by evaluating `f(L, K)` for every
    /// `0 <= L <= max_l` and `-L <= K <= L`.
    pub fn from_fn<F>(max_l: usize, f: F) -> Self
    where F: Fn(i32, i32) -> f64
    {
        let mut xlk: nd::Array2<f64> = nd::Array2::zeros((max_l + 1, 2 * max_l + 1));
        for L in 0..=max_l as i32 {
            for K in -L..=L {
                xlk[[L as usize, (K + L) as usize]] = f(L, K);
            }
        }
        Self { xlk }
    }

    /// Truncation rank of the potential expansion.
    pub fn max_l(&self) -> usize { self.xlk.nrows() - 1 }

    /// Coefficient `X^L_K`, or zero outside the stored table.
    pub fn get(&self, L: i32, K: i32) -> f64 {
        let (Ok(i), Ok(j)) = (usize::try_from(L), usize::try_from(K + L))
            else { return 0.0; };
        self.xlk.get((i, j)).copied().unwrap_or(0.0)
    }
}

/// Rotational diffusion tensor, exchange rate, and orienting potential.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DiffusionParams {
    pub Rxx: f64,
    pub Ryy: f64,
    pub Rzz: f64,
    /// Heisenberg spin exchange rate.
    pub exchange: f64,
    pub potential: Option<PotentialTable>,
}

impl DiffusionParams {
    /// Isotropic diffusion with rate `R` about every axis.
    pub fn isotropic(R: f64) -> Self {
        Self { Rxx: R, Ryy: R, Rzz: R, ..Self::default() }
    }

    /// Return `true` if `Rxx != Ryy`.
    pub fn is_rhombic(&self) -> bool { self.Rxx != self.Ryy }

    fn validate(&self) -> SleResult<()> {
        let all_finite
            = [self.Rxx, self.Ryy, self.Rzz, self.exchange].iter()
            .all(|x| x.is_finite());
        if !all_finite {
            return Err(SleError::InvalidParams(
                "diffusion rates and exchange rate must be finite".into()
            ));
        }
        Ok(())
    }
}

/// Truncation of the rotational and spin basis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct BasisTruncation {
    /// Maximum even orbital rank (also the overall maximum).
    pub Lemax: i32,
    /// Maximum odd orbital rank.
    pub Lomax: i32,
    /// Maximum `K`.
    pub Kmax: i32,
    /// Maximum `|M|`.
    pub Mmax: i32,
    /// Smallest `jK` symmetry label, either `-1` or `+1`.
    pub jKmin: i32,
    /// Smallest electron coherence order, one of `-1`, `0`, `+1`.
    pub pSmin: i32,
    /// Step in `K`.
    pub deltaK: i32,
    /// Drop the redundant symmetry sector `pI + pIb + pS - M != 1` when the
    /// director is untilted.
    #[serde(default)]
    pub meirovitch_symm: bool,
    /// Maximum nuclear coherence order, first nucleus.
    #[serde(default)]
    pub pImax: i32,
    /// Maximum nuclear coherence order, second nucleus.
    #[serde(default)]
    pub pIbmax: i32,
}

impl BasisTruncation {
    fn validate(&self) -> SleResult<()> {
        let nonneg = [
            ("Lemax", self.Lemax),
            ("Lomax", self.Lomax),
            ("Kmax", self.Kmax),
            ("Mmax", self.Mmax),
            ("pImax", self.pImax),
            ("pIbmax", self.pIbmax),
        ];
        if let Some((name, val)) = nonneg.iter().find(|(_, val)| *val < 0) {
            return Err(SleError::InvalidParams(
                format!("{name} must be non-negative, got {val}")
            ));
        }
        if self.jKmin != -1 && self.jKmin != 1 {
            return Err(SleError::InvalidParams(
                format!("jKmin must be -1 or +1, got {}", self.jKmin)
            ));
        }
        if !(-1..=1).contains(&self.pSmin) {
            return Err(SleError::InvalidParams(
                format!("pSmin must be -1, 0, or +1, got {}", self.pSmin)
            ));
        }
        if self.deltaK < 1 {
            return Err(SleError::InvalidParams(
                format!("deltaK must be positive, got {}", self.deltaK)
            ));
        }
        Ok(())
    }
}

/// Capacities of the sparse output buffers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AllocationLimits {
    pub max_elements: usize,
    pub max_rows: usize,
}

impl Default for AllocationLimits {
    fn default() -> Self { Self { max_elements: 5_000_000, max_rows: 100_000 } }
}

/// Everything needed to enumerate the basis and evaluate matrix elements.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SleParams {
    #[serde(default)]
    pub system: SystemParams,
    #[serde(default)]
    pub diffusion: DiffusionParams,
    pub basis: BasisTruncation,
}

impl SleParams {
    /// Bundle and validate parameter records.
    pub fn new(
        system: SystemParams,
        diffusion: DiffusionParams,
        basis: BasisTruncation,
    ) -> SleResult<Self>
    {
        let params = Self { system, diffusion, basis };
        params.validate()?;
        Ok(params)
    }

    /// Check all records for malformed values.
    pub fn validate(&self) -> SleResult<()> {
        self.system.validate()?;
        self.diffusion.validate()?;
        self.basis.validate()?;
        Ok(())
    }
}

/// Contents of a parameter file: an [`SleParams`] plus optional
/// [`AllocationLimits`].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SleConfig {
    #[serde(default)]
    pub system: SystemParams,
    #[serde(default)]
    pub diffusion: DiffusionParams,
    pub basis: BasisTruncation,
    #[serde(default)]
    pub allocation: AllocationLimits,
}

impl SleConfig {
    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(s: &str) -> SleResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.params().validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML configuration file.
    pub fn load<P>(path: P) -> SleResult<Self>
    where P: AsRef<Path>
    {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Return a copy of the parameter bundle.
    pub fn params(&self) -> SleParams {
        SleParams {
            system: self.system.clone(),
            diffusion: self.diffusion.clone(),
            basis: self.basis,
        }
    }

    /// Split into the parameter bundle and the allocation limits.
    pub fn into_parts(self) -> (SleParams, AllocationLimits) {
        let Self { system, diffusion, basis, allocation } = self;
        (SleParams { system, diffusion, basis }, allocation)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const CONFIG: &str = r#"
        [system]
        I = 1.0
        EZ0 = 59.2
        HF0 = 0.11
        HF2 = { re = [0.0, 0.0, 0.09, 0.0, 0.0] }
        EZ2 = { re = [0.0, 0.0, -0.02, 0.0, 0.0], im = [0.0, 0.01, 0.0, -0.01, 0.0] }

        [diffusion]
        Rxx = 0.03
        Ryy = 0.03
        Rzz = 0.05
        exchange = 0.001

        [diffusion.potential]
        xlk = [
            [0.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.5, 0.0, 0.0],
        ]

        [basis]
        Lemax = 6
        Lomax = 3
        Kmax = 4
        Mmax = 2
        jKmin = 1
        pSmin = 0
        deltaK = 2
        pImax = 2

        [allocation]
        max_elements = 10000
    "#;

    #[test]
    fn parse_config() {
        let config = SleConfig::from_toml_str(CONFIG).unwrap();
        assert_eq!(config.system.spin_a().halves(), 2);
        assert_eq!(config.system.spin_b().halves(), 0);
        assert_eq!(config.system.EZ2.im_at(-1), Some(0.01));
        assert_eq!(config.system.HF2.im_at(0), None);
        assert_eq!(config.system.d2(0, 0), 1.0);
        assert_eq!(config.system.d2(1, 0), 0.0);
        let potential = config.diffusion.potential.as_ref().unwrap();
        assert_eq!(potential.max_l(), 2);
        assert_eq!(potential.get(2, 0), 1.5);
        assert_eq!(config.basis.Lemax, 6);
        assert!(!config.basis.meirovitch_symm);
        assert_eq!(config.allocation.max_elements, 10000);
        assert_eq!(config.allocation.max_rows, 100_000);
    }

    #[test]
    fn reject_malformed_basis() {
        let bad = CONFIG.replace("deltaK = 2", "deltaK = 0");
        assert!(matches!(
            SleConfig::from_toml_str(&bad),
            Err(SleError::InvalidParams(_)),
        ));
        let bad = CONFIG.replace("jKmin = 1", "jKmin = 0");
        assert!(matches!(
            SleConfig::from_toml_str(&bad),
            Err(SleError::InvalidParams(_)),
        ));
        let bad = CONFIG.replace("I = 1.0", "I = 0.7");
        assert!(matches!(
            SleConfig::from_toml_str(&bad),
            Err(SleError::InvalidParams(_)),
        ));
    }

    #[test]
    fn reject_misshapen_potential() {
        let bad = CONFIG.replace("[0.0, 0.0, 1.5, 0.0, 0.0],", "[0.0, 1.5, 0.0],");
        assert!(SleConfig::from_toml_str(&bad).is_err());
        let flat = nd::Array2::zeros((2, 2));
        assert!(PotentialTable::new(flat).is_err());
    }

    #[test]
    fn potential_reads_outside_table_are_zero() {
        let table = PotentialTable::from_fn(2, |L, K| f64::from(10 * L + K));
        assert_eq!(table.get(2, -2), 18.0);
        assert_eq!(table.get(1, 1), 11.0);
        assert_eq!(table.get(4, 0), 0.0);
        assert_eq!(table.get(0, -1), 0.0);
        assert_eq!(table.get(2, 3), 0.0);
    }

    #[test]
    fn rank2_components() {
        let t = Rank2Tensor::complex([1.0, 2.0, 3.0, 4.0, 5.0], [0.0; 5]);
        assert_eq!(t.re_at(-2), 1.0);
        assert_eq!(t.re_at(2), 5.0);
        assert_eq!(t.re_at(3), 0.0);
        assert_eq!(t.im_at(0), Some(0.0));
        assert!(Rank2Tensor::default().is_zero());
    }
}
