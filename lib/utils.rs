//! Small integer helpers shared across the assembler.

/// Maximum orbital-rank separation coupled by the diffusion operator.
pub const L_BAND: i32 = 8;

/// Maximum `K` difference or sum coupled by the orienting potential.
pub const K_BAND: i32 = 8;

/// Return `true` if `k` is odd; valid for negative `k`.
pub fn is_odd(k: i32) -> bool { k.rem_euclid(2) == 1 }

/// Return `(-1)^k` as an `i32`.
pub fn parity(k: i32) -> i32 { if is_odd(k) { -1 } else { 1 } }

/// Return `(-1)^k` as an `f64`.
pub fn parity_f(k: i32) -> f64 { f64::from(parity(k)) }

/// Create a directory and all its parents, propagating any error with `?`.
#[macro_export]
macro_rules! mkdir {
    ( $dir:expr ) => {
        std::fs::create_dir_all($dir.as_path())?
    }
}

/// Write a set of named arrays to a `.npz` archive, propagating any error
/// with `?`.
///
/// ```ignore
/// write_npz!(
///     outdir.join("out.npz"),
///     arrays: {
///         "rows" => &rows,
///         "cols" => &cols,
///     }
/// );
/// ```
#[macro_export]
macro_rules! write_npz {
    (
        $outfile:expr,
        arrays: { $( $name:literal => $arr:expr ),+ $(,)? }
    ) => {
        {
            let mut npz
                = $crate::ndarray_npy::NpzWriter::new(
                    std::fs::File::create($outfile)?
                );
            $( npz.add_array($name, $arr)?; )+
            npz.finish()?;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parity_of_negatives() {
        assert_eq!(parity(-3), -1);
        assert_eq!(parity(-2), 1);
        assert_eq!(parity(0), 1);
        assert_eq!(parity(7), -1);
        assert!(is_odd(-1));
    }
}
