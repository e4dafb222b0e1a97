#![allow(dead_code, non_snake_case, non_upper_case_globals)]

pub mod error;
pub mod utils;
pub mod spin;
pub mod cgcoeffs;
pub mod params;
pub mod basis;
pub mod coupling;
pub mod elements;
pub mod sparse;
pub mod assembler;

#[doc(hidden)]
pub use ndarray_npy;

pub use error::{ SleError, SleResult };
pub use params::{
    AllocationLimits,
    BasisTruncation,
    DiffusionParams,
    PotentialTable,
    Rank2Tensor,
    SleConfig,
    SleParams,
    SystemParams,
};
pub use basis::{ Basis, BasisIndex };
pub use sparse::{ SparseEntry, SparseOutput };
pub use assembler::{ build, Assembler };
