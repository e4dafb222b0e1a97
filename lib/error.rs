//! Errors raised while validating parameters or assembling the superoperator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SleError {
    /// A parameter record is malformed; nothing has been computed.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// The element buffer is full.
    #[error(
        "number of non-zero elements reached the allocated maximum ({max}); \
        increase the element allocation"
    )]
    ElementCapacity { max: usize },

    /// The basis dimension reached the row allocation.
    #[error(
        "basis dimension reached the allocated maximum number of rows ({max}); \
        increase the row allocation"
    )]
    RowCapacity { max: usize },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("error parsing parameter file: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type SleResult<T> = Result<T, SleError>;
