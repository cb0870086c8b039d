//! Error type for the C emitter.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodeGenError {
    /// A type reached code generation that the emitter has no C rendering
    /// for (only reachable if the type checker has a bug).
    #[error("type mapping error: {0}")]
    TypeMappingError(String),

    /// An invariant the type checker is supposed to guarantee did not hold.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CodeGenError>;
