//! portc-util - Core utilities shared by every compiler stage.
//!
//! This crate has no knowledge of Portugol syntax or semantics. It provides
//! the foundation every other `portc-*` crate builds on:
//!
//! - [`span`] - source positions, ranges, and the multi-file source map.
//! - [`symbol`] - string interning for identifiers.
//! - [`diagnostic`] - stable error codes, severities, and rendered diagnostics.
//! - [`index_vec`] - a typed vector indexed by a newtype instead of `usize`,
//!   used by the resolver's scope tree and other per-compilation tables.

pub mod diagnostic;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use index_vec::{Idx, IndexVec};
pub use span::{FileId, Position, Range, SourceMap};
pub use symbol::{Interner, Symbol};
