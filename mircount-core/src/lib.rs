//! Shared building blocks for the mircount crates.
//!
//! This crate holds the pieces every other mircount crate needs: the strand and
//! alignment-flag models, the parsed [`AlignedRead`](models::AlignedRead) record,
//! the [`CountingError`](errors::CountingError) type and helpers for opening
//! (optionally gzipped) SAM files and reading them line by line.

pub mod consts;
pub mod dna;
pub mod errors;
pub mod models;
pub mod utils;

// re-exports
pub use self::errors::{CountingError, CountingResult};
pub use self::models::{AlignedRead, ReadFlag, Strand};
