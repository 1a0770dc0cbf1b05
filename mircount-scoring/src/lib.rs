//! Counting reads per feature and per sample.
//!
//! Two counting modes are provided:
//!
//! - [`ReadAggregator`] assigns the reads of one sample to features of a
//!   [`FeatureIndex`](mircount_overlaprs::FeatureIndex) and records where on
//!   each feature the reads fall ([`QcProfile`]).
//!   [`feature_scoring_from_alignments`] runs it over many samples in parallel
//!   and merges the results into feature × sample matrices.
//! - [`count_reference_sequences`] counts reads aligned directly to named
//!   reference sequences, such as an sgRNA library, and summarises how many
//!   reads of each sample aligned at all.
//!
//! Results stay in memory; [`CountMatrix::write_to_file`] is there for callers
//! that want a tab-separated table.

pub mod aggregate;
pub mod batch;
pub mod config;
pub mod consts;
pub mod counts;
pub mod qc;
pub mod refseq;

// re-exports
pub use aggregate::*;
pub use batch::*;
pub use config::*;
pub use counts::*;
pub use qc::*;
pub use refseq::*;
