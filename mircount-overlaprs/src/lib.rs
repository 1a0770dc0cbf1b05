//! Feature lookup and overlap resolution for reads mapped to a genome.
//!
//! Features (typically mature microRNAs) are read from a reference alignment
//! listing, a SAM file in which each record places one feature on the genome.
//! Every feature is indexed at each position of its alignment widened by a
//! small flank, so a read can be matched to features by looking up the
//! positions it covers.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::io::Cursor;
//!
//! use mircount_core::Strand;
//! use mircount_overlaprs::{FeatureIndex, IndexParams, OverlapResolver, SeededTieBreaker};
//!
//! let listing = "@HD\tVN:1.0\n\
//!                F1\t0\t1\t100\t255\t20M\t*\t0\t0\tTGAGGTAGTAGGTTGTATAG\t*\n";
//!
//! let index = FeatureIndex::from_reader(Cursor::new(listing), &IndexParams::default()).unwrap();
//! let mut tie_breaker = SeededTieBreaker::new(Some(42));
//!
//! let hit = index.resolve("1", Strand::Forward, 100, 119, &mut tie_breaker).unwrap();
//! assert_eq!(index.catalog().name(hit.feature), "F1");
//! assert_eq!(hit.primary_start, 100);
//! ```
//!
//! Reads covering several features are assigned to the feature they share the
//! most indexed positions with. Equal overlaps are settled by a
//! [`TieBreaker`], which is passed in by the caller so runs can be seeded.

/// Feature names and per-feature count vectors.
pub mod catalog;

/// Building the position index from a reference alignment listing.
pub mod index;

/// Looking up and resolving reads against the index.
pub mod resolve;

/// Random and deterministic tie-breaking between equally good features.
pub mod tiebreak;

// re-exports
pub use self::catalog::{FeatureCatalog, FeatureCounts};
pub use self::index::{FeatureAnchor, FeatureIndex, IndexParams};
pub use self::resolve::OverlapResolver;
pub use self::tiebreak::{FirstCandidate, SeededTieBreaker, TieBreaker};
