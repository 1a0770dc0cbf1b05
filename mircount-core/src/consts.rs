/// Lines starting with this byte are SAM headers.
pub const HEADER_MARKER: u8 = b'@';

/// Reference name written by aligners for reads that did not align.
pub const UNALIGNED_REFERENCE: &str = "*";

/// Number of bases added on both sides of a feature when it is indexed.
pub const DEFAULT_FLANK: i64 = 5;

/// Annotation key holding the feature name in semicolon-delimited identifiers.
pub const DEFAULT_NAME_KEY: &str = "Name";
