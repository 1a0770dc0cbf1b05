pub mod aligned_read;
pub mod strand;

// re-export for cleaner imports
pub use self::aligned_read::{AlignedRead, ReadFlag, parse_record};
pub use self::strand::Strand;
