use std::fmt::{self, Display};
use std::str::FromStr;

///
/// Genomic strand of a feature or an aligned read.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy, PartialOrd, Ord)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    ///
    /// Strand of a feature in the reference alignment listing.
    ///
    /// Only the reverse-strand codes (`16`, and `272` for a secondary reverse
    /// alignment) map to [`Strand::Reverse`]. Every other code, including
    /// ones we don't recognise, is read as forward.
    ///
    pub fn from_listing_flag(flag: u16) -> Strand {
        match flag {
            16 | 272 => Strand::Reverse,
            _ => Strand::Forward,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Strand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            _ => Err(format!("Invalid strand: {}", s)),
        }
    }
}
