use std::collections::BTreeMap;

use mircount_core::Strand;

///
/// Position of aligned bases relative to the 5' end of the feature they were
/// assigned to.
///
/// Offset 0 is the feature's primary start. Negative offsets are bases
/// upstream of it (in the flank), positive offsets lie downstream, measured
/// along the feature's strand.
///
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QcProfile {
    offsets: BTreeMap<i64, u64>,
}

impl QcProfile {
    ///
    /// Record every base of a read covering `[start, end]` (both inclusive)
    /// against a feature whose primary start is `primary_start`.
    ///
    pub fn add_span(&mut self, strand: Strand, primary_start: i64, start: i64, end: i64) {
        for pos in start..=end {
            let offset = match strand {
                Strand::Forward => pos - primary_start,
                Strand::Reverse => primary_start - pos,
            };
            *self.offsets.entry(offset).or_insert(0) += 1;
        }
    }

    pub fn get(&self, offset: i64) -> u64 {
        self.offsets.get(&offset).copied().unwrap_or(0)
    }

    /// `(offset, bases)` pairs in ascending offset order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, u64)> + '_ {
        self.offsets.iter().map(|(o, n)| (*o, *n))
    }

    pub fn offsets(&self) -> impl Iterator<Item = i64> + '_ {
        self.offsets.keys().copied()
    }

    pub fn total(&self) -> u64 {
        self.offsets.values().sum()
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}
