use std::io::BufRead;
use std::ops::AddAssign;
use std::path::Path;

use log::{debug, info, warn};

use mircount_core::consts::HEADER_MARKER;
use mircount_core::models::{AlignedRead, ReadFlag, parse_record};
use mircount_core::utils::{FileType, get_dynamic_reader, get_file_info, read_line_bytes};
use mircount_core::{CountingError, CountingResult};
use mircount_overlaprs::{FeatureCounts, FeatureIndex, OverlapResolver, TieBreaker};

use crate::qc::QcProfile;

///
/// What happened to the records of one sample.
///
/// `records` counts every non-header line; each of them ends up in exactly one
/// of the other fields.
///
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReadStats {
    pub records: u64,
    pub assigned: u64,
    pub unaligned: u64,
    pub unknown_flag: u64,
    pub no_overlap: u64,
    pub malformed: u64,
}

impl AddAssign for ReadStats {
    fn add_assign(&mut self, other: Self) {
        self.records += other.records;
        self.assigned += other.assigned;
        self.unaligned += other.unaligned;
        self.unknown_flag += other.unknown_flag;
        self.no_overlap += other.no_overlap;
        self.malformed += other.malformed;
    }
}

/// Everything counted for one sample.
#[derive(Debug, Clone)]
pub struct SampleCounts {
    pub counts: FeatureCounts,
    pub qc: QcProfile,
    pub stats: ReadStats,
}

///
/// Assigns the reads of one sample to features of a [`FeatureIndex`].
///
/// Each aligned read goes to at most one feature, chosen by
/// [`OverlapResolver::resolve`]. Ties are settled by the aggregator's own
/// [`TieBreaker`], so one aggregator per sample keeps samples independent.
///
pub struct ReadAggregator<'a, T: TieBreaker> {
    index: &'a FeatureIndex,
    tie_breaker: T,
}

impl<'a, T: TieBreaker> ReadAggregator<'a, T> {
    pub fn new(index: &'a FeatureIndex, tie_breaker: T) -> Self {
        ReadAggregator { index, tie_breaker }
    }

    ///
    /// Count a SAM alignment file, plain or gzipped.
    ///
    /// # Errors
    /// [`CountingError::UnsupportedInput`] when the path isn't a `.sam` or
    /// `.sam.gz` file, or any error opening and reading it.
    ///
    pub fn count_file(&mut self, path: &Path) -> CountingResult<SampleCounts> {
        if get_file_info(path).file_type != FileType::SAM {
            return Err(CountingError::UnsupportedInput(path.to_path_buf()));
        }

        let reader = get_dynamic_reader(path)?;
        let sample = self.count_reader(reader)?;

        info!(
            "{}: {} records, {} assigned, {} unaligned, {} without overlap",
            path.display(),
            sample.stats.records,
            sample.stats.assigned,
            sample.stats.unaligned,
            sample.stats.no_overlap
        );
        if sample.stats.unknown_flag > 0 {
            warn!(
                "{}: skipped {} records with unsupported flags",
                path.display(),
                sample.stats.unknown_flag
            );
        }

        Ok(sample)
    }

    ///
    /// Count alignment records from any reader. Header lines are skipped, as
    /// are records that can't be parsed.
    ///
    pub fn count_reader<R: BufRead>(&mut self, mut reader: R) -> CountingResult<SampleCounts> {
        let mut counts = self.index.count_template();
        let mut qc = QcProfile::default();
        let mut stats = ReadStats::default();

        let mut buf = Vec::new();
        while read_line_bytes(&mut reader, &mut buf)? {
            if buf.is_empty() || buf[0] == HEADER_MARKER {
                continue;
            }
            stats.records += 1;

            let record = match parse_record(&buf) {
                Ok(record) => record,
                Err(e) => {
                    skip_malformed(&mut stats, e);
                    continue;
                }
            };
            let read = match AlignedRead::try_from(&record) {
                Ok(read) => read,
                Err(e) => {
                    skip_malformed(&mut stats, e);
                    continue;
                }
            };

            let strand = match read.flag() {
                ReadFlag::Aligned(strand) => strand,
                ReadFlag::Unaligned => {
                    stats.unaligned += 1;
                    continue;
                }
                ReadFlag::Unknown(flag) => {
                    debug!(
                        "Unsupported flag {} for read {}",
                        flag,
                        read.name.unwrap_or("*")
                    );
                    stats.unknown_flag += 1;
                    continue;
                }
            };

            let hit = self.index.resolve(
                read.chr,
                strand,
                read.start,
                read.end(),
                &mut self.tie_breaker,
            );

            match hit {
                Some(anchor) => {
                    counts.increment(anchor.feature);
                    qc.add_span(strand, anchor.primary_start, read.start, read.end());
                    stats.assigned += 1;
                }
                None => stats.no_overlap += 1,
            }
        }

        Ok(SampleCounts { counts, qc, stats })
    }
}

fn skip_malformed(stats: &mut ReadStats, err: CountingError) {
    warn!("Skipping record {}: {}", stats.records, err);
    stats.malformed += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    use mircount_overlaprs::{FirstCandidate, IndexParams, SeededTieBreaker};
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    const SEQ20: &str = "ACGTACGTACGTACGTACGT";

    fn sam_line(name: &str, flag: &str, chr: &str, start: i64, seq: &str) -> String {
        format!("{name}\t{flag}\t{chr}\t{start}\t255\t{}M\t*\t0\t0\t{seq}\t*\n", seq.len())
    }

    #[fixture]
    fn index() -> FeatureIndex {
        let mut listing = String::from("@HD\tVN:1.6\n");
        listing.push_str(&sam_line("F1", "0", "1", 100, SEQ20));
        listing.push_str(&sam_line("F2", "16", "1", 200, SEQ20));
        listing.push_str(&sam_line("F3", "0", "2", 50, SEQ20));
        FeatureIndex::from_reader(Cursor::new(listing), &IndexParams::default()).unwrap()
    }

    #[rstest]
    fn test_single_read_on_a_feature(index: FeatureIndex) {
        let sam = sam_line("r1", "0", "1", 100, SEQ20);
        let mut agg = ReadAggregator::new(&index, SeededTieBreaker::new(Some(1)));
        let sample = agg.count_reader(Cursor::new(sam)).unwrap();

        assert_eq!(sample.counts.get("F1"), Some(1));
        assert_eq!(sample.counts.get("F2"), Some(0));
        assert_eq!(sample.counts.get("F3"), Some(0));
        assert_eq!(sample.qc.get(0), 1);
        assert_eq!(sample.qc.get(19), 1);
        assert_eq!(sample.qc.len(), 20);
    }

    #[rstest]
    fn test_reverse_read_offsets(index: FeatureIndex) {
        let sam = sam_line("r1", "16", "1", 198, SEQ20);
        let mut agg = ReadAggregator::new(&index, FirstCandidate);
        let sample = agg.count_reader(Cursor::new(sam)).unwrap();

        assert_eq!(sample.counts.get("F2"), Some(1));
        // primary start of F2 is 219, read covers 198..=217
        assert_eq!(sample.qc.get(2), 1);
        assert_eq!(sample.qc.get(21), 1);
        assert_eq!(sample.qc.get(1), 0);
    }

    #[rstest]
    fn test_strand_must_match(index: FeatureIndex) {
        let sam = sam_line("r1", "16", "1", 100, SEQ20);
        let mut agg = ReadAggregator::new(&index, FirstCandidate);
        let sample = agg.count_reader(Cursor::new(sam)).unwrap();

        assert_eq!(sample.counts.total(), 0);
        assert_eq!(sample.stats.no_overlap, 1);
        assert!(sample.qc.is_empty());
    }

    #[rstest]
    fn test_records_are_classified(index: FeatureIndex) {
        let mut sam = String::from("@HD\tVN:1.6\n@SQ\tSN:1\tLN:1000\n");
        sam.push_str(&sam_line("r1", "0", "1", 100, SEQ20));
        sam.push_str(&sam_line("r2", "0", "2", 52, SEQ20));
        sam.push_str(&sam_line("r3", "4", "*", 0, SEQ20));
        sam.push_str(&sam_line("r4", "256", "1", 100, SEQ20));
        sam.push_str(&sam_line("r5", "0", "1", 5000, SEQ20));
        sam.push_str(&sam_line("r6", "0", "chrUn", 100, SEQ20));
        sam.push_str("r7\t0\t1\n");
        sam.push_str(&sam_line("r8", "0", "1", 101, SEQ20));

        let mut agg = ReadAggregator::new(&index, FirstCandidate);
        let sample = agg.count_reader(Cursor::new(sam)).unwrap();

        assert_eq!(
            sample.stats,
            ReadStats {
                records: 8,
                assigned: 3,
                unaligned: 1,
                unknown_flag: 1,
                no_overlap: 2,
                malformed: 1,
            }
        );
        assert_eq!(sample.counts.get("F1"), Some(2));
        assert_eq!(sample.counts.get("F3"), Some(1));
        // r1 covers offsets 0..=19, r8 1..=20 and r2 2..=21 on F3
        assert_eq!(sample.qc.get(0), 1);
        assert_eq!(sample.qc.get(1), 2);
        assert_eq!(sample.qc.get(2), 3);
        assert_eq!(sample.qc.get(21), 1);
    }

    #[rstest]
    fn test_invalid_utf8_record_is_skipped(index: FeatureIndex) {
        let mut sam = sam_line("r1", "0", "1", 100, SEQ20).into_bytes();
        sam.extend_from_slice(b"r\xff2\t0\t1\t101\t255\t20M\t*\t0\t0\tACGTACGTACGTACGTACGT\t*\n");
        sam.extend_from_slice(sam_line("r3", "0", "2", 50, SEQ20).as_bytes());

        let mut agg = ReadAggregator::new(&index, FirstCandidate);
        let sample = agg.count_reader(Cursor::new(sam)).unwrap();

        assert_eq!(sample.stats.records, 3);
        assert_eq!(sample.stats.assigned, 2);
        assert_eq!(sample.stats.malformed, 1);
        assert_eq!(sample.counts.get("F1"), Some(1));
        assert_eq!(sample.counts.get("F3"), Some(1));
    }

    #[rstest]
    fn test_overflowing_end_is_skipped(index: FeatureIndex) {
        let mut sam = sam_line("r1", "0", "1", 9223372036854775800, SEQ20);
        sam.push_str(&sam_line("r2", "0", "1", 100, SEQ20));

        let mut agg = ReadAggregator::new(&index, FirstCandidate);
        let sample = agg.count_reader(Cursor::new(sam)).unwrap();

        assert_eq!(sample.stats.records, 2);
        assert_eq!(sample.stats.malformed, 1);
        assert_eq!(sample.stats.assigned, 1);
        assert_eq!(sample.counts.get("F1"), Some(1));
    }

    #[rstest]
    fn test_empty_input_gives_zeroed_counts(index: FeatureIndex) {
        let mut agg = ReadAggregator::new(&index, FirstCandidate);
        let sample = agg.count_reader(Cursor::new("@HD\tVN:1.6\n")).unwrap();

        let got: Vec<(&str, u64)> = sample.counts.iter().collect();
        assert_eq!(got, vec![("F1", 0), ("F2", 0), ("F3", 0)]);
        assert_eq!(sample.stats, ReadStats::default());
    }

    #[rstest]
    #[case("sample.bam")]
    #[case("sample.txt")]
    #[case("sample.bed.gz")]
    fn test_rejects_non_sam(index: FeatureIndex, #[case] file: &str) {
        let mut agg = ReadAggregator::new(&index, FirstCandidate);
        let res = agg.count_file(&PathBuf::from(file));

        assert!(matches!(res, Err(CountingError::UnsupportedInput(_))));
    }

    #[rstest]
    fn test_missing_sam_file(index: FeatureIndex) {
        let mut agg = ReadAggregator::new(&index, FirstCandidate);
        let res = agg.count_file(&PathBuf::from("does/not/exist.sam"));

        assert!(matches!(res, Err(CountingError::FileReadError { .. })));
    }

    #[rstest]
    fn test_count_file(index: FeatureIndex) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s1.sam");
        std::fs::write(&path, sam_line("r1", "0", "2", 50, SEQ20)).unwrap();

        let mut agg = ReadAggregator::new(&index, FirstCandidate);
        let sample = agg.count_file(&path).unwrap();
        assert_eq!(sample.counts.get("F3"), Some(1));
    }

    #[rstest]
    fn test_stats_add_assign() {
        let mut a = ReadStats {
            records: 2,
            assigned: 1,
            unaligned: 1,
            ..Default::default()
        };
        a += ReadStats {
            records: 1,
            malformed: 1,
            ..Default::default()
        };
        assert_eq!(a.records, 3);
        assert_eq!(a.malformed, 1);
        assert_eq!(a.assigned, 1);
    }
}
