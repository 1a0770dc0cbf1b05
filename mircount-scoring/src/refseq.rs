use std::io::BufRead;
use std::path::PathBuf;

use fxhash::FxHashMap as HashMap;
use log::{info, warn};
use rayon::prelude::*;

use mircount_core::consts::HEADER_MARKER;
use mircount_core::models::parse_record;
use mircount_core::utils::{get_dynamic_reader, read_line_bytes};
use mircount_core::{CountingError, CountingResult};

use crate::batch::{check_sample_names, run_in_pool, sample_progress};
use crate::config::CountingConfig;
use crate::consts::{ALIGNED_READS, PERCENT_ALIGNED, TOTAL_READS};
use crate::counts::CountMatrix;

///
/// Reads per reference name for one sample, plus the reads that didn't
/// align anywhere.
///
/// Reference names are kept in first-seen order so that rows added for
/// unexpected references come out in a stable order.
///
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReferenceTally {
    order: Vec<String>,
    counts: HashMap<String, u64>,
    pub unaligned: u64,
    pub malformed: u64,
}

impl ReferenceTally {
    pub fn add(&mut self, reference: &str) {
        match self.counts.get_mut(reference) {
            Some(n) => *n += 1,
            None => {
                self.order.push(reference.to_string());
                self.counts.insert(reference.to_string(), 1);
            }
        }
    }

    pub fn get(&self, reference: &str) -> u64 {
        self.counts.get(reference).copied().unwrap_or(0)
    }

    /// `(reference, reads)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.order.iter().map(|r| (r.as_str(), self.counts[r]))
    }

    pub fn aligned(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn total(&self) -> u64 {
        self.aligned() + self.unaligned
    }
}

///
/// Tally the reference name of every alignment record. A missing reference
/// (`*`), or one equal to `unaligned_marker`, counts as an unaligned read.
///
/// Records that can't be parsed, including ones that aren't valid UTF-8, are
/// counted in [`ReferenceTally::malformed`] and the rest of the input is still
/// read.
///
pub fn tally_reference_reads<R: BufRead>(
    mut reader: R,
    unaligned_marker: &str,
) -> CountingResult<ReferenceTally> {
    let mut tally = ReferenceTally::default();

    let mut buf = Vec::new();
    while read_line_bytes(&mut reader, &mut buf)? {
        if buf.is_empty() || buf[0] == HEADER_MARKER {
            continue;
        }

        let record = match parse_record(&buf) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping record: {}", e);
                tally.malformed += 1;
                continue;
            }
        };

        match record.reference_sequence_name().map(|name| std::str::from_utf8(name)) {
            None => tally.unaligned += 1,
            Some(Ok(reference)) if reference == unaligned_marker => tally.unaligned += 1,
            Some(Ok(reference)) => tally.add(reference),
            Some(Err(_)) => {
                warn!(
                    "Skipping record with a non UTF-8 reference name: {}",
                    String::from_utf8_lossy(&buf)
                );
                tally.malformed += 1;
            }
        }
    }

    Ok(tally)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleSummary {
    pub sample: String,
    pub total: u64,
    pub aligned: u64,
    pub percent_aligned: f64,
}

impl SampleSummary {
    pub fn from_tally(sample: &str, tally: &ReferenceTally) -> Self {
        let total = tally.total();
        let aligned = tally.aligned();
        let percent_aligned = if total == 0 {
            warn!("Sample {} has no reads", sample);
            0.0
        } else {
            100.0 * aligned as f64 / total as f64
        };

        SampleSummary {
            sample: sample.to_string(),
            total,
            aligned,
            percent_aligned,
        }
    }
}

#[derive(Debug)]
pub struct ReferenceCountReport {
    /// references × samples
    pub counts: CountMatrix<f64>,
    pub summary: Vec<SampleSummary>,
    pub failures: Vec<(String, CountingError)>,
}

impl ReferenceCountReport {
    /// The summary as a samples × (total, aligned, percent) table.
    pub fn summary_matrix(&self) -> CountingResult<CountMatrix<f64>> {
        let samples = self.summary.iter().map(|s| s.sample.clone()).collect();
        let columns = vec![
            TOTAL_READS.to_string(),
            ALIGNED_READS.to_string(),
            PERCENT_ALIGNED.to_string(),
        ];

        let mut matrix = CountMatrix::new(samples, columns);
        for (row, s) in self.summary.iter().enumerate() {
            matrix.set(row, 0, s.total as f64)?;
            matrix.set(row, 1, s.aligned as f64)?;
            matrix.set(row, 2, s.percent_aligned)?;
        }

        Ok(matrix)
    }
}

///
/// Count reads per reference sequence for every sample.
///
/// Rows start as `references`, in the given order. A reference that shows up
/// in the alignments but isn't in that list gets a new row at the bottom, with
/// a warning. Samples whose file can't be read are reported in `failures` and
/// left out of the matrix.
///
/// # Errors
/// [`CountingError::SampleNameMismatch`] when `files` and `names` differ in
/// length, or a thread pool that can't be built.
///
pub fn count_reference_sequences(
    files: &[PathBuf],
    names: &[String],
    references: &[String],
    config: &CountingConfig,
) -> CountingResult<ReferenceCountReport> {
    check_sample_names(files, names)?;

    let progress = sample_progress(files.len(), "Counting references...");
    let marker = config.unaligned_marker.as_str();

    let tallies: Vec<CountingResult<ReferenceTally>> = run_in_pool(config.threads, || {
        files
            .par_iter()
            .map(|path| {
                let res = get_dynamic_reader(path)
                    .and_then(|reader| tally_reference_reads(reader, marker));
                progress.inc(1);
                res
            })
            .collect()
    })?;

    progress.finish_with_message("Done.");

    let mut counted: Vec<(String, ReferenceTally)> = Vec::new();
    let mut failures = Vec::new();
    for (name, res) in names.iter().zip(tallies) {
        match res {
            Ok(tally) => counted.push((name.clone(), tally)),
            Err(e) => {
                warn!("Sample {} was not counted: {}", name, e);
                failures.push((name.clone(), e));
            }
        }
    }

    let sample_names = counted.iter().map(|(name, _)| name.clone()).collect();
    let mut counts = CountMatrix::new(references.to_vec(), sample_names);
    let mut summary = Vec::with_capacity(counted.len());

    for (col, (name, tally)) in counted.iter().enumerate() {
        for (reference, reads) in tally.iter() {
            let row = match counts.row_index(reference) {
                Some(row) => row,
                None => {
                    warn!(
                        "Reference {} in sample {} is not in the reference list, adding it",
                        reference, name
                    );
                    counts.push_row(reference)
                }
            };
            counts.set(row, col, reads as f64)?;
        }

        if tally.malformed > 0 {
            warn!("{}: skipped {} malformed records", name, tally.malformed);
        }

        let s = SampleSummary::from_tally(name, tally);
        info!(
            "{}: {} of {} reads aligned ({:.2}%)",
            name, s.aligned, s.total, s.percent_aligned
        );
        summary.push(s);
    }

    Ok(ReferenceCountReport {
        counts,
        summary,
        failures,
    })
}
