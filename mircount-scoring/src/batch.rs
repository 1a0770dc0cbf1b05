use std::collections::BTreeSet;
use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use mircount_core::{CountingError, CountingResult};
use mircount_overlaprs::{FeatureIndex, SeededTieBreaker};

use crate::aggregate::{ReadAggregator, ReadStats, SampleCounts};
use crate::config::CountingConfig;
use crate::consts::PROGRESS_TEMPLATE;
use crate::counts::CountMatrix;

///
/// Counts of a whole batch of samples.
///
/// Only samples that were counted successfully get a column; the others are
/// listed in `failures` with the reason.
///
#[derive(Debug)]
pub struct FeatureScoringReport {
    /// features × samples, features sorted by name
    pub counts: CountMatrix<u64>,
    /// offsets × samples, over every offset any sample has bases at
    pub qc: CountMatrix<u64>,
    pub stats: Vec<(String, ReadStats)>,
    pub failures: Vec<(String, CountingError)>,
}

///
/// Run `op` on a dedicated pool of `threads` workers, or on the global rayon
/// pool when no count is given.
///
pub(crate) fn run_in_pool<T, F>(threads: Option<usize>, op: F) -> CountingResult<T>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    match threads {
        Some(n) => {
            let pool = ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| CountingError::ThreadPool(e.to_string()))?;
            Ok(pool.install(op))
        }
        None => Ok(op()),
    }
}

pub(crate) fn sample_progress(len: usize, msg: &'static str) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_TEMPLATE) {
        bar.set_style(style);
    }
    bar.set_message(msg);
    bar
}

pub(crate) fn check_sample_names(files: &[PathBuf], names: &[String]) -> CountingResult<()> {
    if files.len() != names.len() {
        return Err(CountingError::SampleNameMismatch {
            files: files.len(),
            names: names.len(),
        });
    }
    Ok(())
}

///
/// Count every alignment file against one feature index, one rayon task per
/// sample.
///
/// With `config.seed = Some(s)` sample `i` breaks ties with seed `s + i`, so a
/// rerun with the same inputs in the same order gives the same counts
/// regardless of thread count. A sample that fails is reported and the rest
/// carry on.
///
/// # Errors
/// Only for problems with the batch itself: mismatched `files` and `names`,
/// or a thread pool that can't be built.
///
pub fn feature_scoring_from_alignments(
    files: &[PathBuf],
    names: &[String],
    index: &FeatureIndex,
    config: &CountingConfig,
) -> CountingResult<FeatureScoringReport> {
    check_sample_names(files, names)?;

    let progress = sample_progress(files.len(), "Counting samples...");

    let results: Vec<CountingResult<SampleCounts>> = run_in_pool(config.threads, || {
        files
            .par_iter()
            .enumerate()
            .map(|(i, path)| {
                let seed = config.seed.map(|s| s.wrapping_add(i as u64));
                let mut aggregator = ReadAggregator::new(index, SeededTieBreaker::new(seed));
                let res = aggregator.count_file(path);
                progress.inc(1);
                res
            })
            .collect()
    })?;

    progress.finish_with_message("Done.");

    let mut samples: Vec<(String, SampleCounts)> = Vec::new();
    let mut failures = Vec::new();
    for (name, res) in names.iter().zip(results) {
        match res {
            Ok(sample) => samples.push((name.clone(), sample)),
            Err(e) => {
                warn!("Sample {} was not counted: {}", name, e);
                failures.push((name.clone(), e));
            }
        }
    }

    info!(
        "Counted {} of {} samples over {} features",
        samples.len(),
        files.len(),
        index.catalog().len()
    );

    Ok(FeatureScoringReport {
        counts: merge_feature_counts(index, &samples)?,
        qc: merge_qc_profiles(&samples)?,
        stats: samples
            .iter()
            .map(|(name, sample)| (name.clone(), sample.stats))
            .collect(),
        failures,
    })
}

fn merge_feature_counts(
    index: &FeatureIndex,
    samples: &[(String, SampleCounts)],
) -> CountingResult<CountMatrix<u64>> {
    let mut features: Vec<String> = index.catalog().names().to_vec();
    features.sort();
    let sample_names = samples.iter().map(|(name, _)| name.clone()).collect();

    let mut matrix = CountMatrix::new(features, sample_names);
    for (col, (_, sample)) in samples.iter().enumerate() {
        for (feature, count) in sample.counts.iter() {
            if let Some(row) = matrix.row_index(feature) {
                matrix.set(row, col, count)?;
            }
        }
    }

    Ok(matrix)
}

fn merge_qc_profiles(samples: &[(String, SampleCounts)]) -> CountingResult<CountMatrix<u64>> {
    let offsets: BTreeSet<i64> = samples
        .iter()
        .flat_map(|(_, sample)| sample.qc.offsets())
        .collect();
    let offsets: Vec<i64> = offsets.into_iter().collect();

    let labels = offsets.iter().map(|o| o.to_string()).collect();
    let sample_names = samples.iter().map(|(name, _)| name.clone()).collect();

    let mut matrix = CountMatrix::new(labels, sample_names);
    for (col, (_, sample)) in samples.iter().enumerate() {
        for (offset, bases) in sample.qc.iter() {
            // offsets are sorted, so the row is the rank
            if let Ok(row) = offsets.binary_search(&offset) {
                matrix.set(row, col, bases)?;
            }
        }
    }

    Ok(matrix)
}
