use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::{info, warn};

use mircount_overlaprs::FeatureIndex;
use mircount_scoring::consts::{FEATURE_COLUMN, OFFSET_COLUMN, SAMPLE_COLUMN};
use mircount_scoring::{CountMatrix, FeatureScoringReport, feature_scoring_from_alignments};

use crate::common::{alignment_files, load_config, output_path, sample_names};

const STATS_COLUMNS: [&str; 6] = [
    "records",
    "assigned",
    "unaligned",
    "unknown_flag",
    "no_overlap",
    "malformed",
];

pub fn run_mirna(matches: &ArgMatches) -> Result<()> {
    let reference = matches
        .get_one::<String>("reference")
        .expect("A reference listing is required.");

    let config = load_config(matches)?;
    let files = alignment_files(matches);
    let names = sample_names(matches, &files)?;

    let index = FeatureIndex::from_path(Path::new(reference), &config.index_params())
        .with_context(|| format!("Failed to index reference listing {}", reference))?;

    let report = feature_scoring_from_alignments(&files, &names, &index, &config)?;

    let counts_out = output_path(matches, "counts.tsv");
    report.counts.write_to_file(&counts_out, FEATURE_COLUMN)?;
    let qc_out = output_path(matches, "qc.tsv");
    report.qc.write_to_file(&qc_out, OFFSET_COLUMN)?;
    let stats_out = output_path(matches, "stats.tsv");
    stats_matrix(&report)?.write_to_file(&stats_out, SAMPLE_COLUMN)?;

    info!(
        "Wrote {}, {} and {}",
        counts_out.display(),
        qc_out.display(),
        stats_out.display()
    );

    if !report.failures.is_empty() {
        warn!(
            "{} of {} samples could not be counted",
            report.failures.len(),
            files.len()
        );
        if report.stats.is_empty() {
            anyhow::bail!("None of the {} samples could be counted", files.len());
        }
    }

    Ok(())
}

fn stats_matrix(report: &FeatureScoringReport) -> Result<CountMatrix<u64>> {
    let samples = report.stats.iter().map(|(name, _)| name.clone()).collect();
    let columns = STATS_COLUMNS.iter().map(|c| c.to_string()).collect();

    let mut matrix = CountMatrix::new(samples, columns);
    for (row, (_, stats)) in report.stats.iter().enumerate() {
        let values = [
            stats.records,
            stats.assigned,
            stats.unaligned,
            stats.unknown_flag,
            stats.no_overlap,
            stats.malformed,
        ];
        for (col, value) in values.into_iter().enumerate() {
            matrix.set(row, col, value)?;
        }
    }

    Ok(matrix)
}
