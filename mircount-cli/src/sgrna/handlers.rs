use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::{info, warn};

use mircount_core::utils::read_list_file;
use mircount_scoring::consts::{REFERENCE_COLUMN, SAMPLE_COLUMN};
use mircount_scoring::count_reference_sequences;

use crate::common::{alignment_files, load_config, output_path, sample_names};

pub fn run_sgrna(matches: &ArgMatches) -> Result<()> {
    let references = matches
        .get_one::<String>("references")
        .expect("A file of library sequence names is required.");

    let config = load_config(matches)?;
    let files = alignment_files(matches);
    let names = sample_names(matches, &files)?;

    let references = read_list_file(Path::new(references))
        .with_context(|| format!("Failed to read reference names from {}", references))?;
    if references.is_empty() {
        warn!("The reference list is empty, every aligned read adds a new row");
    }

    let report = count_reference_sequences(&files, &names, &references, &config)?;

    let counts_out = output_path(matches, "counts.tsv");
    report.counts.write_to_file(&counts_out, REFERENCE_COLUMN)?;
    let summary_out = output_path(matches, "summary.tsv");
    report
        .summary_matrix()?
        .write_to_file(&summary_out, SAMPLE_COLUMN)?;

    info!(
        "Wrote {} and {}",
        counts_out.display(),
        summary_out.display()
    );

    if !report.failures.is_empty() && report.summary.is_empty() {
        anyhow::bail!("None of the {} samples could be counted", files.len());
    }

    Ok(())
}
