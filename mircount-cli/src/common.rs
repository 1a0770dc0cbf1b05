use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;

use mircount_core::utils::{read_list_file, remove_all_extensions};
use mircount_scoring::CountingConfig;
use mircount_scoring::consts::DEFAULT_OUT_PREFIX;

///
/// Settings from `--config` (or the defaults), with any flags given on the
/// command line taking precedence.
///
pub fn load_config(matches: &ArgMatches) -> Result<CountingConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => CountingConfig::try_from(Path::new(path))
            .with_context(|| format!("Failed to load config file {}", path))?,
        None => CountingConfig::default(),
    };

    if let Ok(Some(seed)) = matches.try_get_one::<u64>("seed") {
        config.seed = Some(*seed);
    }
    if let Some(threads) = matches.get_one::<usize>("threads") {
        config.threads = Some(*threads);
    }
    if let Ok(Some(flank)) = matches.try_get_one::<i64>("flank") {
        config.flank = *flank;
    }

    config.validate()?;
    Ok(config)
}

pub fn alignment_files(matches: &ArgMatches) -> Vec<PathBuf> {
    matches
        .get_many::<String>("alignments")
        .expect("At least one alignment file is required.")
        .map(PathBuf::from)
        .collect()
}

///
/// Sample names from `--names` when given, otherwise each file name with all
/// extensions removed.
///
pub fn sample_names(matches: &ArgMatches, files: &[PathBuf]) -> Result<Vec<String>> {
    match matches.get_one::<String>("names") {
        Some(path) => Ok(read_list_file(Path::new(path))?),
        None => Ok(files.iter().map(|f| remove_all_extensions(f)).collect()),
    }
}

pub fn output_path(matches: &ArgMatches, suffix: &str) -> PathBuf {
    let default_out = DEFAULT_OUT_PREFIX.to_string();
    let prefix = matches.get_one::<String>("output").unwrap_or(&default_out);
    PathBuf::from(format!("{}_{}", prefix, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::{Arg, ArgAction, Command, value_parser};
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn command() -> Command {
        Command::new("test")
            .arg(Arg::new("alignments").action(ArgAction::Append))
            .arg(Arg::new("names").long("names"))
            .arg(Arg::new("output").long("output"))
            .arg(Arg::new("config").long("config"))
            .arg(
                Arg::new("seed")
                    .long("seed")
                    .value_parser(value_parser!(u64)),
            )
            .arg(
                Arg::new("threads")
                    .long("threads")
                    .value_parser(value_parser!(usize)),
            )
    }

    #[rstest]
    fn test_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mircount.toml");
        std::fs::write(&path, "seed = 1\nthreads = 8\nflank = 3\n").unwrap();

        let matches = command()
            .try_get_matches_from([
                "test",
                "a.sam",
                "--config",
                path.to_str().unwrap(),
                "--seed",
                "9",
            ])
            .unwrap();
        let config = load_config(&matches).unwrap();

        assert_eq!(config.seed, Some(9));
        assert_eq!(config.threads, Some(8));
        assert_eq!(config.flank, 3);
    }

    #[rstest]
    fn test_zero_threads_rejected() {
        let matches = command()
            .try_get_matches_from(["test", "a.sam", "--threads", "0"])
            .unwrap();
        assert!(load_config(&matches).is_err());
    }

    #[rstest]
    fn test_sample_names_from_files() {
        let matches = command()
            .try_get_matches_from(["test", "lib/s1.sam.gz", "s2.trimmed.sam"])
            .unwrap();
        let files = alignment_files(&matches);
        let names = sample_names(&matches, &files).unwrap();

        assert_eq!(names, vec!["s1", "s2"]);
    }

    #[rstest]
    fn test_output_path() {
        let matches = command()
            .try_get_matches_from(["test", "a.sam", "--output", "out/run1"])
            .unwrap();
        assert_eq!(
            output_path(&matches, "counts.tsv"),
            PathBuf::from("out/run1_counts.tsv")
        );

        let matches = command().try_get_matches_from(["test", "a.sam"]).unwrap();
        assert_eq!(
            output_path(&matches, "qc.tsv"),
            PathBuf::from("mircount_qc.tsv")
        );
    }
}
