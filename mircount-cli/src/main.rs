mod common;
mod mirna;
mod sgrna;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "mircount";
    pub const BIN_NAME: &str = "mircount";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Count mature microRNA and sgRNA reads from SAM alignments.")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Log more: -v for progress, -vv for every skipped read"),
        )
        .subcommand(mirna::cli::create_mirna_cli())
        .subcommand(sgrna::cli::create_sgrna_cli())
}

fn init_logging(verbosity: u8) {
    env_logger::Builder::new()
        .filter_level(match verbosity {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    // global args propagate down, so the subcommand sees -v wherever it was given
    if let Some((_, sub)) = matches.subcommand() {
        init_logging(sub.get_count("verbose"));
    }

    match matches.subcommand() {
        //
        // MATURE MICRORNA COUNTING
        //
        Some((mirna::cli::MIRNA_CMD, matches)) => {
            mirna::handlers::run_mirna(matches)?;
        }

        //
        // SGRNA LIBRARY COUNTING
        //
        Some((sgrna::cli::SGRNA_CMD, matches)) => {
            sgrna::handlers::run_sgrna(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::*;

    #[rstest]
    fn test_parser_is_valid() {
        build_parser().debug_assert();
    }

    #[rstest]
    fn test_no_author_credit() {
        let parser = build_parser();
        assert!(parser.get_author().is_none());
        for sub in parser.get_subcommands() {
            assert!(sub.get_author().is_none(), "{}", sub.get_name());
        }
    }

    #[rstest]
    fn test_verbosity_is_global() {
        let matches = build_parser()
            .try_get_matches_from([
                "mircount", "sgrna", "-vv", "a.sam", "--references", "refs.txt",
            ])
            .unwrap();
        let sub = matches.subcommand_matches("sgrna").unwrap();
        assert_eq!(sub.get_count("verbose"), 2);
    }
}
