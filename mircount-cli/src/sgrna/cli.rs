use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const SGRNA_CMD: &str = "sgrna";

pub fn create_sgrna_cli() -> Command {
    Command::new(SGRNA_CMD)
        .about("Count reads per library sequence (sgRNA) for a set of SAM alignment files.")
        .arg_required_else_help(true)
        .arg(
            Arg::new("alignments")
                .required(true)
                .action(ArgAction::Append)
                .help("SAM alignment files, one per sample, aligned to the library"),
        )
        .arg(arg!(-r --references <references> "File with one library sequence name per line").required(true))
        .arg(arg!(--names <names> "File with one sample name per alignment file"))
        .arg(arg!(-o --output <output> "Prefix for the output tables"))
        .arg(arg!(-c --config <config> "TOML file with counting settings"))
        .arg(
            arg!(-t --threads <threads> "Number of samples counted at once")
                .value_parser(value_parser!(usize)),
        )
}
