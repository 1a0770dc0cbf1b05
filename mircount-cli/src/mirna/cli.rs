use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const MIRNA_CMD: &str = "mirna";

pub fn create_mirna_cli() -> Command {
    Command::new(MIRNA_CMD)
        .about("Count reads per mature microRNA for a set of SAM alignment files.")
        .arg_required_else_help(true)
        .arg(
            Arg::new("alignments")
                .required(true)
                .action(ArgAction::Append)
                .help("SAM alignment files, one per sample (.sam or .sam.gz)"),
        )
        .arg(arg!(-r --reference <reference> "SAM listing of mature microRNA loci").required(true))
        .arg(arg!(--names <names> "File with one sample name per alignment file"))
        .arg(arg!(-o --output <output> "Prefix for the output tables"))
        .arg(arg!(-c --config <config> "TOML file with counting settings"))
        .arg(
            arg!(--seed <seed> "Seed for breaking ties between equally good features")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            arg!(-t --threads <threads> "Number of samples counted at once")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            arg!(--flank <flank> "Bases added on both sides of every feature")
                .value_parser(value_parser!(i64)),
        )
}
