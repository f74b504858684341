use std::path::PathBuf;

use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, ArgAction,
    Command,
};

use utils::{init_log, LogLevel, Separator};

use crate::config::Config;

/// Set up definition of command options for clap
fn cli_model() -> Command {
    Command::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .author(crate_authors!())
        .arg(
            Arg::new("timestamp")
                .short('X')
                .long("timestamp")
                .value_parser(value_parser!(stderrlog::Timestamp))
                .value_name("GRANULARITY")
                .default_value("none")
                .help("Prepend log entries with a timestamp"),
        )
        .arg(
            Arg::new("loglevel")
                .short('l')
                .long("loglevel")
                .value_name("LOGLEVEL")
                .value_parser(value_parser!(LogLevel))
                .ignore_case(true)
                .default_value("warn")
                .help("Set log level"),
        )
        .arg(
            Arg::new("quiet")
                .action(ArgAction::SetTrue)
                .long("quiet")
                .conflicts_with("loglevel")
                .help("Silence all output"),
        )
        .arg(
            Arg::new("separator")
                .short('s')
                .long("separator")
                .value_parser(value_parser!(Separator))
                .value_name("CHAR")
                .default_value("\\t")
                .help("Set field separator for circRNA count files"),
        )
        .arg(
            Arg::new("decimals")
                .short('d')
                .long("decimals")
                .value_parser(value_parser!(usize))
                .value_name("INT")
                .help("Set number of decimal places for ratios [default: shortest representation]"),
        )
        .arg(
            Arg::new("poly_a")
                .short('p')
                .long("polyA")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .required(true)
                .help("circRNA-sponging config file for polyA input data"),
        )
        .arg(
            Arg::new("total_rna")
                .short('t')
                .long("totalRNA")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .required(true)
                .help("circRNA-sponging config file for totalRNA input data"),
        )
        .arg(
            Arg::new("outdir")
                .short('o')
                .long("outdir")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .required(true)
                .help("Output directory for stats.tsv"),
        )
}

/// Handle command line options.  Set up Config structure
pub fn handle_cli() -> anyhow::Result<Config> {
    // Get matches from command line
    let m = cli_model().get_matches();

    // Setup logging
    init_log(&m)?;

    debug!("Processing command line options");

    let poly_a = m
        .get_one::<PathBuf>("poly_a")
        .expect("Missing polyA config file")
        .to_owned();
    let total_rna = m
        .get_one::<PathBuf>("total_rna")
        .expect("Missing totalRNA config file")
        .to_owned();
    let outdir = m
        .get_one::<PathBuf>("outdir")
        .expect("Missing output directory")
        .to_owned();

    if poly_a == total_rna {
        warn!(
            "polyA and totalRNA runs use the same config file {}",
            poly_a.display()
        )
    }

    let mut cfg = Config::new(poly_a, total_rna, outdir);

    if let Some(sep) = m.get_one::<Separator>("separator") {
        cfg.set_separator(*sep)
    }
    if let Some(d) = m.get_one::<usize>("decimals") {
        cfg.set_decimals(*d)
    }

    Ok(cfg)
}
