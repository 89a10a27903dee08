use clap::{App, Arg, SubCommand};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use num_enum::TryFromPrimitive;

mod command_hash;
mod command_run;
mod command_simulate;
mod command_verify;
mod config;

use command_hash::command_hash;
use command_run::command_run;
use command_simulate::command_simulate;
use command_verify::command_verify;
use config::Config;

#[derive(TryFromPrimitive, PartialEq, Copy, Clone, Debug)]
#[repr(u8)]
enum Verbosity {
    Silent = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl Verbosity {
    fn from_matches(matches: &clap::ArgMatches) -> Self {
        if matches.is_present("quiet") {
            return Verbosity::Silent;
        }
        let level =
            (Verbosity::Warn as u64 + matches.occurrences_of("v")).min(Verbosity::Debug as u64);
        Verbosity::try_from_primitive(level as u8).unwrap_or(Verbosity::Debug)
    }

    fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Silent => LevelFilter::Off,
            Verbosity::Error => LevelFilter::Error,
            Verbosity::Warn => LevelFilter::Warn,
            Verbosity::Info => LevelFilter::Info,
            Verbosity::Debug => LevelFilter::Debug,
        }
    }
}

fn main() {
    let matches = App::new("QuantumBallot CLI")
        .version("0.1")
        .author("Patrick Hayes <patrick.d.hayes@gmail.com>")
        .about("Runs anonymous approval-voting elections with single-shot sampled tallies")
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .long("quiet")
                .help("Disables logging"),
        )
        .arg(
            Arg::with_name("on-duplicate")
                .long("on-duplicate")
                .takes_value(true)
                .possible_values(&["overwrite", "reject"])
                .help("What to do with a second ballot under the same key - can also be set with QUANTUMBALLOT_ON_DUPLICATE"),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .takes_value(true)
                .help("Seed for identity issuing and sampling - can also be set with QUANTUMBALLOT_SEED"),
        )
        .subcommand(
            SubCommand::with_name("simulate")
                .about("Simulate an election where each voter approves a random set of candidates")
                .arg(
                    Arg::with_name("voters")
                        .long("voters")
                        .takes_value(true)
                        .use_delimiter(true)
                        .help("Comma separated voter names"),
                ),
        )
        .subcommand(
            SubCommand::with_name("run")
                .about("Run an election over approvals read from a JSON file")
                .arg(
                    Arg::with_name("INPUT")
                        .index(1)
                        .required(true)
                        .help("JSON array of {\"voter\": name, \"approvals\": [4 x 0/1]} entries"),
                )
                .arg(
                    Arg::with_name("store-out")
                        .long("store-out")
                        .takes_value(true)
                        .help("Write a snapshot of the ballot store to this file"),
                )
                .arg(
                    Arg::with_name("cbor")
                        .long("cbor")
                        .requires("store-out")
                        .help("Write the snapshot as CBOR instead of JSON"),
                ),
        )
        .subcommand(
            SubCommand::with_name("verify")
                .about("Check that a ballot is present in a store snapshot")
                .arg(
                    Arg::with_name("STORE")
                        .index(1)
                        .required(true)
                        .help("Store snapshot in JSON or CBOR format"),
                )
                .arg(
                    Arg::with_name("KEY")
                        .index(2)
                        .required(true)
                        .help("Anonymized voter key, in hex"),
                ),
        )
        .subcommand(
            SubCommand::with_name("hash")
                .about("Print the anonymized key for a raw voter id")
                .arg(Arg::with_name("RAW-ID").index(1).required(true)),
        )
        .get_matches();

    init_logging(Verbosity::from_matches(&matches));

    let config = match Config::from_env().and_then(|config| config.with_matches(&matches)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    // Subcommands
    match matches.subcommand() {
        ("simulate", Some(matches)) => command_simulate(matches, &config),
        ("run", Some(matches)) => command_run(matches, &config),
        ("verify", Some(matches)) => command_verify(matches),
        ("hash", Some(matches)) => command_hash(matches),
        _ => {
            eprintln!("{}", matches.usage());
            std::process::exit(1);
        }
    }
}

fn init_logging(verbosity: Verbosity) {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{h({l})} {m}{n}")))
        .build();

    let config = log4rs::config::Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(
            Root::builder()
                .appender("stderr")
                .build(verbosity.level_filter()),
        );

    match config {
        Ok(config) => {
            if let Err(e) = log4rs::init_config(config) {
                eprintln!("quantumballot: unable to initialise logging: {}", e);
            }
        }
        Err(e) => eprintln!("quantumballot: invalid logging configuration: {}", e),
    }
}
