#![forbid(unsafe_code, non_ascii_idents)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::correctness,
    clippy::suspicious,
    clippy::cargo,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::nursery,
    deprecated_in_future,
    future_incompatible,
    nonstandard_style,
    trivial_casts,
    trivial_numeric_casts
)]
#![allow(clippy::multiple_crate_versions)]

use std::error::Error;
use std::io;
use std::process::ExitCode;

use clap::{arg, crate_description, crate_name, crate_version, value_parser, ArgAction, Command, ValueHint};
use clap_complete::aot::{generate, Generator, Shell};
use colored::Colorize;
use log::{error, Level, LevelFilter, Metadata, Record};

use crate::config::Config;
use crate::console::Console;
use crate::storage::FileStorage;

mod config;
mod console;
mod model;
mod storage;
mod value;

struct SimpleLogger;

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            if record.metadata().level() == Level::Error {
                eprintln!("{}", record.args());
            } else {
                println!("{}", record.args());
            }
        }
    }

    fn flush(&self) {}
}

static LOGGER: SimpleLogger = SimpleLogger;

fn get_command() -> Command {
    Command::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .arg(
            arg!(-c --config <FILE> "Sets a custom config file")
                .required(false)
                .display_order(100)
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            arg!(-f --file <FILE> "Sets the backing data file")
                .required(false)
                .display_order(100)
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            arg!(-q --quiet "Do not print the prompt or any log message")
                .required(false)
                .display_order(100),
        )
        .arg(arg!(-v --verbose "Output more information").required(false).display_order(100))
        .arg(arg!(-d --debug "Output debug information").required(false).display_order(100))
        .arg(
            arg!(--completions "Generate shell completions")
                .action(ArgAction::Set)
                .display_order(200)
                .value_parser(value_parser!(Shell)),
        )
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

fn main() -> ExitCode {
    let matches = get_command().get_matches();

    if let Some(generator) = matches.get_one::<Shell>("completions").copied() {
        let mut commands = get_command();
        print_completions(generator, &mut commands);
        return ExitCode::from(0);
    }

    let log_level = if matches.get_flag("debug") {
        LevelFilter::Debug
    } else if matches.get_flag("verbose") {
        LevelFilter::Info
    } else if matches.get_flag("quiet") {
        LevelFilter::Off
    } else {
        LevelFilter::Warn
    };

    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(log_level))
        .expect("Failed to set logger");

    let config = Config::from(&matches);

    match run(&config, matches.get_flag("quiet")) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{} {}", "\u{2716}".bright_red(), e);
            ExitCode::from(1)
        }
    }
}

fn run(config: &Config, quiet: bool) -> Result<u8, Box<dyn Error>> {
    let mut storage = FileStorage::new(&config.file);
    storage.reload()?;

    let mut console = Console::new(storage, quiet);
    console.cmdloop(io::stdin().lock(), io::stdout().lock())?;

    Ok(0)
}
