use crate::CLAP_STYLING;
use clap::{arg, command};
use techgrid::{DB_ENV_VAR, DEFAULT_DB_LOCATION};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("techgrid")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("techgrid")
        .about("Which technologies were detected on which sites")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Log store queries to stderr")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(--"db" <CONNECTION>)
                .required(false)
                .help("Detection store: a database path or an SQLite file: URI")
                .env(DB_ENV_VAR)
                .default_value(DEFAULT_DB_LOCATION)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("ui").about("Opens the interactive presence grid (default when no subcommand is given)"),
        )
        .subcommand(
            command!("table")
                .about("Prints or saves the site x technology presence table")
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, csv, markdown")
                        .value_parser(["text", "json", "csv", "markdown"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
        .subcommand(
            command!("urls")
                .about("Lists the URLs where a technology was detected on a site")
                .arg(
                    arg!(-b --"base-url" <BASE_URL>)
                        .required(true)
                        .help("Site identifier exactly as stored"),
                )
                .arg(
                    arg!(-t --"technology" <NAME>)
                        .required(true)
                        .help("Technology name exactly as stored"),
                ),
        )
}
