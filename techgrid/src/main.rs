use commands::command_argument_builder;
use techgrid::DEFAULT_DB_LOCATION;
use techgrid::handlers::{handle_table, handle_ui, handle_urls, init_tracing};
use techgrid_core::print_banner;

mod commands;

fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let verbose = chosen_command.get_flag("verbose");
    let db_uri = chosen_command
        .get_one::<String>("db")
        .map(String::as_str)
        .unwrap_or(DEFAULT_DB_LOCATION);

    let interactive = matches!(chosen_command.subcommand(), None | Some(("ui", _)));
    init_tracing(verbose, interactive);

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    match chosen_command.subcommand() {
        None | Some(("ui", _)) => handle_ui(db_uri),
        Some(("table", primary_command)) => handle_table(db_uri, primary_command),
        Some(("urls", primary_command)) => handle_urls(db_uri, primary_command),
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
