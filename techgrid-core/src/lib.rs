pub mod data;
pub mod error;
pub mod model;
pub mod presence;
pub mod report;
pub mod selection;

use colored::Colorize;

pub use data::{Database, DetectionSource};
pub use error::{Result, StoreError};
pub use presence::{Flag, PresenceRow, PresenceTable, SortDirection, SortKey};
pub use selection::{SelectionOutcome, resolve_selection};

/// Banner goes to stderr so piped table and URL output stays parseable.
pub fn print_banner() {
    let banner = r#"
  ╔╦╗┌─┐┌─┐┬ ┬┌─┐┬─┐┬┌┬┐
   ║ ├┤ │  ├─┤│ ┬├┬┘│ ││
   ╩ └─┘└─┘┴ ┴└─┘┴└─┴─┴┘"#;
    eprintln!("{}", banner.bright_cyan().bold());
    eprintln!(
        "  {} {}\n",
        "technology presence dashboard".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
