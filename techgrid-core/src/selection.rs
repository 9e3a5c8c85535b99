//! Row selection handling for the presence grid.
//!
//! Selecting a row reveals the URLs behind exactly one technology: the
//! leftmost column flagged `Y`. Further `Y` columns in the same row are
//! ignored.

use crate::data::DetectionSource;
use crate::error::Result;
use crate::presence::PresenceRow;
use tracing::debug;

pub const NO_DATA_MESSAGE: &str = "No data available.";
pub const NO_ROW_MESSAGE: &str = "No rows selected.";
pub const NO_TECHNOLOGY_MESSAGE: &str = "No technology selected or no URLs found.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    NoRowSelected,
    NoTechnology {
        base_url: String,
    },
    Urls {
        base_url: String,
        technology: String,
        urls: Vec<String>,
    },
}

impl SelectionOutcome {
    /// Text block shown to the user: a heading or message, then one URL per
    /// line.
    pub fn lines(&self) -> Vec<String> {
        match self {
            SelectionOutcome::NoRowSelected => vec![NO_ROW_MESSAGE.to_string()],
            SelectionOutcome::NoTechnology { .. } => vec![NO_TECHNOLOGY_MESSAGE.to_string()],
            SelectionOutcome::Urls {
                base_url,
                technology,
                urls,
            } => std::iter::once(format!(
                "URLs where '{}' is found under '{}':",
                technology, base_url
            ))
            .chain(urls.iter().cloned())
            .collect(),
        }
    }
}

/// Resolves a grid selection into the URLs to display.
pub fn resolve_selection<S: DetectionSource + ?Sized>(
    source: &S,
    row: Option<&PresenceRow>,
) -> Result<SelectionOutcome> {
    let Some(row) = row else {
        return Ok(SelectionOutcome::NoRowSelected);
    };

    let Some(technology) = row.first_present() else {
        debug!(target: "techgrid::selection", "{} has no detected technology", row.base_url());
        return Ok(SelectionOutcome::NoTechnology {
            base_url: row.base_url().to_string(),
        });
    };

    let urls = source.urls_for(row.base_url(), technology)?;
    Ok(SelectionOutcome::Urls {
        base_url: row.base_url().to_string(),
        technology: technology.to_string(),
        urls,
    })
}
