//! Wide Base_URL x Technology presence table.
//!
//! The aggregator yields a tall `(site, technology, count)` sequence. This
//! module pivots it into one row per site and one column per technology,
//! then recodes every count into a [`Flag`].

use crate::data::DetectionSource;
use crate::error::Result;
use crate::model::{AggregatedCount, NO_TECHNOLOGY};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Name of the distinguished site column. Always the first column.
pub const BASE_URL_COLUMN: &str = "Base_URL";

/// Presence of a technology on a site. `No` orders before `Yes`, matching
/// the "N" < "Y" ordering of their display values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Flag {
    No,
    Yes,
}

impl Flag {
    pub fn from_count(count: i64) -> Self {
        if count >= 1 { Flag::Yes } else { Flag::No }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::Yes => "Y",
            Flag::No => "N",
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Flag::Yes)
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One site's flags, in the table's technology column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceRow {
    base_url: String,
    cells: Vec<(String, Flag)>,
}

impl PresenceRow {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Technology cells left to right, excluding `Base_URL`.
    pub fn cells(&self) -> impl Iterator<Item = (&str, Flag)> {
        self.cells.iter().map(|(name, flag)| (name.as_str(), *flag))
    }

    pub fn flag(&self, technology: &str) -> Option<Flag> {
        self.cells
            .iter()
            .find(|(name, _)| name == technology)
            .map(|(_, flag)| *flag)
    }

    /// Display value of any column, `Base_URL` included.
    pub fn get(&self, column: &str) -> Option<&str> {
        if column == BASE_URL_COLUMN {
            return Some(&self.base_url);
        }
        self.flag(column).map(|flag| flag.as_str())
    }

    /// The leftmost technology flagged `Y`.
    pub fn first_present(&self) -> Option<&str> {
        self.cells
            .iter()
            .find(|(_, flag)| flag.is_present())
            .map(|(name, _)| name.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// Display ordering of rows. `column` indexes [`PresenceTable::columns`],
/// so `0` is `Base_URL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: usize,
    pub direction: SortDirection,
}

impl SortKey {
    /// First technology column, descending, so sites flagged `Y` come first.
    /// Falls back to `Base_URL` ascending when there are no technologies.
    pub fn initial(table: &PresenceTable) -> Self {
        if table.technologies.is_empty() {
            SortKey {
                column: 0,
                direction: SortDirection::Ascending,
            }
        } else {
            SortKey {
                column: 1,
                direction: SortDirection::Descending,
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceTable {
    technologies: Vec<String>,
    rows: Vec<PresenceRow>,
}

impl PresenceTable {
    /// Pivots aggregated counts into the wide table.
    ///
    /// Every site in `counts` gets exactly one row, even when all its
    /// detections carry the `"None"` sentinel. Columns are the distinct
    /// technologies other than the sentinel. Rows and columns come out in
    /// ascending order regardless of input order.
    pub fn from_counts(counts: &[AggregatedCount]) -> Self {
        let technologies: BTreeSet<&str> = counts
            .iter()
            .map(|c| c.technology.as_str())
            .filter(|t| *t != NO_TECHNOLOGY)
            .collect();

        let mut by_site: BTreeMap<&str, BTreeMap<&str, i64>> = BTreeMap::new();
        for c in counts {
            let site = by_site.entry(c.base_url.as_str()).or_default();
            if c.technology != NO_TECHNOLOGY {
                *site.entry(c.technology.as_str()).or_insert(0) += c.count;
            }
        }

        let rows = by_site
            .into_iter()
            .map(|(base_url, site_counts)| PresenceRow {
                base_url: base_url.to_string(),
                cells: technologies
                    .iter()
                    .map(|tech| {
                        let count = site_counts.get(tech).copied().unwrap_or(0);
                        (tech.to_string(), Flag::from_count(count))
                    })
                    .collect(),
            })
            .collect();

        PresenceTable {
            technologies: technologies.into_iter().map(String::from).collect(),
            rows,
        }
    }

    /// Runs the aggregation and reshapes it. `None` means the store holds no
    /// detections at all and callers should show the empty state.
    pub fn load<S: DetectionSource + ?Sized>(source: &S) -> Result<Option<Self>> {
        let counts = source.aggregate_counts()?;
        if counts.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::from_counts(&counts)))
    }

    /// `Base_URL` followed by the technology columns.
    pub fn columns(&self) -> Vec<&str> {
        std::iter::once(BASE_URL_COLUMN)
            .chain(self.technologies.iter().map(String::as_str))
            .collect()
    }

    pub fn technologies(&self) -> &[String] {
        &self.technologies
    }

    pub fn rows(&self) -> &[PresenceRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&PresenceRow> {
        self.rows.get(index)
    }

    pub fn find_row(&self, base_url: &str) -> Option<&PresenceRow> {
        self.rows.iter().find(|r| r.base_url == base_url)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of sites flagged `Y` for each technology, in column order.
    pub fn site_counts(&self) -> Vec<(&str, usize)> {
        self.technologies
            .iter()
            .enumerate()
            .map(|(idx, tech)| {
                let present = self
                    .rows
                    .iter()
                    .filter(|row| row.cells[idx].1.is_present())
                    .count();
                (tech.as_str(), present)
            })
            .collect()
    }

    /// Row indices in display order. The sort is stable, so ties keep
    /// ascending `Base_URL` order. An out-of-range column leaves rows as is.
    pub fn row_order(&self, sort: SortKey) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        if sort.column > self.technologies.len() {
            return order;
        }

        order.sort_by(|&a, &b| {
            let ordering = self.compare_rows(a, b, sort.column);
            match sort.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
        order
    }

    fn compare_rows(&self, a: usize, b: usize, column: usize) -> Ordering {
        let (a, b) = (&self.rows[a], &self.rows[b]);
        if column == 0 {
            a.base_url.cmp(&b.base_url)
        } else {
            a.cells[column - 1].1.cmp(&b.cells[column - 1].1)
        }
    }
}
