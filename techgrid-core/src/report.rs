// Presence table export

use crate::presence::{BASE_URL_COLUMN, PresenceTable};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }
}

pub fn render_report(table: &PresenceTable, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(table)),
        ReportFormat::Json => generate_json_report(table),
        ReportFormat::Csv => Ok(generate_csv_report(table)),
        ReportFormat::Markdown => Ok(generate_markdown_report(table)),
    }
}

pub fn generate_text_report(table: &PresenceTable) -> String {
    let mut report = String::new();
    let columns = table.columns();
    let widths = column_widths(table);
    let rule_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    let heavy_rule = "━".repeat(rule_width.max(40));

    report.push_str(&heavy_rule);
    report.push('\n');
    report.push_str("TECHNOLOGY PRESENCE\n");
    report.push_str(&heavy_rule);
    report.push_str("\n\n");

    report.push_str(&format!("Sites:        {}\n", table.len()));
    report.push_str(&format!("Technologies: {}\n\n", table.technologies().len()));

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(name, width)| format!("{:<width$}", name, width = *width))
        .collect();
    report.push_str(header.join("  ").trim_end());
    report.push('\n');
    report.push_str(&"─".repeat(rule_width));
    report.push('\n');

    for row in table.rows() {
        let values = std::iter::once(row.base_url()).chain(row.cells().map(|(_, flag)| flag.as_str()));
        let line: Vec<String> = values
            .zip(&widths)
            .map(|(value, width)| format!("{:<width$}", value, width = *width))
            .collect();
        report.push_str(line.join("  ").trim_end());
        report.push('\n');
    }

    if !table.technologies().is_empty() {
        report.push_str("\nSites per technology:\n");
        for (technology, sites) in table.site_counts() {
            report.push_str(&format!("  {:<width$}  {}\n", technology, sites, width = widths[0].max(12)));
        }
    }

    report
}

pub fn generate_json_report(table: &PresenceTable) -> Result<String, serde_json::Error> {
    let rows: Vec<serde_json::Value> = table
        .rows()
        .iter()
        .map(|row| {
            let mut object = serde_json::Map::new();
            object.insert(BASE_URL_COLUMN.to_string(), serde_json::json!(row.base_url()));
            for (technology, flag) in row.cells() {
                object.insert(technology.to_string(), serde_json::json!(flag.as_str()));
            }
            serde_json::Value::Object(object)
        })
        .collect();

    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Techgrid",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "summary": {
                "total_sites": table.len(),
                "total_technologies": table.technologies().len(),
                "sites_per_technology": table
                    .site_counts()
                    .into_iter()
                    .map(|(technology, sites)| serde_json::json!({ "technology": technology, "sites": sites }))
                    .collect::<Vec<_>>()
            },
            "columns": table.columns(),
            "rows": rows
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_csv_report(table: &PresenceTable) -> String {
    let mut report = String::new();
    let header: Vec<String> = table.columns().into_iter().map(csv_field).collect();
    report.push_str(&header.join(","));
    report.push('\n');

    for row in table.rows() {
        let fields: Vec<String> = std::iter::once(csv_field(row.base_url()))
            .chain(row.cells().map(|(_, flag)| flag.as_str().to_string()))
            .collect();
        report.push_str(&fields.join(","));
        report.push('\n');
    }

    report
}

pub fn generate_markdown_report(table: &PresenceTable) -> String {
    let mut report = String::new();
    report.push_str("# Technology Presence\n\n");
    report.push_str(&format!(
        "{} sites, {} technologies\n\n",
        table.len(),
        table.technologies().len()
    ));

    let columns: Vec<String> = table.columns().into_iter().map(markdown_cell).collect();
    report.push_str(&format!("| {} |\n", columns.join(" | ")));
    report.push_str(&format!(
        "|{}|\n",
        columns.iter().map(|_| "---").collect::<Vec<_>>().join("|")
    ));

    for row in table.rows() {
        let cells: Vec<String> = std::iter::once(markdown_cell(row.base_url()))
            .chain(row.cells().map(|(_, flag)| flag.as_str().to_string()))
            .collect();
        report.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    report
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

// Helper functions
fn column_widths(table: &PresenceTable) -> Vec<usize> {
    let base_width = table
        .rows()
        .iter()
        .map(|row| row.base_url().chars().count())
        .chain(std::iter::once(BASE_URL_COLUMN.len()))
        .max()
        .unwrap_or(BASE_URL_COLUMN.len());

    std::iter::once(base_width)
        .chain(table.technologies().iter().map(|t| t.chars().count().max(1)))
        .collect()
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn markdown_cell(value: &str) -> String {
    value.replace('|', "\\|")
}
