// Tests for presence table export

use techgrid_core::model::AggregatedCount;
use techgrid_core::presence::PresenceTable;
use techgrid_core::report::{
    ReportFormat, generate_csv_report, generate_json_report, generate_markdown_report,
    generate_text_report, render_report, save_report,
};
use tempfile::TempDir;

fn sample_table() -> PresenceTable {
    PresenceTable::from_counts(&[
        AggregatedCount::new("exam.edu", "Honorlock", 2),
        AggregatedCount::new("exam.edu", "Proctorio", 1),
        AggregatedCount::new("shop.com", "Recaptcha", 5),
        AggregatedCount::new("blog.org", "None", 1),
    ])
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("json"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("csv"), Some(ReportFormat::Csv));
    assert_eq!(ReportFormat::from_str("markdown"), Some(ReportFormat::Markdown));
    assert_eq!(ReportFormat::from_str("md"), Some(ReportFormat::Markdown));
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert_eq!(ReportFormat::from_str("TEXT"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("Json"), Some(ReportFormat::Json));
}

#[test]
fn test_report_format_from_str_invalid() {
    assert_eq!(ReportFormat::from_str("html"), None);
    assert_eq!(ReportFormat::from_str("pdf"), None);
}

// ============================================================================
// Text Report Tests
// ============================================================================

#[test]
fn test_text_report_contents() {
    let report = generate_text_report(&sample_table());

    assert!(report.contains("TECHNOLOGY PRESENCE"));
    assert!(report.contains("Sites:        3"));
    assert!(report.contains("Technologies: 3"));
    assert!(report.contains("Base_URL"));
    assert!(report.contains("Honorlock"));
    assert!(report.contains("blog.org"));
    assert!(!report.contains("None"));
    assert!(report.contains("Sites per technology:"));
}

#[test]
fn test_text_report_row_alignment() {
    let report = generate_text_report(&sample_table());
    let line = report
        .lines()
        .find(|l| l.starts_with("exam.edu"))
        .unwrap();

    let flags: Vec<&str> = line.split_whitespace().skip(1).collect();
    assert_eq!(flags, vec!["Y", "Y", "N"]);
}

// ============================================================================
// JSON Report Tests
// ============================================================================

#[test]
fn test_json_report_structure() {
    let report = generate_json_report(&sample_table()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&report).unwrap();

    let root = &value["report"];
    assert_eq!(root["metadata"]["generator"], "Techgrid");
    assert_eq!(root["summary"]["total_sites"], 3);
    assert_eq!(root["summary"]["total_technologies"], 3);
    assert_eq!(
        root["columns"],
        serde_json::json!(["Base_URL", "Honorlock", "Proctorio", "Recaptcha"])
    );

    let rows = root["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["Base_URL"], "blog.org");
    assert_eq!(rows[0]["Recaptcha"], "N");
    assert_eq!(rows[1]["Base_URL"], "exam.edu");
    assert_eq!(rows[1]["Proctorio"], "Y");
    assert_eq!(rows[2]["Recaptcha"], "Y");
}

#[test]
fn test_json_report_sites_per_technology() {
    let report = generate_json_report(&sample_table()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&report).unwrap();

    let per_tech = value["report"]["summary"]["sites_per_technology"]
        .as_array()
        .unwrap();
    assert_eq!(per_tech.len(), 3);
    assert_eq!(per_tech[0]["technology"], "Honorlock");
    assert_eq!(per_tech[0]["sites"], 1);
}

// ============================================================================
// CSV / Markdown Tests
// ============================================================================

#[test]
fn test_csv_report() {
    let report = generate_csv_report(&sample_table());
    let lines: Vec<&str> = report.lines().collect();

    assert_eq!(lines[0], "Base_URL,Honorlock,Proctorio,Recaptcha");
    assert_eq!(lines[1], "blog.org,N,N,N");
    assert_eq!(lines[2], "exam.edu,Y,Y,N");
    assert_eq!(lines[3], "shop.com,N,N,Y");
}

#[test]
fn test_csv_report_quotes_fields() {
    let table = PresenceTable::from_counts(&[AggregatedCount::new("a.com,b", "Say \"hi\"", 1)]);
    let report = generate_csv_report(&table);

    assert!(report.starts_with("Base_URL,\"Say \"\"hi\"\"\"\n"));
    assert!(report.contains("\"a.com,b\",Y"));
}

#[test]
fn test_markdown_report() {
    let report = generate_markdown_report(&sample_table());

    assert!(report.starts_with("# Technology Presence"));
    assert!(report.contains("3 sites, 3 technologies"));
    assert!(report.contains("| Base_URL | Honorlock | Proctorio | Recaptcha |"));
    assert!(report.contains("|---|---|---|---|"));
    assert!(report.contains("| exam.edu | Y | Y | N |"));
}

// ============================================================================
// Rendering / Saving Tests
// ============================================================================

#[test]
fn test_render_report_dispatches_on_format() {
    let table = sample_table();
    assert_eq!(
        render_report(&table, ReportFormat::Csv).unwrap(),
        generate_csv_report(&table)
    );
    assert_eq!(
        render_report(&table, ReportFormat::Markdown).unwrap(),
        generate_markdown_report(&table)
    );
    assert!(render_report(&table, ReportFormat::Json).unwrap().contains("\"rows\""));
}

#[test]
fn test_save_report() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("presence.csv");

    let content = generate_csv_report(&sample_table());
    save_report(&content, &path).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
}
