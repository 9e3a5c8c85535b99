use techgrid::handlers::*;
use techgrid_core::data::Database;
use techgrid_core::model::DetectionRecord;
use techgrid_core::report::ReportFormat;
use tempfile::TempDir;

fn seeded_store(records: &[(&str, &str, &str)]) -> (TempDir, String) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("scraped_data.db");
    let db = Database::create(&path).unwrap();
    for (site, tech, url) in records {
        db.insert_detection(&DetectionRecord::new(site, tech, url))
            .unwrap();
    }
    db.close().unwrap();
    let uri = path.to_str().unwrap().to_string();
    (temp_dir, uri)
}

#[test]
fn test_resolve_connection_string_plain_path() {
    let result = resolve_connection_string("/var/lib/techgrid/scraped_data.db");
    assert_eq!(result, Ok("/var/lib/techgrid/scraped_data.db".to_string()));
}

#[test]
fn test_resolve_connection_string_expands_tilde() {
    let result = resolve_connection_string("~/scraped_data.db").unwrap();
    assert!(!result.starts_with('~'));
    assert!(result.ends_with("scraped_data.db"));
}

#[test]
fn test_resolve_connection_string_keeps_file_uri() {
    let result = resolve_connection_string("  file:~/data.db?mode=ro ");
    assert_eq!(result, Ok("file:~/data.db?mode=ro".to_string()));
}

#[test]
fn test_resolve_connection_string_empty() {
    let result = resolve_connection_string("  ");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains(DB_ENV_VAR));
}

#[test]
fn test_open_database_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.db");

    let result = open_database(path.to_str().unwrap());
    assert!(result.is_err());
    let message = result.err().unwrap();
    assert!(message.contains("No detection store found"));
    assert!(message.contains(DB_ENV_VAR));
}

#[test]
fn test_load_presence_table_empty_store() {
    let (_temp_dir, uri) = seeded_store(&[]);
    let db = open_database(&uri).unwrap();

    assert_eq!(load_presence_table(&db), Ok(None));
}

#[test]
fn test_build_report_csv() {
    let (_temp_dir, uri) = seeded_store(&[
        ("exam.edu", "Proctorio", "https://exam.edu/1"),
        ("shop.com", "Recaptcha", "https://shop.com/cart"),
        ("shop.com", "Recaptcha", "https://shop.com/login"),
    ]);
    let db = open_database(&uri).unwrap();

    let report = build_report(&db, ReportFormat::Csv).unwrap().unwrap();
    assert_eq!(
        report,
        "Base_URL,Proctorio,Recaptcha\nexam.edu,Y,N\nshop.com,N,Y\n"
    );
}

#[test]
fn test_build_report_empty_store() {
    let (_temp_dir, uri) = seeded_store(&[]);
    let db = open_database(&uri).unwrap();

    assert_eq!(build_report(&db, ReportFormat::Text), Ok(None));
}

#[test]
fn test_lookup_urls() {
    let (_temp_dir, uri) = seeded_store(&[
        ("shop.com", "Recaptcha", "https://shop.com/cart"),
        ("shop.com", "Hcaptcha", "https://shop.com/signup"),
        ("shop.com", "Recaptcha", "https://shop.com/login"),
    ]);
    let db = open_database(&uri).unwrap();

    let urls = lookup_urls(&db, "shop.com", "Recaptcha").unwrap();
    assert_eq!(urls, vec!["https://shop.com/cart", "https://shop.com/login"]);
}

#[test]
fn test_lookup_urls_against_missing_schema() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("plain.db");
    // An empty file is a valid SQLite database without the detection collection
    std::fs::write(&path, b"").unwrap();

    let db = open_database(path.to_str().unwrap()).unwrap();
    let result = lookup_urls(&db, "a.com", "X");
    assert!(result.unwrap_err().contains("Failed to look up URLs"));
}
