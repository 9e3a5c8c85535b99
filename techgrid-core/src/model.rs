use serde::{Deserialize, Serialize};

/// Group key used when a stored document has no `Base_URL`.
pub const UNKNOWN_BASE_URL: &str = "Unknown";

/// Technology value meaning "nothing detected on this page". Never a column.
pub const NO_TECHNOLOGY: &str = "None";

/// One raw observation as stored in the collection. Documents are loosely
/// shaped, so every field may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionRecord {
    #[serde(rename = "Base_URL")]
    pub base_url: Option<String>,
    #[serde(rename = "Technology")]
    pub technology: Option<String>,
    #[serde(rename = "URL")]
    pub url: Option<String>,
}

impl DetectionRecord {
    pub fn new(base_url: &str, technology: &str, url: &str) -> Self {
        Self {
            base_url: Some(base_url.to_string()),
            technology: Some(technology.to_string()),
            url: Some(url.to_string()),
        }
    }
}

/// Number of detection records sharing one (site, technology) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedCount {
    pub base_url: String,
    pub technology: String,
    pub count: i64,
}

impl AggregatedCount {
    pub fn new(base_url: &str, technology: &str, count: i64) -> Self {
        Self {
            base_url: base_url.to_string(),
            technology: technology.to_string(),
            count,
        }
    }
}
