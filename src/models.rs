use serde::{Deserialize, Serialize};

/// Normalized extraction result for one job posting.
///
/// Any value handed out by an extractor has a non-empty `title` and `company`;
/// every other field may be an empty string. `source` names the site the data
/// came from ("LinkedIn", "Indeed", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobData {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub url: String,
    pub source: String,
}

/// Logged-in dashboard user, read from local session storage.
///
/// Treated as an opaque credential carrier: the extraction side only ever
/// reads it, never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}
