use chrono::{DateTime, Utc};
use serde::Serialize;

/// A comment on a remote issue. Fetched on demand, never persisted locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub body: String,
    pub created_at: Option<DateTime<Utc>>,
}
