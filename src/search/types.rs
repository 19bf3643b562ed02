//! Canonical search result types.

use serde::{Deserialize, Serialize};

/// Hard upper bound on the number of items a search returns.
pub const MAX_RESULTS: usize = 15;

/// One video result in the gateway's canonical shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultItem {
    pub video_id: String,
    pub title: String,
    pub author: String,
    pub thumbnail_url: String,
    pub duration_seconds: Option<i64>,
    pub view_count: Option<i64>,
}
