use serde::{Deserialize, Serialize};

/// One page of records from a collection list call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult<T> {
    pub page: u32,
    pub per_page: u32,
    /// `-1` when the backend was asked to skip counting.
    pub total_items: i64,
    pub total_pages: i64,
    pub items: Vec<T>,
}

impl<T> ListResult<T> {
    pub fn empty(page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            total_items: 0,
            total_pages: 0,
            items: Vec::new(),
        }
    }
}
