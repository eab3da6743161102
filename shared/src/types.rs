//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Fixed number of rows returned by every paginated listing
pub const PAGE_SIZE: u32 = 30;

/// Pagination parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Build the fixed-size window for a 1-based page number.
    /// Missing or zero pages fall back to the first page.
    pub fn page(page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: PAGE_SIZE,
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    /// Slice an already ordered, already filtered row set to this window
    pub fn window<T>(&self, rows: Vec<T>) -> Vec<T> {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        rows.into_iter()
            .skip(offset)
            .take(self.per_page as usize)
            .collect()
    }
}

/// One page of rows plus the number of rows matching the filter,
/// ignoring the page window
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: i64) -> Self {
        Self { items, total_count }
    }

    /// An unpaginated list whose count is its own length
    pub fn full(items: Vec<T>) -> Self {
        let total_count = items.len() as i64;
        Self { items, total_count }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
        }
    }
}

/// Response envelope shared by every endpoint.
///
/// `totalCount` is only emitted by list operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T, E = ()> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub errors: Option<E>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: None,
            total_count: None,
        }
    }

    /// Success without a payload (`data: null`)
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            errors: None,
            total_count: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn list(message: impl Into<String>, page: Page<T>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(page.items),
            errors: None,
            total_count: Some(page.total_count),
        }
    }
}

impl<E> ApiResponse<(), E> {
    pub fn failure(message: impl Into<String>, errors: E) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            errors: Some(errors),
            total_count: None,
        }
    }
}
