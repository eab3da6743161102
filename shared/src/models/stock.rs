//! Stock listing filters and sentinel decoding
//!
//! Clients send a handful of magic values (`categoryId` of 0 or -1,
//! `deliveredBy` of 0). They are decoded here exactly once so nothing past
//! the HTTP boundary ever sees a sentinel.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stock listing filter mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockFilter {
    #[default]
    All,
    /// Only rows whose quantity is below the location's critical threshold
    LowStock,
}

impl StockFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockFilter::All => "all",
            StockFilter::LowStock => "low-stock",
        }
    }

    pub fn parse(raw: Option<&str>) -> Result<Self, &'static str> {
        match raw.map(str::trim) {
            None | Some("") | Some("all") => Ok(StockFilter::All),
            Some("low-stock") => Ok(StockFilter::LowStock),
            Some(_) => Err("Filter must be 'all' or 'low-stock'"),
        }
    }

    /// Whether a row with this quantity and threshold passes the filter
    pub fn admits(&self, quantity: Decimal, threshold: Decimal) -> bool {
        match self {
            StockFilter::All => true,
            StockFilter::LowStock => is_low_stock(quantity, threshold),
        }
    }
}

/// Catalog category filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    Any,
    Only(i64),
}

impl CategoryFilter {
    /// `0` and `-1` both mean "every category"
    pub fn from_raw(raw: Option<i64>) -> Result<Self, &'static str> {
        match raw {
            None | Some(0) | Some(-1) => Ok(CategoryFilter::Any),
            Some(id) if id > 0 => Ok(CategoryFilter::Only(id)),
            Some(_) => Err("Category id must be positive, 0 or -1"),
        }
    }

    pub fn id(&self) -> Option<i64> {
        match self {
            CategoryFilter::Any => None,
            CategoryFilter::Only(id) => Some(*id),
        }
    }
}

/// Decode a supplier reference where `0` means "no supplier"
pub fn supplier_ref(raw: Option<i64>) -> Result<Option<i64>, &'static str> {
    match raw {
        None | Some(0) => Ok(None),
        Some(id) if id > 0 => Ok(Some(id)),
        Some(_) => Err("Supplier id cannot be negative"),
    }
}

/// Low stock means strictly below the critical threshold
pub fn is_low_stock(quantity: Decimal, threshold: Decimal) -> bool {
    quantity < threshold
}
