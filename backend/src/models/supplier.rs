//! Supplier records

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub contact_number1: Option<String>,
    pub contact_number2: Option<String>,
    pub address: Option<String>,
}

/// Editable supplier columns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SupplierFields {
    pub name: String,
    pub contact_number1: Option<String>,
    pub contact_number2: Option<String>,
    pub address: Option<String>,
}

/// What a supplier deletion touched besides the supplier row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierDeletion {
    pub supplier_id: i64,
    /// Movement records whose supplier reference was set to null
    pub detached_movements: u64,
    pub deleted_returns: u64,
}
