//! Supplier directory service

use serde::Deserialize;
use shared::normalize_search;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{Supplier, SupplierDeletion, SupplierFields};
use crate::store::{SharedStore, SupplierStore};

#[derive(Clone)]
pub struct SupplierService {
    store: SharedStore,
}

/// Upsert body. `id` of 0 (or missing) creates a new supplier.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SupplierInput {
    #[serde(default)]
    pub id: i64,
    #[validate(length(min = 1, max = 255, message = "Supplier name is required"))]
    pub name: String,
    #[validate(length(max = 50, message = "Contact number is too long"))]
    pub contact_number1: Option<String>,
    #[validate(length(max = 50, message = "Contact number is too long"))]
    pub contact_number2: Option<String>,
    pub address: Option<String>,
}

/// Blank optional text is stored as null
fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl From<SupplierInput> for SupplierFields {
    fn from(input: SupplierInput) -> Self {
        SupplierFields {
            name: input.name.trim().to_string(),
            contact_number1: optional_text(input.contact_number1),
            contact_number2: optional_text(input.contact_number2),
            address: optional_text(input.address),
        }
    }
}

impl SupplierService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list_suppliers(&self, search: Option<&str>) -> AppResult<Vec<Supplier>> {
        let search = normalize_search(search);
        self.store.list_suppliers(search.as_deref()).await
    }

    /// `None` means no supplier was requested; an unknown id is `NotFound`
    pub async fn get_supplier(&self, id: Option<i64>) -> AppResult<Option<Supplier>> {
        match id {
            None => Ok(None),
            Some(id) => self
                .store
                .get_supplier(id)
                .await?
                .map(Some)
                .ok_or_else(|| AppError::NotFound("Supplier".to_string())),
        }
    }

    /// Create when `id` is 0, otherwise update in place
    pub async fn upsert_supplier(&self, input: SupplierInput) -> AppResult<Supplier> {
        input.validate()?;
        if input.name.trim().is_empty() {
            return Err(AppError::validation("name", "Supplier name is required"));
        }

        let id = input.id;
        if id < 0 {
            return Err(AppError::validation("id", "Supplier id cannot be negative"));
        }
        let fields = SupplierFields::from(input);

        if id == 0 {
            let supplier = self.store.insert_supplier(&fields).await?;
            tracing::info!(supplier_id = supplier.id, "Supplier created");
            return Ok(supplier);
        }

        let supplier = self
            .store
            .update_supplier(id, &fields)
            .await?
            .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;
        tracing::info!(supplier_id = supplier.id, "Supplier updated");
        Ok(supplier)
    }

    /// Detach the supplier from movements, delete its returns, then delete it
    pub async fn delete_supplier(&self, id: i64) -> AppResult<SupplierDeletion> {
        let deletion = self
            .store
            .delete_supplier(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        tracing::info!(
            supplier_id = id,
            detached_movements = deletion.detached_movements,
            deleted_returns = deletion.deleted_returns,
            "Supplier deleted"
        );
        Ok(deletion)
    }
}
