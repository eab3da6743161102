//! Quantity ledger service
//!
//! The only path that changes a stock row's quantity. Receipts and returns
//! pair the change with a movement record; the warehouse overwrite is the
//! one audit-free correction.

use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    now_utc, numeric_text, parse_http_date, parse_quantity, supplier_ref,
    validate_non_negative_quantity, validate_positive_quantity,
};

use crate::error::{AppError, AppResult};
use crate::models::{
    NewBranchReceipt, NewSupplierReturn, NewWarehouseReceipt, Recorded, StockInput,
    SupplierReturn, WarehouseStock, WarehouseStockInput,
};
use crate::store::{LedgerStore, SharedStore};

/// Ledger service for receipts, returns and quantity corrections
#[derive(Clone)]
pub struct LedgerService {
    store: SharedStore,
}

/// Branch receipt request body. Numbers arrive as decimal text or JSON numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchReceiptInput {
    #[serde(deserialize_with = "numeric_text::deserialize")]
    pub qty: String,
    #[serde(default, deserialize_with = "numeric_text::option::deserialize")]
    pub moq: Option<String>,
    pub delivery_date: String,
    /// `0` means no supplier
    #[serde(default)]
    pub delivered_by: Option<i64>,
    #[serde(
        rename = "expectedTotalQty",
        alias = "expectedQty",
        deserialize_with = "numeric_text::deserialize"
    )]
    pub expected_qty: String,
    #[serde(
        rename = "actualTotalQty",
        alias = "actualQty",
        deserialize_with = "numeric_text::deserialize"
    )]
    pub actual_qty: String,
}

/// Warehouse receipt request body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseReceiptInput {
    #[serde(deserialize_with = "numeric_text::deserialize")]
    pub qty: String,
    pub delivery_date: String,
    /// `0` means no supplier
    #[serde(default)]
    pub delivered_by: Option<i64>,
    #[serde(
        rename = "expectedTotalQty",
        alias = "expectedQty",
        deserialize_with = "numeric_text::deserialize"
    )]
    pub expected_qty: String,
    #[serde(
        rename = "actualTotalQty",
        alias = "actualQty",
        deserialize_with = "numeric_text::deserialize"
    )]
    pub actual_qty: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseQuantityInput {
    #[serde(alias = "newQty", deserialize_with = "numeric_text::deserialize")]
    pub quantity: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierReturnInput {
    pub supplier_id: i64,
    pub reason: String,
    #[serde(deserialize_with = "numeric_text::deserialize")]
    pub quantity: String,
    /// Defaults to now
    #[serde(default)]
    pub date: Option<String>,
}

fn quantity(field: &str, text: &str) -> AppResult<Decimal> {
    parse_quantity(text).map_err(|message| AppError::validation(field, message))
}

fn movement_quantity(field: &str, text: &str) -> AppResult<Decimal> {
    let qty = quantity(field, text)?;
    validate_positive_quantity(qty).map_err(|message| AppError::validation(field, message))?;
    Ok(qty)
}

fn date(field: &str, text: &str) -> AppResult<chrono::NaiveDateTime> {
    parse_http_date(text.trim()).map_err(|message| AppError::validation(field, message))
}

fn delivered_by(raw: Option<i64>) -> AppResult<Option<i64>> {
    supplier_ref(raw).map_err(|message| AppError::validation("deliveredBy", message))
}

impl BranchReceiptInput {
    fn into_receipt(self, branch_item_id: i64) -> AppResult<NewBranchReceipt> {
        Ok(NewBranchReceipt {
            branch_item_id,
            qty: movement_quantity("qty", &self.qty)?,
            moq: match self.moq.as_deref() {
                Some(text) if !text.trim().is_empty() => quantity("moq", text)?,
                _ => Decimal::ZERO,
            },
            delivery_date: date("deliveryDate", &self.delivery_date)?,
            delivered_by: delivered_by(self.delivered_by)?,
            expected_qty: quantity("expectedTotalQty", &self.expected_qty)?,
            actual_qty: quantity("actualTotalQty", &self.actual_qty)?,
        })
    }
}

impl WarehouseReceiptInput {
    fn into_receipt(self, warehouse_item_id: i64) -> AppResult<NewWarehouseReceipt> {
        Ok(NewWarehouseReceipt {
            warehouse_item_id,
            qty: movement_quantity("qty", &self.qty)?,
            delivery_date: date("deliveryDate", &self.delivery_date)?,
            delivered_by: delivered_by(self.delivered_by)?,
            expected_qty: quantity("expectedTotalQty", &self.expected_qty)?,
            actual_qty: quantity("actualTotalQty", &self.actual_qty)?,
        })
    }
}

impl SupplierReturnInput {
    fn into_return(self, warehouse_item_id: i64) -> AppResult<NewSupplierReturn> {
        let supplier_id = supplier_ref(Some(self.supplier_id))
            .map_err(|message| AppError::validation("supplierId", message))?
            .ok_or_else(|| AppError::validation("supplierId", "Supplier is required"))?;

        Ok(NewSupplierReturn {
            warehouse_item_id,
            supplier_id,
            reason: self.reason.trim().to_string(),
            quantity: movement_quantity("quantity", &self.quantity)?,
            date: match self.date.as_deref() {
                Some(text) => date("date", text)?,
                None => now_utc(),
            },
        })
    }
}

impl LedgerService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Record goods received at a branch and add them to the branch stock row
    pub async fn record_branch_receipt(
        &self,
        branch_item_id: i64,
        input: BranchReceiptInput,
    ) -> AppResult<Recorded<StockInput>> {
        let receipt = input.into_receipt(branch_item_id)?;
        let recorded = self.store.record_branch_receipt(receipt).await?;

        tracing::info!(
            branch_item_id,
            movement_id = recorded.record.id,
            qty = %recorded.record.qty,
            new_quantity = %recorded.new_quantity,
            "Branch receipt recorded"
        );
        Ok(recorded)
    }

    /// Record goods received at the warehouse and add them to the warehouse stock row
    pub async fn record_warehouse_receipt(
        &self,
        warehouse_item_id: i64,
        input: WarehouseReceiptInput,
    ) -> AppResult<Recorded<WarehouseStockInput>> {
        let receipt = input.into_receipt(warehouse_item_id)?;
        let recorded = self.store.record_warehouse_receipt(receipt).await?;

        tracing::info!(
            warehouse_item_id,
            movement_id = recorded.record.id,
            qty = %recorded.record.qty,
            new_quantity = %recorded.new_quantity,
            "Warehouse receipt recorded"
        );
        Ok(recorded)
    }

    /// Overwrite a warehouse quantity. No movement record is written.
    pub async fn edit_warehouse_quantity(
        &self,
        warehouse_item_id: i64,
        input: WarehouseQuantityInput,
    ) -> AppResult<WarehouseStock> {
        let new_quantity = quantity("quantity", &input.quantity)?;
        validate_non_negative_quantity(new_quantity)
            .map_err(|message| AppError::validation("quantity", message))?;

        let stock = self
            .store
            .set_warehouse_quantity(warehouse_item_id, new_quantity)
            .await?;

        tracing::warn!(
            warehouse_item_id,
            new_quantity = %stock.quantity,
            "Warehouse quantity overwritten without a movement record"
        );
        Ok(stock)
    }

    /// Send warehouse goods back to a supplier and subtract them from the stock row.
    /// The quantity may go negative.
    pub async fn return_to_supplier(
        &self,
        warehouse_item_id: i64,
        input: SupplierReturnInput,
    ) -> AppResult<Recorded<SupplierReturn>> {
        let supplier_return = input.into_return(warehouse_item_id)?;
        let recorded = self.store.record_supplier_return(supplier_return).await?;

        if recorded.new_quantity < Decimal::ZERO {
            tracing::warn!(
                warehouse_item_id,
                new_quantity = %recorded.new_quantity,
                "Supplier return left a negative warehouse quantity"
            );
        }
        tracing::info!(
            warehouse_item_id,
            supplier_id = recorded.record.supplier_id,
            quantity = %recorded.record.quantity,
            new_quantity = %recorded.new_quantity,
            "Supplier return recorded"
        );
        Ok(recorded)
    }
}
