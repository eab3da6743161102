//! Business logic services for the BPIMS stock ledger

pub mod ledger;
pub mod receipt;
pub mod stock_query;
pub mod supplier;

pub use ledger::LedgerService;
pub use receipt::{PlainTextReceipt, ReceiptRenderer};
pub use stock_query::StockQueryService;
pub use supplier::SupplierService;
