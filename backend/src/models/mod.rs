//! Database models for the BPIMS stock ledger
//!
//! Re-exports filter types from the shared crate and adds the typed records
//! each store query maps its rows into.

mod stock;
mod supplier;

pub use shared::models::*;
pub use stock::*;
pub use supplier::*;
