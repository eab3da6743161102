//! Domain models for the BPIMS stock ledger

mod stock;

pub use stock::*;
