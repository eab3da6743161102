//! Shared types and models for the BPIMS stock ledger
//!
//! This crate contains the wire envelope, pagination, filter decoding and
//! text parsing rules shared by the backend and its tests.

pub mod dates;
pub mod models;
pub mod types;
pub mod validation;

pub use dates::*;
pub use models::*;
pub use types::*;
pub use validation::*;
