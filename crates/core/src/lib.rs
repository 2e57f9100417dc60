//! Core synchronization logic for QBSync.
//!
//! This crate contains the document model, the qbXML wire codec, tax
//! reconciliation, reference-data provisioning and the create-or-replace
//! engine. It has no web or database dependencies; the request processor and
//! the durable ledger are reached through the [`gateway::RequestProcessor`]
//! and [`ledger::LedgerStore`] traits.
//!
//! # Modules
//!
//! - `document` - Inbound invoices and bills, with validation
//! - `mapping` - Document to qbXML payload mapping
//! - `protocol` - qbXML request/response envelopes and builders
//! - `gateway` - Sessions against a request processor
//! - `tax` - Declared-versus-known tax rate reconciliation
//! - `provisioning` - Idempotent bootstrap of reference data
//! - `ledger` - Sync ledger records and store trait
//! - `sync` - Batch orchestration and create-or-replace

pub mod amount;
pub mod document;
pub mod error;
pub mod gateway;
pub mod ledger;
pub mod mapping;
pub mod protocol;
pub mod provisioning;
pub mod sync;
pub mod tax;

#[cfg(test)]
mod testing;

pub use error::{ErrorKind, SyncError};
pub use sync::{BatchOutcome, DocumentResult, SyncEngine};
