//! Synchronization error types.
//!
//! Every error raised while processing a document or a batch maps to one
//! [`ErrorKind`]. Per-document errors are recorded in the ledger and reported
//! in the batch result; the same kinds raised while opening a session,
//! bootstrapping or fetching the tax snapshot abort the batch.

use qbsync_shared::AppError;
use serde::Serialize;
use thiserror::Error;

use crate::gateway::GatewayError;
use crate::ledger::LedgerError;
use crate::tax::TaxMismatch;

/// Error category reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Malformed or incomplete input document.
    Validation,
    /// Declared taxes do not match the company file.
    TaxMismatch,
    /// Required data is missing and cannot be created.
    NotFound,
    /// Several prior documents match and none can be chosen safely.
    Ambiguous,
    /// A settled document cannot be replaced.
    Conflict,
    /// The accounting engine returned a non-success status.
    ExternalRejected,
    /// Session or exchange failure at the request-processor boundary.
    Transport,
    /// The ledger could not be read or written.
    Ledger,
}

impl ErrorKind {
    /// Stable code used in results and API responses.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION",
            Self::TaxMismatch => "TAX_MISMATCH",
            Self::NotFound => "NOT_FOUND",
            Self::Ambiguous => "AMBIGUOUS",
            Self::Conflict => "CONFLICT",
            Self::ExternalRejected => "EXTERNAL_REJECTED",
            Self::Transport => "TRANSPORT",
            Self::Ledger => "LEDGER",
        }
    }
}

/// Errors raised by the synchronization engine.
#[derive(Debug, Error)]
pub enum SyncError {
    // ========== Document Errors ==========
    /// The document failed structural validation.
    #[error("Invalid document: {0}")]
    Validation(String),

    /// Declared taxes do not match the company file.
    #[error("Sales tax does not match the company file ({} mismatch(es))", mismatches.len())]
    TaxMismatch {
        /// Every mismatch found for the document.
        mismatches: Vec<TaxMismatch>,
    },

    // ========== Lookup Errors ==========
    /// Required data is missing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Several candidates match and none can be chosen.
    #[error("Ambiguous: {0}")]
    Ambiguous(String),

    /// A settled document cannot be replaced.
    #[error("Conflict: {0}")]
    Conflict(String),

    // ========== Accounting Engine Errors ==========
    /// The accounting engine rejected a request.
    #[error("{operation} rejected with status {status_code}: {message}")]
    ExternalRejected {
        /// Operation name, e.g. `InvoiceAdd`.
        operation: String,
        /// Status code returned.
        status_code: i32,
        /// Status message returned.
        message: String,
    },

    /// Session or exchange failure.
    #[error("Transport error: {0}")]
    Transport(String),

    // ========== Ledger Errors ==========
    /// The ledger could not be read or written.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl SyncError {
    /// Returns the error category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::TaxMismatch { .. } => ErrorKind::TaxMismatch,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Ambiguous(_) => ErrorKind::Ambiguous,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::ExternalRejected { .. } => ErrorKind::ExternalRejected,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Ledger(_) => ErrorKind::Ledger,
        }
    }

    /// Returns the stable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Returns the HTTP status code for batch-level failures.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Ambiguous | ErrorKind::Conflict => 409,
            ErrorKind::TaxMismatch => 422,
            ErrorKind::ExternalRejected => 502,
            ErrorKind::Transport => 503,
            ErrorKind::Ledger => 500,
        }
    }

    /// Builds an `ExternalRejected` error from a response status.
    pub(crate) fn rejected(operation: &str, status_code: i32, message: &str) -> Self {
        Self::ExternalRejected {
            operation: operation.to_string(),
            status_code,
            message: message.to_string(),
        }
    }
}

impl From<GatewayError> for SyncError {
    fn from(err: GatewayError) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::Validation => Self::Validation(message),
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::Ambiguous | ErrorKind::Conflict => Self::Conflict(message),
            ErrorKind::TaxMismatch => Self::BusinessRule(message),
            ErrorKind::ExternalRejected => Self::ExternalService(message),
            ErrorKind::Transport => Self::Unavailable(message),
            ErrorKind::Ledger => Self::Database(message),
        }
    }
}
