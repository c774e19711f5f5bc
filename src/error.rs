//! # Error Types
//!
//! This module defines error types used throughout the certatelier library.
//!
//! Two kinds of errors live here:
//!
//! - [`CertError`]: the library-internal error enum (configuration, render,
//!   I/O). These are operator-facing and carry free-form messages.
//! - [`QueryError`]: the public query contract errors. These cross the wire,
//!   are serializable, and are deliberately vague: the contract must not
//!   reveal which of the queried fields mismatched.
//!
//! Import validation errors are data, not control flow; see
//! [`ValidationError`](crate::model::ValidationError).

use serde::Serialize;
use thiserror::Error;

/// Main error type for certatelier operations
#[derive(Debug, Error)]
pub enum CertError {
    /// Unknown or misconfigured template (e.g. a recipient referencing a
    /// code the registry has never seen)
    #[error("Template error: {0}")]
    Template(String),

    /// Placeholder schema error (duplicate keys, malformed import)
    #[error("Schema error: {0}")]
    Schema(String),

    /// Compositing / rasterization error
    #[error("Render error: {0}")]
    Render(String),

    /// Background image fetch or decode error
    #[error("Image error: {0}")]
    Image(String),

    /// Bulk generation error (empty target list, re-entrant trigger)
    #[error("Bulk generation error: {0}")]
    Bulk(String),

    /// Import pipeline error (wrong stage, commit failure)
    #[error("Import error: {0}")]
    Import(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Public query contract errors.
///
/// `NotFound` covers every mismatch: wrong name, wrong phone, wrong
/// organization, or no such record at all. Callers get no signal about
/// which field was wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryError {
    /// No enabled certificate matches the queried triple
    #[error("未查询到证书，请核对信息后再试")]
    NotFound,

    /// The certificate exists but has been disabled by the issuer
    #[error("该证书已停用，请联系颁发机构")]
    Disabled,
}
