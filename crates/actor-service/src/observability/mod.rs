//! Observability for the actor service.
//!
//! # Privacy by Default
//!
//! Every instrumented function uses `#[instrument(skip_all)]` and adds fields
//! explicitly. Fields fall into three groups:
//! - **SAFE**: logged in plaintext (actor type, operation names, outcome)
//! - **HASHED**: SHA-256 prefix only, for correlation (actor ID, email)
//! - **NEVER**: never logged (passwords, shared secrets, tokens, hashes)

pub mod metrics;

use crate::errors::AcError;
use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars)
///
/// This is a one-way correlation handle, not a security primitive.
pub fn hash_for_correlation(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    digest.iter().take(4).map(|b| format!("{:02x}", b)).collect()
}

/// Error categories for metrics labels (bounded cardinality)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rejected credentials or federated assertions
    Authentication,
    /// Bad, expired or revoked tokens and signing failures
    Cryptographic,
    /// Malformed input, duplicates, unknown actors
    Validation,
    /// Stores, configuration and everything else
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Cryptographic => "cryptographic",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl From<&AcError> for ErrorCategory {
    fn from(err: &AcError) -> Self {
        match err {
            AcError::InvalidCredentials | AcError::ExternalAuthFailed => {
                ErrorCategory::Authentication
            }
            AcError::InvalidToken(_) | AcError::RefreshDenied | AcError::Crypto(_) => {
                ErrorCategory::Cryptographic
            }
            AcError::InvalidInput(_) | AcError::Conflict(_) | AcError::NotFound(_) => {
                ErrorCategory::Validation
            }
            AcError::Configuration(_) | AcError::Database(_) => ErrorCategory::Internal,
        }
    }
}
