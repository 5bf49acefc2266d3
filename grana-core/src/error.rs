//! Error type shared by the billing module and its store collaborators.

use thiserror::Error;

/// Failures surfaced by billing operations.
///
/// `NotFound` and `Invalid` carry enough context (entity kind + key) to
/// render a user-facing message. Storage failures are fatal to the calling
/// operation; nothing in this module retries.
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("invalid {field}: {value}")]
    Invalid { field: &'static str, value: String },

    #[error("storage failure: {0}")]
    Storage(String),
}

impl BillingError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            value: value.into(),
        }
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }

    /// True for the "card absent" class of errors that the merged-listing
    /// path deliberately absorbs.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
