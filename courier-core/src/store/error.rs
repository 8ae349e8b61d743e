use thiserror::Error;

/// Infrastructure failures raised by a [`crate::DeliveryStore`].
///
/// These are distinct from validation rejections and are never retried by
/// the engine. Catalogue data whose totals cannot be represented is
/// reported here too.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing storage failed.
    #[error("delivery store failure: {message}")]
    Backend {
        /// Backend-specific detail.
        message: String,
    },
    /// A required entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of entity, for example `"product"`.
        entity: &'static str,
        /// Raw identifier.
        id: u64,
    },
    /// Summing catalogue measures overflowed the decimal range.
    #[error("load overflowed while totalling {context}")]
    LoadOverflow {
        /// What was being totalled.
        context: &'static str,
    },
}

impl StoreError {
    /// Shorthand for [`StoreError::NotFound`].
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<u64>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}
