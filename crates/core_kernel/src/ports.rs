//! Ports for reference-data collaborators
//!
//! Products, suppliers, customers, carriers and payment conditions are owned
//! by systems outside this workspace. A domain crate declares a port trait
//! extending [`DomainPort`] and every adapter (HTTP client, database view,
//! in-memory mock) reports failures as a [`PortError`].
//!
//! ```rust,ignore
//! #[async_trait]
//! pub trait ReferenceDataPort: DomainPort {
//!     async fn product(&self, id: ProductId) -> Result<ProductRef, PortError>;
//! }
//! ```

use std::fmt;
use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Failure reported by a reference-data adapter
#[derive(Debug, Error)]
pub enum PortError {
    /// The collaborator does not know the requested entity
    #[error("Not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// The collaborator could not be reached or refused the request
    #[error("Service unavailable: {service}")]
    Unavailable {
        service: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// The collaborator did not answer in time
    #[error("Timeout after {after_ms}ms: {operation}")]
    Timeout { operation: String, after_ms: u64 },

    /// The collaborator answered with a payload that is not a valid reference
    #[error("Malformed {entity}: {reason}")]
    Malformed { entity: String, reason: String },
}

impl PortError {
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn unavailable(service: impl Into<String>) -> Self {
        PortError::Unavailable {
            service: service.into(),
            source: None,
        }
    }

    /// Unavailable, keeping the transport error as the source
    pub fn unavailable_with(
        service: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PortError::Unavailable {
            service: service.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn malformed(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        PortError::Malformed {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    /// True for failures a later attempt might not hit
    ///
    /// Lookups are never retried automatically; callers may use this to
    /// decide whether to offer a retry to the user.
    pub fn is_transient(&self) -> bool {
        matches!(self, PortError::Unavailable { .. } | PortError::Timeout { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
///
/// Ports are shared behind `Arc<dyn ...>` across async tasks.
pub trait DomainPort: Send + Sync + 'static {}
