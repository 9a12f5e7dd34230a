//! Error conditions surfaced by the extension API.
//!
//! This layer performs no recovery and no retries; every condition here is
//! reported upward to the caller as the terminal outcome of validation or
//! resolution.

use thiserror::Error;

/// Result alias for extension API operations.
pub type ResourceResult<T> = Result<T, ResourceError>;

/// The conditions callers must be able to tell apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// A structural constraint on a spec or registration was violated.
    #[error("invalid spec: {0}")]
    InvalidSpec(String),

    /// A reference names an object or namespace that does not exist.
    #[error("{kind} \"{namespace}/{name}\" not found")]
    NotFound {
        kind: String,
        namespace: String,
        name: String,
    },

    /// The kind has no projection for the requested subresource, or a
    /// requested version is not among the declared ones.
    #[error("kind \"{kind}\" does not support {detail}")]
    Unsupported { kind: String, detail: String },

    /// A stored payload does not parse under the schema its version claims.
    /// Detected only at the consuming boundary, never on the storage path.
    #[error("payload mismatch: {0}")]
    PayloadMismatch(String),

    /// A write carried a stale resource version, or a create hit an
    /// existing object.
    #[error("conflict writing {kind} \"{namespace}/{name}\"")]
    Conflict {
        kind: String,
        namespace: String,
        name: String,
    },
}

impl ResourceError {
    pub fn invalid_spec(msg: impl Into<String>) -> Self {
        Self::InvalidSpec(msg.into())
    }

    pub fn not_found(kind: &str, namespace: &str, name: &str) -> Self {
        Self::NotFound {
            kind: kind.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    pub fn unsupported(kind: &str, detail: impl Into<String>) -> Self {
        Self::Unsupported {
            kind: kind.to_string(),
            detail: detail.into(),
        }
    }

    pub fn conflict(kind: &str, namespace: &str, name: &str) -> Self {
        Self::Conflict {
            kind: kind.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}
