use thiserror::Error;

use super::content::ContentKind;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{} `{id}` not found", .kind.map_or("content", ContentKind::label))]
    NotFound {
        kind: Option<ContentKind>,
        id: String,
    },
    #[error("domain validation failed: {message}")]
    Validation { message: String },
    #[error("domain invariant violated: {message}")]
    Invariant { message: String },
}

impl DomainError {
    pub fn not_found(kind: Option<ContentKind>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant {
            message: message.into(),
        }
    }
}
