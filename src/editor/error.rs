use thiserror::Error;

use crate::{document::AccessError, domain::TypeError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("{action} is not available on {target}")]
    Unsupported { action: &'static str, target: String },
    #[error("invalid {what}: {input}")]
    InvalidInput { what: &'static str, input: String },
}

impl EditorError {
    pub fn unsupported(action: &'static str, target: impl Into<String>) -> Self {
        EditorError::Unsupported {
            action,
            target: target.into(),
        }
    }
}
