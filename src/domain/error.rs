use thiserror::Error;

/// Failures raised while ingesting a wire-format document into the typed node model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("document payload is not valid JSON: {message}")]
    Malformed { message: String },
    #[error("document payload has an unexpected shape: {message}")]
    Shape { message: String },
    #[error("expected a `document` root node, found `{found}`")]
    UnexpectedRoot { found: String },
    #[error("`{node_type}` node is missing required field `{field}`")]
    MissingField {
        node_type: &'static str,
        field: &'static str,
    },
    #[error("`{node_type}` node has an invalid `{field}`: {reason}")]
    InvalidField {
        node_type: &'static str,
        field: &'static str,
        reason: String,
    },
}

impl DocumentError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape {
            message: message.into(),
        }
    }

    pub fn missing(node_type: &'static str, field: &'static str) -> Self {
        Self::MissingField { node_type, field }
    }

    pub fn invalid(node_type: &'static str, field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            node_type,
            field,
            reason: reason.into(),
        }
    }
}
