use std::error::Error as StdError;

use thiserror::Error;

use crate::{
    application::{page::PageError, render::RenderConfigError, repos::StoreError},
    infra::error::InfraError,
};

/// Error chain flattened for reporting at the process boundary.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Render(#[from] RenderConfigError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Page(PageError::NotFound { .. }) => 2,
            AppError::Store(StoreError::Document { .. }) => 65,
            AppError::Render(_) | AppError::Infra(InfraError::Configuration { .. }) => 78,
            AppError::Page(PageError::Store { .. })
            | AppError::Store(_)
            | AppError::Infra(_)
            | AppError::Unexpected(_) => 1,
        }
    }
}
