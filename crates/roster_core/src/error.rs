use serde::Serialize;
use shared::{domain::ChildId, error::RecordError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("failed to load children page {page}: {source}")]
    Fetch {
        page: u32,
        source: anyhow::Error,
    },
    #[error("failed to cancel registration of child {id}: {source}")]
    Delete { id: ChildId, source: anyhow::Error },
    #[error("page {page} contained an invalid child entry: {source}")]
    InvalidRecord { page: u32, source: RecordError },
    #[error("page {page} reported {total_count} children, more than {max_pages} pages can show")]
    TotalCountOutOfRange {
        page: u32,
        total_count: u64,
        max_pages: u32,
    },
    #[error("page {page} is out of range (last page is {last})")]
    InvalidPage { page: u32, last: u32 },
    #[error("a registration cancellation is still in flight")]
    Busy,
}

impl ControllerError {
    pub fn context(&self) -> ErrorContext {
        match self {
            Self::Delete { .. } | Self::Busy => ErrorContext::CancelRegistration,
            Self::Fetch { .. }
            | Self::InvalidRecord { .. }
            | Self::TotalCountOutOfRange { .. }
            | Self::InvalidPage { .. } => ErrorContext::LoadPage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorContext {
    LoadPage,
    CancelRegistration,
}

/// Last failure as shown to the user; the controller keeps only the most recent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportedError {
    context: ErrorContext,
    message: String,
}

impl ReportedError {
    pub fn new(context: ErrorContext, message: impl Into<String>) -> Self {
        Self {
            context,
            message: message.into(),
        }
    }

    pub fn context(&self) -> ErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&ControllerError> for ReportedError {
    fn from(error: &ControllerError) -> Self {
        Self::new(error.context(), error.to_string())
    }
}
