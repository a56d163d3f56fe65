use thiserror::Error;

/// Rejection reasons for a remote entry that cannot become a [`crate::domain::Child`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("child entry is missing an id")]
    MissingId,
    #[error("invalid birth date {value:?}: expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidBirthDate { value: String },
}

impl RecordError {
    pub fn invalid_birth_date(value: impl Into<String>) -> Self {
        Self::InvalidBirthDate {
            value: value.into(),
        }
    }
}
