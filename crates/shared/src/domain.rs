use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::RecordError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(ChildId);

/// Remote sources hand out ids as JSON strings or numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawChildId {
    Text(String),
    Number(i64),
}

impl fmt::Display for RawChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Number(value) => write!(f, "{value}"),
        }
    }
}

/// A registered child exactly as the remote source serialized it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChild {
    pub id: RawChildId,
    pub name: String,
    pub birth_date: String,
}

/// Validated, read-only snapshot of one registered child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub id: ChildId,
    pub name: String,
    pub birth_date: NaiveDate,
}

impl TryFrom<RawChild> for Child {
    type Error = RecordError;

    fn try_from(raw: RawChild) -> Result<Self, Self::Error> {
        let id = raw.id.to_string();
        if id.trim().is_empty() {
            return Err(RecordError::MissingId);
        }
        let birth_date = parse_birth_date(&raw.birth_date)?;
        Ok(Self {
            id: ChildId(id),
            name: raw.name,
            birth_date,
        })
    }
}

/// Accepts a plain calendar date or a full RFC 3339 timestamp, keeping the date part.
pub fn parse_birth_date(value: &str) -> Result<NaiveDate, RecordError> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|timestamp| timestamp.date_naive())
        .map_err(|_| RecordError::invalid_birth_date(value))
}
