//! Request-scoped resolution errors.
//!
//! Every variant is terminal for the request that produced it and carries a
//! message fit for display. None of them is fatal to the process.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Malformed or out-of-range raw timestamp.
    #[error("Your GPS value does not make any sense: {0}")]
    InvalidTimestamp(String),

    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    #[error("invalid channel name: {0}")]
    InvalidChannel(String),

    /// The resolved time/channel has no stored report. The payload is the
    /// full display message.
    #[error("{0}")]
    NotFound(String),

    #[error("no channel report available for {0}")]
    NoDataForPeriod(String),
}

/// Serialisable tag for a [`ResolveError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidTimestamp,
    MissingRequiredField,
    InvalidChannel,
    NotFound,
    NoDataForPeriod,
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTimestamp(_) => ErrorKind::InvalidTimestamp,
            Self::MissingRequiredField(_) => ErrorKind::MissingRequiredField,
            Self::InvalidChannel(_) => ErrorKind::InvalidChannel,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::NoDataForPeriod(_) => ErrorKind::NoDataForPeriod,
        }
    }
}
