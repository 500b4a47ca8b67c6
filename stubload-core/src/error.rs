use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Operational classification of a failure. Every [Error] maps to exactly one kind, and the
/// kind is what gets logged and recorded for each failed row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    ConfigurationMissing,
    MissingData,
    EnumParseFailure,
    SourceOperationFailure,
    PublishFailure,
    UnclassifiedFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::ConfigurationMissing => write!(f, "ConfigurationMissing"),
            ErrorKind::MissingData => write!(f, "MissingData"),
            ErrorKind::EnumParseFailure => write!(f, "EnumParseFailure"),
            ErrorKind::SourceOperationFailure => write!(f, "SourceOperationFailure"),
            ErrorKind::PublishFailure => write!(f, "PublishFailure"),
            ErrorKind::UnclassifiedFailure => write!(f, "UnclassifiedFailure"),
        }
    }
}

/// Reasons a candidate row cannot become a domain record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("column '{column}' is missing, null or not of the expected type")]
    MissingData { column: &'static str },

    #[error("column '{column}' has unknown value '{value}'")]
    EnumParse { column: &'static str, value: String },
}

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("Config Error - {0}")]
    Config(String),

    #[error("Validation Error - {0}")]
    Validation(#[from] ValidationError),

    #[error("Source Error - {0}")]
    Source(String),

    #[error("Publish Error - {0}")]
    Publish(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::ConfigurationMissing,
            Error::Validation(ValidationError::MissingData { .. }) => ErrorKind::MissingData,
            Error::Validation(ValidationError::EnumParse { .. }) => ErrorKind::EnumParseFailure,
            Error::Source(_) => ErrorKind::SourceOperationFailure,
            Error::Publish(_) => ErrorKind::PublishFailure,
            Error::Other(_) => ErrorKind::UnclassifiedFailure,
        }
    }
}

impl From<tokio_postgres::Error> for Error {
    fn from(value: tokio_postgres::Error) -> Self {
        Error::Source(value.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Other(format!("Serialization failed - {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_maps_to_its_kind() {
        let cases = [
            (Error::Config("x".to_string()), ErrorKind::ConfigurationMissing),
            (
                ValidationError::MissingData { column: "email" }.into(),
                ErrorKind::MissingData,
            ),
            (
                ValidationError::EnumParse {
                    column: "brand",
                    value: "ZZ".to_string(),
                }
                .into(),
                ErrorKind::EnumParseFailure,
            ),
            (Error::Source("x".to_string()), ErrorKind::SourceOperationFailure),
            (Error::Publish("x".to_string()), ErrorKind::PublishFailure),
            (Error::Other("x".to_string()), ErrorKind::UnclassifiedFailure),
        ];

        for (error, kind) in cases {
            assert_eq!(error.kind(), kind, "{error}");
        }
    }

    #[test]
    fn test_validation_error_display() {
        let err: Error = ValidationError::EnumParse {
            column: "paymentType",
            value: "UNKNOWN_CODE".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Validation Error - column 'paymentType' has unknown value 'UNKNOWN_CODE'"
        );

        let err = ValidationError::MissingData { column: "reference" };
        assert_eq!(
            err.to_string(),
            "column 'reference' is missing, null or not of the expected type"
        );
    }

    #[test]
    fn test_serde_error_is_unclassified() {
        let serde_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = Error::from(serde_err);
        assert_eq!(err.kind(), ErrorKind::UnclassifiedFailure);
        assert!(err.to_string().starts_with("Serialization failed"));
    }
}
