use std::{fmt, io};

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum PayoffError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Custom error: {0}")]
    Custom(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("You do not have permission to access this resource")]
    PermissionDenied,
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for PayoffError {
    fn from(src: toml::de::Error) -> PayoffError {
        PayoffError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for PayoffError {
    fn from(src: toml::ser::Error) -> PayoffError {
        PayoffError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for PayoffError {
    fn from(src: JsonError) -> PayoffError {
        PayoffError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<io::Error> for PayoffError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => PayoffError::NotFound(format!("{x}")),
            io::ErrorKind::PermissionDenied => PayoffError::PermissionDenied,
            _ => PayoffError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<fmt::Error> for PayoffError {
    fn from(x: fmt::Error) -> Self {
        PayoffError::Custom(format!("{x}"))
    }
}
