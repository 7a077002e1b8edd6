//! Error types for xml-flatdiff.

use thiserror::Error;

/// Result type alias for xml-flatdiff operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing, flattening, editing or serializing.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed XML input. Carries the underlying parser message.
    #[error("XML parse error at byte {position}: {message}")]
    Parse {
        /// Parser message.
        message: String,
        /// Byte offset into the input where the error was detected.
        position: u64,
    },

    /// The editable tree could not be written back to XML.
    #[error("cannot serialize tree: {0}")]
    Serialize(String),

    /// No node with the given identifier exists in the tree.
    #[error("no node with path {0}")]
    NodeNotFound(String),

    /// A name is not usable as an XML element or attribute name.
    #[error("invalid XML name: {0:?}")]
    InvalidName(String),

    /// The comparison worker or its channel failed.
    #[error("comparison worker failed: {0}")]
    Worker(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn parse(message: impl Into<String>, position: u64) -> Self {
        Error::Parse {
            message: message.into(),
            position,
        }
    }
}
