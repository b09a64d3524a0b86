//! Centralized error handling for schema metadata construction.
//!
//! Only *constraint violations* surface as errors: a range whose endpoints do
//! not match the declared column type, a boolean dictionary whose two classes
//! coincide, a rename onto a label that is already taken. Capacity overflow
//! (column cap, nominal value cap) and count underflow are absorbed into wider
//! uncertainty and never reach the caller as an error.
//!
//! ```
//! use tablefacts::column::{ColumnBuilder, ColumnType, ObjectRange, ObjectValue};
//! use tablefacts::error::MetadataError;
//! use tablefacts::facts::SetRelation;
//!
//! let range = ObjectRange::new(
//!     ObjectValue::Text("a".to_owned()),
//!     ObjectValue::Text("z".to_owned()),
//! )?;
//! let mut builder = ColumnBuilder::new(ColumnType::DateTime);
//! match builder.set_object_range(Some(range), SetRelation::Equal) {
//!     Err(MetadataError::TypeMismatch { .. }) => {}
//!     other => panic!("expected a type mismatch, got {other:?}"),
//! }
//! # Ok::<(), MetadataError>(())
//! ```

use std::fmt;

/// Main error type for metadata operations.
#[derive(Debug)]
pub enum MetadataError {
    /// A value or range does not match the declared column type
    TypeMismatch { expected: String, found: String },

    /// A range that can never describe a column (mixed endpoint kinds, inverted object bounds)
    InvalidRange(String),

    /// A dictionary that violates its own invariants
    InvalidDictionary(String),

    /// The referenced column label is not part of the table
    NoSuchColumn(String),

    /// The label is already used by another column
    DuplicateLabel(String),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for MetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch { expected, found } => {
                write!(f, "Type mismatch: expected {expected}, found {found}")
            }
            Self::InvalidRange(msg) => write!(f, "Invalid range: {msg}"),
            Self::InvalidDictionary(msg) => write!(f, "Invalid dictionary: {msg}"),
            Self::NoSuchColumn(label) => write!(f, "No such column: {label}"),
            Self::DuplicateLabel(label) => write!(f, "Duplicate column label: {label}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for MetadataError {}

/// Result type alias for metadata operations.
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<MetadataError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: MetadataError = e.into();
            MetadataError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: MetadataError = e.into();
            MetadataError::Other(format!("{}: {}", f(), err))
        })
    }
}
