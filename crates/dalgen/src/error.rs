//! Error types for dalgen operations.
//!
//! I/O and schema problems fail fast. Reference problems are collected across the whole
//! generation set and surface together as [`GenError::Unresolved`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dalgen operations.
pub type Result<T> = std::result::Result<T, GenError>;

/// Top-level error type for loading, resolving and generating.
#[derive(Error, Debug)]
pub enum GenError {
    /// File system error (schema or manifest read, output write)
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Schema file could not be understood
    #[error("Schema error in {path}: {message}")]
    Schema {
        /// Schema file
        path: PathBuf,
        /// What went wrong
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generator configuration was rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reference errors accumulated over the generation set
    #[error("{} found", count_summary(.errors.len()))]
    Unresolved {
        /// Every problem found, in generation order
        errors: Vec<ReferenceError>,
    },
}

impl GenError {
    /// Create an I/O error for a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a schema error from a message and optional source.
    pub fn schema<E>(path: impl Into<PathBuf>, message: impl Into<String>, source: Option<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Schema {
            path: path.into(),
            message: message.into(),
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Accumulated reference errors, if this is a batch.
    pub fn reference_errors(&self) -> &[ReferenceError] {
        match self {
            Self::Unresolved { errors } => errors,
            _ => &[],
        }
    }
}

fn count_summary(count: usize) -> String {
    if count == 1 {
        "1 error was".to_string()
    } else {
        format!("{count} errors were")
    }
}

/// A single unresolved edge of the class graph.
///
/// Every variant names the class that owns the edge, so a batch report can be acted on
/// without re-running the generator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// A class named for generation is not in the schema
    #[error("can not find class \"{class}\"")]
    UnknownClass {
        /// Requested class name
        class: String,
    },

    /// Relationship target is not defined by the schema
    #[error("the class \"{target}\" (it is used by the relationship \"{relationship}\" of class \"{class}\") is not defined by the schema")]
    UnknownRelationshipTarget {
        /// Owning class
        class: String,
        /// Relationship name
        relationship: String,
        /// Missing target class
        target: String,
    },

    /// Direct superclass is not defined by the schema
    #[error("the class \"{superclass}\" (it is direct superclass of class \"{class}\") is not defined by the schema")]
    UnknownSuperclass {
        /// Owning class
        class: String,
        /// Missing superclass
        superclass: String,
    },

    /// Relationship target is neither generated, overridden, nor listed by any manifest
    #[error("the class \"{target}\" is used by the relationship \"{relationship}\" of class \"{class}\"; it is not in the list of generated classes, it was not found in any manifest of the search directories and it is not defined by a user override")]
    UnresolvedRelationshipTarget {
        /// Owning class
        class: String,
        /// Relationship name
        relationship: String,
        /// External target class
        target: String,
    },

    /// Superclass is neither generated, overridden, nor listed by any manifest
    #[error("the class \"{superclass}\" is direct superclass of class \"{class}\"; it is not in the list of generated classes, it was not found in any manifest of the search directories and it is not defined by a user override")]
    UnresolvedSuperclass {
        /// Owning class
        class: String,
        /// External superclass
        superclass: String,
    },
}

impl ReferenceError {
    /// Class that owns the failing edge.
    pub fn owner(&self) -> &str {
        match self {
            Self::UnknownClass { class }
            | Self::UnknownRelationshipTarget { class, .. }
            | Self::UnknownSuperclass { class, .. }
            | Self::UnresolvedRelationshipTarget { class, .. }
            | Self::UnresolvedSuperclass { class, .. } => class,
        }
    }
}
