//! Typed error handling for deadmethod.
//!
//! Every fatal condition of an analysis run maps to one variant, so library
//! consumers (and the CLI's exit-code mapping) can match on what went wrong.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for deadmethod operations.
#[derive(Error, Debug)]
pub enum DeadmethodError {
    /// The target package path is not part of the loaded program
    #[error("package {package} not found in the loaded program")]
    PackageNotFound { package: String },

    /// The target package has no top-level identifier with this name
    #[error("type {name} not found in package {package}")]
    TypeNotFound { package: String, name: String },

    /// The identifier exists but cannot carry a method set
    #[error("{package}.{name} is not a named type (found {found})")]
    NotANamedType {
        package: String,
        name: String,
        /// What the identifier actually resolved to ("func", "alias", ...)
        found: String,
    },

    /// The typed program could not be loaded, or is not fully type-checked
    #[error("program load error at {path}: {message}")]
    ProgramLoad { path: PathBuf, message: String },

    /// Configuration file errors
    #[error("config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// I/O error when reading files
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The usage scan was interrupted before it finished
    #[error("analysis cancelled")]
    Cancelled,
}

impl DeadmethodError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a package-not-found error.
    pub fn package_not_found(package: impl Into<String>) -> Self {
        Self::PackageNotFound {
            package: package.into(),
        }
    }

    /// Create a type-not-found error.
    pub fn type_not_found(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::TypeNotFound {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Create a not-a-named-type error.
    pub fn not_a_named_type(
        package: impl Into<String>,
        name: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::NotANamedType {
            package: package.into(),
            name: name.into(),
            found: found.into(),
        }
    }

    /// Create a program load error.
    pub fn program_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ProgramLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this error comes from resolving the target type.
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::PackageNotFound { .. } | Self::TypeNotFound { .. } | Self::NotANamedType { .. }
        )
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::ProgramLoad { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            Self::Io { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Convenience type alias for deadmethod results.
pub type DeadmethodResult<T> = Result<T, DeadmethodError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> DeadmethodResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> DeadmethodResult<T> {
        self.map_err(|e| DeadmethodError::io(path, e))
    }
}
