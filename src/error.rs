//! Error types for pizzaz-mcp.
//!
//! Startup errors ([`ConfigError`], [`AssetError`], [`CatalogError`]) are fatal:
//! the server refuses to start serving. Per-request failures never use these
//! types; they are converted into protocol-level error responses by the
//! dispatcher.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors raised while loading compiled widget artifacts from disk.
#[derive(Error, Debug)]
pub enum AssetError {
    /// The assets directory does not exist or is not a directory.
    #[error("assets directory not found: {path}")]
    DirectoryNotFound {
        /// Directory that was expected to hold the build output.
        path: PathBuf,
    },

    /// The glob pattern built from the assets directory is invalid.
    #[error("invalid assets pattern: {pattern}")]
    Pattern {
        /// The offending pattern.
        pattern: String,
        /// The underlying glob error.
        #[source]
        source: glob::PatternError,
    },

    /// An artifact file could not be read.
    #[error("failed to read artifact: {path}")]
    ReadError {
        /// Path to the artifact file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Catalog integrity violations detected at startup.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CatalogError {
    /// Two widgets declare the same identifier.
    #[error("duplicate widget identifier: {identifier}")]
    DuplicateIdentifier {
        /// The identifier declared more than once.
        identifier: String,
    },

    /// A widget has no compiled artifact.
    #[error("no compiled artifact for widget '{identifier}'")]
    MissingArtifact {
        /// Identifier of the widget without markup.
        identifier: String,
    },
}

/// Errors from running a transport.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The HTTP listener could not bind.
    #[error("failed to bind {addr}")]
    Bind {
        /// Address that was requested.
        addr: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP server stopped with an error.
    #[error("HTTP server error")]
    Serve(#[source] std::io::Error),

    /// stdio transport I/O failed.
    #[error("transport I/O error")]
    Io(#[from] std::io::Error),
}

/// Failure raised by a widget while executing.
///
/// The dispatcher reports these to the client as `isError` results; they
/// never abort the request handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// An upstream data source failed.
    #[error("upstream request failed: {0}")]
    Upstream(String),

    /// Validated arguments could not be mapped onto the widget's input type.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Any other execution failure.
    #[error("{0}")]
    Internal(String),
}
