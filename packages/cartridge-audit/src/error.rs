//! Typed errors for package analysis.
//!
//! Only `AnalysisError` aborts an analysis. Problems inside individual
//! content files are recovered where they occur and never surface here.

use thiserror::Error;

/// Errors that abort a whole package analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The package could not be decompressed
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// No manifest at the configured path
    #[error("manifest not found in package: {path}")]
    ManifestMissing { path: String },

    /// No module metadata at the configured path
    #[error("module metadata not found in package: {path}")]
    ModuleMetaMissing { path: String },

    /// The manifest or module metadata is not well-formed XML
    #[error("malformed XML in {path}: {source}")]
    MalformedXml {
        path: String,
        #[source]
        source: roxmltree::Error,
    },

    /// A resource depends on an identifier the manifest never declares
    #[error("resource {resource} depends on undeclared resource {dependency}")]
    UnresolvedDependency { resource: String, dependency: String },

    /// A dependency resource declares no file to read
    #[error("dependency {dependency} of resource {resource} has no href")]
    DependencyWithoutHref { resource: String, dependency: String },

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

/// Errors from an archive reader.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The blob is not a readable zip archive
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Reading an entry failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking decompression task did not complete
    #[error("decompression task failed: {0}")]
    Task(String),
}

/// Errors from an audit engine.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The engine raised an error while scanning
    #[error("audit engine error: {0}")]
    Engine(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The engine cannot handle this fragment or profile
    #[error("unsupported audit request: {0}")]
    Unsupported(String),
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Result type alias for archive operations.
pub type ArchiveResult<T> = std::result::Result<T, ArchiveError>;

/// Result type alias for audit operations.
pub type AuditResult<T> = std::result::Result<T, AuditError>;
