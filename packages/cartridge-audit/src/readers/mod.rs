//! Archive reader implementations.
//!
//! - `ZipArchiveReader` - zip-compressed course packages
//! - `MockArchiveReader` (in [`crate::testing`]) - canned contents for tests
//!
//! # Example
//!
//! ```rust,ignore
//! use cartridge_audit::readers::ZipArchiveReader;
//! use cartridge_audit::traits::archive::ArchiveReader;
//!
//! let files = ZipArchiveReader::new().read_package(bytes, "web_resources/").await?;
//! ```

mod zip_reader;

pub use zip_reader::ZipArchiveReader;

// Re-export from traits for convenience
pub use crate::traits::archive::ArchiveReader;
