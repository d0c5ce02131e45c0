//! Archive reader trait for turning a package blob into text entries.
//!
//! Decompression is one of the two suspension points of an analysis, so
//! readers are async even when the underlying codec is synchronous.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cartridge_audit::readers::ZipArchiveReader;
//! use cartridge_audit::traits::archive::ArchiveReader;
//!
//! let files = ZipArchiveReader::new()
//!     .read_package(bytes, "web_resources/")
//!     .await?;
//! let manifest = files.get("imsmanifest.xml");
//! ```

use async_trait::async_trait;

use crate::error::ArchiveResult;
use crate::types::package::PackageFiles;

/// Decompresses a package into a mapping of internal path to text.
///
/// Implementations must:
/// - leave out directory entries
/// - leave out every entry under `asset_prefix`
/// - decode each remaining entry as text (lossy where needed)
#[async_trait]
pub trait ArchiveReader: Send + Sync {
    /// Read every text entry of a package.
    ///
    /// # Arguments
    ///
    /// * `bytes` - The compressed package
    /// * `asset_prefix` - Binary asset subtree to skip
    async fn read_package(&self, bytes: Vec<u8>, asset_prefix: &str)
        -> ArchiveResult<PackageFiles>;

    /// Get the reader name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

/// Whether an archive entry belongs in [`PackageFiles`].
pub fn is_text_entry(name: &str, is_dir: bool, asset_prefix: &str) -> bool {
    !is_dir && !name.ends_with('/') && (asset_prefix.is_empty() || !name.starts_with(asset_prefix))
}
