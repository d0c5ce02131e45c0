//! Zip-based archive reader.
//!
//! Course packages are plain zip files. Decompression runs on the blocking
//! pool so the caller's runtime is never stalled by a large package.

use async_trait::async_trait;
use std::io::{Cursor, Read};
use tracing::{debug, info};

use crate::error::{ArchiveError, ArchiveResult};
use crate::traits::archive::{is_text_entry, ArchiveReader};
use crate::types::package::PackageFiles;

/// Upper bound on the up-front buffer for one entry. Larger entries grow
/// the buffer as they are read.
const MAX_PREALLOC: u64 = 1 << 20;

/// Archive reader for zip-compressed packages.
#[derive(Debug, Clone, Default)]
pub struct ZipArchiveReader;

impl ZipArchiveReader {
    pub fn new() -> Self {
        Self
    }

    /// Decompress synchronously.
    pub fn read_blocking(bytes: &[u8], asset_prefix: &str) -> ArchiveResult<PackageFiles> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let mut files = PackageFiles::new();
        let mut skipped = 0usize;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_string();

            if !is_text_entry(&name, entry.is_dir(), asset_prefix) {
                skipped += 1;
                continue;
            }

            let mut buf = Vec::with_capacity(preallocation(entry.size()));
            entry.read_to_end(&mut buf)?;
            files.insert(name, String::from_utf8_lossy(&buf).into_owned());
        }

        debug!(entries = files.len(), skipped, "Decompressed package");
        Ok(files)
    }
}

/// Buffer capacity for an entry whose header declares `declared` bytes.
///
/// The header size is untrusted, so the reservation is capped.
fn preallocation(declared: u64) -> usize {
    usize::try_from(declared.min(MAX_PREALLOC)).unwrap_or(0)
}

#[async_trait]
impl ArchiveReader for ZipArchiveReader {
    async fn read_package(
        &self,
        bytes: Vec<u8>,
        asset_prefix: &str,
    ) -> ArchiveResult<PackageFiles> {
        let size = bytes.len();
        let prefix = asset_prefix.to_string();

        let files = tokio::task::spawn_blocking(move || Self::read_blocking(&bytes, &prefix))
            .await
            .map_err(|e| ArchiveError::Task(e.to_string()))??;

        info!(bytes = size, entries = files.len(), "Read package archive");
        Ok(files)
    }

    fn name(&self) -> &str {
        "zip"
    }
}
