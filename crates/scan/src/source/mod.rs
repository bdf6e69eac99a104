//! Folder source trait and implementations.
//!
//! A `FolderSource` is the cataloging equivalent of a browser's folder
//! picker: it turns a user-chosen directory tree into a flat sequence of
//! [`FileEntry`] values. The ingestion pipeline consumes that sequence as an
//! opaque, already-flattened input and never goes back to the filesystem.

mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::local::LocalFolder;
#[cfg(feature = "mock")]
pub use self::mock::MockFolder;
use crate::error::Result;
use crate::models::FileEntry;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::pin::Pin;

pub(crate) type FileEntryStream<'a> = Pin<Box<dyn Stream<Item = Result<FileEntry>> + Send + 'a>>;

/// Unified interface for folder listing sources.
///
/// Listing is asynchronous and streaming so that catalogs with hundreds of
/// thousands of entries start flowing immediately instead of materializing
/// up front. Sources are read-only: nothing in hdcat ever opens, writes, or
/// deletes the files it catalogs.
///
/// # Examples
///
/// ```no_run
/// use hdcat_scan::{FolderSource, error::Result};
///
/// async fn count_bytes(source: &dyn FolderSource) -> Result<u64> {
///     let entries = source.list().await?;
///     Ok(entries.iter().map(|entry| entry.size).sum())
/// }
/// ```
#[async_trait]
pub trait FolderSource: Send + Sync {
    /// Label of the source, used for logging only.
    fn name(&self) -> &str;

    /// Stream every file under the selected folder.
    ///
    /// Entries arrive in no particular order; directory structure is
    /// retained only as segments of each entry's relative path.
    fn list_stream(&self) -> FileEntryStream<'_>;

    /// List all files by collecting [`list_stream`](Self::list_stream)
    /// into a [`Vec`].
    async fn list(&self) -> Result<Vec<FileEntry>> {
        self.list_stream().try_collect().await
    }
}
