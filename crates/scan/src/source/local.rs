//! Local filesystem folder source.
//!
//! Walks a directory tree with `tokio::fs` and yields one [`FileEntry`] per
//! regular file found, with paths relative to the selected root.

use crate::error::{ErrorKind, Result};
use crate::models::FileEntry;
use crate::path::validate as validate_path;
use crate::source::{FileEntryStream, FolderSource};
use async_stream::stream;
use async_trait::async_trait;
use exn::ResultExt;
use std::path::{Path, PathBuf};
use tokio::fs::{self, DirEntry};

enum WalkEntry {
    File(FileEntry),
    Descend(PathBuf),
    Skip,
}

/// A user-selected folder on the local filesystem.
///
/// # Examples
///
/// ```no_run
/// use hdcat_scan::LocalFolder;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let source = LocalFolder::new("HD Externo Backup", "/mnt/backup")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalFolder {
    name: String,
    /// Root of the selected tree
    root: PathBuf,
}

impl LocalFolder {
    /// Open a folder source rooted at an existing directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute, does not exist, or is
    /// not a directory. Unlike a storage backend, a listing source never
    /// creates its root: cataloging a folder that isn't there is a mistake,
    /// not a bootstrap.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if !root.exists() {
            exn::bail!(ErrorKind::NotFound(root));
        }
        if !root.is_dir() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        let name = name.into();
        tracing::debug!(source = %name, root = %root.display(), "opened folder source");
        Ok(Self { name, root })
    }

    /// Convert an absolute walk path back to a relative listing path.
    fn relative_path(&self, absolute: &Path) -> Result<PathBuf> {
        let relative = absolute
            .strip_prefix(&self.root)
            .or_raise(|| ErrorKind::InvalidPath(absolute.to_path_buf()))?;
        // Validation also normalizes the path.
        validate_path(relative)
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }

    /// Classify a directory entry for the walk loop.
    ///
    /// Extracted into a helper because the stream loop can't `?` errors —
    /// they have to be converted, yielded, and the loop continued.
    async fn process_entry(&self, entry: DirEntry) -> Result<WalkEntry> {
        let path = entry.path();
        let metadata = entry.metadata().await.map_err(|e| Self::map_io_error(e, &path))?;
        if metadata.is_dir() {
            return Ok(WalkEntry::Descend(path));
        }
        if metadata.is_file() {
            let relative = self.relative_path(&path)?;
            let name = match relative.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                // Cataloging stores paths as text; a name that isn't UTF-8
                // can't be represented faithfully.
                None => exn::bail!(ErrorKind::InvalidPath(relative)),
            };
            return Ok(WalkEntry::File(FileEntry::new(relative, name, metadata.len())));
        }
        // Note: silently drop what is most likely a broken symlink.
        Ok(WalkEntry::Skip)
    }
}

#[async_trait]
impl FolderSource for LocalFolder {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream(&self) -> FileEntryStream<'_> {
        let mut stack = vec![self.root.clone()];
        Box::pin(stream! {
            'dirs: while let Some(current) = stack.pop() {
                let mut entries = match fs::read_dir(&current).await {
                    Ok(entries) => entries,
                    // A directory that vanished mid-walk (drive unplugged,
                    // concurrent cleanup) yields nothing rather than killing
                    // the whole listing.
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                    Err(err) => {
                        yield Err(exn::Exn::from(Self::map_io_error(err, &current)));
                        continue 'dirs;
                    }
                };

                'entries: loop {
                    let entry = match entries.next_entry().await {
                        Ok(Some(entry)) => entry,
                        Ok(None) => break 'entries,
                        Err(e) => { yield Err(exn::Exn::from(Self::map_io_error(e, &current))); continue 'entries; },
                    };
                    match self.process_entry(entry).await {
                        Ok(WalkEntry::File(f)) => yield Ok(f),
                        Ok(WalkEntry::Descend(d)) => stack.push(d),
                        Ok(WalkEntry::Skip) => {},
                        Err(e) => yield Err(e),
                    };
                }
            }
        })
    }
}
