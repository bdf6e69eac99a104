//! In-memory folder source for testing.

use crate::error::Result;
use crate::models::FileEntry;
use crate::path::validate as validate_path;
use crate::source::{FileEntryStream, FolderSource};
use async_trait::async_trait;
use std::path::PathBuf;

/// In-memory folder source for testing.
///
/// Holds a fixed listing, so ingestion and CLI tests can run without a
/// filesystem. Entries are yielded in insertion order.
///
/// # Examples
///
/// ```
/// use hdcat_scan::{FolderSource, MockFolder};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = MockFolder::with_files([
///     ("Fotos/ferias.jpg", 2048),
///     ("notas.txt", 64),
/// ]);
/// assert_eq!(source.list().await?.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct MockFolder {
    name: String,
    entries: Vec<FileEntry>,
}

impl MockFolder {
    /// Create a mock source pre-populated with `(path, size)` pairs.
    ///
    /// Panics if any path fails validation (e.g. path traversal). If test
    /// setup is wrong, then the test should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, u64)>) -> Self {
        let entries = files
            .into_iter()
            .map(|(path, size)| {
                let path = path.into();
                let Ok(validated) = validate_path(&path) else {
                    // The panic here is DELIBERATE. MockFolder is intended to
                    // be used in tests; panics are expected. There is no
                    // error result.
                    panic!("MockFolder::with_files: invalid path {}", path.display());
                };
                let Some(name) = validated.file_name().and_then(|n| n.to_str()).map(String::from) else {
                    panic!("MockFolder::with_files: unusable file name {}", path.display());
                };
                FileEntry::new(validated, name, size)
            })
            .collect();
        Self { name: "mock".to_string(), entries }
    }

    /// Change the name of the mock source.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for MockFolder {
    fn default() -> Self {
        Self { name: "mock".to_string(), entries: Vec::new() }
    }
}

#[async_trait]
impl FolderSource for MockFolder {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream(&self) -> FileEntryStream<'_> {
        Box::pin(futures::stream::iter(self.entries.iter().cloned().map(Result::Ok)))
    }
}
