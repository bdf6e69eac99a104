//! Query engine: filtered search, pagination, and aggregate summaries.
//!
//! Everything here is either a push-down to the store's indexed query path
//! or a pure function over rows already in hand — the engine holds no state
//! of its own, so a live consumer can re-run any of it after each
//! [`CatalogEvent`](hdcat_catalog::CatalogEvent).

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use hdcat_catalog::{Drive, FileFilter, FileKind, FileRecord, Repository};
use std::collections::BTreeMap;

/// Fixed number of results per page.
pub const PAGE_SIZE: usize = 50;

const BYTES_PER_GB: f64 = (1024u64 * 1024 * 1024) as f64;

/// Search input: all dimensions optional, combined with AND.
///
/// A `None` dimension matches everything, so the default value is the
/// unfiltered catalog. `query` matches case-insensitively against file name
/// OR path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub query: Option<String>,
    pub kind: Option<FileKind>,
    pub drive_id: Option<i64>,
    /// Minimum size in bytes.
    pub min_size: Option<u64>,
}

impl SearchFilter {
    fn to_store_filter(&self) -> FileFilter {
        FileFilter {
            drive_id: self.drive_id,
            kind: self.kind,
            // A blank query box means "no text filter", not "match blank".
            substring: self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()).map(String::from),
            min_size: self.min_size,
        }
    }
}

/// Run a filtered search against the catalog.
///
/// Results come back newest-first; slice them with [`paginate`].
pub async fn search(repo: &Repository, filter: &SearchFilter) -> Result<Vec<FileRecord>> {
    repo.query_files(&filter.to_store_filter()).await.or_raise(|| ErrorKind::Catalog)
}

/// Pure, stateless slice of a result set.
///
/// Pages are 1-based and [`PAGE_SIZE`] long; page 0 is treated as page 1,
/// and a page past the end is an empty slice, never an error.
pub fn paginate<T>(items: &[T], page: usize) -> &[T] {
    let start = page.max(1).saturating_sub(1).saturating_mul(PAGE_SIZE);
    if start >= items.len() {
        return &[];
    }
    let end = (start + PAGE_SIZE).min(items.len());
    &items[start..end]
}

/// Total bytes per kind across the given rows, in one pass.
///
/// Derived for reporting, never persisted. Kinds with no rows are absent
/// from the map.
pub fn usage_by_kind(files: &[FileRecord]) -> BTreeMap<FileKind, u64> {
    let mut totals = BTreeMap::new();
    for file in files {
        *totals.entry(file.kind).or_insert(0u64) += file.size;
    }
    totals
}

/// Per-drive usage line for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveUsage {
    pub name: String,
    /// Total size in gigabytes (1 GB = 1024³ bytes).
    pub size_gb: f64,
    pub files: u64,
}

/// Project drive summaries into reporting rows.
///
/// Trusts the persisted totals invariant — no recomputation from file rows.
pub fn usage_by_drive(drives: &[Drive]) -> Vec<DriveUsage> {
    drives
        .iter()
        .map(|drive| DriveUsage {
            name: drive.name.clone(),
            size_gb: drive.total_size as f64 / BYTES_PER_GB,
            files: drive.total_files,
        })
        .collect()
}
