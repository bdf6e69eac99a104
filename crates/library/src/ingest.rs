//! Ingestion pipeline: raw folder listing in, committed drive out.
//!
//! The pipeline never touches the filesystem itself — it consumes whatever
//! flat listing a [`FolderSource`](hdcat_scan::FolderSource) produced and is
//! purely CPU plus store I/O from there. Progress reporting is the caller's
//! concern; the only side effect here is the store mutation.

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use hdcat_catalog::{FileKind, NewDrive, NewFile, Repository, extension_of};
use hdcat_scan::FileEntry;
use serde::{Deserialize, Serialize};

/// Records accumulated per bulk-insert statement.
///
/// Bounds peak memory and per-statement size when a catalog run covers
/// hundreds of thousands of entries. Correctness does not depend on the
/// value — every batch lands in the same transaction.
pub const BATCH_SIZE: usize = 2000;

/// What to do when the selected folder turns out to contain no files.
///
/// Reasonable people disagree on whether a zero-file drive is worth
/// recording, so it's a configuration choice instead of a hard-coded guess.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyDrivePolicy {
    /// Refuse the run before anything is written.
    #[default]
    Reject,
    /// Record a drive with zero files and zero bytes.
    Accept,
}

/// Catalog one selected folder as a new drive.
///
/// Validates up front (empty name, empty selection per `on_empty`), computes
/// the summary totals in a single cheap pass, then writes the drive row and
/// every classified file record inside one transaction. Any failure along
/// the way rolls the entire run back; readers never observe partial state.
///
/// Returns the store-assigned id of the new drive.
pub async fn ingest(
    repo: &Repository,
    drive_name: &str,
    entries: Vec<FileEntry>,
    on_empty: EmptyDrivePolicy,
) -> Result<i64> {
    let drive_name = drive_name.trim();
    if drive_name.is_empty() {
        exn::bail!(ErrorKind::EmptyDriveName);
    }
    if entries.is_empty() && on_empty == EmptyDrivePolicy::Reject {
        exn::bail!(ErrorKind::EmptySelection);
    }

    // Totals come from one pass over the listing, no per-entry I/O: the
    // summary row is the first thing written and it must already agree with
    // the rows that will follow it into the transaction.
    let total_size: u64 = entries.iter().map(|entry| entry.size).sum();
    let summary = NewDrive::new(drive_name, entries.len() as u64, total_size);

    let mut session = repo.begin_import(&summary).await.or_raise(|| ErrorKind::Catalog)?;
    let mut batch = Vec::with_capacity(BATCH_SIZE.min(entries.len()));
    for entry in &entries {
        batch.push(classify(entry)?);
        if batch.len() >= BATCH_SIZE {
            session.insert_files(&batch).await.or_raise(|| ErrorKind::Catalog)?;
            batch.clear();
        }
    }
    if !batch.is_empty() {
        session.insert_files(&batch).await.or_raise(|| ErrorKind::Catalog)?;
    }
    let drive_id = session.commit().await.or_raise(|| ErrorKind::Catalog)?;
    tracing::info!(drive = drive_name, files = entries.len(), bytes = total_size, "drive cataloged");
    Ok(drive_id)
}

/// Classify one listing entry into an insertable record.
///
/// Kind derivation is deterministic: lowercase whatever follows the last
/// dot of the *name* (`"none"` when there is nothing to take), then map it
/// through the fixed taxonomy.
fn classify(entry: &FileEntry) -> Result<NewFile> {
    let path = entry
        .path
        .to_str()
        .ok_or_raise(|| ErrorKind::InvalidEntry("path is not valid UTF-8"))?
        .to_string();
    let extension = extension_of(&entry.name);
    let kind = FileKind::from_extension(&extension);
    Ok(NewFile {
        name: entry.name.clone(),
        path,
        size: entry.size,
        extension,
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdcat_catalog::{Database, FileFilter};
    use std::path::PathBuf;

    fn entry(path: &str, size: u64) -> FileEntry {
        let path = PathBuf::from(path);
        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        FileEntry { name, path, size }
    }

    async fn repo() -> Repository {
        let db = Database::connect_in_memory().await.unwrap();
        Repository::from(&db)
    }

    #[tokio::test]
    async fn test_ingest_totals_match_listing() {
        let repo = repo().await;
        let entries = vec![
            entry("Fotos/ferias.JPG", 2_000),
            entry("Filmes/viagem.mp4", 50_000),
            entry("LEIAME", 10),
        ];
        let drive_id = ingest(&repo, "HD Externo", entries, EmptyDrivePolicy::Reject).await.unwrap();

        let drives = repo.list_drives().await.unwrap();
        assert_eq!(drives.len(), 1);
        assert_eq!(drives[0].total_files, 3);
        assert_eq!(drives[0].total_size, 52_010);

        let records = repo
            .query_files(&FileFilter { drive_id: Some(drive_id), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(records.len(), 3);
        let photo = records.iter().find(|r| r.name == "ferias.JPG").unwrap();
        assert_eq!(photo.extension, "jpg", "extension is stored lowercase");
        assert_eq!(photo.kind, FileKind::Imagem);
        assert_eq!(photo.path, "Fotos/ferias.JPG");
        let plain = records.iter().find(|r| r.name == "LEIAME").unwrap();
        assert_eq!(plain.extension, "none");
        assert_eq!(plain.kind, FileKind::Outros);
    }

    #[tokio::test]
    async fn test_ingest_spans_multiple_batches() {
        let repo = repo().await;
        let count = BATCH_SIZE * 2 + 25;
        let entries: Vec<FileEntry> = (0..count).map(|i| entry(&format!("bulk/{i}.txt"), 1)).collect();
        let drive_id = ingest(&repo, "Bulk", entries, EmptyDrivePolicy::Reject).await.unwrap();

        let drives = repo.list_drives().await.unwrap();
        assert_eq!(drives[0].total_files, count as u64);
        assert_eq!(drives[0].total_size, count as u64);
        let records = repo
            .query_files(&FileFilter { drive_id: Some(drive_id), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(records.len(), count);
    }

    #[tokio::test]
    async fn test_empty_name_rejected_before_any_mutation() {
        let repo = repo().await;
        let err = ingest(&repo, "   ", vec![entry("a.txt", 1)], EmptyDrivePolicy::Reject)
            .await
            .unwrap_err();
        assert!(matches!(&*err, ErrorKind::EmptyDriveName));
        assert!(repo.list_drives().await.unwrap().is_empty());
        assert_eq!(repo.count_files().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_selection_policy_reject() {
        let repo = repo().await;
        let err = ingest(&repo, "Vazio", Vec::new(), EmptyDrivePolicy::Reject).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::EmptySelection));
        assert!(repo.list_drives().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_selection_policy_accept() {
        let repo = repo().await;
        let drive_id = ingest(&repo, "Vazio", Vec::new(), EmptyDrivePolicy::Accept).await.unwrap();
        let drive = repo.get_drive(drive_id).await.unwrap();
        assert_eq!(drive.total_files, 0);
        assert_eq!(drive.total_size, 0);
        assert_eq!(repo.count_files().await.unwrap(), 0);
    }

    /// A failure between batch flushes must leave nothing behind: not the
    /// drive row, not the batches already sent to the store.
    #[cfg(unix)]
    #[tokio::test]
    async fn test_failure_after_first_batch_rolls_back_everything() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let repo = repo().await;
        // Enough valid entries to flush a full batch, then one whose path
        // cannot be represented, failing the run partway through.
        let mut entries: Vec<FileEntry> =
            (0..BATCH_SIZE + 10).map(|i| entry(&format!("ok/{i}.txt"), 1)).collect();
        entries.push(FileEntry {
            name: "bad".to_string(),
            path: PathBuf::from(OsString::from_vec(vec![b'b', 0xFF, b'd'])),
            size: 1,
        });

        let err = ingest(&repo, "Doomed", entries, EmptyDrivePolicy::Reject).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidEntry(_)));
        assert!(repo.list_drives().await.unwrap().is_empty(), "drive row must roll back");
        assert_eq!(repo.count_files().await.unwrap(), 0, "flushed batches must roll back");
    }
}
