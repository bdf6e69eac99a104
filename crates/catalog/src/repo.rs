//! Repository for the drive and file collections.
//!
//! The two collections are tightly coupled: a drive summary is meaningless
//! without the file rows it totals, and file rows are meaningless without
//! their drive. The only multi-step write (importing a drive) therefore
//! runs inside a single [`ImportSession`] transaction so readers never see
//! one collection without the other.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::events::CatalogEvent;
use crate::models::{Drive, DriveRow, FileKind, FileRecord, FileRow, NewDrive, NewFile};
use exn::ResultExt;
use sqlx::sqlite::SqlitePool;
use sqlx::{QueryBuilder, Sqlite, Transaction};
use tokio::sync::broadcast;

/// Filter for [`Repository::query_files`].
///
/// Every dimension is optional; `None` matches everything, and present
/// dimensions combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileFilter {
    /// Only rows belonging to this drive.
    pub drive_id: Option<i64>,
    /// Only rows of this kind.
    pub kind: Option<FileKind>,
    /// Case-insensitive substring over name OR path.
    pub substring: Option<String>,
    /// Only rows at least this many bytes.
    pub min_size: Option<u64>,
}

/// How many events may queue per subscriber before the slowest one starts
/// losing the oldest.
const EVENT_CAPACITY: usize = 32;

/// SQLite allows 32k bound parameters per statement; at seven columns per
/// file row this cap leaves comfortable headroom.
pub const MAX_BATCH_ROWS: usize = 4000;

/// Map an sqlx error to the right catalog kind.
///
/// SQLITE_FULL (primary result code 13) means the database or the disk
/// holding it has no room left; callers want to distinguish that from a
/// plain query failure.
fn classify(err: &sqlx::Error) -> ErrorKind {
    match err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("13") => ErrorKind::QuotaExceeded,
        _ => ErrorKind::Database,
    }
}

fn raise_db<T>(result: std::result::Result<T, sqlx::Error>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => {
            let kind = classify(&err);
            Err(err).or_raise(|| kind)
        },
    }
}

/// Repository for managing drives and their file rows.
///
/// Cheap to clone: a handle over the connection pool plus the commit
/// notification channel. Construct one per store handle and pass it to
/// whatever needs catalog access; there is no process-wide singleton.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
    events: broadcast::Sender<CatalogEvent>,
}

impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self::new(db.pool().clone())
    }
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { pool, events }
    }

    /// Subscribe to commit notifications.
    ///
    /// Every committed write transaction publishes one [`CatalogEvent`].
    /// Subscribers re-pull whatever view they hold instead of polling.
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    // =========================================================================
    // Insert
    // =========================================================================

    /// Insert a drive summary on its own, without any file rows.
    ///
    /// Equivalent to opening an import session and committing it untouched.
    /// Returns the store-assigned drive id.
    pub async fn create_drive(&self, drive: &NewDrive) -> Result<i64> {
        self.begin_import(drive).await?.commit().await
    }

    /// Open the atomic unit for one cataloging run.
    ///
    /// The drive summary row is inserted first (its id is needed by every
    /// file row), then the caller streams batches in via
    /// [`ImportSession::insert_files`] and finishes with
    /// [`ImportSession::commit`]. Dropping the session without committing
    /// rolls the whole run back, drive row included, so concurrent readers
    /// never observe a drive whose totals disagree with the rows present.
    pub async fn begin_import(&self, drive: &NewDrive) -> Result<ImportSession> {
        let mut tx = raise_db(self.pool.begin().await)?;
        let total_files =
            i64::try_from(drive.total_files).or_raise(|| ErrorKind::InvalidData("file count"))?;
        let total_size =
            i64::try_from(drive.total_size).or_raise(|| ErrorKind::InvalidData("total size"))?;
        let result = raise_db(
            sqlx::query(include_str!("../queries/insert_drive.sql"))
                .bind(&drive.name)
                .bind(drive.scanned_at.unix_timestamp())
                .bind(total_files)
                .bind(total_size)
                .execute(&mut *tx)
                .await,
        )?;
        Ok(ImportSession {
            tx,
            events: self.events.clone(),
            drive_id: result.last_insert_rowid(),
            drive_name: drive.name.clone(),
            inserted: 0,
        })
    }

    // =========================================================================
    // Query
    // =========================================================================

    /// Return all file rows matching the filter.
    ///
    /// All filter dimensions are conjunctive and optional; an absent
    /// dimension matches everything. Drive and kind equality are pushed down
    /// to the indexed columns; the substring match (case-insensitive over
    /// name OR path, ASCII folding only) necessarily scans every candidate
    /// row left after the equality filters — O(n) in that subset.
    ///
    /// Rows come back newest-first (`ORDER BY id DESC`), so repeated calls
    /// against an unchanged store return identical sequences.
    pub async fn query_files(&self, filter: &FileFilter) -> Result<Vec<FileRecord>> {
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, drive_id, drive_name, name, path, size, extension, kind FROM files WHERE 1 = 1",
        );
        if let Some(drive_id) = filter.drive_id {
            query.push(" AND drive_id = ").push_bind(drive_id);
        }
        if let Some(kind) = filter.kind {
            query.push(" AND kind = ").push_bind(kind.as_str());
        }
        if let Some(min_size) = filter.min_size {
            let min_size = i64::try_from(min_size).or_raise(|| ErrorKind::InvalidData("size filter"))?;
            query.push(" AND size >= ").push_bind(min_size);
        }
        if let Some(needle) = &filter.substring {
            let needle = needle.to_lowercase();
            query
                .push(" AND (instr(lower(name), ")
                .push_bind(needle.clone())
                .push(") > 0 OR instr(lower(path), ")
                .push_bind(needle)
                .push(") > 0)");
        }
        query.push(" ORDER BY id DESC");
        let rows: Vec<FileRow> = raise_db(query.build_query_as().fetch_all(&self.pool).await)?;
        rows.into_iter().map(FileRecord::try_from).collect()
    }

    /// List all drive summaries, oldest first.
    pub async fn list_drives(&self) -> Result<Vec<Drive>> {
        let rows: Vec<DriveRow> = raise_db(
            sqlx::query_as(include_str!("../queries/list_drives.sql")).fetch_all(&self.pool).await,
        )?;
        rows.into_iter().map(Drive::try_from).collect()
    }

    /// Get one drive summary by id.
    pub async fn get_drive(&self, drive_id: i64) -> Result<Drive> {
        let row: Option<DriveRow> = raise_db(
            sqlx::query_as(include_str!("../queries/get_drive.sql"))
                .bind(drive_id)
                .fetch_optional(&self.pool)
                .await,
        )?;
        match row {
            Some(row) => row.try_into(),
            None => exn::bail!(ErrorKind::DriveNotFound(drive_id)),
        }
    }

    /// Count file rows across all drives.
    pub async fn count_files(&self) -> Result<u64> {
        let count: i64 = raise_db(
            sqlx::query_scalar(include_str!("../queries/count_files.sql")).fetch_one(&self.pool).await,
        )?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("file count"))
    }

    /// Most recently cataloged `(path, size)` pairs, newest first.
    ///
    /// A cheap projection for building prompts and previews without paying
    /// for full rows.
    pub async fn sample_files(&self, limit: usize) -> Result<Vec<(String, u64)>> {
        let limit = i64::try_from(limit).or_raise(|| ErrorKind::InvalidData("limit"))?;
        let rows: Vec<(String, i64)> = raise_db(
            sqlx::query_as(include_str!("../queries/sample_files.sql"))
                .bind(limit)
                .fetch_all(&self.pool)
                .await,
        )?;
        rows.into_iter()
            .map(|(path, size)| {
                Ok((path, u64::try_from(size).or_raise(|| ErrorKind::InvalidData("file size"))?))
            })
            .collect()
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Delete a drive and every file row referencing it, atomically.
    ///
    /// The schema defines no cascade, so the file rows are removed
    /// explicitly in the same transaction — no orphans either way.
    ///
    /// Returns `true` if the drive existed.
    pub async fn delete_drive(&self, drive_id: i64) -> Result<bool> {
        let mut tx = raise_db(self.pool.begin().await)?;
        raise_db(
            sqlx::query(include_str!("../queries/delete_files_for_drive.sql"))
                .bind(drive_id)
                .execute(&mut *tx)
                .await,
        )?;
        let result = raise_db(
            sqlx::query(include_str!("../queries/delete_drive.sql"))
                .bind(drive_id)
                .execute(&mut *tx)
                .await,
        )?;
        raise_db(tx.commit().await)?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            // Nobody listening is fine.
            _ = self.events.send(CatalogEvent::DriveDeleted { drive_id });
        }
        Ok(deleted)
    }
}

/// One in-flight cataloging run: the atomic unit spanning both collections.
///
/// Obtained from [`Repository::begin_import`]. The drive row is already
/// inserted (uncommitted) when the session exists; file batches accumulate
/// through [`insert_files`](Self::insert_files) and everything becomes
/// visible at once on [`commit`](Self::commit). Dropping the session rolls
/// the entire run back.
pub struct ImportSession {
    tx: Transaction<'static, Sqlite>,
    events: broadcast::Sender<CatalogEvent>,
    drive_id: i64,
    drive_name: String,
    inserted: u64,
}

impl ImportSession {
    /// The store-assigned id of the drive row opened by this session.
    pub fn drive_id(&self) -> i64 {
        self.drive_id
    }

    /// Insert one batch of file rows with a single multi-row statement.
    ///
    /// The owning drive id and name are stamped onto every row here, so
    /// callers only prepare the per-file fields. An empty batch is a no-op.
    pub async fn insert_files(&mut self, batch: &[NewFile]) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        if batch.len() > MAX_BATCH_ROWS {
            exn::bail!(ErrorKind::InvalidData("insert batch too large"));
        }
        // Sizes must be validated up front: push_values offers no way to
        // bail out halfway through building the statement.
        let mut rows = Vec::with_capacity(batch.len());
        for file in batch {
            let size = i64::try_from(file.size).or_raise(|| ErrorKind::InvalidData("file size"))?;
            rows.push((size, file));
        }
        let mut query = QueryBuilder::<Sqlite>::new(
            "INSERT INTO files (drive_id, drive_name, name, path, size, extension, kind) ",
        );
        query.push_values(rows, |mut row, (size, file)| {
            row.push_bind(self.drive_id)
                .push_bind(&self.drive_name)
                .push_bind(&file.name)
                .push_bind(&file.path)
                .push_bind(size)
                .push_bind(&file.extension)
                .push_bind(file.kind.as_str());
        });
        raise_db(query.build().execute(&mut *self.tx).await)?;
        self.inserted += batch.len() as u64;
        Ok(())
    }

    /// Commit the run and publish the commit notification.
    ///
    /// Returns the drive id for convenience.
    pub async fn commit(self) -> Result<i64> {
        raise_db(self.tx.commit().await)?;
        tracing::debug!(drive_id = self.drive_id, files = self.inserted, "import committed");
        _ = self.events.send(CatalogEvent::DriveImported {
            drive_id: self.drive_id,
            files: self.inserted,
        });
        Ok(self.drive_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::extension_of;

    fn new_file(name: &str, size: u64) -> NewFile {
        let extension = extension_of(name);
        let kind = FileKind::from_extension(&extension);
        NewFile {
            name: name.to_string(),
            path: format!("root/{name}"),
            size,
            extension,
            kind,
        }
    }

    async fn import(repo: &Repository, drive: &str, files: &[NewFile]) -> i64 {
        let total: u64 = files.iter().map(|f| f.size).sum();
        let summary = NewDrive::new(drive, files.len() as u64, total);
        let mut session = repo.begin_import(&summary).await.unwrap();
        session.insert_files(files).await.unwrap();
        session.commit().await.unwrap()
    }

    async fn repo() -> Repository {
        let db = Database::connect_in_memory().await.unwrap();
        Repository::from(&db)
    }

    #[tokio::test]
    async fn test_import_and_query_round_trip() {
        let repo = repo().await;
        let files = [new_file("a.jpg", 10), new_file("b.mp4", 20), new_file("c", 30)];
        let drive_id = import(&repo, "HD Backup", &files).await;

        let drives = repo.list_drives().await.unwrap();
        assert_eq!(drives.len(), 1);
        assert_eq!(drives[0].id, drive_id);
        assert_eq!(drives[0].total_files, 3);
        assert_eq!(drives[0].total_size, 60);

        let records = repo
            .query_files(&FileFilter { drive_id: Some(drive_id), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.drive_name == "HD Backup"));
        // Extensionless entries carry the sentinel and the default kind.
        let plain = records.iter().find(|r| r.name == "c").unwrap();
        assert_eq!(plain.extension, "none");
        assert_eq!(plain.kind, FileKind::Outros);
    }

    #[tokio::test]
    async fn test_dropping_session_rolls_back_everything() {
        let repo = repo().await;
        {
            let summary = NewDrive::new("Doomed", 2, 30);
            let mut session = repo.begin_import(&summary).await.unwrap();
            session.insert_files(&[new_file("a.jpg", 10), new_file("b.png", 20)]).await.unwrap();
            // No commit.
        }
        assert!(repo.list_drives().await.unwrap().is_empty());
        assert_eq!(repo.count_files().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_query_filters_are_conjunctive() {
        let repo = repo().await;
        let one = import(&repo, "One", &[new_file("report.pdf", 10)]).await;
        let two = import(&repo, "Two", &[new_file("report.png", 20)]).await;

        let documents = repo
            .query_files(&FileFilter {
                substring: Some("report".to_string()),
                kind: Some(FileKind::Documento),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].drive_id, one);

        let on_two = repo
            .query_files(&FileFilter {
                substring: Some("report".to_string()),
                drive_id: Some(two),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(on_two.len(), 1);
        assert_eq!(on_two[0].name, "report.png");
    }

    #[tokio::test]
    async fn test_substring_matches_name_or_path_case_insensitive() {
        let repo = repo().await;
        import(&repo, "Photos", &[new_file("Ferias2019.JPG", 1), new_file("notes.txt", 1)]).await;

        // Matches the name, folding case.
        let by_name = repo
            .query_files(&FileFilter { substring: Some("ferias".to_string()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);

        // Matches only through the path ("root/" folder segment).
        let by_path = repo
            .query_files(&FileFilter { substring: Some("ROOT/".to_string()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(by_path.len(), 2);
    }

    #[tokio::test]
    async fn test_min_size_filter() {
        let repo = repo().await;
        import(&repo, "Mixed", &[new_file("small.txt", 10), new_file("big.mkv", 5_000)]).await;
        let big = repo
            .query_files(&FileFilter { min_size: Some(1_000), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(big.len(), 1);
        assert_eq!(big[0].name, "big.mkv");
    }

    #[tokio::test]
    async fn test_query_is_idempotent_and_newest_first() {
        let repo = repo().await;
        import(&repo, "A", &[new_file("1.txt", 1), new_file("2.txt", 2)]).await;
        import(&repo, "B", &[new_file("3.txt", 3)]).await;

        let first = repo.query_files(&FileFilter::default()).await.unwrap();
        let second = repo.query_files(&FileFilter::default()).await.unwrap();
        assert_eq!(first, second);
        let ids: Vec<i64> = first.iter().map(|r| r.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(ids, sorted, "results should be newest first");
    }

    #[tokio::test]
    async fn test_create_drive_standalone() {
        let repo = repo().await;
        let drive_id = repo.create_drive(&NewDrive::new("Empty", 0, 0)).await.unwrap();
        let drive = repo.get_drive(drive_id).await.unwrap();
        assert_eq!(drive.total_files, 0);
        assert_eq!(repo.count_files().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_drive_missing() {
        let repo = repo().await;
        let err = repo.get_drive(999).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::DriveNotFound(999)));
    }

    #[tokio::test]
    async fn test_delete_drive_cleans_up_file_rows() {
        let repo = repo().await;
        let keep = import(&repo, "Keep", &[new_file("k.txt", 1)]).await;
        let gone = import(&repo, "Gone", &[new_file("g1.txt", 1), new_file("g2.txt", 1)]).await;

        assert!(repo.delete_drive(gone).await.unwrap());
        assert!(!repo.delete_drive(gone).await.unwrap(), "second delete finds nothing");

        assert_eq!(repo.count_files().await.unwrap(), 1);
        let drives = repo.list_drives().await.unwrap();
        assert_eq!(drives.len(), 1);
        assert_eq!(drives[0].id, keep);
    }

    #[tokio::test]
    async fn test_commit_publishes_event() {
        let repo = repo().await;
        let mut events = repo.subscribe();
        let drive_id = import(&repo, "Watched", &[new_file("w.txt", 1)]).await;
        assert_eq!(events.try_recv().unwrap(), CatalogEvent::DriveImported { drive_id, files: 1 });

        repo.delete_drive(drive_id).await.unwrap();
        assert_eq!(events.try_recv().unwrap(), CatalogEvent::DriveDeleted { drive_id });
    }

    #[tokio::test]
    async fn test_rollback_publishes_nothing() {
        let repo = repo().await;
        let mut events = repo.subscribe();
        {
            let session = repo.begin_import(&NewDrive::new("Silent", 0, 0)).await.unwrap();
            drop(session);
        }
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_sample_files_limit() {
        let repo = repo().await;
        import(&repo, "S", &[new_file("1.txt", 1), new_file("2.txt", 2), new_file("3.txt", 3)]).await;
        let sample = repo.sample_files(2).await.unwrap();
        assert_eq!(sample.len(), 2);
        // Newest first.
        assert_eq!(sample[0].0, "root/3.txt");
    }

    #[tokio::test]
    async fn test_oversized_batch_is_rejected() {
        let repo = repo().await;
        let batch: Vec<NewFile> = (0..=MAX_BATCH_ROWS).map(|i| new_file(&format!("{i}.txt"), 1)).collect();
        let mut session = repo.begin_import(&NewDrive::new("Big", 0, 0)).await.unwrap();
        let err = session.insert_files(&batch).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidData(_)));
    }
}
