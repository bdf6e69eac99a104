use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use time::UtcDateTime;

/// A drive summary waiting to be inserted.
///
/// The totals are computed by the ingestion pipeline in a single pass over
/// the selected entries *before* any row is written, so the summary and the
/// file rows commit (or roll back) together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrive {
    /// User-supplied label (e.g. `"HD Externo Backup"`). Not unique.
    pub name: String,
    pub scanned_at: UtcDateTime,
    pub total_files: u64,
    /// Total size in bytes.
    pub total_size: u64,
}

impl NewDrive {
    /// Create a summary stamped with the current time.
    pub fn new(name: impl Into<String>, total_files: u64, total_size: u64) -> Self {
        Self {
            name: name.into(),
            scanned_at: UtcDateTime::now(),
            total_files,
            total_size,
        }
    }
}

/// One cataloging run: a persisted drive summary.
///
/// Rows are immutable once written. Re-cataloging the same physical drive
/// creates a new row; nothing is merged or updated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drive {
    /// Store-assigned, unique, monotonic.
    pub id: i64,
    pub name: String,
    pub scanned_at: UtcDateTime,
    /// Number of file rows referencing this drive at the end of ingestion.
    pub total_files: u64,
    /// Sum of the byte sizes of those rows.
    pub total_size: u64,
}

#[derive(sqlx::FromRow)]
pub(crate) struct DriveRow {
    id: i64,
    name: String,
    scanned_at: i64,
    total_files: i64,
    total_size: i64,
}

impl TryFrom<DriveRow> for Drive {
    type Error = Error;
    fn try_from(row: DriveRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            scanned_at: UtcDateTime::from_unix_timestamp(row.scanned_at)
                .or_raise(|| ErrorKind::InvalidData("scan date"))?,
            total_files: u64::try_from(row.total_files).or_raise(|| ErrorKind::InvalidData("file count"))?,
            total_size: u64::try_from(row.total_size).or_raise(|| ErrorKind::InvalidData("total size"))?,
        })
    }
}
