use crate::error::{Error, ErrorKind};
use crate::models::FileKind;
use exn::ResultExt;

/// A classified file record waiting to be inserted.
///
/// Built by the ingestion pipeline from a raw listing entry: the extension
/// has already been lowercased and the kind derived from it. The owning
/// drive id and name are attached by the import session at insert time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile {
    pub name: String,
    /// Relative path as selected, folder segments included.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// Lowercase extension, `"none"` if the name carries none.
    pub extension: String,
    pub kind: FileKind,
}

/// One cataloged file's metadata.
///
/// The owning drive's name is denormalized onto every row so listings don't
/// need a join. There is no update path: re-importing creates new rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Store-assigned, unique.
    pub id: i64,
    /// Owning drive id. A foreign key by convention only — the schema does
    /// not enforce it and deleting a drive cleans its rows up explicitly.
    pub drive_id: i64,
    pub drive_name: String,
    pub name: String,
    pub path: String,
    pub size: u64,
    pub extension: String,
    pub kind: FileKind,
}

#[derive(sqlx::FromRow)]
pub(crate) struct FileRow {
    id: i64,
    drive_id: i64,
    drive_name: String,
    name: String,
    path: String,
    size: i64,
    extension: String,
    kind: String,
}

impl TryFrom<FileRow> for FileRecord {
    type Error = Error;
    fn try_from(row: FileRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            drive_id: row.drive_id,
            drive_name: row.drive_name,
            name: row.name,
            path: row.path,
            size: u64::try_from(row.size).or_raise(|| ErrorKind::InvalidData("file size"))?,
            extension: row.extension,
            kind: row.kind.parse::<FileKind>().or_raise(|| ErrorKind::InvalidData("file kind"))?,
        })
    }
}
