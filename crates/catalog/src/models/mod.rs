mod drive;
mod file;
mod kind;

pub use self::drive::{Drive, NewDrive};
pub use self::file::{FileRecord, NewFile};
pub use self::kind::{FileKind, NO_EXTENSION, extension_of};

pub(crate) use self::drive::DriveRow;
pub(crate) use self::file::FileRow;
