//! Commit notifications.
//!
//! The repository publishes a [`CatalogEvent`] on a broadcast channel after
//! every committed write transaction. Consumers that want to stay current (a
//! live dashboard, a watch-mode CLI) subscribe and re-pull on each event
//! instead of polling. Nothing is published for rolled-back transactions.

/// A committed change to one of the catalog's collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogEvent {
    /// A drive summary and its file rows were committed together.
    DriveImported {
        drive_id: i64,
        /// Number of file rows inserted in the transaction.
        files: u64,
    },
    /// A drive and every file row referencing it were removed.
    DriveDeleted { drive_id: i64 },
}
