//! SQLite catalog database for drives and their file listings.
//!
//! This crate is the persistence layer of hdcat. Each cataloging run of a
//! locally selected folder produces one **drive** summary row and a bulk of
//! **file** rows, committed together in a single transaction so readers
//! never observe a half-imported drive. Rows are immutable after that
//! commit; re-cataloging the same physical drive creates new rows.
//!
//! # Architecture
//! - [`Database`] owns the connection pool, PRAGMAs, and embedded
//!   migrations; open one per catalog file and pass handles down — there is
//!   no global instance.
//! - [`Repository`] exposes the operations: [`begin_import`]
//!   (the atomic drive-plus-files unit), filtered queries, listings, and
//!   deletion. Committed writes publish a [`CatalogEvent`] for live
//!   consumers.
//!
//! [`begin_import`]: Repository::begin_import

mod db;
pub mod error;
mod events;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::events::CatalogEvent;
pub use crate::models::{Drive, FileKind, FileRecord, NO_EXTENSION, NewDrive, NewFile, extension_of};
pub use crate::repo::{FileFilter, ImportSession, MAX_BATCH_ROWS, Repository};
