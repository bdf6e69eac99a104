//! Folder listing sources for hdcat.
//!
//! The cataloging pipeline doesn't care where a listing comes from — only
//! that it receives a flat sequence of `{name, relative path, size}`
//! entries. This crate supplies that sequence: [`LocalFolder`] walks a
//! directory tree on the local filesystem, and [`MockFolder`] (behind the
//! `mock` feature) serves fixed listings to tests. Sources never read file
//! contents; a catalog is metadata only.

pub mod error;
mod models;
mod path;
mod source;

pub use crate::models::FileEntry;
pub use crate::path::validate as validate_path;
pub use crate::source::{FolderSource, LocalFolder};
#[cfg(feature = "mock")]
pub use crate::source::MockFolder;
