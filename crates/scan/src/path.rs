//! Path validation and security utilities.
//!
//! Listing entries come back as paths relative to the selected folder; this
//! module makes sure none of them can point outside it.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a relative listing path for security and correctness.
/// Ensures that paths don't escape the selected folder (no `..` traversal).
///
/// > **Note:** This does **not** normalize backslashes, non-UTF8 bytes, or
/// >           platform-specific weirdness. Null bytes are explicitly rejected.
///
/// # Returns
/// Returns the normalized path if valid, or
/// [`InvalidPath`](crate::error::ErrorKind::InvalidPath) if invalid.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use hdcat_scan::validate_path;
/// // Valid paths
/// assert!(validate_path("Fotos/2019/ferias.jpg").is_ok());
/// assert!(validate_path("a/../file.txt").is_ok()); // (never leaves the folder)
/// // Invalid paths
/// assert!(validate_path("../etc/passwd").is_err());
/// assert!(validate_path("a/../../b").is_err()); // (leaves the folder)
/// assert!(validate_path("a\0b").is_err());
/// // Paths get resolved
/// assert_eq!(
///     validate_path("wrong/../still-wrong/.././correct//./path.txt/").unwrap(),
///     Path::new("correct/path.txt")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    // Use Rust's built-in path component parser for robust handling. Means we
    // don't have to deal with non-UTF8, or the maniacs on Unix that use
    // backslashes in their filenames.
    let mut components = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls — reject them explicitly.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
        false => Ok(components.into_iter().collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_paths() {
        assert_eq!(validate(Path::new("Fotos/2019/ferias.jpg")).unwrap(), Path::new("Fotos/2019/ferias.jpg"));
        assert_eq!(validate(Path::new("a/b/c/file.txt")).unwrap(), Path::new("a/b/c/file.txt"));
        assert_eq!(validate(Path::new("simple.txt")).unwrap(), Path::new("simple.txt"));
    }

    #[test]
    fn test_path_normalization() {
        // Double slashes are normalized
        assert_eq!(validate(Path::new("a//b//c")).unwrap(), Path::new("a/b/c"));
        // Current directory references removed
        assert_eq!(validate(Path::new("a/./b/./c")).unwrap(), Path::new("a/b/c"));
    }

    #[test]
    fn test_traversal_attempts() {
        // Basic parent directory reference
        assert!(validate(Path::new("../etc/passwd")).is_err());
        // Traversal in the middle
        assert!(validate(Path::new("a/../../b")).is_err());
        // Only parent references
        assert!(validate(Path::new("..")).is_err());
        assert!(validate(Path::new("../..")).is_err());
    }

    #[test]
    fn test_traversal_within_root() {
        // Traversal remains within the selected folder
        assert_eq!(validate(Path::new("a/b/..")).unwrap(), Path::new("a"));
    }

    #[test]
    fn test_invalid_characters() {
        // Null byte
        assert!(validate(Path::new("a\0b")).is_err());
        assert!(validate(Path::new("\0")).is_err());
    }

    #[test]
    fn test_empty_paths() {
        assert!(validate(Path::new("")).is_err());
        assert!(validate(Path::new(".")).is_err());
        assert!(validate(Path::new("./")).is_err());
        assert!(validate(Path::new("//")).is_err());
    }

    #[test]
    fn test_trailing_slashes() {
        assert_eq!(validate(Path::new("Fotos/")).unwrap(), Path::new("Fotos"));
        assert_eq!(validate(Path::new("a/b/c///")).unwrap(), Path::new("a/b/c"));
    }
}
