//! Degradation-safe path rendering.
//!
//! Paths are arbitrary byte strings on Unix and may not be valid UTF-8.
//! The report must never fail on such a path, so rendering substitutes a
//! `\xNN` escape for each unrepresentable byte instead of erroring or
//! silently mangling the name.

use std::path::Path;

/// Render a path as text, escaping bytes that are not valid UTF-8.
///
/// On Unix the raw bytes are inspected and invalid sequences become
/// `\xNN` escapes; elsewhere the platform lossy conversion is used.
///
/// # Example
///
/// ```
/// use dupescout::output::path_text;
/// use std::path::Path;
///
/// assert_eq!(path_text(Path::new("plain/name.txt")), "plain/name.txt");
/// ```
#[must_use]
#[cfg(unix)]
pub fn path_text(path: &Path) -> String {
    use std::fmt::Write as _;
    use std::os::unix::ffi::OsStrExt;

    let bytes = path.as_os_str().as_bytes();
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
        for byte in chunk.invalid() {
            let _ = write!(out, "\\x{byte:02x}");
        }
    }
    out
}

/// Render a path as text, escaping bytes that are not valid UTF-8.
#[must_use]
#[cfg(not(unix))]
pub fn path_text(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_utf8_roundtrips() {
        assert_eq!(path_text(Path::new("a/b/c.txt")), "a/b/c.txt");
        assert_eq!(path_text(Path::new("café/🦀.rs")), "café/🦀.rs");
    }

    #[cfg(unix)]
    #[test]
    fn test_invalid_bytes_are_escaped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let raw = OsStr::from_bytes(b"bad\xff\xfename");
        assert_eq!(path_text(Path::new(raw)), "bad\\xff\\xfename");
    }

    #[cfg(unix)]
    #[test]
    fn test_mixed_valid_and_invalid_runs() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let raw = OsStr::from_bytes(b"caf\xc3\xa9\x80.txt");
        assert_eq!(path_text(Path::new(raw)), "café\\x80.txt");
    }
}
