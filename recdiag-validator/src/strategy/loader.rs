//! Sample and configuration file loading.
//!
//! Reads are bounded with `Read::take`, so the size check and the read are the
//! same operation and an oversized file is never pulled fully into memory.

use std::io::Read;
use std::path::Path;

use crate::error::DiagError;

const BOM: char = '\u{feff}';

/// Read a file as UTF-8 text, enforcing `max_file_size`.
///
/// A leading byte order mark is dropped.
///
/// # Errors
///
/// - [`DiagError::Io`] if the file cannot be opened or read
/// - [`DiagError::FileTooLarge`] if it exceeds `max_file_size`
/// - [`DiagError::InvalidEncoding`] if it is not valid UTF-8
pub fn read_text_bounded(path: &Path, max_file_size: u64) -> Result<String, DiagError> {
    let io_err = |source| DiagError::Io {
        path: path.to_owned(),
        source,
    };

    let file = std::fs::File::open(path).map_err(io_err)?;

    // Read at most max_file_size + 1 bytes to detect oversized files
    let mut buffer = Vec::new();
    file.take(max_file_size.saturating_add(1))
        .read_to_end(&mut buffer)
        .map_err(io_err)?;

    if buffer.len() as u64 > max_file_size {
        return Err(DiagError::FileTooLarge {
            path: path.to_owned(),
            max: max_file_size,
        });
    }

    let mut text = String::from_utf8(buffer).map_err(|_| DiagError::InvalidEncoding {
        path: path.to_owned(),
    })?;
    if text.starts_with(BOM) {
        text.replace_range(..BOM.len_utf8(), "");
    }
    Ok(text)
}

/// Load a sample log as one string with every line terminated by `\n`.
///
/// # Errors
///
/// Same as [`read_text_bounded`].
pub fn load_log(path: &Path, max_file_size: u64) -> Result<String, DiagError> {
    let raw = read_text_bounded(path, max_file_size)?;
    Ok(normalize_line_endings(&raw))
}

/// Rebuild `raw` line by line: `\r\n` and lone `\r` become `\n`, and the last
/// line gets a terminator if it lacks one.
#[must_use]
pub fn normalize_line_endings(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 1);
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_mixed_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\nd"), "a\nb\nc\nd\n");
    }

    #[test]
    fn test_normalize_keeps_blank_lines() {
        assert_eq!(normalize_line_endings("a\r\n\r\nb\r\n"), "a\n\nb\n");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_line_endings(""), "");
    }

    #[test]
    fn test_load_log_strips_bom_and_crlf() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("app.log");
        fs::write(&path, "\u{feff}line one\r\nline two").unwrap();

        let content = load_log(&path, 1024).unwrap();
        assert_eq!(content, "line one\nline two\n");
    }

    #[test]
    fn test_read_rejects_oversized_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("big.log");
        fs::write(&path, "0123456789").unwrap();

        let err = read_text_bounded(&path, 5).unwrap_err();
        assert!(matches!(err, DiagError::FileTooLarge { max: 5, .. }));
        assert!(read_text_bounded(&path, 10).is_ok());
    }

    #[test]
    fn test_read_rejects_invalid_utf8() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bin.log");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x41]).unwrap();

        let err = read_text_bounded(&path, 1024).unwrap_err();
        assert!(matches!(err, DiagError::InvalidEncoding { .. }));
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = read_text_bounded(&tmp.path().join("nope.log"), 1024).unwrap_err();
        assert!(matches!(err, DiagError::Io { .. }));
    }
}
