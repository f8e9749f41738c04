// LogScope - platform/fs.rs
//
// File input for the analysis core. The core only ever sees lines;
// opening files and decoding bytes happen here.

use crate::util::error::InputError;
use std::io;
use std::path::Path;

/// Read a log file and split it into lines.
///
/// Invalid UTF-8 is replaced rather than rejected, so one bad byte never
/// stops the rest of the file from being analysed. `\n`, `\r\n` and a
/// lone `\r` all end a line.
pub fn read_lines_lossy(path: &Path) -> Result<Vec<String>, InputError> {
    if path.is_dir() {
        return Err(InputError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => InputError::NotFound {
            path: path.to_path_buf(),
        },
        _ => InputError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let content = String::from_utf8_lossy(&bytes);
    let lines = split_lines(&content);

    tracing::debug!(
        path = %path.display(),
        bytes = bytes.len(),
        lines = lines.len(),
        lossy = matches!(content, std::borrow::Cow::Owned(_)),
        "Log file read"
    );

    Ok(lines)
}

/// Split on any of the three line endings. A trailing terminator does
/// not produce an extra empty line.
fn split_lines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = content;
    while !rest.is_empty() {
        match rest.find(['\n', '\r']) {
            Some(idx) => {
                lines.push(rest[..idx].to_owned());
                let skip = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[idx + skip..];
            }
            None => {
                lines.push(rest.to_owned());
                break;
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_lines_with_mixed_endings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"first\r\nsecond\n\nthird").unwrap();

        let lines = read_lines_lossy(file.path()).unwrap();
        assert_eq!(lines, vec!["first", "second", "", "third"]);
    }

    #[test]
    fn test_lone_carriage_return_ends_a_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"one\rtwo\r\nthree\r\rfour\r").unwrap();

        let lines = read_lines_lossy(file.path()).unwrap();
        assert_eq!(lines, vec!["one", "two", "three", "", "four"]);
    }

    #[test]
    fn test_split_lines_edges() {
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("\n"), vec![""]);
        assert_eq!(split_lines("a\n\nb\n"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"ok line\nbad \xff\xfe byte\n").unwrap();

        let lines = read_lines_lossy(file.path()).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "ok line");
        assert!(lines[1].starts_with("bad "));
        assert!(lines[1].ends_with(" byte"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_lines_lossy(&dir.path().join("absent.log"));
        assert!(matches!(result, Err(InputError::NotFound { .. })));
    }

    #[test]
    fn test_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_lines_lossy(dir.path());
        assert!(matches!(result, Err(InputError::NotAFile { .. })));
    }
}
