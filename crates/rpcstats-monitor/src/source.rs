//! Source file context for call sites.

use crate::trace::SourceSnippet;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading source context.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source unavailable: {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reads `path` and indexes it by 1-based line number.
///
/// Lines are split on `\n` only, so files with CRLF endings keep a trailing
/// `\r` on each line. A final newline does not produce an extra empty line.
/// `target_line` is passed through as the highlight without validation.
pub fn load(path: impl AsRef<Path>, target_line: i64) -> Result<SourceSnippet, SourceError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| {
        tracing::warn!(path = %path.display(), "Failed to read source file: {}", source);
        SourceError::Unavailable {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let content = String::from_utf8_lossy(&bytes);
    let lines = index_lines(&content);

    tracing::debug!(
        path = %path.display(),
        lines = lines.len(),
        highlight = target_line,
        "Loaded source context"
    );

    Ok(SourceSnippet {
        path: path.to_path_buf(),
        highlight_line: target_line,
        lines,
    })
}

/// Parses a line number from user input; anything malformed becomes 0.
pub fn parse_line_number(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

fn index_lines(content: &str) -> BTreeMap<usize, String> {
    if content.is_empty() {
        return BTreeMap::new();
    }
    let body = content.strip_suffix('\n').unwrap_or(content);
    body.split('\n')
        .enumerate()
        .map(|(i, line)| (i + 1, line.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_load_indexes_lines_from_one() {
        let file = write_temp(b"fn main() {\n    run();\n}\n");
        let snippet = load(file.path(), 2).unwrap();

        assert_eq!(snippet.lines.len(), 3);
        assert_eq!(snippet.lines.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(snippet.lines[&1], "fn main() {");
        assert_eq!(snippet.highlighted(), Some("    run();"));
        assert_eq!(snippet.path, file.path());
    }

    #[test]
    fn test_load_without_trailing_newline() {
        let file = write_temp(b"a\nb\nc");
        let snippet = load(file.path(), 1).unwrap();
        assert_eq!(snippet.lines.len(), 3);
        assert_eq!(snippet.lines[&3], "c");
    }

    #[test]
    fn test_load_keeps_blank_lines_and_carriage_returns() {
        let file = write_temp(b"a\r\n\r\nb\n\n");
        let snippet = load(file.path(), 1).unwrap();
        assert_eq!(snippet.lines.len(), 4);
        assert_eq!(snippet.lines[&1], "a\r");
        assert_eq!(snippet.lines[&2], "\r");
        assert_eq!(snippet.lines[&4], "");
    }

    #[test]
    fn test_load_empty_file() {
        let file = write_temp(b"");
        let snippet = load(file.path(), 1).unwrap();
        assert!(snippet.lines.is_empty());
    }

    #[test]
    fn test_highlight_beyond_end_is_kept() {
        let file = write_temp(b"only\n");
        let snippet = load(file.path(), 10).unwrap();
        assert_eq!(snippet.highlight_line, 10);
        assert_eq!(snippet.highlighted(), None);
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let err = load("/no/such/file", 10).unwrap_err();
        let SourceError::Unavailable { path, source } = err;
        assert_eq!(path, PathBuf::from("/no/such/file"));
        assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load(dir.path(), 1),
            Err(SourceError::Unavailable { .. })
        ));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let file = write_temp(b"ok\n\xffbad\n");
        let snippet = load(file.path(), 2).unwrap();
        assert_eq!(snippet.lines[&2], "\u{fffd}bad");
    }

    #[test]
    fn test_parse_line_number() {
        assert_eq!(parse_line_number("42"), 42);
        assert_eq!(parse_line_number(" 7 "), 7);
        assert_eq!(parse_line_number("-3"), -3);
        assert_eq!(parse_line_number("abc"), 0);
        assert_eq!(parse_line_number(""), 0);
        assert_eq!(parse_line_number("99999999999999999999999"), 0);
    }
}
