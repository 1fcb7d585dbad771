//! Parsing of pip requirements files.

use std::path::Path;

use dockpack_common::error::{DockpackError, Result};

/// Extracts requirement specifiers from requirements-file text.
///
/// Blank lines, comments, and option lines (`-r`, `--index-url`, ...) are
/// skipped; trailing ` #` comments are removed.
pub fn parse_requirements(content: &str) -> Vec<String> {
    content
        .lines()
        .map(strip_comment)
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('-'))
        .map(ToString::to_string)
        .collect()
}

/// Reads and parses a requirements file.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn read_requirements(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| DockpackError::io(path, e))?;
    let requirements = parse_requirements(&content);
    tracing::debug!(
        path = %path.display(),
        count = requirements.len(),
        "read requirements file"
    );
    Ok(requirements)
}

fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    line.find(" #").map_or(line, |idx| &line[..idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_blank_and_comment_lines() {
        let content = "# pinned\n\nflask==2.0\n  \nrequests>=2 # http\n";
        assert_eq!(parse_requirements(content), vec!["flask==2.0", "requests>=2"]);
    }

    #[test]
    fn parse_skips_option_lines() {
        let content = "-r base.txt\n--index-url https://example.com\nattrs\n";
        assert_eq!(parse_requirements(content), vec!["attrs"]);
    }

    #[test]
    fn parse_keeps_markers_and_extras() {
        let content = "uvicorn[standard]; python_version >= \"3.8\"\n";
        assert_eq!(
            parse_requirements(content),
            vec!["uvicorn[standard]; python_version >= \"3.8\""]
        );
    }

    #[test]
    fn read_missing_file_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(read_requirements(&dir.path().join("requirements.txt")).is_err());
    }

    #[test]
    fn read_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("requirements.txt");
        std::fs::write(&path, "six\n").expect("write");
        assert_eq!(read_requirements(&path).expect("read"), vec!["six"]);
    }
}
