//! Step outputs for the CI runner.

use std::io::{self, Write};
use std::path::Path;

/// Appends `key=value` to the step outputs file.
///
/// Values must be single-line; the runner treats each line as one output.
pub fn append_output(path: &Path, key: &str, value: &str) -> io::Result<()> {
    if value.contains(['\n', '\r']) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("output '{key}' must be a single line"),
        ));
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{key}={value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_without_clobbering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github_output");
        std::fs::write(&path, "earlier=1\n").unwrap();

        append_output(&path, "portable_zip", "/ws/portable-v1.2.3.zip").unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "earlier=1\nportable_zip=/ws/portable-v1.2.3.zip\n"
        );
    }

    #[test]
    fn multiline_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = append_output(&dir.path().join("out"), "k", "a\nb").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
