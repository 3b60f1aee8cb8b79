// src/output/writer.rs
//! File I/O for exported records.

use crate::datasets::Record;
use crate::error::AppError;
use std::fs;
use std::path::Path;

/// Writes `records` as a pretty-printed JSON array with a trailing newline.
///
/// Parent directories are created as needed. Returns the bytes written.
pub fn write_records(path: &Path, records: &[Record]) -> Result<usize, AppError> {
    let mut content = serde_json::to_string_pretty(records).map_err(|source| AppError::JsonFile {
        path: path.to_path_buf(),
        source,
    })?;
    content.push('\n');

    log::debug!("Writing {} bytes to {}", content.len(), path.display());

    // Create parent directories if needed
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, &content)?;

    log::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(content.len())
}

/// Reads the records in `path`.
///
/// A missing file, unreadable JSON, or anything but an array of objects
/// yields an empty list; the reason is logged.
pub fn load_records(path: &Path) -> Vec<Record> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No local records at {}", path.display());
            return Vec::new();
        }
        Err(e) => {
            log::warn!("Could not read {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<Record>>(&content) {
        Ok(records) => records,
        Err(e) => {
            log::warn!("Ignoring {}: not a JSON array of objects ({})", path.display(), e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(title: &str) -> Record {
        let mut record = Record::new();
        record.insert("id".into(), json!("abc"));
        record.insert("title".into(), json!(title));
        record
    }

    #[test]
    fn writes_pretty_unescaped_json_and_reads_it_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("articles.json");

        let written = write_records(&path, &[record("ノートPC")]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(written, content.len());
        assert_eq!(
            content,
            "[\n  {\n    \"id\": \"abc\",\n    \"title\": \"ノートPC\"\n  }\n]\n"
        );
        assert_eq!(load_records(&path), vec![record("ノートPC")]);
    }

    #[test]
    fn missing_or_invalid_files_load_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_records(&dir.path().join("none.json")).is_empty());

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{\"not\": \"a list\"}").unwrap();
        assert!(load_records(&bad).is_empty());
    }
}
