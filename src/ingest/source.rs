//! Loading prompt sources from disk.
//!
//! | Format         | Shape                                                   |
//! |----------------|---------------------------------------------------------|
//! | `Json`         | array of strings or objects (rows of a tabular export)  |
//! | `NumberedText` | `Category N: …` headings and `1. …` numbered lines      |
//! | `Lines`        | one prompt per line                                     |
//!
//! For JSON objects the text column is `question` or `text` when present,
//! otherwise the first key mentioning "question" or "prompt", otherwise the
//! first string-valued field.

use std::path::Path;

use serde_json::Value;

use crate::ingest::normalizer::parse_numbered_text;
use crate::ingest::record::RawPromptRecord;
use crate::ingest::IngestError;

/// Layout of a prompt source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    NumberedText,
    Lines,
}

impl SourceFormat {
    /// Pick a format from the file extension: `.json` is JSON, anything else
    /// is treated as numbered text.
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::NumberedText,
        }
    }
}

impl std::str::FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "numbered" | "numbered-text" | "text" => Ok(Self::NumberedText),
            "lines" => Ok(Self::Lines),
            other => Err(format!("unknown source format: {other}")),
        }
    }
}

/// Read `path` and split it into raw rows.
pub fn load_source(path: &Path, format: SourceFormat) -> Result<Vec<RawPromptRecord>, IngestError> {
    let content = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let records = match format {
        SourceFormat::Json => parse_json_rows(&content)?,
        SourceFormat::NumberedText => parse_numbered_text(&content),
        SourceFormat::Lines => content
            .lines()
            .enumerate()
            .map(|(idx, line)| RawPromptRecord::new(line).with_index(idx))
            .collect(),
    };

    log::info!(
        "ingest: read {} rows from {} ({:?})",
        records.len(),
        path.display(),
        format
    );
    Ok(records)
}

/// Decode a JSON array of rows.
pub fn parse_json_rows(content: &str) -> Result<Vec<RawPromptRecord>, IngestError> {
    let value: Value = serde_json::from_str(content)?;
    let Value::Array(rows) = value else {
        return Err(IngestError::Format(
            "expected a JSON array of prompts".into(),
        ));
    };

    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(idx, row)| row_to_record(row, idx))
        .collect())
}

fn row_to_record(row: Value, idx: usize) -> RawPromptRecord {
    match row {
        Value::String(text) => RawPromptRecord::new(text).with_index(idx),
        Value::Object(map) => {
            let text = text_column(&map).unwrap_or_default();
            let mut record = RawPromptRecord::new(text).with_index(idx);
            if let Some(Value::String(category)) = map.get("category") {
                record = record.with_category(category.clone());
            }
            record
        }
        Value::Null => RawPromptRecord::new("").with_index(idx),
        other => RawPromptRecord::new(other.to_string()).with_index(idx),
    }
}

fn text_column(map: &serde_json::Map<String, Value>) -> Option<String> {
    let as_text = |v: &Value| v.as_str().map(str::to_string);

    if let Some(text) = map.get("question").and_then(as_text) {
        return Some(text);
    }
    if let Some(text) = map.get("text").and_then(as_text) {
        return Some(text);
    }
    if let Some(text) = map
        .iter()
        .find(|(k, _)| {
            let k = k.to_lowercase();
            k.contains("question") || k.contains("prompt")
        })
        .and_then(|(_, v)| as_text(v))
    {
        return Some(text);
    }
    map.iter()
        .filter(|(k, _)| k.as_str() != "category")
        .find_map(|(_, v)| as_text(v))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn detect_format_from_extension() {
        assert_eq!(SourceFormat::detect(Path::new("a.json")), SourceFormat::Json);
        assert_eq!(SourceFormat::detect(Path::new("a.JSON")), SourceFormat::Json);
        assert_eq!(
            SourceFormat::detect(Path::new("a.txt")),
            SourceFormat::NumberedText
        );
    }

    #[test]
    fn format_from_str() {
        assert_eq!("lines".parse::<SourceFormat>(), Ok(SourceFormat::Lines));
        assert!("xlsx".parse::<SourceFormat>().is_err());
    }

    #[test]
    fn json_strings_and_records() {
        let rows = parse_json_rows(
            r#"["Plain prompt", {"question": "Q?", "category": "Ethics"}, {"text": "T?"}]"#,
        )
        .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].text, "Plain prompt");
        assert_eq!(rows[1].category.as_deref(), Some("Ethics"));
        assert_eq!(rows[2].text, "T?");
        assert_eq!(rows[2].source_index, Some(2));
    }

    #[test]
    fn json_prompt_named_column_is_found() {
        let rows = parse_json_rows(r#"[{"ID": "7", "Prompt Text": "Tell me a story"}]"#).unwrap();
        assert_eq!(rows[0].text, "Tell me a story");
    }

    #[test]
    fn json_null_cells_become_empty_rows() {
        let rows = parse_json_rows("[null, {}]").unwrap();
        assert!(rows.iter().all(|r| r.text.is_empty()));
    }

    #[test]
    fn json_non_array_is_format_error() {
        let err = parse_json_rows(r#"{"questions": []}"#).unwrap_err();
        assert!(matches!(err, IngestError::Format(_)));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load_source(Path::new("/nonexistent/prompts.txt"), SourceFormat::Lines)
            .unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }

    #[test]
    fn load_numbered_text_file() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("prompts.txt");
        std::fs::write(
            &path,
            "Category 3: Legacy (Questions 1-2)\n1. What do you hope to pass on?\n2. Who shaped you?\n",
        )
        .expect("write");

        let rows = load_source(&path, SourceFormat::detect(&path)).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.category.as_deref() == Some("Legacy")));
    }
}
