// ============================================================
// Layer 4 - Dataset Loader
// ============================================================
// Reads labelled VQA records from a dataset directory:
//
//   data/vqa/
//     train.jsonl   ← one JSON record per line
//     test.jsonl
//
// Each line looks like:
//   {"image_id": 9, "question": "What is on the plate?", "answer": "pizza"}
//
// A `train.json` / `test.json` file holding a JSON array of the same
// records is accepted as a fallback when the .jsonl file is absent.
//
// Bad lines are skipped with a warning rather than failing the whole
// load: crowd-sourced dumps occasionally contain truncated rows.
//
// Reference: serde_json documentation
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::domain::record::VqaRecord;
use crate::domain::traits::RecordSource;

/// Loads the train/test splits from a directory of JSON Lines files.
pub struct JsonlLoader {
    dir: PathBuf,
}

impl JsonlLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load `<split>.jsonl`, falling back to `<split>.json`.
    fn load_split(&self, split: &str) -> Result<Vec<VqaRecord>> {
        let jsonl = self.dir.join(format!("{split}.jsonl"));
        let json  = self.dir.join(format!("{split}.json"));

        let records = if jsonl.exists() {
            load_jsonl(&jsonl)?
        } else if json.exists() {
            load_json_array(&json)?
        } else {
            anyhow::bail!(
                "No '{split}' split found: expected '{}' or '{}'",
                jsonl.display(),
                json.display()
            );
        };

        tracing::info!("Loaded {} {} records", records.len(), split);
        Ok(records)
    }
}

impl RecordSource for JsonlLoader {
    fn load_train(&self) -> Result<Vec<VqaRecord>> {
        self.load_split("train")
    }

    fn load_test(&self) -> Result<Vec<VqaRecord>> {
        self.load_split("test")
    }
}

/// Parse a JSON Lines file, one record per non-blank line.
fn load_jsonl(path: &Path) -> Result<Vec<VqaRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<VqaRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                tracing::warn!("Skipping {}:{}: {}", path.display(), line_no + 1, e);
            }
        }
    }

    if skipped > 0 {
        tracing::warn!("Skipped {} malformed lines in '{}'", skipped, path.display());
    }
    Ok(records)
}

/// Parse a file holding one JSON array of records.
fn load_json_array(path: &Path) -> Result<Vec<VqaRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("'{}' is not a JSON array of VQA records", path.display()))
}
