// ============================================================
// Layer 4 - Answer Table
// ============================================================
// The classifier predicts one of a fixed set of answers. This
// table defines that set and the id of every answer in it.
//
// Built from the training split only:
//   - count every (cleaned) answer
//   - keep the `label_size` most frequent ones
//   - ties are broken alphabetically so the table is stable
//     across runs on the same data
//
// Answer id N is the N-th entry of the table, which is also the
// N-th column of the one-hot label and of the model's logits.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct AnswerTable {
    answers: Vec<String>,
    index:   HashMap<String, usize>,
}

impl AnswerTable {
    /// Keep the `label_size` most frequent answers.
    pub fn build<'a>(answers: impl IntoIterator<Item = &'a str>, label_size: usize) -> Self {
        let mut freq: HashMap<&str, usize> = HashMap::new();
        for answer in answers {
            *freq.entry(answer).or_insert(0) += 1;
        }

        let mut ranked: Vec<(&str, usize)> = freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(label_size);

        Self::from(
            ranked.into_iter().map(|(a, _)| a.to_string()).collect::<Vec<_>>()
        )
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn index_of(&self, answer: &str) -> Option<usize> {
        self.index.get(answer).copied()
    }

    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(index).map(String::as_str)
    }

    /// One answer per model output, or the ids and logits disagree.
    pub fn ensure_label_size(&self, label_size: usize) -> Result<()> {
        anyhow::ensure!(
            self.len() == label_size,
            "Answer table has {} entries but the model predicts {}",
            self.len(), label_size
        );
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Cannot write answer table to '{}'", path.display()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!(
                "Cannot read answer table from '{}'. Have you run 'train' first?",
                path.display()
            ))?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl From<Vec<String>> for AnswerTable {
    fn from(answers: Vec<String>) -> Self {
        let index = answers
            .iter()
            .enumerate()
            .map(|(i, a)| (a.clone(), i))
            .collect();
        Self { answers, index }
    }
}

impl From<AnswerTable> for Vec<String> {
    fn from(table: AnswerTable) -> Self {
        table.answers
    }
}
