// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The application layer talks to these traits, never to the
// concrete loaders or models behind them.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::record::VqaRecord;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can produce the train and test splits of a
/// VQA dataset.
///
/// Implementations:
///   - JsonlLoader → reads train.jsonl / test.jsonl from a directory
pub trait RecordSource {
    /// Load the labelled training records.
    fn load_train(&self) -> Result<Vec<VqaRecord>>;

    /// Load the labelled test records.
    fn load_test(&self) -> Result<Vec<VqaRecord>>;
}

// ─── QuestionAnswerer ─────────────────────────────────────────────────────────
/// Any component that can answer a natural language question.
///
/// Returns candidate answers ranked by confidence, best first.
pub trait QuestionAnswerer {
    fn answer(&self, question: &str, top_k: usize) -> Result<Vec<(String, f32)>>;
}
