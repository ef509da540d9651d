// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Everything between the dataset files and tensor batches:
//
//   train.jsonl / test.jsonl
//       │
//       ▼
//   JsonlLoader       → reads VqaRecords
//       │
//       ▼
//   Preprocessor      → cleans questions, canonicalises answers
//       │
//       ▼
//   AnswerTable       → answer string ↔ class id
//   Tokenizer         → question words → token ids (infra layer)
//       │
//       ▼
//   QuestionEncoder   → fixed-length VqaSamples
//       │
//       ▼
//   splitter          → train / validation / test
//       │
//       ▼
//   VqaDataset        → implements Burn's Dataset trait
//       │
//       ▼
//   VqaBatcher        → question tensor + one-hot labels
//
// word embeddings (GloVe) are loaded separately and handed to the
// model builder.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads train/test records from JSON Lines files
pub mod loader;

/// Cleans questions and answers
pub mod preprocessor;

/// Answer vocabulary: the classifier's output classes
pub mod answers;

/// GloVe word vectors aligned to the question vocabulary
pub mod embeddings;

/// Encoded samples and Burn's Dataset trait
pub mod dataset;

/// Implements Burn's Batcher trait with one-hot labels
pub mod batcher;

/// Fixed holdout and debug splits
pub mod splitter;
