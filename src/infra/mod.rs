// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Persistence shared by training, evaluation and inference:
//
//   checkpoint.rs      - best-model weights (CompactRecorder),
//                        model / training configs as JSON
//
//   tokenizer_store.rs - question vocabulary as a HuggingFace
//                        tokenizer.json, so the exact same word ids
//                        are used at inference time
//
//   metrics.rs         - per-epoch CSV log
//
// Reference: Burn Book §5 (Checkpointing)

/// Best-model saving and loading
pub mod checkpoint;

/// Question vocabulary building, saving, and loading
pub mod tokenizer_store;

/// Training metrics CSV logger
pub mod metrics;
