// ============================================================
// Layer 5 - ML / Model Layer (Burn)
// ============================================================
// All Burn model code lives here.
//
//   lstm.rs       - hand-written LSTM question encoder
//                   (forget / input / cell / output gates)
//
//   model.rs      - embedding → LSTM → projection classifier,
//                   softmax cross-entropy on one-hot labels
//
//   trainer.rs    - epoch loop, validation, best-checkpoint
//                   selection and the final test pass
//
//   predictor.rs  - batch-truncated prediction with confidences
//
//   inferencer.rs - answers a single question from a checkpoint
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

/// Manual LSTM recurrence
pub mod lstm;

/// VQA classifier architecture
pub mod model;

/// Training loop with validation and checkpointing
pub mod trainer;

/// Batched prediction and accuracy
pub mod predictor;

/// Single-question inference from a checkpoint
pub mod inferencer;
