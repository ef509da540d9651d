// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Workflow coordination only: no model math, no printing, no
// direct file formats. Each use case wires the data, ml and infra
// layers together for one user-facing goal.
//
// Reference: Clean Architecture pattern

// Load data, train, keep the best checkpoint, test it
pub mod train_use_case;

// Re-test a saved checkpoint on the test split
pub mod evaluate_use_case;

// Answer a single question from a saved checkpoint
pub mod ask_use_case;
