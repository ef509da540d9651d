// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust structs and traits describing the VQA problem:
// a question asked about an image, and the answer a human gave.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// One labelled image / question / answer triple
pub mod record;

// Core abstractions (traits) that other layers implement
pub mod traits;
