//! json-cow-util - Utility functions for json-cow
//!
//! Deep duplication and deep equality over `serde_json::Value`, plus a seeded
//! fuzzer that generates random object graphs and mutation scripts for the
//! differential test suites.

pub mod fuzzer;
pub mod json_clone;
pub mod json_equal;

// Re-exports for convenience
pub use fuzzer::Fuzzer;
pub use json_clone::duplicate;
pub use json_equal::deep_equal;
