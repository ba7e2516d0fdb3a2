// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// goal per use case:
//
//   prepare  — download, clean, balance, split, export
//   describe — run the pipeline and summarise the data
//   register — make the labeled export queryable in a catalog
//
// Rules for this layer:
//   - No text processing here (that's Layer 4)
//   - No printing here (that's Layer 1)
//   - Storage and catalog only through the Layer 3 traits
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The full preparation workflow
pub mod prepare_use_case;

// Dataset summary for inspection
pub mod describe_use_case;

// Catalog registration of the labeled export
pub mod register_use_case;
