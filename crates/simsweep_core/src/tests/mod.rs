//! Integration tests for the sweep execution engine
//!
//! Tests are organized by topic:
//! - `pipeline` - Full sweeps through the engine with fake trial runners
//! - `reshape` - Flat-to-shaped grid reconstruction and its failure modes
//! - `resolver_fs` - Build-tree executable resolution on a real filesystem
//! - `table_io` - The CSV artifact: write, read back, malformed input
//! - `process` - Real external processes (Unix only)

mod pipeline;
mod table_io;
