// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Driver tests, organized by command.
//!
//! - `build/` - multi-file compiles written to disk and read back
//! - `check/` - per-file parallel checking
//! - `common/` - shared fixtures
//!
//! ```bash
//! cargo test -p kdlc --test phases
//! ```

#[path = "phases/common/mod.rs"]
mod common;

#[path = "phases/build/mod.rs"]
mod build;

#[path = "phases/check/mod.rs"]
mod check;
