//! Extraction engine.
//!
//! The pipeline runs in two passes:
//!
//! 1. **Scan**: discover source files, detect user-visible literals, and group
//!    them by text with a proposed resource key (`file_scanner`, `scan`,
//!    `skip_policy`, `group`, `keygen`).
//! 2. **Commit**: write the string table, then rewrite every selected
//!    occurrence into a resource reference (`resources`, `namespace`,
//!    `rewrite`).
//!
//! [`session::Session`] ties both passes together.

pub mod file_scanner;
pub mod group;
pub mod keygen;
pub mod namespace;
pub mod progress;
pub mod resources;
pub mod rewrite;
pub mod scan;
pub mod session;
pub mod skip_policy;
pub mod syntax;
