//! strlift - move hard-coded UI strings of Android projects into string resources
//!
//! strlift is a CLI tool and library that finds user-visible string literals
//! in Kotlin, Java, and XML layout files, proposes a resource key for each
//! distinct text, writes the texts into `strings.xml`, and rewrites every
//! occurrence into a resource reference.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (user-facing commands and reports)
//! - `config`: Configuration file loading and parsing
//! - `core`: Extraction engine (scan, group, commit)
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod utils;
