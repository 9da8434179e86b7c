// src/errors.rs

//! Crate-wide error aliases.
//!
//! Session-level operations (constructing and closing a watch) report
//! failures through `anyhow`; the parser modules carry their own structured
//! error enums, and per-file failures inside a scan are logged, not
//! returned.

pub use anyhow::{Error, Result};
