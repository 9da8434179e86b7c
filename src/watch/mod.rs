// src/watch/mod.rs

//! The watch session: filesystem notifications in, change events out.
//!
//! `notify` delivers raw filesystem events for the watched directory; the
//! session rescans on anything that can alter the set of identities and
//! publishes the resulting changes one at a time. It does not interpret
//! file contents itself; that is `scan`'s job.

pub mod watcher;

pub use watcher::DirWatch;
