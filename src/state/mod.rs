//! Application state
//!
//! This module handles all per-image and collection state:
//! - A loaded image and its derived display resources (entry.rs)
//! - The ordered collection, selection and shared config (collection.rs)
//! - On-disk change detection and reload (watcher.rs)

pub mod collection;
pub mod entry;
pub mod watcher;
