//! UI building blocks
//!
//! - The viewer canvas with pointer interaction and overlays (canvas.rs)
//! - The thumbnail gallery strip (gallery.rs)

pub mod canvas;
pub mod gallery;
