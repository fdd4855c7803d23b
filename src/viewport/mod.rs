//! Interactive viewport
//!
//! This module handles:
//! - Zoom/pan/fit state and placement math (transform.rs)
//! - Mapping screen points back to source pixels (inspector.rs)
//! - Propagating a viewport across same-size images (link.rs)

pub mod inspector;
pub mod link;
pub mod transform;
