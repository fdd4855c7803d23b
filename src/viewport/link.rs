//! Link view: viewport propagation across same-size images
//!
//! While link mode is on, the selected image's viewport is copied to
//! every other entry whose pixel dimensions match exactly. Runs after
//! per-frame interaction has been applied to the selected entry.

use crate::state::entry::ImageEntry;
use crate::viewport::transform::MAX_ZOOM;

/// Copy the selected entry's viewport onto all dimension-matching
/// entries. Zoom is re-clamped against each target's own bounds; a target
/// that has never been fitted inherits the source's `min_zoom` so the
/// clamp is meaningful. Entries with any dimension mismatch are left
/// untouched.
pub fn propagate(selected: usize, entries: &mut [ImageEntry]) {
    let Some(source) = entries.get(selected) else {
        return;
    };
    let dims = (source.source.width, source.source.height);
    let view = source.viewport;

    for (i, entry) in entries.iter_mut().enumerate() {
        if i == selected {
            continue;
        }
        if (entry.source.width, entry.source.height) != dims {
            continue;
        }
        if entry.viewport.min_zoom.is_none() {
            entry.viewport.min_zoom = view.min_zoom;
        }
        entry.viewport.zoom = match entry.viewport.min_zoom {
            Some(min) => view.zoom.clamp(min, MAX_ZOOM),
            None => view.zoom.min(MAX_ZOOM),
        };
        entry.viewport.pan = view.pan;
        entry.viewport.fit_to_window = view.fit_to_window;
    }
}
