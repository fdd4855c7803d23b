//! On-disk change detection and reload
//!
//! Once per watch tick the app asks every entry whether its backing file
//! changed, comparing an (mtime, size) stamp. A change triggers a reload
//! through the codec and pipeline with the entry's applied config. Fit
//! entries stay in Fit with their zoom bound cleared (the dimensions may
//! have changed); Manual entries keep zoom, pan and zoom bound exactly.

use std::path::Path;
use std::time::SystemTime;

use crate::error::{Result, ViewerError};
use crate::state::entry::ImageEntry;

/// File identity snapshot: modification time plus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub modified: SystemTime,
    pub len: u64,
}

/// Read the current stamp of a regular file.
pub fn read_stamp(path: &Path) -> Result<FileStamp> {
    if !path.is_file() {
        return Err(ViewerError::FileNotFound(path.to_path_buf()));
    }
    let meta = std::fs::metadata(path)?;
    Ok(FileStamp {
        modified: meta.modified()?,
        len: meta.len(),
    })
}

/// Check one entry's backing file and reload it if the stamp moved.
///
/// * First observation only records the stamp (no reload).
/// * Unreadable stamp (file missing mid-save) is a quiet no-op; the next
///   tick retries.
/// * Unchanged stamp is a no-op: neither viewport nor preview mutate.
/// * On change: reload, update the stamp, and restore the viewport per
///   the Fit/Manual rules. A failed reload keeps the previous source,
///   preview, stamp and viewport and returns the error.
///
/// Returns whether a reload happened.
pub fn check_and_reload(entry: &mut ImageEntry) -> Result<bool> {
    let stamp = match read_stamp(&entry.path) {
        Ok(stamp) => stamp,
        Err(_) => return Ok(false),
    };

    match entry.stamp {
        None => {
            entry.stamp = Some(stamp);
            Ok(false)
        }
        Some(prev) if prev == stamp => Ok(false),
        Some(_) => {
            let was_fit = entry.viewport.fit_to_window;
            let saved = entry.viewport;

            entry.reload_from_disk()?;
            entry.stamp = Some(stamp);

            if was_fit {
                entry.viewport.fit_to_window = true;
                entry.viewport.min_zoom = None;
            } else {
                entry.viewport = saved;
            }
            log::info!("Reloaded {} ({})", entry.filename, entry.stats.source);
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::PreviewConfig;
    use crate::viewport::transform::ViewportState;
    use iced::Vector;
    use std::path::PathBuf;

    fn write_png(path: &Path, w: u32, h: u32, seed: u8) {
        let buf = image::RgbImage::from_fn(w, h, |x, y| {
            image::Rgb([seed.wrapping_add(x as u8), y as u8, 0])
        });
        buf.save(path).unwrap();
    }

    /// Force a stamp difference without relying on filesystem mtime
    /// granularity between two quick writes. No real file ever reaches
    /// this length, so the poisoned stamp can never match the disk.
    fn backdate_stamp(entry: &mut ImageEntry) {
        if let Some(stamp) = entry.stamp.as_mut() {
            stamp.len = u64::MAX;
        }
    }

    fn load_entry(path: &Path) -> ImageEntry {
        ImageEntry::load(path, PreviewConfig::default()).unwrap()
    }

    #[test]
    fn first_observation_records_without_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        write_png(&path, 4, 4, 0);

        let mut entry = load_entry(&path);
        entry.stamp = None;
        assert!(!check_and_reload(&mut entry).unwrap());
        assert!(entry.stamp.is_some());
    }

    #[test]
    fn unchanged_stamp_mutates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        write_png(&path, 4, 4, 0);

        let mut entry = load_entry(&path);
        entry.viewport = ViewportState {
            zoom: 3.0,
            min_zoom: Some(0.5),
            pan: Vector::new(7.0, 8.0),
            fit_to_window: false,
        };
        let viewport_before = entry.viewport;
        let preview_before = entry.preview.clone();

        assert!(!check_and_reload(&mut entry).unwrap());
        assert_eq!(entry.viewport, viewport_before);
        assert_eq!(entry.preview, preview_before);
    }

    #[test]
    fn changed_stamp_reloads_and_preserves_manual_viewport() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        write_png(&path, 4, 4, 0);

        let mut entry = load_entry(&path);
        entry.viewport = ViewportState {
            zoom: 5.0,
            min_zoom: Some(0.25),
            pan: Vector::new(-3.0, 4.0),
            fit_to_window: false,
        };
        let viewport_before = entry.viewport;

        write_png(&path, 4, 4, 100);
        backdate_stamp(&mut entry);

        assert!(check_and_reload(&mut entry).unwrap());
        assert_eq!(entry.viewport, viewport_before);
        assert_eq!(entry.source.samples.get(0), 100.0);
    }

    #[test]
    fn changed_stamp_in_fit_clears_zoom_bound() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        write_png(&path, 4, 4, 0);

        let mut entry = load_entry(&path);
        entry.viewport.min_zoom = Some(2.0);
        assert!(entry.viewport.fit_to_window);

        write_png(&path, 8, 2, 1);
        backdate_stamp(&mut entry);

        assert!(check_and_reload(&mut entry).unwrap());
        assert!(entry.viewport.fit_to_window);
        assert_eq!(entry.viewport.min_zoom, None);
        assert_eq!(entry.source.width, 8);
    }

    #[test]
    fn failed_reload_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        write_png(&path, 4, 4, 0);

        let mut entry = load_entry(&path);
        let source_before = entry.source.clone();
        let preview_before = entry.preview.clone();

        std::fs::write(&path, b"no longer a png").unwrap();
        backdate_stamp(&mut entry);
        let stamp_before = entry.stamp;

        let err = check_and_reload(&mut entry).unwrap_err();
        assert!(matches!(
            err,
            ViewerError::UnsupportedOrCorruptFormat { .. }
        ));
        assert_eq!(entry.source, source_before);
        assert_eq!(entry.preview, preview_before);
        // Stamp not advanced on failure, so the next tick retries.
        assert_eq!(entry.stamp, stamp_before);
    }

    #[test]
    fn missing_file_is_a_quiet_noop() {
        let mut entry = {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("gone.png");
            write_png(&path, 2, 2, 0);
            let mut entry = load_entry(&path);
            entry.path = PathBuf::from("/nonexistent/gone.png");
            entry
        };
        assert!(!check_and_reload(&mut entry).unwrap());
    }
}
