//! The ordered set of loaded images and the shared display config

use std::path::{Path, PathBuf};

use crate::preview::PreviewConfig;
use crate::state::entry::ImageEntry;

/// Insertion-ordered entries plus the selection index, the session-global
/// preview config and the link-view flag.
#[derive(Debug, Default)]
pub struct Collection {
    pub entries: Vec<ImageEntry>,
    pub selected: usize,
    pub config: PreviewConfig,
    pub link_view: bool,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn selected_entry(&self) -> Option<&ImageEntry> {
        self.entries.get(self.selected)
    }

    pub fn selected_entry_mut(&mut self) -> Option<&mut ImageEntry> {
        self.entries.get_mut(self.selected)
    }

    pub fn select(&mut self, index: usize) {
        if index < self.entries.len() {
            self.selected = index;
        }
    }

    pub fn push(&mut self, entry: ImageEntry) {
        self.entries.push(entry);
    }

    /// Whether a path (canonicalized when possible) is already loaded.
    /// Used to skip duplicate drops silently.
    pub fn contains_path(&self, path: &Path) -> bool {
        let canon = canonical(path);
        self.entries.iter().any(|e| canonical(&e.path) == canon)
    }

    /// Remove the entry at `index`, preserving relative order, and
    /// re-clamp the selection:
    /// * removed == selected: select `min(index, new_len - 1)`, or 0 when
    ///   the collection becomes empty
    /// * removed < selected: selection shifts down by one
    /// * removed > selected: selection unchanged
    ///
    /// The returned entry still owns its texture handles; dropping it
    /// releases them.
    pub fn remove(&mut self, index: usize) -> Option<ImageEntry> {
        if index >= self.entries.len() {
            return None;
        }
        let entry = self.entries.remove(index);
        if self.entries.is_empty() {
            self.selected = 0;
        } else if index == self.selected {
            self.selected = index.min(self.entries.len() - 1);
        } else if index < self.selected {
            self.selected -= 1;
        }
        Some(entry)
    }

    pub fn remove_selected(&mut self) -> Option<ImageEntry> {
        if self.entries.is_empty() {
            return None;
        }
        self.remove(self.selected)
    }

    /// Rebuild every entry whose applied config no longer matches the
    /// live config. All stale entries rebuild in one sweep; a failing
    /// entry keeps its previous preview and gets an inline status line
    /// while its siblings still rebuild.
    pub fn rebuild_stale(&mut self) {
        let config = self.config;
        for entry in &mut self.entries {
            if entry.applied_config == config {
                continue;
            }
            match entry.rebuild_preview(config) {
                Ok(()) => entry.status_line = None,
                Err(e) => {
                    let message = e.to_string();
                    if entry.status_line.as_deref() != Some(&message) {
                        log::warn!("Preview rebuild failed for {}: {}", entry.filename, message);
                        entry.status_line = Some(message);
                    }
                }
            }
        }
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Samples, SourceImage};
    use std::path::PathBuf;

    fn entry(name: &str) -> ImageEntry {
        let source = SourceImage::new(2, 2, 1, Samples::U8(vec![0, 64, 128, 255]));
        ImageEntry::from_source(
            PathBuf::from(format!("/virtual/{name}")),
            source,
            PreviewConfig::default(),
        )
        .unwrap()
    }

    fn collection(count: usize) -> Collection {
        let mut c = Collection::new();
        for i in 0..count {
            c.push(entry(&format!("{i}.png")));
        }
        c
    }

    #[test]
    fn removing_selected_selects_successor_or_last() {
        let mut c = collection(3);
        c.selected = 1;
        c.remove(1);
        assert_eq!(c.selected, 1); // former index 2

        let mut c = collection(3);
        c.selected = 2;
        c.remove(2);
        assert_eq!(c.selected, 1); // clamped to new last
    }

    #[test]
    fn removing_before_selected_shifts_selection_down() {
        let mut c = collection(3);
        c.selected = 2;
        c.remove(0);
        assert_eq!(c.selected, 1);
        assert_eq!(c.selected_entry().unwrap().filename, "2.png");
    }

    #[test]
    fn removing_after_selected_keeps_selection() {
        let mut c = collection(3);
        c.selected = 0;
        c.remove(2);
        assert_eq!(c.selected, 0);
        assert_eq!(c.selected_entry().unwrap().filename, "0.png");
    }

    #[test]
    fn removing_last_entry_resets_selection() {
        let mut c = collection(1);
        c.remove(0);
        assert_eq!(c.selected, 0);
        assert!(c.selected_entry().is_none());
    }

    #[test]
    fn selection_rule_holds_for_all_triples() {
        // Exhaustive check of the three-way rule for small collections.
        for count in 1..=5usize {
            for selected in 0..count {
                for deleted in 0..count {
                    let mut c = collection(count);
                    c.selected = selected;
                    c.remove(deleted);

                    let new_len = count - 1;
                    if new_len == 0 {
                        assert_eq!(c.selected, 0);
                        continue;
                    }
                    let expected = if deleted == selected {
                        deleted.min(new_len - 1)
                    } else if deleted < selected {
                        selected - 1
                    } else {
                        selected
                    };
                    assert_eq!(
                        c.selected, expected,
                        "count={count} selected={selected} deleted={deleted}"
                    );
                    assert!(c.selected < new_len);
                }
            }
        }
    }

    #[test]
    fn deletion_preserves_relative_order() {
        let mut c = collection(4);
        c.remove(1);
        let names: Vec<_> = c.entries.iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(names, vec!["0.png", "2.png", "3.png"]);
    }

    #[test]
    fn out_of_range_removal_is_ignored() {
        let mut c = collection(2);
        assert!(c.remove(5).is_none());
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn duplicate_paths_are_detected() {
        let c = collection(2);
        assert!(c.contains_path(Path::new("/virtual/0.png")));
        assert!(!c.contains_path(Path::new("/virtual/9.png")));
    }

    #[test]
    fn rebuild_sweep_covers_all_stale_entries() {
        let mut c = collection(3);
        c.config.grayscale = true;
        c.rebuild_stale();
        for entry in &c.entries {
            assert_eq!(entry.applied_config, c.config);
        }
    }

    #[test]
    fn rebuild_skips_entries_already_current() {
        let mut c = collection(1);
        let before = c.entries[0].preview.clone();
        c.rebuild_stale();
        assert_eq!(c.entries[0].preview, before);
    }
}
