//! A single loaded image and its derived display resources

use std::path::{Path, PathBuf};

use iced::widget::image::Handle;
use iced::Size;

use crate::codec::{self, SourceImage};
use crate::error::{Result, ViewerError};
use crate::preview::{self, PreviewBuffer, PreviewConfig, PreviewStats};
use crate::state::watcher::{self, FileStamp};
use crate::thumbnail::{self, THUMB_HEIGHT, THUMB_WIDTH};
use crate::viewport::transform::ViewportState;

/// Everything the app holds for one loaded image: the immutable source
/// samples, the derived preview + thumbnail (regenerated on config or
/// source change, never partially), texture handles for the renderer, the
/// viewport state, and the file identity used by the change watcher.
#[derive(Debug, Clone)]
pub struct ImageEntry {
    pub path: PathBuf,
    pub filename: String,
    pub source: SourceImage,
    pub preview: PreviewBuffer,
    pub stats: PreviewStats,
    /// Config snapshot the current preview was built with. Compared
    /// against the live global config to find stale entries.
    pub applied_config: PreviewConfig,
    pub texture: Handle,
    pub thumb_texture: Handle,
    pub viewport: ViewportState,
    /// (mtime, size) of the backing file at last load, if readable.
    pub stamp: Option<FileStamp>,
    /// Inline status for reload/rebuild errors; load errors go modal.
    pub status_line: Option<String>,
}

impl ImageEntry {
    /// Load an entry from disk: decode, build the preview under `config`,
    /// upload textures, record the file stamp.
    pub fn load(path: &Path, config: PreviewConfig) -> Result<Self> {
        let source = codec::decode(path)?;
        let mut entry = Self::from_source(path.to_path_buf(), source, config)?;
        entry.stamp = watcher::read_stamp(path).ok();
        Ok(entry)
    }

    /// Build an entry around an already-decoded source buffer.
    pub fn from_source(path: PathBuf, source: SourceImage, config: PreviewConfig) -> Result<Self> {
        let (preview, stats) = preview::build_preview(&source, config)?;
        let (texture, thumb_texture) = upload_previews(&preview)?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            path,
            filename,
            source,
            preview,
            stats,
            applied_config: config,
            texture,
            thumb_texture,
            viewport: ViewportState::default(),
            stamp: None,
            status_line: None,
        })
    }

    /// Regenerate the preview under a new config. Builds into temporaries
    /// and commits only on success, so a failure leaves the previous
    /// preview untouched.
    pub fn rebuild_preview(&mut self, config: PreviewConfig) -> Result<()> {
        let (preview, stats) = preview::build_preview(&self.source, config)?;
        let (texture, thumb_texture) = upload_previews(&preview)?;

        self.preview = preview;
        self.stats = stats;
        self.texture = texture;
        self.thumb_texture = thumb_texture;
        self.applied_config = config;
        Ok(())
    }

    /// Re-decode the backing file and rebuild the preview with the
    /// currently applied config. Commit-on-success: a failed reload leaves
    /// the previous source and preview intact. Viewport state is not
    /// touched here; the watcher owns the preserve/reset rules.
    pub fn reload_from_disk(&mut self) -> Result<()> {
        let source = codec::decode(&self.path)?;
        let (preview, stats) = preview::build_preview(&source, self.applied_config)?;
        let (texture, thumb_texture) = upload_previews(&preview)?;

        self.source = source;
        self.preview = preview;
        self.stats = stats;
        self.texture = texture;
        self.thumb_texture = thumb_texture;
        Ok(())
    }

    /// Image dimensions as a float size for viewport math.
    pub fn image_size(&self) -> Size {
        Size::new(self.source.width as f32, self.source.height as f32)
    }
}

/// Upload the display texture and its letterboxed thumbnail.
fn upload_previews(preview: &PreviewBuffer) -> Result<(Handle, Handle)> {
    let texture = upload_rgba(&preview.rgba, preview.width, preview.height)?;
    let thumb = thumbnail::letterboxed_thumbnail(
        &preview.rgba,
        preview.width,
        preview.height,
        THUMB_WIDTH,
        THUMB_HEIGHT,
    );
    let thumb_texture = upload_rgba(&thumb, THUMB_WIDTH, THUMB_HEIGHT)?;
    Ok((texture, thumb_texture))
}

/// Validate and wrap an RGBA buffer as a renderer texture handle.
fn upload_rgba(rgba: &[u8], width: u32, height: u32) -> Result<Handle> {
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(ViewerError::TextureUpload(format!(
            "RGBA buffer is {} bytes, expected {} for {}x{}",
            rgba.len(),
            expected,
            width,
            height
        )));
    }
    Ok(Handle::from_rgba(width, height, rgba.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Samples;

    fn test_source() -> SourceImage {
        SourceImage::new(2, 2, 3, Samples::U8(vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]))
    }

    #[test]
    fn from_source_builds_preview_and_textures() {
        let entry = ImageEntry::from_source(
            PathBuf::from("/virtual/test.png"),
            test_source(),
            PreviewConfig::default(),
        )
        .unwrap();
        assert_eq!(entry.filename, "test.png");
        assert_eq!(entry.preview.rgba.len(), 2 * 2 * 4);
        assert!(entry.viewport.fit_to_window);
        assert_eq!(entry.applied_config, PreviewConfig::default());
    }

    #[test]
    fn rebuild_swaps_applied_config() {
        let mut entry = ImageEntry::from_source(
            PathBuf::from("/virtual/test.png"),
            test_source(),
            PreviewConfig::default(),
        )
        .unwrap();

        let config = PreviewConfig {
            grayscale: true,
            ..Default::default()
        };
        entry.rebuild_preview(config).unwrap();
        assert_eq!(entry.applied_config, config);
        assert_eq!(entry.preview.flat_channels, 1);
    }

    #[test]
    fn upload_rejects_mismatched_buffer() {
        let err = upload_rgba(&[0u8; 10], 2, 2).unwrap_err();
        assert!(matches!(err, ViewerError::TextureUpload(_)));
    }
}
