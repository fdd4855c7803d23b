//! Image decoding at native bit depth
//!
//! This module loads raster files without forcing depth/channel conversion:
//! a 16-bit PNG stays 16-bit, an EXR stays 32-bit float. The decoded
//! samples are what the pixel inspector reports, so no precision may be
//! lost here.

use std::path::Path;

use image::DynamicImage;

use crate::error::{Result, ViewerError};

/// File extensions accepted at the input boundary.
///
/// Anything else dropped onto the window is rejected with a modal message
/// before the decoder ever runs.
#[rustfmt::skip]
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    // bitmap
    "bmp", "dib",
    // jpeg
    "jpg", "jpeg", "jpe", "jfif",
    // png
    "png",
    // portable anymap
    "pbm", "pgm", "ppm", "pnm", "pam",
    // tiff
    "tif", "tiff",
    // webp
    "webp",
    // hdr-ish
    "hdr", "exr",
    // others
    "tga", "qoi", "gif", "ico", "ff",
];

/// Check a path against the extension allow-list (case-insensitive).
pub fn is_supported_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Per-sample storage depth of a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleDepth {
    U8,
    I8,
    U16,
    I16,
    I32,
    F32,
    F64,
}

impl SampleDepth {
    /// Short display label ("16U", "32F", ...).
    pub fn label(self) -> &'static str {
        match self {
            SampleDepth::U8 => "8U",
            SampleDepth::I8 => "8S",
            SampleDepth::U16 => "16U",
            SampleDepth::I16 => "16S",
            SampleDepth::I32 => "32S",
            SampleDepth::F32 => "32F",
            SampleDepth::F64 => "64F",
        }
    }
}

/// Interleaved sample storage, one variant per supported depth.
///
/// Decoding produces the U8/U16/F32 variants (what the `image` crate can
/// represent); the signed and 64-bit variants exist because the preview
/// pipeline and pixel inspector must handle buffers produced by other
/// tooling and tests.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    U8(Vec<u8>),
    I8(Vec<i8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::U8(v) => v.len(),
            Samples::I8(v) => v.len(),
            Samples::U16(v) => v.len(),
            Samples::I16(v) => v.len(),
            Samples::I32(v) => v.len(),
            Samples::F32(v) => v.len(),
            Samples::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn depth(&self) -> SampleDepth {
        match self {
            Samples::U8(_) => SampleDepth::U8,
            Samples::I8(_) => SampleDepth::I8,
            Samples::U16(_) => SampleDepth::U16,
            Samples::I16(_) => SampleDepth::I16,
            Samples::I32(_) => SampleDepth::I32,
            Samples::F32(_) => SampleDepth::F32,
            Samples::F64(_) => SampleDepth::F64,
        }
    }

    /// Read one sample as f64. Exact for every integer depth (all fit in
    /// the f64 mantissa) and for f32/f64.
    pub fn get(&self, index: usize) -> f64 {
        match self {
            Samples::U8(v) => v[index] as f64,
            Samples::I8(v) => v[index] as f64,
            Samples::U16(v) => v[index] as f64,
            Samples::I16(v) => v[index] as f64,
            Samples::I32(v) => v[index] as f64,
            Samples::F32(v) => v[index] as f64,
            Samples::F64(v) => v[index],
        }
    }
}

/// An owned, immutable-after-load multi-channel sample buffer.
///
/// Created by [`decode`] on load, replaced wholesale on reload, dropped
/// when the image entry is removed.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub samples: Samples,
}

impl SourceImage {
    pub fn new(width: u32, height: u32, channels: u8, samples: Samples) -> Self {
        debug_assert_eq!(
            samples.len(),
            width as usize * height as usize * channels as usize,
            "sample buffer does not match dimensions"
        );
        Self {
            width,
            height,
            channels,
            samples,
        }
    }

    pub fn depth(&self) -> SampleDepth {
        self.samples.depth()
    }

    pub fn depth_label(&self) -> &'static str {
        self.depth().label()
    }

    /// Shape summary for the status line, e.g. "640x480 x3 16U".
    pub fn describe(&self) -> String {
        format!(
            "{}x{} x{} {}",
            self.width,
            self.height,
            self.channels,
            self.depth_label()
        )
    }

    /// Flat index of channel `c` at pixel (x, y).
    pub fn sample_index(&self, x: u32, y: u32, c: u8) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels as usize + c as usize
    }
}

/// Decode a file into a [`SourceImage`], preserving native bit depth and
/// channel count.
///
/// # Errors
/// * `FileNotFound` - the path does not resolve to a regular file
/// * `UnsupportedOrCorruptFormat` - the decoder failed or produced an
///   empty result
/// * `UnsupportedDepth` - the decoded sample format has no counterpart in
///   [`Samples`]
pub fn decode(path: &Path) -> Result<SourceImage> {
    if !path.is_file() {
        return Err(ViewerError::FileNotFound(path.to_path_buf()));
    }

    let decoded = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| ViewerError::UnsupportedOrCorruptFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let source = source_from_dynamic(decoded)?;
    if source.width == 0 || source.height == 0 || source.samples.is_empty() {
        return Err(ViewerError::UnsupportedOrCorruptFormat {
            path: path.to_path_buf(),
            reason: "decoder produced an empty image".to_string(),
        });
    }

    log::debug!("Decoded {}: {}", path.display(), source.describe());
    Ok(source)
}

/// Map a decoded `DynamicImage` onto the native-depth sample model.
fn source_from_dynamic(img: DynamicImage) -> Result<SourceImage> {
    let source = match img {
        DynamicImage::ImageLuma8(buf) => {
            SourceImage::new(buf.width(), buf.height(), 1, Samples::U8(buf.into_raw()))
        }
        DynamicImage::ImageLumaA8(buf) => {
            SourceImage::new(buf.width(), buf.height(), 2, Samples::U8(buf.into_raw()))
        }
        DynamicImage::ImageRgb8(buf) => {
            SourceImage::new(buf.width(), buf.height(), 3, Samples::U8(buf.into_raw()))
        }
        DynamicImage::ImageRgba8(buf) => {
            SourceImage::new(buf.width(), buf.height(), 4, Samples::U8(buf.into_raw()))
        }
        DynamicImage::ImageLuma16(buf) => {
            SourceImage::new(buf.width(), buf.height(), 1, Samples::U16(buf.into_raw()))
        }
        DynamicImage::ImageLumaA16(buf) => {
            SourceImage::new(buf.width(), buf.height(), 2, Samples::U16(buf.into_raw()))
        }
        DynamicImage::ImageRgb16(buf) => {
            SourceImage::new(buf.width(), buf.height(), 3, Samples::U16(buf.into_raw()))
        }
        DynamicImage::ImageRgba16(buf) => {
            SourceImage::new(buf.width(), buf.height(), 4, Samples::U16(buf.into_raw()))
        }
        DynamicImage::ImageRgb32F(buf) => {
            SourceImage::new(buf.width(), buf.height(), 3, Samples::F32(buf.into_raw()))
        }
        DynamicImage::ImageRgba32F(buf) => {
            SourceImage::new(buf.width(), buf.height(), 4, Samples::F32(buf.into_raw()))
        }
        other => {
            return Err(ViewerError::UnsupportedDepth(format!("{:?}", other.color())));
        }
    };
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_allow_list() {
        assert!(is_supported_extension(Path::new("photo.PNG")));
        assert!(is_supported_extension(Path::new("/a/b/scan.tiff")));
        assert!(!is_supported_extension(Path::new("notes.txt")));
        assert!(!is_supported_extension(Path::new("no_extension")));
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let err = decode(Path::new("/nonexistent/image.png")).unwrap_err();
        assert!(matches!(err, ViewerError::FileNotFound(_)));
    }

    #[test]
    fn garbage_file_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"this is not a png").unwrap();
        let err = decode(&path).unwrap_err();
        assert!(matches!(
            err,
            ViewerError::UnsupportedOrCorruptFormat { .. }
        ));
    }

    #[test]
    fn decode_preserves_rgb8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        let buf = image::RgbImage::from_fn(4, 2, |x, y| image::Rgb([x as u8, y as u8, 7]));
        buf.save(&path).unwrap();

        let source = decode(&path).unwrap();
        assert_eq!((source.width, source.height, source.channels), (4, 2, 3));
        assert_eq!(source.depth(), SampleDepth::U8);
        assert_eq!(source.samples.get(source.sample_index(3, 1, 0)), 3.0);
        assert_eq!(source.samples.get(source.sample_index(3, 1, 2)), 7.0);
    }

    #[test]
    fn decode_preserves_16bit_depth() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray16.png");
        let buf: image::ImageBuffer<image::Luma<u16>, Vec<u16>> =
            image::ImageBuffer::from_fn(3, 3, |x, y| image::Luma([(x * 1000 + y * 300) as u16]));
        buf.save(&path).unwrap();

        let source = decode(&path).unwrap();
        assert_eq!(source.depth(), SampleDepth::U16);
        assert_eq!(source.depth_label(), "16U");
        assert_eq!(source.channels, 1);
        assert_eq!(source.samples.get(source.sample_index(2, 1, 0)), 2300.0);
        assert_eq!(source.describe(), "3x3 x1 16U");
    }
}
