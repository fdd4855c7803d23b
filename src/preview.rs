//! Preview transform pipeline
//!
//! Converts a native-depth source buffer into the 8-bit RGBA buffer the
//! renderer uploads. Stages run in a fixed order:
//!
//! 1. depth normalization (direct bit-depth cast) OR per-channel
//!    auto-contrast stretch
//! 2. grayscale reduction
//! 3. pseudo-color mapping
//! 4. alpha neutralization
//! 5. channel-order normalization to RGBA
//!
//! A failed build leaves the caller's previous preview untouched: the
//! pipeline only returns new buffers, it never writes in place.

use crate::codec::{SampleDepth, SourceImage};
use crate::colormap;
use crate::error::{Result, ViewerError};

/// Session-global display toggles. Each image keeps the snapshot it was
/// last built with, so a stale entry is found by comparing against this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreviewConfig {
    pub grayscale: bool,
    pub auto_contrast: bool,
    pub pseudo_color: bool,
    pub ignore_alpha: bool,
}

/// Observed value range when auto-contrast ran (all stretched channels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContrastRange {
    pub min_val: f64,
    pub max_val: f64,
}

/// Display-ready buffer derived from a source image.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewBuffer {
    /// Canonical RGBA presentation order, 8 bits per channel.
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// 8-bit intermediate buffer before RGBA reordering, for contexts that
    /// want post-transform values in the buffer's own channel layout.
    pub flat: Vec<u8>,
    pub flat_channels: u8,
    /// Populated only when auto-contrast was applied.
    pub contrast: Option<ContrastRange>,
}

/// Shape summaries for the status line.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewStats {
    pub source: String,
    pub preview: String,
}

impl PreviewBuffer {
    /// Post-transform 8-bit values at (x, y) in the intermediate
    /// buffer's own channel layout. `None` out of bounds.
    pub fn flat_pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let c = self.flat_channels as usize;
        let i = (y as usize * self.width as usize + x as usize) * c;
        self.flat.get(i..i + c)
    }
}

/// Which channel, if any, is treated as alpha. Inherited convention: the
/// 4th channel of a 4-channel buffer. Single funnel so an explicit alpha
/// designation can replace the rule in one place.
fn alpha_channel(channels: usize) -> Option<usize> {
    (channels == 4).then_some(3)
}

/// Direct bit-depth cast to 8-bit with clamping, without rescaling by the
/// actual data range. Integer depths drop their low bits; 32-bit and float
/// samples are displayed as if normalized to [0, 1], which is how a
/// float texture renders.
fn display_cast(depth: SampleDepth, v: f64) -> u8 {
    match depth {
        SampleDepth::U8 => v as u8,
        SampleDepth::I8 => v.max(0.0) as u8,
        SampleDepth::U16 => ((v as u16) >> 8) as u8,
        SampleDepth::I16 => ((v.max(0.0) as u16) >> 8) as u8,
        SampleDepth::I32 | SampleDepth::F32 | SampleDepth::F64 => {
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
    }
}

/// Build a display RGBA preview for `source` under `config`.
///
/// Returns the preview buffer plus stats describing source/preview shapes.
/// Channel counts other than 1/3/4 at presentation time are a hard error.
pub fn build_preview(
    source: &SourceImage,
    config: PreviewConfig,
) -> Result<(PreviewBuffer, PreviewStats)> {
    let width = source.width;
    let height = source.height;
    let pixels = width as usize * height as usize;
    let channels = source.channels as usize;
    let depth = source.depth();

    let mut buf = vec![0u8; pixels * channels];
    let mut contrast = None;

    if config.auto_contrast {
        let mut min_across = f64::INFINITY;
        let mut max_across = f64::NEG_INFINITY;

        for ch in 0..channels {
            if alpha_channel(channels) == Some(ch) {
                // Alpha is cast directly, never stretched.
                for p in 0..pixels {
                    let i = p * channels + ch;
                    buf[i] = display_cast(depth, source.samples.get(i));
                }
                continue;
            }

            let mut lo = f64::INFINITY;
            let mut hi = f64::NEG_INFINITY;
            for p in 0..pixels {
                let v = source.samples.get(p * channels + ch);
                lo = lo.min(v);
                hi = hi.max(v);
            }
            min_across = min_across.min(lo);
            max_across = max_across.max(hi);

            if lo == hi {
                // Constant channel: no range to stretch, stays zero.
                continue;
            }
            let scale = 255.0 / (hi - lo);
            for p in 0..pixels {
                let i = p * channels + ch;
                let v = (source.samples.get(i) - lo) * scale;
                buf[i] = v.round().clamp(0.0, 255.0) as u8;
            }
        }

        contrast = Some(ContrastRange {
            min_val: if min_across.is_finite() { min_across } else { 0.0 },
            max_val: if max_across.is_finite() { max_across } else { 0.0 },
        });
    } else {
        for (i, out) in buf.iter_mut().enumerate() {
            *out = display_cast(depth, source.samples.get(i));
        }
    }

    let mut chans = channels;

    // Grayscale reduction (3/4 channels; a trailing alpha is ignored).
    if config.grayscale && (chans == 3 || chans == 4) {
        let mut gray = vec![0u8; pixels];
        for (p, out) in gray.iter_mut().enumerate() {
            let r = buf[p * chans] as f32;
            let g = buf[p * chans + 1] as f32;
            let b = buf[p * chans + 2] as f32;
            *out = (0.299 * r + 0.587 * g + 0.114 * b).round() as u8;
        }
        buf = gray;
        chans = 1;
    }

    // Pseudo-color: single intensity channel through the fixed LUT. The
    // result is already in display channel order.
    let mut display_ready = false;
    if config.pseudo_color && chans == 1 {
        let lut = colormap::lut();
        let mut rgba = vec![0u8; pixels * 4];
        for p in 0..pixels {
            let [r, g, b] = lut[buf[p] as usize];
            rgba[p * 4] = r;
            rgba[p * 4 + 1] = g;
            rgba[p * 4 + 2] = b;
            rgba[p * 4 + 3] = u8::MAX;
        }
        buf = rgba;
        chans = 4;
        display_ready = true;
    }

    // Alpha neutralization: force full opacity, color channels untouched.
    if config.ignore_alpha && chans == 4 {
        for p in 0..pixels {
            buf[p * 4 + 3] = u8::MAX;
        }
    }

    let flat = buf.clone();
    let flat_channels = chans as u8;

    // Channel-order normalization to canonical RGBA.
    let rgba = if display_ready {
        buf
    } else {
        match chans {
            1 => {
                let mut rgba = vec![0u8; pixels * 4];
                for p in 0..pixels {
                    let v = buf[p];
                    rgba[p * 4] = v;
                    rgba[p * 4 + 1] = v;
                    rgba[p * 4 + 2] = v;
                    rgba[p * 4 + 3] = u8::MAX;
                }
                rgba
            }
            3 => {
                let mut rgba = vec![0u8; pixels * 4];
                for p in 0..pixels {
                    rgba[p * 4] = buf[p * 3];
                    rgba[p * 4 + 1] = buf[p * 3 + 1];
                    rgba[p * 4 + 2] = buf[p * 3 + 2];
                    rgba[p * 4 + 3] = u8::MAX;
                }
                rgba
            }
            4 => buf,
            n => return Err(ViewerError::UnsupportedChannelCount(n as u8)),
        }
    };

    let buffer = PreviewBuffer {
        rgba,
        width,
        height,
        flat,
        flat_channels,
        contrast,
    };
    let stats = PreviewStats {
        source: source.describe(),
        preview: format!("{}x{} x{} 8U", width, height, flat_channels),
    };
    Ok((buffer, stats))
}
