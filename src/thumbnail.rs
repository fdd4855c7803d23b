//! Letterboxed thumbnail generation
//!
//! Derives the fixed-size gallery thumbnail from a preview buffer. The
//! image is scaled to fit (never stretched), centered on a neutral gray
//! canvas. Downscaling uses area averaging, upscaling nearest-neighbor so
//! single-pixel source features stay crisp.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Gallery thumbnail size.
pub const THUMB_WIDTH: u32 = 96;
pub const THUMB_HEIGHT: u32 = 54;

/// Letterbox padding color.
const PAD_COLOR: Rgba<u8> = Rgba([114, 114, 114, 255]);

/// Compose a `target_w` x `target_h` RGBA thumbnail from an RGBA buffer.
///
/// The result is always exactly the target size; the scaled image is
/// centered with rounding-induced offsets clamped so the paste region
/// never exceeds the canvas.
pub fn letterboxed_thumbnail(
    rgba: &[u8],
    src_w: u32,
    src_h: u32,
    target_w: u32,
    target_h: u32,
) -> Vec<u8> {
    let src = RgbaImage::from_raw(src_w, src_h, rgba.to_vec())
        .expect("RGBA buffer does not match its dimensions");

    let sx = target_w as f64 / src_w as f64;
    let sy = target_h as f64 / src_h as f64;
    let scale = sx.min(sy);

    let new_w = ((src_w as f64 * scale).round() as u32).max(1);
    let new_h = ((src_h as f64 * scale).round() as u32).max(1);

    let resized = if scale < 1.0 {
        // Area averaging keeps downscaled content representative.
        imageops::thumbnail(&src, new_w, new_h)
    } else {
        imageops::resize(&src, new_w, new_h, FilterType::Nearest)
    };

    let mut canvas = RgbaImage::from_pixel(target_w, target_h, PAD_COLOR);
    let max_x = target_w.saturating_sub(new_w);
    let max_y = target_h.saturating_sub(new_h);
    let x = (max_x / 2).min(max_x);
    let y = (max_y / 2).min(max_y);
    imageops::replace(&mut canvas, &resized, x as i64, y as i64);
    canvas.into_raw()
}
