//! Pixel picking and raw value formatting
//!
//! Maps a hovered screen point back to integer source coordinates and
//! renders the untransformed per-channel value for display. The readout
//! always reports what is in the file, not what the preview pipeline made
//! of it.

use iced::Point;

use crate::codec::{Samples, SourceImage};
use crate::viewport::transform::Placement;

/// Grid lines and crosshair only appear once a device pixel maps to at
/// least this many screen units per axis.
pub const GRID_MIN_PIXEL_SIZE: f32 = 4.0;

/// Map a screen point inside the drawn image rectangle to source pixel
/// coordinates. Left-inclusive, right-exclusive: the rectangle's top-left
/// maps to (0, 0), a point on the right or bottom edge yields no hit.
pub fn hit_test(
    screen: Point,
    placement: &Placement,
    grid_w: u32,
    grid_h: u32,
) -> Option<(u32, u32)> {
    if grid_w == 0 || grid_h == 0 || !placement.contains(screen) {
        return None;
    }
    let u = (screen.x - placement.top_left.x) / placement.size.width;
    let v = (screen.y - placement.top_left.y) / placement.size.height;
    let x = ((u * grid_w as f32).floor() as u32).min(grid_w - 1);
    let y = ((v * grid_h as f32).floor() as u32).min(grid_h - 1);
    Some((x, y))
}

/// Whether the pixel grid overlay should be drawn for this on-screen
/// pixel size.
pub fn grid_visible(pixel_w: f32, pixel_h: f32) -> bool {
    pixel_w >= GRID_MIN_PIXEL_SIZE && pixel_h >= GRID_MIN_PIXEL_SIZE
}

/// Canonical channel label. Native storage is RGB(A) order, so the label
/// index is the channel index.
fn channel_label(channels: u8, index: u8) -> String {
    match channels {
        1 => "Gray".to_string(),
        3 | 4 => ["R", "G", "B", "A"][index as usize].to_string(),
        _ => format!("C{}", index),
    }
}

/// Render one raw sample: integer depths at integer precision, float
/// depths at their native precision.
fn format_sample(source: &SourceImage, index: usize) -> String {
    match &source.samples {
        Samples::U8(v) => v[index].to_string(),
        Samples::I8(v) => v[index].to_string(),
        Samples::U16(v) => v[index].to_string(),
        Samples::I16(v) => v[index].to_string(),
        Samples::I32(v) => v[index].to_string(),
        Samples::F32(v) => v[index].to_string(),
        Samples::F64(v) => v[index].to_string(),
    }
}

/// Format the raw per-channel value at (x, y), e.g.
/// `(12, 7) [R=255, G=0, B=17]`. Out-of-bounds coordinates yield an empty
/// string, not an error.
pub fn format_pixel(source: &SourceImage, x: u32, y: u32) -> String {
    if x >= source.width || y >= source.height {
        return String::new();
    }

    let mut out = format!("({}, {}) [", x, y);
    for c in 0..source.channels {
        if c > 0 {
            out.push_str(", ");
        }
        out.push_str(&channel_label(source.channels, c));
        out.push('=');
        out.push_str(&format_sample(source, source.sample_index(x, y, c)));
    }
    out.push(']');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced::Size;

    fn placement() -> Placement {
        Placement {
            top_left: Point::new(10.0, 20.0),
            size: Size::new(100.0, 50.0),
            zoom: 1.0,
        }
    }

    #[test]
    fn origin_maps_to_first_pixel() {
        let hit = hit_test(Point::new(10.0, 20.0), &placement(), 10, 5);
        assert_eq!(hit, Some((0, 0)));
    }

    #[test]
    fn right_and_bottom_edges_are_exclusive() {
        let p = placement();
        assert_eq!(hit_test(Point::new(110.0, 30.0), &p, 10, 5), None);
        assert_eq!(hit_test(Point::new(50.0, 70.0), &p, 10, 5), None);
        // Just inside still hits the last pixel.
        assert_eq!(
            hit_test(Point::new(109.9, 69.9), &p, 10, 5),
            Some((9, 4))
        );
    }

    #[test]
    fn interior_points_floor_to_pixel_indices() {
        // Pixels are 10x10 screen units here.
        let p = placement();
        assert_eq!(hit_test(Point::new(29.9, 20.0), &p, 10, 5), Some((1, 0)));
        assert_eq!(hit_test(Point::new(30.0, 20.0), &p, 10, 5), Some((2, 0)));
    }

    #[test]
    fn outside_rectangle_misses() {
        let p = placement();
        assert_eq!(hit_test(Point::new(9.9, 25.0), &p, 10, 5), None);
        assert_eq!(hit_test(Point::new(50.0, 19.9), &p, 10, 5), None);
    }

    #[test]
    fn grid_threshold() {
        assert!(grid_visible(4.0, 4.0));
        assert!(!grid_visible(3.9, 10.0));
        assert!(!grid_visible(10.0, 3.9));
    }

    #[test]
    fn formats_gray_pixel() {
        let source = SourceImage::new(2, 1, 1, Samples::U16(vec![1234, 5678]));
        assert_eq!(format_pixel(&source, 1, 0), "(1, 0) [Gray=5678]");
    }

    #[test]
    fn formats_rgb_and_rgba_labels() {
        let rgb = SourceImage::new(1, 1, 3, Samples::U8(vec![255, 0, 17]));
        assert_eq!(format_pixel(&rgb, 0, 0), "(0, 0) [R=255, G=0, B=17]");

        let rgba = SourceImage::new(1, 1, 4, Samples::U8(vec![1, 2, 3, 4]));
        assert_eq!(format_pixel(&rgba, 0, 0), "(0, 0) [R=1, G=2, B=3, A=4]");
    }

    #[test]
    fn formats_other_channel_counts_generically() {
        let source = SourceImage::new(1, 1, 2, Samples::U8(vec![5, 6]));
        assert_eq!(format_pixel(&source, 0, 0), "(0, 0) [C0=5, C1=6]");
    }

    #[test]
    fn float_values_keep_float_precision() {
        let source = SourceImage::new(1, 1, 1, Samples::F32(vec![0.25]));
        assert_eq!(format_pixel(&source, 0, 0), "(0, 0) [Gray=0.25]");
    }

    #[test]
    fn out_of_bounds_is_empty_string() {
        let source = SourceImage::new(2, 2, 1, Samples::U8(vec![0; 4]));
        assert_eq!(format_pixel(&source, 2, 0), "");
        assert_eq!(format_pixel(&source, 0, 5), "");
    }
}
