//! Minimal raster primitives for the selection overlay.

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};

/// Outline of `w x h` at `(x, y)`, growing inwards by `thickness` pixels.
/// Parts outside the surface are clipped.
pub fn draw_rect_outline(
    img: &mut RgbaImage,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    color: Rgba<u8>,
    thickness: i32,
) {
    if w <= 0 || h <= 0 {
        return;
    }
    let t = thickness.max(1).min(w).min(h);
    fill_rect(img, x, y, w, t, color);
    fill_rect(img, x, y.saturating_add(h - t), w, t, color);
    fill_rect(img, x, y, t, h, color);
    fill_rect(img, x.saturating_add(w - t), y, t, h, color);
}

/// Opaque fill of `w x h` at `(x, y)`, clipped to the surface.
pub fn fill_rect(img: &mut RgbaImage, x: i32, y: i32, w: i32, h: i32, color: Rgba<u8>) {
    let Some((x0, y0, x1, y1)) = clip(img, x, y, w, h) else {
        return;
    };
    for yy in y0..y1 {
        for xx in x0..x1 {
            img.put_pixel(xx, yy, color);
        }
    }
}

/// 8x8 bitmap text with its top-left corner at `(x, y)`.
pub fn draw_text(img: &mut RgbaImage, x: i32, y: i32, text: &str, color: Rgba<u8>) {
    let mut cursor_x = x;
    for ch in text.chars() {
        if cursor_x >= img.width() as i32 {
            break;
        }
        let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) else {
            cursor_x = cursor_x.saturating_add(8);
            continue;
        };
        for (row_idx, row) in glyph.iter().enumerate() {
            for col_idx in 0..8 {
                if (row >> col_idx) & 1 == 0 {
                    continue;
                }
                let px = cursor_x.saturating_add(col_idx);
                let py = y.saturating_add(row_idx as i32);
                if px >= 0 && py >= 0 && (px as u32) < img.width() && (py as u32) < img.height() {
                    img.put_pixel(px as u32, py as u32, color);
                }
            }
        }
        cursor_x = cursor_x.saturating_add(8);
    }
}

fn clip(img: &RgbaImage, x: i32, y: i32, w: i32, h: i32) -> Option<(u32, u32, u32, u32)> {
    let iw = img.width() as i64;
    let ih = img.height() as i64;
    let x0 = (x as i64).clamp(0, iw);
    let y0 = (y as i64).clamp(0, ih);
    let x1 = (x as i64 + w as i64).clamp(0, iw);
    let y1 = (y as i64 + h as i64).clamp(0, ih);
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    #[test]
    fn outline_leaves_interior_untouched() {
        let mut img = RgbaImage::from_pixel(40, 40, CLEAR);
        draw_rect_outline(&mut img, 5, 5, 20, 20, RED, 3);
        assert_eq!(*img.get_pixel(5, 5), RED);
        assert_eq!(*img.get_pixel(7, 15), RED);
        assert_eq!(*img.get_pixel(24, 24), RED);
        assert_eq!(*img.get_pixel(15, 15), CLEAR);
        assert_eq!(*img.get_pixel(25, 25), CLEAR);
    }

    #[test]
    fn shapes_are_clipped_to_surface() {
        let mut img = RgbaImage::from_pixel(10, 10, CLEAR);
        fill_rect(&mut img, -5, -5, 8, 8, RED);
        assert_eq!(*img.get_pixel(0, 0), RED);
        assert_eq!(*img.get_pixel(2, 2), RED);
        assert_eq!(*img.get_pixel(3, 3), CLEAR);
        draw_rect_outline(&mut img, 8, 8, 50, 50, RED, 3);
        draw_text(&mut img, 6, -3, "200 x 150 px", RED);
    }

    #[test]
    fn text_sets_some_pixels() {
        let mut img = RgbaImage::from_pixel(64, 16, CLEAR);
        draw_text(&mut img, 0, 0, "10 x", RED);
        assert!(img.pixels().any(|p| *p == RED));
    }

    #[test]
    fn far_out_coordinates_saturate() {
        let mut img = RgbaImage::from_pixel(20, 20, CLEAR);
        draw_rect_outline(&mut img, 5, 5, i32::MAX, 10, RED, 3);
        draw_rect_outline(&mut img, i32::MIN, i32::MIN, i32::MAX, i32::MAX, RED, 3);
        draw_text(&mut img, i32::MAX - 4, i32::MAX - 2, "200 x 150 px", RED);
        assert_eq!(*img.get_pixel(5, 10), RED);
        assert_eq!(*img.get_pixel(19, 5), RED);
        assert_eq!(*img.get_pixel(19, 10), CLEAR);
    }
}
