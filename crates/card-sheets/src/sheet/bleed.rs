//! Placing a face on a page with edge-extended bleed

use crate::types::Bleed;
use image::RgbImage;

/// Paste `face` with its top-left corner at `origin` and extend its edges by `bleed`.
///
/// Each pixel in the bleed band copies the nearest face edge pixel; the corner squares
/// take the corner pixels. Anything outside the page is dropped, so an oversized bleed
/// runs to the page edge.
pub fn draw_with_bleed(page: &mut RgbImage, face: &RgbImage, origin: (i64, i64), bleed: Bleed) {
    let (face_width, face_height) = face.dimensions();
    if face_width == 0 || face_height == 0 {
        return;
    }

    let (page_width, page_height) = (page.width() as i64, page.height() as i64);
    let (ox, oy) = origin;
    let (bx, by) = (bleed.x as i64, bleed.y as i64);

    let left = (ox - bx).max(0);
    let top = (oy - by).max(0);
    let right = (ox + face_width as i64 + bx).min(page_width);
    let bottom = (oy + face_height as i64 + by).min(page_height);

    let max_x = face_width as i64 - 1;
    let max_y = face_height as i64 - 1;

    for y in top..bottom {
        let sy = (y - oy).clamp(0, max_y) as u32;
        for x in left..right {
            let sx = (x - ox).clamp(0, max_x) as u32;
            page.put_pixel(x as u32, y as u32, *face.get_pixel(sx, sy));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    /// 2x2 face with a distinct colour in each corner
    fn quad() -> RgbImage {
        let mut face = RgbImage::new(2, 2);
        face.put_pixel(0, 0, Rgb([1, 0, 0]));
        face.put_pixel(1, 0, Rgb([2, 0, 0]));
        face.put_pixel(0, 1, Rgb([3, 0, 0]));
        face.put_pixel(1, 1, Rgb([4, 0, 0]));
        face
    }

    #[test]
    fn test_edges_and_corners_extend() {
        let mut page = RgbImage::from_pixel(10, 10, WHITE);
        draw_with_bleed(&mut page, &quad(), (4, 4), Bleed::new(2, 1));

        // Face itself
        assert_eq!(page.get_pixel(4, 4), &Rgb([1, 0, 0]));
        assert_eq!(page.get_pixel(5, 5), &Rgb([4, 0, 0]));
        // Left edge band repeats the left column
        assert_eq!(page.get_pixel(2, 5), &Rgb([3, 0, 0]));
        // Top-right corner square takes the top-right pixel
        assert_eq!(page.get_pixel(7, 3), &Rgb([2, 0, 0]));
        // Outside the bleed is untouched
        assert_eq!(page.get_pixel(1, 4), &WHITE);
        assert_eq!(page.get_pixel(4, 2), &WHITE);
    }

    #[test]
    fn test_clipped_to_page() {
        let mut page = RgbImage::from_pixel(6, 6, WHITE);
        draw_with_bleed(&mut page, &quad(), (1, 1), Bleed::new(100_000, 0));

        assert_eq!(page.get_pixel(0, 1), &Rgb([1, 0, 0]));
        assert_eq!(page.get_pixel(5, 2), &Rgb([4, 0, 0]));
        assert_eq!(page.get_pixel(0, 0), &WHITE);
    }

    #[test]
    fn test_zero_bleed_is_plain_paste() {
        let mut page = RgbImage::from_pixel(4, 4, WHITE);
        draw_with_bleed(&mut page, &quad(), (1, 1), Bleed::default());

        let changed = page.pixels().filter(|&&p| p != WHITE).count();
        assert_eq!(changed, 4);
    }
}
