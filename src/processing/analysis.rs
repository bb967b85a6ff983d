//! Bit-plane inspection.
//!
//! Renders the least significant bit of one channel as a black/white map.
//! Natural photos show faint structure in this plane; a channel carrying
//! encrypted payload looks like uniform static.

use image::{Rgb, RgbImage};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// LSB plane of `channel` (0 = red, 1 = green, 2 = blue). Out-of-range
/// channels are clamped to blue.
pub fn bit_plane(image: &RgbImage, channel: usize) -> RgbImage {
    let channel = channel.min(2);
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        if image.get_pixel(x, y)[channel] & 1 == 1 {
            WHITE
        } else {
            BLACK
        }
    })
}

/// Fraction of pixels whose `channel` LSB is set. `0.0` for empty images.
pub fn ones_ratio(image: &RgbImage, channel: usize) -> f64 {
    let channel = channel.min(2);
    let total = image.width() as u64 * image.height() as u64;
    if total == 0 {
        return 0.0;
    }
    let ones = image.pixels().filter(|p| p[channel] & 1 == 1).count() as u64;
    ones as f64 / total as f64
}
