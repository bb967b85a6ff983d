//! Cosmetic "glitch art" corruption shown in place of a payload when a PIN
//! does not open anything. Purely visual; carries no information.

use image::RgbImage;
use rand::Rng;

/// Largest horizontal row displacement, in pixels.
const MAX_ROW_SHIFT: i64 = 50;
/// Side length of the inverted blocks.
const BLOCK_SIZE: u32 = 50;
/// Inverted blocks at full intensity.
const MAX_BLOCKS: f32 = 10.0;

/// Corrupt a copy of `image` using the thread-local RNG.
pub fn corrupt(image: &RgbImage, intensity: f32) -> RgbImage {
    corrupt_with_rng(image, intensity, &mut rand::thread_rng())
}

/// Corrupt a copy of `image`. `intensity` is clamped to `[0, 1]`.
///
/// Each row is displaced with probability `intensity`, then
/// `floor(10 * intensity)` blocks are colour-inverted.
pub fn corrupt_with_rng<R: Rng>(image: &RgbImage, intensity: f32, rng: &mut R) -> RgbImage {
    let intensity = if intensity.is_finite() {
        intensity.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut out = image.clone();
    let (width, height) = out.dimensions();
    if width == 0 || height == 0 {
        return out;
    }

    for y in 0..height {
        if rng.gen::<f32>() < intensity {
            let shift = rng.gen_range(-MAX_ROW_SHIFT..=MAX_ROW_SHIFT);
            shift_row(&mut out, image, y, shift);
        }
    }

    let blocks = (MAX_BLOCKS * intensity) as usize;
    for _ in 0..blocks {
        let x0 = rng.gen_range(0..=width.saturating_sub(BLOCK_SIZE));
        let y0 = rng.gen_range(0..=height.saturating_sub(BLOCK_SIZE));
        for y in y0..(y0 + BLOCK_SIZE).min(height) {
            for x in x0..(x0 + BLOCK_SIZE).min(width) {
                let pixel = out.get_pixel_mut(x, y);
                for channel in pixel.0.iter_mut() {
                    *channel = 255 - *channel;
                }
            }
        }
    }

    out
}

/// Copy row `y` of `source` into `out`, sampling `x + shift`; pixels whose
/// source falls outside the image keep their value.
fn shift_row(out: &mut RgbImage, source: &RgbImage, y: u32, shift: i64) {
    let width = source.width() as i64;
    for x in 0..width {
        let from = x + shift;
        if (0..width).contains(&from) {
            out.put_pixel(x as u32, y, *source.get_pixel(from as u32, y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, (x ^ y) as u8]))
    }

    #[test]
    fn test_zero_intensity_is_identity() {
        let img = gradient(80, 60);
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        assert_eq!(corrupt_with_rng(&img, 0.0, &mut rng), img);
    }

    #[test]
    fn test_full_intensity_changes_image() {
        let img = gradient(120, 120);
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let out = corrupt_with_rng(&img, 1.0, &mut rng);
        assert_eq!(out.dimensions(), img.dimensions());
        assert_ne!(out, img);
    }

    #[test]
    fn test_reproducible_with_seed() {
        let img = gradient(100, 70);
        let a = corrupt_with_rng(&img, 0.8, &mut ChaCha20Rng::seed_from_u64(3));
        let b = corrupt_with_rng(&img, 0.8, &mut ChaCha20Rng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_small_images_do_not_panic() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        for (w, h) in [(0, 0), (1, 1), (10, 3), (3, 70)] {
            let img = gradient(w, h);
            assert_eq!(corrupt_with_rng(&img, 1.0, &mut rng).dimensions(), (w, h));
        }
    }

    #[test]
    fn test_out_of_range_intensity_is_clamped() {
        let img = gradient(60, 60);
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        assert_eq!(corrupt_with_rng(&img, -3.0, &mut rng), img);
        assert_eq!(corrupt_with_rng(&img, f32::NAN, &mut rng), img);
    }

    #[test]
    fn test_shift_row() {
        let img = gradient(5, 1);
        let mut out = img.clone();
        shift_row(&mut out, &img, 0, 2);
        let reds: Vec<u8> = out.pixels().map(|p| p[0]).collect();
        assert_eq!(reds, vec![2, 3, 4, 3, 4]);
    }
}
