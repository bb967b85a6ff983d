//! # Scatter Order
//!
//! PIN-seeded permutation of every pixel coordinate. Encoder and decoder
//! regenerate the same order from the same PIN and image dimensions, so the
//! order itself is never stored.
//!
//! The seed is SHA-256 of the PIN fed to a ChaCha20 generator that lives only
//! for the duration of the call. The Fisher-Yates shuffle draws `u32` ranges:
//! `gen_range` over `usize` consumes a different amount of generator output on
//! 32-bit and 64-bit targets, which would yield different permutations.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

/// Seed for the scatter generator: SHA-256 of the PIN bytes.
pub fn seed_for(pin: &str) -> [u8; 32] {
    Sha256::digest(pin.as_bytes()).into()
}

/// All `(x, y)` coordinates of a `width × height` image in PIN-seeded order.
pub fn coordinates(pin: &str, width: u32, height: u32) -> Vec<(u32, u32)> {
    let mut coords: Vec<(u32, u32)> = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            coords.push((x, y));
        }
    }

    let mut rng = ChaCha20Rng::from_seed(seed_for(pin));
    for i in (1..coords.len()).rev() {
        let j = rng.gen_range(0..=(i as u32)) as usize;
        coords.swap(i, j);
    }
    coords
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn test_deterministic() {
        assert_eq!(coordinates("1234", 17, 9), coordinates("1234", 17, 9));
    }

    #[test]
    fn test_is_permutation() {
        let coords = coordinates("9999", 12, 7);
        assert_eq!(coords.len(), 84);
        let unique: HashSet<_> = coords.iter().copied().collect();
        assert_eq!(unique.len(), 84);
        assert!(coords.iter().all(|&(x, y)| x < 12 && y < 7));
    }

    #[test]
    fn test_different_pins_differ() {
        assert_ne!(coordinates("1234", 16, 16), coordinates("1235", 16, 16));
    }

    #[test]
    fn test_actually_shuffled() {
        let raster: Vec<(u32, u32)> = (0..16u32)
            .flat_map(|y| (0..16u32).map(move |x| (x, y)))
            .collect();
        assert_ne!(coordinates("1234", 16, 16), raster);
    }

    #[test]
    fn test_empty_image() {
        assert!(coordinates("1234", 0, 10).is_empty());
        assert!(coordinates("1234", 10, 0).is_empty());
    }

    #[test]
    fn test_concurrent_calls_are_independent() {
        let expected = coordinates("2468", 32, 32);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                thread::spawn(move || {
                    for round in 0..5 {
                        let _noise = coordinates(&format!("{}-{}", i, round), 32, 32);
                    }
                    coordinates("2468", 32, 32)
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
