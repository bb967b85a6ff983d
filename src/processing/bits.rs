//! # LSB Bit Embedding
//!
//! Writes and reads one bit per selected channel per visited coordinate.
//!
//! Coordinates are visited in the order given (the scatter order); within a
//! coordinate, channels are visited in the order given by the strategy. Each
//! write clears the channel's least significant bit and ORs in the data bit.
//!
//! ### Capacity
//! A layer can carry `coordinates.len() * channels.len()` bits.

use image::RgbImage;
use thiserror::Error;

/// Errors raised by the embedder/extractor.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EmbedError {
    #[error("payload needs {needed} bits but only {available} are available")]
    Capacity { needed: usize, available: usize },

    #[error("ran out of coordinates after {available} of {requested} bits")]
    Exhausted { requested: usize, available: usize },
}

/// Number of bits a layer can hold.
pub fn capacity(coordinates: usize, channels: &[usize]) -> usize {
    coordinates.saturating_mul(channels.len())
}

/// Expand bytes into bits (one `0`/`1` per element), MSB first.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for byte in bytes {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1);
        }
    }
    bits
}

/// Pack bits back into bytes, MSB first. A trailing partial byte is zero-padded.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (i, bit)| byte | ((bit & 1) << (7 - i)))
        })
        .collect()
}

/// Embed `bits` into the image LSBs.
///
/// Nothing is written if the bits do not fit.
pub fn embed(
    image: &mut RgbImage,
    bits: &[u8],
    coordinates: &[(u32, u32)],
    channels: &[usize],
) -> Result<(), EmbedError> {
    let available = capacity(coordinates.len(), channels);
    if bits.len() > available {
        return Err(EmbedError::Capacity {
            needed: bits.len(),
            available,
        });
    }
    if channels.is_empty() {
        return Ok(());
    }

    for (&(x, y), chunk) in coordinates.iter().zip(bits.chunks(channels.len())) {
        let pixel = image.get_pixel_mut(x, y);
        for (&channel, &bit) in channels.iter().zip(chunk) {
            pixel[channel] = (pixel[channel] & 0xFE) | (bit & 1);
        }
    }

    Ok(())
}

/// Read `count` bits from the image LSBs.
pub fn extract(
    image: &RgbImage,
    coordinates: &[(u32, u32)],
    channels: &[usize],
    count: usize,
) -> Result<Vec<u8>, EmbedError> {
    let available = capacity(coordinates.len(), channels);
    if count > available {
        return Err(EmbedError::Exhausted {
            requested: count,
            available,
        });
    }

    let mut bits = Vec::with_capacity(count);
    'outer: for &(x, y) in coordinates {
        let pixel = image.get_pixel(x, y);
        for &channel in channels {
            if bits.len() == count {
                break 'outer;
            }
            bits.push(pixel[channel] & 1);
        }
    }

    Ok(bits)
}
