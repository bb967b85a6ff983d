//! # Image Processing and Steganography
//!
//! The steganographic codec and the image utilities around it.
//!
//! ## Modules
//!
//! - [`payload`]: envelope, compression and encrypted frame
//! - [`scatter`]: PIN-seeded coordinate permutation
//! - [`bits`]: LSB bit embedding and extraction
//! - [`strategy`]: channel assignment per layer
//! - [`steganography`]: encode entry point and blind decoder
//! - [`glitch`]: cosmetic corruption for rejected PINs
//! - [`analysis`]: LSB bit-plane inspection

pub mod analysis;
pub mod bits;
pub mod error;
pub mod glitch;
pub mod payload;
pub mod scatter;
pub mod steganography;
pub mod strategy;

// Re-export main entry points for convenience
pub use error::StegoError;
pub use payload::Payload;
pub use steganography::{
    decode, decode_image_bytes, encode, encode_image_bytes, load_carrier, to_png, DecodeOutcome,
    EncodeRequest, Recovered,
};
pub use strategy::{Mode, Strategy};
