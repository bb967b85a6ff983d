//! # Mirage
//!
//! PIN-locked LSB image steganography with an optional decoy layer.
//!
//! - [`crypto`]: PBKDF2 key derivation and AES-256-GCM
//! - [`processing`]: payload framing, scatter order, embedding and blind decoding
//! - [`server`]: HTTP API
//! - [`common`]: configuration and logging

pub mod common;
pub mod crypto;
pub mod processing;
pub mod server;

pub use processing::{decode, encode, DecodeOutcome, EncodeRequest, Payload, StegoError};
