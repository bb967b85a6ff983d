//! # Payload Framing
//!
//! Wraps user content in a JSON envelope, compresses it with zlib, encrypts
//! it with the PIN and frames the result for embedding.
//!
//! ## Frame Layout
//!
//! ```text
//! [0..16)        salt           (PBKDF2 salt)
//! [16..20)       length L       (u32, big-endian, ciphertext byte count)
//! [20..20+L)     ciphertext     (12-byte nonce || AES-GCM output)
//! ```
//!
//! The 20-byte header is always 160 bits once expanded to a bitstream.
//!
//! ## Envelope
//!
//! ```text
//! {"type":"text","data":"hello"}
//! {"type":"file","data":"<base64>","name":"notes.pdf"}
//! ```

use std::io::{Read, Write};

use base64::{engine::general_purpose, Engine as _};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::{self, CryptoError, NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::processing::bits::bytes_to_bits;

/// Header size in bytes: salt + u32 length.
pub const HEADER_LEN: usize = SALT_LEN + 4;
/// Header size in bits.
pub const HEADER_BITS: usize = HEADER_LEN * 8;
/// Smallest ciphertext a valid frame can carry (nonce + tag, empty plaintext).
pub const MIN_CIPHERTEXT_LEN: usize = NONCE_LEN + TAG_LEN;
/// Upper bound on decompressed envelope size.
pub const MAX_ENVELOPE_BYTES: u64 = 64 * 1024 * 1024;

/// Errors raised while packing or unpacking a frame.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("frame is malformed")]
    MalformedFrame,

    #[error("compression failed: {0}")]
    Compression(std::io::Error),

    #[error("decompression failed")]
    Decompression,

    #[error("envelope is malformed")]
    MalformedEnvelope,

    #[error("ciphertext of {0} bytes does not fit a 32-bit length field")]
    TooLarge(usize),
}

/// Content handed in by the caller for embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content<'a> {
    Text(&'a str),
    File { bytes: &'a [u8], name: Option<&'a str> },
}

/// Self-describing record that travels inside the ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Envelope {
    Text {
        data: String,
    },
    File {
        /// Base64 of the file content.
        data: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

/// Decoded content as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    File { name: Option<String>, bytes: Vec<u8> },
}

impl Envelope {
    pub fn from_content(content: Content<'_>) -> Self {
        match content {
            Content::Text(text) => Envelope::Text {
                data: text.to_string(),
            },
            Content::File { bytes, name } => Envelope::File {
                data: general_purpose::STANDARD.encode(bytes),
                name: name.map(str::to_string),
            },
        }
    }

    /// Decode the base64 body of file envelopes.
    pub fn into_payload(self) -> Result<Payload, PayloadError> {
        match self {
            Envelope::Text { data } => Ok(Payload::Text(data)),
            Envelope::File { data, name } => {
                let bytes = general_purpose::STANDARD
                    .decode(data.as_bytes())
                    .map_err(|_| PayloadError::MalformedEnvelope)?;
                Ok(Payload::File { name, bytes })
            }
        }
    }
}

/// Parsed 160-bit frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub salt: [u8; SALT_LEN],
    pub length: u32,
}

impl FrameHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self, PayloadError> {
        if bytes.len() < HEADER_LEN {
            return Err(PayloadError::MalformedFrame);
        }
        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&bytes[..SALT_LEN]);
        let mut length = [0u8; 4];
        length.copy_from_slice(&bytes[SALT_LEN..HEADER_LEN]);
        Ok(Self {
            salt,
            length: u32::from_be_bytes(length),
        })
    }

    /// Total frame size in bits, header included.
    pub fn frame_bits(&self) -> usize {
        HEADER_BITS.saturating_add((self.length as usize).saturating_mul(8))
    }
}

/// An encrypted, length-prefixed payload ready to embed.
#[derive(Debug, Clone)]
pub struct Frame {
    salt: [u8; SALT_LEN],
    ciphertext: Vec<u8>,
}

impl Frame {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.salt);
        // Length was checked against u32 in `pack`.
        out.extend_from_slice(&(self.ciphertext.len() as u32).to_be_bytes());
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// The frame as a bit sequence, MSB-first per byte.
    pub fn to_bits(&self) -> Vec<u8> {
        bytes_to_bits(&self.to_bytes())
    }

    pub fn bit_len(&self) -> usize {
        (HEADER_LEN + self.ciphertext.len()) * 8
    }
}

/// Envelope → JSON → zlib → AES-GCM → frame.
///
/// # Arguments
/// - `content`: Text or file bytes to seal
/// - `pin`: PIN the key is derived from, with a fresh salt per call
///
/// # Returns
/// - `Ok(Frame)`: Salt, big-endian length and `nonce ‖ ciphertext`
///
/// # Errors
/// - Compression or encryption fails
/// - The ciphertext does not fit the 32-bit length field
pub fn pack(content: Content<'_>, pin: &str) -> Result<Frame, PayloadError> {
    let envelope = Envelope::from_content(content);
    let json = serde_json::to_vec(&envelope).map_err(|_| PayloadError::MalformedEnvelope)?;
    let compressed = compress(&json)?;
    let sealed = crypto::encrypt(&compressed, pin)?;

    if u32::try_from(sealed.ciphertext.len()).is_err() {
        return Err(PayloadError::TooLarge(sealed.ciphertext.len()));
    }

    Ok(Frame {
        salt: sealed.salt,
        ciphertext: sealed.ciphertext,
    })
}

/// Inverse of [`pack`] over the raw frame bytes.
///
/// # Arguments
/// - `frame_bytes`: Header followed by exactly `length` body bytes
/// - `pin`: Candidate PIN
///
/// # Errors
/// - Header too short or body length mismatch
/// - Authentication fails (wrong PIN or damaged data)
/// - Decompressed data is oversized, corrupt, or not a valid envelope
pub fn unpack(frame_bytes: &[u8], pin: &str) -> Result<Envelope, PayloadError> {
    let header = FrameHeader::parse(frame_bytes)?;
    let body = &frame_bytes[HEADER_LEN..];
    if body.len() != header.length as usize {
        return Err(PayloadError::MalformedFrame);
    }

    let compressed = crypto::decrypt(&header.salt, body, pin)?;
    let json = decompress(&compressed)?;
    serde_json::from_slice(&json).map_err(|_| PayloadError::MalformedEnvelope)
}

fn compress(data: &[u8]) -> Result<Vec<u8>, PayloadError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data).map_err(PayloadError::Compression)?;
    encoder.finish().map_err(PayloadError::Compression)
}

fn decompress(data: &[u8]) -> Result<Vec<u8>, PayloadError> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .take(MAX_ENVELOPE_BYTES + 1)
        .read_to_end(&mut out)
        .map_err(|_| PayloadError::Decompression)?;
    if out.len() as u64 > MAX_ENVELOPE_BYTES {
        return Err(PayloadError::Decompression);
    }
    Ok(out)
}
