//! # Layered LSB Steganography
//!
//! Hides PIN-encrypted payloads in the least significant bits of an RGB image,
//! with an optional second, independently keyed decoy layer.
//!
//! ## Algorithm
//!
//! ### Encoding Process
//! 1. Validate the request (exactly one of message/file, decoy fields paired)
//! 2. Pick channel strategies for the primary and decoy layers
//! 3. For every layer: pack the content into an encrypted frame, derive the
//!    scatter order from that layer's PIN, and check capacity
//! 4. Only once every layer fits, write each frame into its channels
//!
//! ### Decoding Process
//! 1. Derive the scatter order from the PIN once
//! 2. For each strategy in [`DECODE_ORDER`]:
//!    - Read the 160-bit header and sanity-check the length against capacity
//!    - Read the body, decrypt, decompress and parse the envelope
//!    - First candidate that validates wins
//! 3. If nothing validates, report [`DecodeOutcome::WrongPin`]
//!
//! A failed candidate leaves no trace: nothing read for one strategy is reused
//! by the next, and the caller cannot learn why a PIN was rejected.
//!
//! ### Capacity
//! A sole payload gets `width * height * 3` bits. With a decoy, each layer gets
//! `width * height` bits in its own channel.

use std::io::Cursor;

use image::{ImageFormat, RgbImage};
use log::debug;

use super::bits;
use super::error::StegoError;
use super::payload::{self, Content, FrameHeader, Payload, HEADER_BITS, MIN_CIPHERTEXT_LEN};
use super::scatter;
use super::strategy::{self, Mode, Strategy, DECODE_ORDER};

/// Everything an encode call may carry.
///
/// Mirrors the loose form-field contract of the HTTP layer; [`encode`]
/// validates the combination.
#[derive(Debug, Clone, Default)]
pub struct EncodeRequest {
    pub pin: String,
    pub message: Option<String>,
    pub file_bytes: Option<Vec<u8>>,
    pub filename: Option<String>,
    pub mode: Mode,
    pub decoy_message: Option<String>,
    pub decoy_pin: Option<String>,
}

impl EncodeRequest {
    /// Text-only request with no decoy.
    pub fn text(pin: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pin: pin.into(),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// File request with no decoy.
    pub fn file(pin: impl Into<String>, bytes: Vec<u8>, filename: Option<String>) -> Self {
        Self {
            pin: pin.into(),
            file_bytes: Some(bytes),
            filename,
            ..Self::default()
        }
    }

    pub fn with_decoy(mut self, message: impl Into<String>, pin: impl Into<String>) -> Self {
        self.decoy_message = Some(message.into());
        self.decoy_pin = Some(pin.into());
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    fn content(&self) -> Result<Content<'_>, StegoError> {
        match (&self.message, &self.file_bytes) {
            (Some(message), None) => Ok(Content::Text(message)),
            (None, Some(bytes)) => Ok(Content::File {
                bytes,
                name: self.filename.as_deref(),
            }),
            (Some(_), Some(_)) => Err(StegoError::AmbiguousContent),
            (None, None) => Err(StegoError::MissingContent),
        }
    }

    fn decoy(&self) -> Result<Option<(&str, &str)>, StegoError> {
        match (&self.decoy_message, &self.decoy_pin) {
            (Some(_), Some(pin)) if *pin == self.pin => Err(StegoError::DecoyPinReused),
            (Some(message), Some(pin)) => Ok(Some((message.as_str(), pin.as_str()))),
            (None, None) => Ok(None),
            _ => Err(StegoError::IncompleteDecoy),
        }
    }
}

/// A recovered payload and the channel strategy it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered {
    pub payload: Payload,
    pub strategy: Strategy,
}

impl Recovered {
    pub fn is_decoy(&self) -> bool {
        self.strategy.is_decoy()
    }
}

/// Result of a blind decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    Recovered(Recovered),
    /// No strategy validated: wrong PIN, no data, or a damaged image.
    WrongPin,
}

impl DecodeOutcome {
    pub fn recovered(self) -> Option<Recovered> {
        match self {
            DecodeOutcome::Recovered(r) => Some(r),
            DecodeOutcome::WrongPin => None,
        }
    }

    pub fn is_wrong_pin(&self) -> bool {
        matches!(self, DecodeOutcome::WrongPin)
    }
}

/// One payload ready to be written: its bits, its walk and its channels.
struct Layer {
    bits: Vec<u8>,
    coordinates: Vec<(u32, u32)>,
    strategy: Strategy,
}

impl Layer {
    fn prepare(
        content: Content<'_>,
        pin: &str,
        strategy: Strategy,
        width: u32,
        height: u32,
    ) -> Result<Self, StegoError> {
        let frame = payload::pack(content, pin)?;
        let coordinates = scatter::coordinates(pin, width, height);

        let needed = frame.bit_len();
        let available = bits::capacity(coordinates.len(), strategy.channels());
        if needed > available {
            return Err(StegoError::Capacity { needed, available });
        }

        debug!(
            "Prepared {} layer: {} of {} bits",
            strategy, needed, available
        );

        Ok(Self {
            bits: frame.to_bits(),
            coordinates,
            strategy,
        })
    }
}

/// Embed the request's payload(s) into `image`.
///
/// A single payload goes to the RGB walk (or red alone in decoy mode). With a
/// decoy, the secret is written to blue and the decoy to red, each on its own
/// PIN-seeded walk.
///
/// # Arguments
/// - `image`: Carrier, modified in place
/// - `request`: PIN, content and optional decoy
///
/// # Returns
/// - `Ok(())`: Every layer was written
/// - `Err`: The image is untouched
///
/// # Errors
/// - No content, or both a message and a file
/// - Decoy message without a decoy PIN (or the reverse), or a reused PIN
/// - A layer needs more bits than its channels hold
pub fn encode(image: &mut RgbImage, request: &EncodeRequest) -> Result<(), StegoError> {
    let content = request.content()?;
    let decoy = request.decoy()?;
    let layout = strategy::select(request.mode, decoy.is_some());
    let (width, height) = image.dimensions();

    let mut layers = vec![Layer::prepare(
        content,
        &request.pin,
        layout.primary,
        width,
        height,
    )?];
    if let (Some((message, pin)), Some(decoy_strategy)) = (decoy, layout.decoy) {
        layers.push(Layer::prepare(
            Content::Text(message),
            pin,
            decoy_strategy,
            width,
            height,
        )?);
    }

    for layer in &layers {
        bits::embed(
            image,
            &layer.bits,
            &layer.coordinates,
            layer.strategy.channels(),
        )?;
    }

    Ok(())
}

/// Blindly recover whichever layer `pin` opens.
///
/// Strategies are tried in the order RGB, blue, red. A strategy is accepted
/// only when its header length is plausible and the frame decrypts and parses.
///
/// # Arguments
/// - `image`: Carrier to read
/// - `pin`: Candidate PIN
///
/// # Returns
/// - `DecodeOutcome::Recovered`: Payload plus the strategy that yielded it
/// - `DecodeOutcome::WrongPin`: Nothing validated
pub fn decode(image: &RgbImage, pin: &str) -> DecodeOutcome {
    let (width, height) = image.dimensions();
    let coordinates = scatter::coordinates(pin, width, height);

    for strategy in DECODE_ORDER {
        if let Some(payload) = attempt(image, &coordinates, strategy, pin) {
            debug!("Strategy {} validated", strategy);
            return DecodeOutcome::Recovered(Recovered { payload, strategy });
        }
        debug!("Strategy {} rejected", strategy);
    }

    DecodeOutcome::WrongPin
}

/// Try a single strategy. Any failure means "not this one".
fn attempt(
    image: &RgbImage,
    coordinates: &[(u32, u32)],
    strategy: Strategy,
    pin: &str,
) -> Option<Payload> {
    let channels = strategy.channels();
    let available = bits::capacity(coordinates.len(), channels);

    let header_bits = bits::extract(image, coordinates, channels, HEADER_BITS).ok()?;
    let header = FrameHeader::parse(&bits::bits_to_bytes(&header_bits)).ok()?;

    // Reject garbage lengths before reading the rest of the image.
    if (header.length as usize) < MIN_CIPHERTEXT_LEN || header.frame_bits() > available {
        return None;
    }

    let frame_bits = bits::extract(image, coordinates, channels, header.frame_bits()).ok()?;
    let envelope = payload::unpack(&bits::bits_to_bytes(&frame_bits), pin).ok()?;
    envelope.into_payload().ok()
}

/// Decode any image format the `image` crate understands into RGB8.
pub fn load_carrier(image_bytes: &[u8]) -> Result<RgbImage, StegoError> {
    Ok(image::load_from_memory(image_bytes)?.to_rgb8())
}

/// Encode an RGB image as PNG bytes.
pub fn to_png(image: &RgbImage) -> Result<Vec<u8>, StegoError> {
    let mut output_bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut output_bytes), ImageFormat::Png)?;
    Ok(output_bytes)
}

/// Embed into an encoded image and return PNG bytes.
///
/// # Example
/// ```ignore
/// let carrier = std::fs::read("holiday.jpg")?;
/// let request = EncodeRequest::text("1234", "meet at the pier");
/// std::fs::write("holiday.png", encode_image_bytes(&carrier, &request)?)?;
/// ```
pub fn encode_image_bytes(image_bytes: &[u8], request: &EncodeRequest) -> Result<Vec<u8>, StegoError> {
    let mut image = load_carrier(image_bytes)?;
    encode(&mut image, request)?;
    to_png(&image)
}

/// Blind-decode an encoded image.
pub fn decode_image_bytes(image_bytes: &[u8], pin: &str) -> Result<DecodeOutcome, StegoError> {
    let image = load_carrier(image_bytes)?;
    Ok(decode(&image, pin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    fn carrier(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 + y) as u8, (x + y * 5) as u8, (x * y) as u8])
        })
    }

    #[test]
    fn test_missing_content() {
        let mut img = carrier(8, 8);
        let request = EncodeRequest {
            pin: "1234".into(),
            ..EncodeRequest::default()
        };
        assert!(matches!(
            encode(&mut img, &request),
            Err(StegoError::MissingContent)
        ));
    }

    #[test]
    fn test_ambiguous_content() {
        let mut img = carrier(8, 8);
        let mut request = EncodeRequest::text("1234", "hi");
        request.file_bytes = Some(vec![1, 2, 3]);
        assert!(matches!(
            encode(&mut img, &request),
            Err(StegoError::AmbiguousContent)
        ));
    }

    #[test]
    fn test_incomplete_decoy() {
        let mut img = carrier(8, 8);
        let mut request = EncodeRequest::text("1234", "hi");
        request.decoy_message = Some("nothing here".into());
        assert!(matches!(
            encode(&mut img, &request),
            Err(StegoError::IncompleteDecoy)
        ));

        let mut request = EncodeRequest::text("1234", "hi");
        request.decoy_pin = Some("0000".into());
        assert!(matches!(
            encode(&mut img, &request),
            Err(StegoError::IncompleteDecoy)
        ));
    }

    #[test]
    fn test_decoy_pin_reused() {
        let mut img = carrier(8, 8);
        let request = EncodeRequest::text("1234", "hi").with_decoy("lunch", "1234");
        assert!(matches!(
            encode(&mut img, &request),
            Err(StegoError::DecoyPinReused)
        ));
    }

    #[test]
    fn test_capacity_error_leaves_image_untouched() {
        // 8x8 RGB holds 192 bits; the header alone is 160.
        let mut img = carrier(8, 8);
        let before = img.clone();
        let err = encode(&mut img, &EncodeRequest::text("1234", "hi")).unwrap_err();
        assert!(matches!(err, StegoError::Capacity { available: 192, .. }));
        assert_eq!(img, before);
    }

    #[test]
    fn test_decoy_capacity_checked_before_writing() {
        // Secret fits in blue, but the decoy is far too long for red.
        let mut img = carrier(40, 40);
        let before = img.clone();
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let noise: String = (0..1000).map(|_| rng.gen_range(b'a'..=b'z') as char).collect();
        let request = EncodeRequest::text("1234", "hi").with_decoy(noise, "9999");

        assert!(matches!(
            encode(&mut img, &request),
            Err(StegoError::Capacity { .. })
        ));
        assert_eq!(img, before);
    }

    #[test]
    fn test_roundtrip_and_wrong_pin() {
        let mut img = carrier(64, 64);
        encode(&mut img, &EncodeRequest::text("1234", "hi")).unwrap();

        let recovered = decode(&img, "1234").recovered().unwrap();
        assert_eq!(recovered.payload, Payload::Text("hi".into()));
        assert_eq!(recovered.strategy, Strategy::Rgb);
        assert!(!recovered.is_decoy());

        assert_eq!(decode(&img, "0000"), DecodeOutcome::WrongPin);
    }

    #[test]
    fn test_clean_image_is_wrong_pin() {
        assert!(decode(&carrier(32, 32), "1234").is_wrong_pin());
    }

    #[test]
    fn test_tiny_image_is_wrong_pin() {
        assert!(decode(&carrier(2, 2), "1234").is_wrong_pin());
        assert!(decode(&RgbImage::new(0, 0), "1234").is_wrong_pin());
    }

    #[test]
    fn test_png_bytes_roundtrip() {
        let png = to_png(&carrier(48, 48)).unwrap();
        let encoded = encode_image_bytes(&png, &EncodeRequest::text("7777", "via png")).unwrap();

        let outcome = decode_image_bytes(&encoded, "7777").unwrap();
        assert_eq!(
            outcome.recovered().map(|r| r.payload),
            Some(Payload::Text("via png".into()))
        );
    }

    #[test]
    fn test_load_carrier_rejects_garbage() {
        assert!(matches!(
            load_carrier(b"not an image"),
            Err(StegoError::Image(_))
        ));
    }
}
