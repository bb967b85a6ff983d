//! Errors surfaced to callers of the encode/decode entry points.
//!
//! Decrypt and parse failures met while trying strategies never escape the
//! decoder; they end up as
//! [`DecodeOutcome::WrongPin`](super::steganography::DecodeOutcome::WrongPin).

use thiserror::Error;

use super::bits::EmbedError;
use super::payload::PayloadError;

#[derive(Error, Debug)]
pub enum StegoError {
    #[error("image too small: payload needs {needed} bits but only {available} are available")]
    Capacity { needed: usize, available: usize },

    #[error("either a message or a file must be supplied")]
    MissingContent,

    #[error("supply either a message or a file, not both")]
    AmbiguousContent,

    #[error("decoy message and decoy PIN must be supplied together")]
    IncompleteDecoy,

    #[error("decoy PIN must differ from the secret PIN")]
    DecoyPinReused,

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl From<EmbedError> for StegoError {
    fn from(e: EmbedError) -> Self {
        match e {
            EmbedError::Capacity { needed, available } => StegoError::Capacity { needed, available },
            EmbedError::Exhausted {
                requested,
                available,
            } => StegoError::Capacity {
                needed: requested,
                available,
            },
        }
    }
}

impl StegoError {
    /// True for errors caused by the request rather than by the server.
    pub fn is_caller_error(&self) -> bool {
        match self {
            StegoError::Payload(PayloadError::TooLarge(_)) => true,
            StegoError::Payload(_) => false,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oversized_payload_is_caller_error() {
        assert!(StegoError::Payload(PayloadError::TooLarge(usize::MAX)).is_caller_error());
        assert!(!StegoError::Payload(PayloadError::Decompression).is_caller_error());
        assert!(StegoError::DecoyPinReused.is_caller_error());
    }
}
