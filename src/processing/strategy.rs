//! # Channel Strategies
//!
//! Picks which RGB channels carry each layer.
//!
//! | Request                  | Secret layer  | Decoy layer |
//! |--------------------------|---------------|-------------|
//! | single payload           | R, G, B       | -           |
//! | single payload, decoy mode | -           | R           |
//! | secret + decoy           | B             | R           |
//!
//! The decoder tries [`DECODE_ORDER`] in sequence since it cannot know which
//! row of the table the encoder used.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Channel set used for one embedding layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// All three channels: sole secret payload, triple capacity.
    Rgb,
    /// Blue only: secret layer alongside a decoy.
    Blue,
    /// Red only: decoy layer.
    Red,
}

/// Priority order for blind decoding.
pub const DECODE_ORDER: [Strategy; 3] = [Strategy::Rgb, Strategy::Blue, Strategy::Red];

impl Strategy {
    pub fn channels(self) -> &'static [usize] {
        match self {
            Strategy::Rgb => &[0, 1, 2],
            Strategy::Blue => &[2],
            Strategy::Red => &[0],
        }
    }

    pub fn is_decoy(self) -> bool {
        matches!(self, Strategy::Red)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Rgb => write!(f, "rgb"),
            Strategy::Blue => write!(f, "blue"),
            Strategy::Red => write!(f, "red"),
        }
    }
}

/// Which layer a single-payload encode lands in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Secret,
    Decoy,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "secret" | "" => Ok(Mode::Secret),
            "decoy" => Ok(Mode::Decoy),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}

/// Channel assignment for one encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub primary: Strategy,
    pub decoy: Option<Strategy>,
}

/// Choose channels for the primary payload and, if present, the decoy.
pub fn select(mode: Mode, with_decoy: bool) -> Layout {
    match (with_decoy, mode) {
        (true, _) => Layout {
            primary: Strategy::Blue,
            decoy: Some(Strategy::Red),
        },
        (false, Mode::Secret) => Layout {
            primary: Strategy::Rgb,
            decoy: None,
        },
        (false, Mode::Decoy) => Layout {
            primary: Strategy::Red,
            decoy: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_payload_uses_all_channels() {
        let layout = select(Mode::Secret, false);
        assert_eq!(layout.primary.channels(), &[0, 1, 2]);
        assert_eq!(layout.decoy, None);
    }

    #[test]
    fn test_decoy_layers_are_disjoint() {
        let layout = select(Mode::Secret, true);
        let decoy = layout.decoy.unwrap();
        assert_eq!(layout.primary.channels(), &[2]);
        assert_eq!(decoy.channels(), &[0]);
        assert!(layout
            .primary
            .channels()
            .iter()
            .all(|c| !decoy.channels().contains(c)));
        assert!(!layout.primary.is_decoy());
        assert!(decoy.is_decoy());
    }

    #[test]
    fn test_decoy_mode_without_decoy_payload() {
        assert_eq!(select(Mode::Decoy, false).primary, Strategy::Red);
        // A real decoy pushes the primary payload to blue regardless of mode.
        assert_eq!(select(Mode::Decoy, true).primary, Strategy::Blue);
    }

    #[test]
    fn test_decode_order_covers_every_layout() {
        for mode in [Mode::Secret, Mode::Decoy] {
            for with_decoy in [false, true] {
                let layout = select(mode, with_decoy);
                assert!(DECODE_ORDER.contains(&layout.primary));
                if let Some(decoy) = layout.decoy {
                    assert!(DECODE_ORDER.contains(&decoy));
                }
            }
        }
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("secret".parse::<Mode>(), Ok(Mode::Secret));
        assert_eq!("DECOY".parse::<Mode>(), Ok(Mode::Decoy));
        assert_eq!("".parse::<Mode>(), Ok(Mode::Secret));
        assert!("green".parse::<Mode>().is_err());
    }
}
