//! # Mirage CLI
//!
//! Encode, decode and inspect carrier images on the local filesystem.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin mirage -- encode -i photo.jpg -o carrier.png --pin 1234 --message "hi"
//! cargo run --bin mirage -- encode -i photo.jpg -o carrier.png --pin 1234 --file notes.pdf \
//!   --decoy-message "grocery list" --decoy-pin 0000
//! cargo run --bin mirage -- decode -i carrier.png --pin 1234 --out-dir ./recovered
//! cargo run --bin mirage -- analyze -i carrier.png -o plane.png --channel 2
//! cargo run --bin mirage -- glitch -i carrier.png -o glitch.png --intensity 0.8
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use mirage::common::logging::init_logger;
use mirage::processing::{
    analysis, decode, encode_image_bytes, glitch, load_carrier, to_png, DecodeOutcome,
    EncodeRequest, Mode, Payload,
};

/// Command-line arguments for the Mirage CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hide a message or file inside an image
    Encode {
        /// Carrier image (any format the image crate reads)
        #[arg(short, long)]
        image: PathBuf,
        /// Output PNG path
        #[arg(short, long)]
        out: PathBuf,
        #[arg(long)]
        pin: String,
        /// Text to hide
        #[arg(long, conflicts_with = "file")]
        message: Option<String>,
        /// File to hide
        #[arg(long)]
        file: Option<PathBuf>,
        /// Layer for a single payload: "secret" or "decoy"
        #[arg(long, default_value = "secret")]
        mode: Mode,
        /// Decoy text, opened by --decoy-pin
        #[arg(long, requires = "decoy_pin")]
        decoy_message: Option<String>,
        #[arg(long, requires = "decoy_message")]
        decoy_pin: Option<String>,
    },
    /// Recover whatever the PIN opens
    Decode {
        #[arg(short, long)]
        image: PathBuf,
        #[arg(long)]
        pin: String,
        /// Where recovered files are written
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Render the LSB bit-plane of one channel
    Analyze {
        #[arg(short, long)]
        image: PathBuf,
        #[arg(short, long)]
        out: PathBuf,
        /// 0 = red, 1 = green, 2 = blue
        #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(0..=2))]
        channel: u8,
    },
    /// Produce the glitch image shown for rejected PINs
    Glitch {
        #[arg(short, long)]
        image: PathBuf,
        #[arg(short, long)]
        out: PathBuf,
        #[arg(long, default_value_t = 0.8)]
        intensity: f32,
    },
}

fn main() -> Result<()> {
    init_logger();

    match Args::parse().command {
        Command::Encode {
            image,
            out,
            pin,
            message,
            file,
            mode,
            decoy_message,
            decoy_pin,
        } => {
            let carrier = read(&image)?;
            let (file_bytes, filename) = match file {
                Some(path) => (
                    Some(read(&path)?),
                    path.file_name().map(|n| n.to_string_lossy().into_owned()),
                ),
                None => (None, None),
            };
            let request = EncodeRequest {
                pin,
                message,
                file_bytes,
                filename,
                mode,
                decoy_message,
                decoy_pin,
            };

            let png = encode_image_bytes(&carrier, &request)?;
            fs::write(&out, png).with_context(|| format!("writing {}", out.display()))?;
            info!("✅ Carrier written to {}", out.display());
        }
        Command::Decode {
            image,
            pin,
            out_dir,
        } => {
            let carrier = load_carrier(&read(&image)?)?;
            let recovered = match decode(&carrier, &pin) {
                DecodeOutcome::Recovered(recovered) => recovered,
                DecodeOutcome::WrongPin => bail!("WRONG_PIN"),
            };
            if recovered.is_decoy() {
                info!("Recovered the decoy layer");
            }
            match recovered.payload {
                Payload::Text(text) => println!("{}", text),
                Payload::File { name, bytes } => {
                    let path = out_dir.join(safe_file_name(name.as_deref()));
                    fs::write(&path, &bytes)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("{}", path.display());
                }
            }
        }
        Command::Analyze {
            image,
            out,
            channel,
        } => {
            let carrier = load_carrier(&read(&image)?)?;
            let channel = channel as usize;
            info!(
                "LSB ones ratio on channel {}: {:.4}",
                channel,
                analysis::ones_ratio(&carrier, channel)
            );
            fs::write(&out, to_png(&analysis::bit_plane(&carrier, channel))?)
                .with_context(|| format!("writing {}", out.display()))?;
        }
        Command::Glitch {
            image,
            out,
            intensity,
        } => {
            let carrier = load_carrier(&read(&image)?)?;
            fs::write(&out, to_png(&glitch::corrupt(&carrier, intensity))?)
                .with_context(|| format!("writing {}", out.display()))?;
        }
    }

    Ok(())
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}

/// Strip directory components from an embedded file name.
fn safe_file_name(name: Option<&str>) -> String {
    name.and_then(|n| Path::new(n).file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "secret_file".to_string())
}
