//! HTTP handlers for the steganography API.
//!
//! All image work runs on tokio's blocking pool: PBKDF2 and full-image
//! shuffles are CPU-bound and would otherwise stall the reactor.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{multipart::Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose, Engine as _};
use log::{error, info};
use serde::Serialize;

use super::AppState;
use crate::processing::{
    analysis, decode, encode_image_bytes, glitch, load_carrier, to_png, DecodeOutcome,
    EncodeRequest, Mode, Payload, Recovered, StegoError,
};

/// File name reported for file payloads embedded without one.
const DEFAULT_FILENAME: &str = "secret_file";

#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

fn internal_error(error: impl Into<String>) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

fn stego_error(e: StegoError) -> ApiError {
    if e.is_caller_error() {
        bad_request(e.to_string())
    } else {
        error!("❌ Steganography failed: {}", e);
        internal_error(e.to_string())
    }
}

fn png_response(bytes: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "image/png")], bytes).into_response()
}

/// Successful decode, shaped for the web frontend.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct DecodeResponse {
    pub status: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Base64 of the recovered file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub is_decoy: bool,
}

impl From<Recovered> for DecodeResponse {
    fn from(recovered: Recovered) -> Self {
        let is_decoy = recovered.is_decoy();
        match recovered.payload {
            Payload::Text(message) => Self {
                status: "success",
                kind: "text",
                message: Some(message),
                filename: None,
                content: None,
                is_decoy,
            },
            Payload::File { name, bytes } => Self {
                status: "success",
                kind: "file",
                message: None,
                filename: Some(name.unwrap_or_else(|| DEFAULT_FILENAME.to_string())),
                content: Some(general_purpose::STANDARD.encode(bytes)),
                is_decoy,
            },
        }
    }
}

enum DecodeReply {
    Found(DecodeResponse),
    /// PNG of the corrupted carrier
    Glitch(Vec<u8>),
}

/// An uploaded file part.
struct Upload {
    filename: Option<String>,
    bytes: Vec<u8>,
}

/// Multipart form split into text fields and file parts.
#[derive(Default)]
struct Form {
    texts: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl Form {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Form::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| bad_request(format!("Failed to read multipart data: {}", e)))?
        {
            let name = field.name().unwrap_or("").to_string();

            if let Some(filename) = field.file_name().map(str::to_string) {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read {}: {}", name, e)))?;
                form.files.insert(
                    name,
                    Upload {
                        filename: Some(filename),
                        bytes: bytes.to_vec(),
                    },
                );
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read {}: {}", name, e)))?;
                form.texts.insert(name, text);
            }
        }

        Ok(form)
    }

    /// Text field, with empty values treated as absent.
    fn text(&mut self, name: &str) -> Option<String> {
        self.texts.remove(name).filter(|v| !v.is_empty())
    }

    fn file(&mut self, name: &str) -> Option<Upload> {
        self.files.remove(name)
    }

    fn carrier(&mut self) -> Result<Vec<u8>, ApiError> {
        self.file("file")
            .map(|upload| upload.bytes)
            .ok_or_else(|| bad_request("No image provided"))
    }

    fn pin(&mut self) -> Result<String, ApiError> {
        self.text("pin").ok_or_else(|| bad_request("No PIN provided"))
    }
}

async fn run_blocking<T, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, StegoError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| internal_error(format!("Worker failed: {}", e)))?
        .map_err(stego_error)
}

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "Mirage System Online",
    }))
}

pub async fn encode_handler(multipart: Multipart) -> Result<Response, ApiError> {
    let mut form = Form::read(multipart).await?;
    let carrier = form.carrier()?;
    let mode = match form.text("mode") {
        Some(mode) => mode.parse::<Mode>().map_err(bad_request)?,
        None => Mode::default(),
    };
    let secret_file = form.file("secret_file");

    let request = EncodeRequest {
        pin: form.pin()?,
        message: form.text("message"),
        filename: secret_file.as_ref().and_then(|f| f.filename.clone()),
        file_bytes: secret_file.map(|f| f.bytes),
        mode,
        decoy_message: form.text("decoy_message"),
        decoy_pin: form.text("decoy_pin"),
    };

    info!(
        "📥 Encode request: carrier {} bytes, decoy: {}",
        carrier.len(),
        request.decoy_message.is_some()
    );

    let png = run_blocking(move || encode_image_bytes(&carrier, &request)).await?;

    info!("✅ Encoding complete: {} bytes", png.len());
    Ok(png_response(png))
}

pub async fn decode_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut form = Form::read(multipart).await?;
    let carrier = form.carrier()?;
    let pin = form.pin()?;
    let intensity = state.config.glitch.intensity;

    let reply = run_blocking(move || {
        let image = load_carrier(&carrier)?;
        Ok(match decode(&image, &pin) {
            DecodeOutcome::Recovered(recovered) => DecodeReply::Found(recovered.into()),
            DecodeOutcome::WrongPin => {
                DecodeReply::Glitch(to_png(&glitch::corrupt(&image, intensity))?)
            }
        })
    })
    .await?;

    match reply {
        DecodeReply::Found(response) => {
            info!("🔓 Payload recovered ({})", response.kind);
            Ok(Json(response).into_response())
        }
        DecodeReply::Glitch(glitched) => {
            info!("🔒 PIN rejected, returning glitch image");
            Ok(png_response(glitched))
        }
    }
}

pub async fn analyze_handler(multipart: Multipart) -> Result<Response, ApiError> {
    let mut form = Form::read(multipart).await?;
    let carrier = form.carrier()?;
    let channel = match form.text("channel") {
        Some(channel) => channel
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|c| *c <= 2)
            .ok_or_else(|| bad_request("channel must be 0, 1 or 2"))?,
        None => 2,
    };

    let png = run_blocking(move || {
        let image = load_carrier(&carrier)?;
        to_png(&analysis::bit_plane(&image, channel))
    })
    .await?;

    Ok(png_response(png))
}
