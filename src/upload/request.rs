//! Upload requests, receipts and the uploader seam.

use serde_json::{Value, json};
use thiserror::Error;

/// What the processing server should do with an uploaded palm.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadPurpose {
    /// Plain image capture, stored by the receiver as-is.
    Capture,
    /// Enroll the palm under a user token.
    Register { token: String },
    /// Charge the palm's linked account.
    Scan { merchant: String, amount: f64 },
}

impl UploadPurpose {
    /// Route on the processing server.
    pub fn path(&self) -> &'static str {
        match self {
            UploadPurpose::Capture => "/upload",
            UploadPurpose::Register { .. } => "/registerPalm",
            UploadPurpose::Scan { .. } => "/scanPalm",
        }
    }

    /// Multipart field the image is sent under.
    pub fn file_field(&self) -> &'static str {
        match self {
            UploadPurpose::Capture => "file",
            UploadPurpose::Register { .. } | UploadPurpose::Scan { .. } => "image",
        }
    }

    /// Text fields sent alongside the image.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            UploadPurpose::Capture => Vec::new(),
            UploadPurpose::Register { token } => vec![("token", token.clone())],
            UploadPurpose::Scan { merchant, amount } => vec![
                (
                    "token",
                    json!({ "merchant": merchant, "amount": amount }).to_string(),
                ),
                ("merchant", merchant.clone()),
                ("amount", amount.to_string()),
            ],
        }
    }

    /// Whether the server answers this route with a JSON body.
    pub fn expects_json(&self) -> bool {
        !matches!(self, UploadPurpose::Capture)
    }
}

/// An encoded image ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub purpose: UploadPurpose,
    pub image: EncodedImage,
}

impl UploadRequest {
    pub fn new(purpose: UploadPurpose, image: EncodedImage) -> Self {
        Self { purpose, image }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

/// Successful server response.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    pub status: u16,
    pub body: ResponseBody,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("could not reach {url}: {message}")]
    Transport { url: String, message: String },

    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response was not valid JSON: {body}")]
    MalformedResponse { body: String },

    #[error("could not build upload request: {message}")]
    Client { message: String },
}

/// Best-effort submission of one palm image.
///
/// Implementations perform the network call synchronously; the dispatcher
/// runs them off the frame loop.
pub trait Uploader {
    fn upload(&self, request: &UploadRequest) -> Result<UploadReceipt, UploadError>;
}
