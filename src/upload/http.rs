//! Multipart HTTP uploader.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::secs;
use crate::upload::{ResponseBody, UploadError, UploadReceipt, UploadRequest, Uploader};

/// Upload settings carried in the application config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Base URL of the processing server, without a route.
    pub endpoint: String,
    /// Whole-request timeout.
    #[serde(with = "secs")]
    pub timeout: Duration,
    /// Requests waiting for the upload worker before new ones are dropped.
    pub queue_capacity: usize,
    pub jpeg_quality: u8,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5001".to_string(),
            timeout: Duration::from_secs(3),
            queue_capacity: 1,
            jpeg_quality: 90,
        }
    }
}

/// Text fields first, then the image under the route's file field.
fn build_form(request: &UploadRequest) -> Result<Form, UploadError> {
    let image = &request.image;
    let part = Part::bytes(image.bytes.clone())
        .file_name(image.filename.clone())
        .mime_str(&image.content_type)
        .map_err(|e| UploadError::Client {
            message: format!("invalid content type {:?}: {e}", image.content_type),
        })?;

    let form = request
        .purpose
        .form_fields()
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value));

    Ok(form.part(request.purpose.file_field(), part))
}

fn transport_error(url: &str, err: reqwest::Error) -> UploadError {
    let kind = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    UploadError::Transport {
        url: url.to_string(),
        message: format!("{kind}: {err}"),
    }
}

/// Interpret a 2xx response body for `request`.
fn parse_body(request: &UploadRequest, body: String) -> Result<ResponseBody, UploadError> {
    if !request.purpose.expects_json() {
        return Ok(ResponseBody::Text(body));
    }
    serde_json::from_str(&body)
        .map(ResponseBody::Json)
        .map_err(|_| UploadError::MalformedResponse { body })
}

/// Posts palm images to the processing server with a blocking `reqwest` client.
pub struct HttpUploader {
    client: Client,
    endpoint: String,
}

impl HttpUploader {
    pub fn new(config: &UploadConfig) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| UploadError::Client {
                message: format!("failed to create HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, request: &UploadRequest) -> String {
        format!("{}{}", self.endpoint, request.purpose.path())
    }
}

impl Uploader for HttpUploader {
    fn upload(&self, request: &UploadRequest) -> Result<UploadReceipt, UploadError> {
        let url = self.url_for(request);
        let form = build_form(request)?;
        debug!(%url, bytes = request.image.bytes.len(), "posting palm image");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| transport_error(&url, e))?;

        let status = response.status();
        let text = response.text().map_err(|e| transport_error(&url, e))?;
        if !status.is_success() {
            return Err(UploadError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let body = parse_body(request, text)?;
        Ok(UploadReceipt {
            status: status.as_u16(),
            body,
        })
    }
}
