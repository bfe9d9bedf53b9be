use crate::error::{CanaiError, Result};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

pub const API_KEY_HEADER: &str = "X-API-Key";

/// How the uploader authenticates against the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    None,
    /// `Authorization: Bearer <key>`
    Bearer(String),
    /// `X-API-Key: <key>` plus a `user_id` form field
    ApiKey { user_id: String, key: String },
}

impl Auth {
    pub fn from_parts(key: Option<String>, user_id: Option<String>) -> Self {
        match (key, user_id) {
            (Some(key), Some(user_id)) => Auth::ApiKey { user_id, key },
            (Some(key), None) if !key.is_empty() => Auth::Bearer(key),
            _ => Auth::None,
        }
    }

    fn apply(&self, request: RequestBuilder, form: Form) -> RequestBuilder {
        match self {
            Auth::None => request.multipart(form),
            Auth::Bearer(key) => request.bearer_auth(key).multipart(form),
            Auth::ApiKey { user_id, key } => request
                .header(API_KEY_HEADER, key)
                .multipart(form.text("user_id", user_id.clone())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file: PathBuf,
    pub url: String,
    pub auth: Auth,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub status: u16,
    pub body: String,
}

/// POST `request.file` as the multipart field `file`. Any non-2xx answer is an
/// [`CanaiError::UploadStatus`].
pub fn try_upload(request: &UploadRequest) -> Result<UploadReceipt> {
    if !request.file.is_file() {
        return Err(CanaiError::FileNotFound(request.file.display().to_string()));
    }

    info!("Uploading {} to {}...", request.file.display(), request.url);

    let file_name = request
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let bytes = std::fs::read(&request.file)?;
    debug!(bytes = bytes.len(), file = %file_name, "file read");

    let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
    let client = Client::builder().timeout(request.timeout).build()?;
    let response = request.auth.apply(client.post(&request.url), form).send()?;

    let status = response.status();
    let body = match response.text() {
        Ok(body) => body,
        Err(e) => {
            debug!("could not read response body: {e}");
            String::new()
        }
    };
    if !status.is_success() {
        return Err(CanaiError::UploadStatus {
            status: status.as_u16(),
            body,
        });
    }

    Ok(UploadReceipt {
        status: status.as_u16(),
        body,
    })
}

/// Upload and report the outcome. Returns whether the upload succeeded.
pub fn upload_file(request: &UploadRequest) -> bool {
    match try_upload(request) {
        Ok(receipt) => {
            info!("Upload successful! Status code: {}", receipt.status);
            info!("Response: {}", receipt.body);
            true
        }
        Err(CanaiError::UploadStatus { status, body }) => {
            error!("Error uploading file: endpoint answered {status}");
            error!("Response status code: {status}");
            error!("Response body: {body}");
            false
        }
        Err(e) => {
            error!("Error uploading file: {e}");
            false
        }
    }
}
