//! JSON response bodies. Errors use `AppError` instead.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// A capability URL for a single upload or download.
#[derive(Debug, Serialize)]
pub struct UrlResponse {
    pub url: String,
}

/// Names of the objects in a folder, relative to the folder prefix.
#[derive(Debug, Serialize)]
pub struct FilesResponse {
    pub files: Vec<String>,
}
