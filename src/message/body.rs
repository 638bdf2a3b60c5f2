//! Request body compilation: raw bytes, JSON documents and multipart file
//! uploads are turned into a byte payload plus a content type before the
//! request reaches the scheduler.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::Error;

/// Body content given to a request before compilation.
#[derive(Debug, Clone)]
pub enum Body {
    /// Sent as-is with content type `text/plain`.
    Raw(Vec<u8>),
    /// Serialized with content type `application/json`.
    Json(serde_json::Value),
    /// Encoded as `multipart/form-data` with a generated boundary.
    Multipart(Vec<FormFile>),
}

/// One file part of a multipart body.
#[derive(Debug, Clone)]
pub struct FormFile {
    /// Form field name.
    pub name: String,
    /// Path of the file to upload.
    pub path: PathBuf,
    /// Filename sent to the server; defaults to the path's file name.
    pub filename: Option<String>,
}

impl FormFile {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            filename: None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledBody {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

pub(crate) fn compile(body: &Body) -> Result<CompiledBody, Error> {
    match body {
        Body::Raw(bytes) => Ok(CompiledBody {
            bytes: bytes.clone(),
            content_type: "text/plain".to_string(),
        }),
        Body::Json(value) => {
            let bytes = serde_json::to_vec(value)
                .map_err(|e| Error::InvalidArgument(format!("invalid json body: {}", e)))?;
            Ok(CompiledBody {
                bytes,
                content_type: "application/json".to_string(),
            })
        }
        Body::Multipart(files) => compile_multipart(files),
    }
}

fn compile_multipart(files: &[FormFile]) -> Result<CompiledBody, Error> {
    let boundary = boundary();
    let mut bytes = Vec::new();

    for file in files {
        let content = fs::read(&file.path).map_err(|e| {
            Error::InvalidArgument(format!(
                "cannot read upload file {}: {}",
                file.path.display(),
                e
            ))
        })?;
        let filename = file
            .filename
            .clone()
            .or_else(|| {
                file.path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_default();

        bytes.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        bytes.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                file.name, filename
            )
            .as_bytes(),
        );
        bytes.extend_from_slice(format!("Content-Length: {}\r\n", content.len()).as_bytes());
        bytes.extend_from_slice(
            format!("Content-Type: {}\r\n\r\n", mime_for(&file.path)).as_bytes(),
        );
        bytes.extend_from_slice(&content);
        bytes.extend_from_slice(b"\r\n");
    }
    bytes.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    Ok(CompiledBody {
        bytes,
        content_type: format!("multipart/form-data; boundary={}", boundary),
    })
}

/// Process-unique multipart boundary: wall-clock nanoseconds plus a counter.
fn boundary() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("{:x}.{:x}", nanos, COUNTER.fetch_add(1, Ordering::Relaxed))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "csv" => "text/csv",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}
