//! Response and redirect records produced by the demultiplexer.

use std::borrow::Cow;
use std::time::Duration;

use crate::error::Error;
use crate::message::Headers;

/// A completed HTTP response. Transport-level failures are represented as a
/// Response too: `status` 0 with `error_code`/`error_message` populated.
#[derive(Debug, Clone)]
pub struct Response {
    pub protocol: String,
    pub status: u32,
    pub reason: String,
    pub headers: Headers,
    pub body: Vec<u8>,
    /// Url the request was submitted with (query string included).
    pub request_url: String,
    /// Url after following redirects, as reported by the transport.
    pub effective_url: String,
    pub content_type: String,
    /// Transport error code; 0 when the transfer succeeded.
    pub error_code: u32,
    pub error_message: String,
    /// Redirect hops prior to this response, earliest first.
    pub redirects: Vec<Redirect>,
    /// Transport timing diagnostics.
    pub info: TransferInfo,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            protocol: "HTTP/1.1".to_string(),
            status: 0,
            reason: String::new(),
            headers: Headers::new(),
            body: Vec::new(),
            request_url: String::new(),
            effective_url: String::new(),
            content_type: String::new(),
            error_code: 0,
            error_message: String::new(),
            redirects: Vec::new(),
            info: TransferInfo::default(),
        }
    }
}

impl Response {
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Decodes the body as JSON when the content type is an
    /// `application/*json` variant.
    pub fn json(&self) -> Result<serde_json::Value, Error> {
        let ct = self.content_type.to_ascii_lowercase();
        if !(ct.starts_with("application/") && ct.contains("json")) {
            return Err(Error::InvalidArgument(format!(
                "response content type is not json: {:?}",
                self.content_type
            )));
        }
        serde_json::from_slice(&self.body)
            .map_err(|e| Error::InvalidArgument(format!("invalid json response body: {}", e)))
    }
}

/// One redirect hop: the status line and headers the server answered with
/// before the transport followed its Location.
#[derive(Debug, Clone, Default)]
pub struct Redirect {
    pub protocol: String,
    pub status: u32,
    pub reason: String,
    pub headers: Headers,
}

/// Subset of the transport's per-transfer diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferInfo {
    pub total_time: Duration,
    pub namelookup_time: Duration,
    pub connect_time: Duration,
    pub redirect_count: u32,
}
