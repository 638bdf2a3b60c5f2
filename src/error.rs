//! Typed error taxonomy for request failures.
//!
//! Transport and HTTP failures are recovered into `Response` error fields by
//! the engine; these error types only surface to callers through the
//! single-request error listener, through input validation, or when the
//! multi interface itself fails.

use std::fmt;

use thiserror::Error;

use crate::classify::{classify, ErrorClass};
use crate::message::Response;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed call input: empty url, invalid json body, unreadable upload file.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// No response reached the client (timeout, resolution or connect failure).
    #[error("connection request error: {0}")]
    Connection(RequestFailure),
    /// The server answered with a 4xx status.
    #[error("client request error: {0}")]
    Client(RequestFailure),
    /// The server answered with a 5xx status.
    #[error("server request error: {0}")]
    Server(RequestFailure),
    /// A failure that fits no more specific class.
    #[error("request error: {0}")]
    Request(RequestFailure),
    /// The transport collaborator itself failed (submit/drive/remove).
    #[error("transport: {0}")]
    Transport(String),
}

impl Error {
    /// Builds the typed error matching a completed response's classification.
    /// Used by the built-in error listener on the single-request path.
    pub fn from_response(response: &Response) -> Self {
        let failure = RequestFailure::from_response(response);
        match classify(response) {
            Some(ErrorClass::Server) => Error::Server(failure),
            Some(ErrorClass::Client) => Error::Client(failure),
            Some(ErrorClass::Connection) => Error::Connection(failure),
            None => Error::Request(failure),
        }
    }
}

/// Details of the failed request carried by the HTTP-level error variants.
#[derive(Debug, Clone)]
pub struct RequestFailure {
    pub url: String,
    /// HTTP status, or 0 when no response was received.
    pub status: u32,
    pub reason: String,
    /// Transport error code; 0 when the transfer itself succeeded.
    pub error_code: u32,
    pub error_message: String,
}

impl RequestFailure {
    pub(crate) fn from_response(response: &Response) -> Self {
        Self {
            url: response.request_url.clone(),
            status: response.status,
            reason: response.reason.clone(),
            error_code: response.error_code,
            error_message: response.error_message.clone(),
        }
    }
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.status == 0 {
            write!(f, "{} {}", self.error_code, self.error_message.trim())?;
        } else {
            let detail = self.error_message.trim();
            let detail = if detail.is_empty() {
                self.reason.as_str()
            } else {
                detail
            };
            write!(f, "{} {}", self.status, detail)?;
        }
        write!(f, ", while requesting {}", self.url)
    }
}
