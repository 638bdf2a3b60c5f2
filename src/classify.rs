//! Classify completed responses into an advisory error taxonomy.
//!
//! Pure function over a `Response`; consumed by the built-in error listener
//! and available to callers inspecting batch results.

use crate::message::Response;

// libcurl error codes treated as connectivity failures (CURLE_* values).
const COULDNT_RESOLVE_PROXY: u32 = 5;
const COULDNT_RESOLVE_HOST: u32 = 6;
const COULDNT_CONNECT: u32 = 7;
const OPERATION_TIMEDOUT: u32 = 28;
const SSL_CONNECT_ERROR: u32 = 35;
const GOT_NOTHING: u32 = 52;

/// Advisory class of a failed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// No response was received; the transport reported a connectivity failure.
    Connection,
    /// 4xx response.
    Client,
    /// 5xx response.
    Server,
}

/// True when the transport error code is one of the known connectivity
/// failures (timeout, host/proxy resolution, connect, TLS connect, empty reply).
pub fn is_connection_error(error_code: u32) -> bool {
    matches!(
        error_code,
        COULDNT_RESOLVE_PROXY
            | COULDNT_RESOLVE_HOST
            | COULDNT_CONNECT
            | OPERATION_TIMEDOUT
            | SSL_CONNECT_ERROR
            | GOT_NOTHING
    )
}

/// Classifies a completed response. Returns `None` for anything that is not
/// an error (2xx, 3xx, or unclassifiable outcomes). Never fails.
pub fn classify(response: &Response) -> Option<ErrorClass> {
    if response.status == 0 && is_connection_error(response.error_code) {
        return Some(ErrorClass::Connection);
    }
    if response.status >= 500 {
        return Some(ErrorClass::Server);
    }
    if response.status >= 400 {
        return Some(ErrorClass::Client);
    }
    None
}
