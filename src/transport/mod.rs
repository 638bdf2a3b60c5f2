//! Abstract transport boundary.
//!
//! The scheduler drives any `Transport`; the production implementation is
//! [`CurlTransport`] over libcurl's multi interface. The trait mirrors the
//! multi interface's shape: submit a configured transfer, drive all transfers
//! one non-blocking step, wait for socket activity with a bound, poll for
//! finished transfers, release their handles.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::error::Error;
use crate::message::TransferInfo;
use crate::request::Method;

mod curl;
pub(crate) mod options;

#[cfg(test)]
pub(crate) mod mock;

pub use self::curl::CurlTransport;

/// Opaque identifier for one submitted job. Assigned by the transport and
/// only valid for routing within one batch; ordering is never derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobHandle(pub(crate) u64);

/// Everything the transport needs to execute one request.
#[derive(Debug, Clone)]
pub struct SubmitParams {
    /// Final url, query string included.
    pub url: String,
    pub method: Method,
    /// `Name: value` lines, original capitalization.
    pub header_lines: Vec<String>,
    /// Payload for POST-type and DELETE requests.
    pub body: Option<Vec<u8>>,
    /// HEAD: do not fetch a body.
    pub nobody: bool,
    /// Submit under this verb instead of the transport's GET/POST default.
    pub custom_method: Option<String>,
    /// Plain POST with url-encoded fields and no explicit body.
    pub post: bool,
    /// Joined `Cookie` header value.
    pub cookie_header: Option<String>,
    /// Cookie-jar file read and written by the transport, format unparsed.
    pub cookie_jar: Option<PathBuf>,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub follow_location: bool,
    pub max_redirections: u32,
    pub ssl_verify_peer: bool,
    /// Accept-Encoding offer; an empty string lets the transport offer all it supports.
    pub accept_encoding: Option<String>,
    pub user_agent: String,
}

/// Raw outcome of one completed transfer, before demultiplexing.
#[derive(Debug, Clone, Default)]
pub struct RawResult {
    /// HTTP status, or 0 when no response was received.
    pub status: u32,
    /// Header lines, newline-joined; when redirects were followed the blocks
    /// of every hop are stacked, separated by blank lines.
    pub header_bytes: Vec<u8>,
    pub body: Vec<u8>,
    /// Transport error code, 0 on success.
    pub error_code: u32,
    pub error_message: String,
    pub effective_url: String,
    pub content_type: String,
    pub info: TransferInfo,
}

pub trait Transport {
    fn submit(&mut self, params: SubmitParams) -> Result<JobHandle, Error>;

    /// One non-blocking drive pass over all transfers. Returns whether any
    /// transfer is still active.
    fn drive_once(&mut self) -> Result<bool, Error>;

    /// Blocks until there is transport activity or the hint elapses. Returns
    /// false when the wait primitive fails; hosts have a documented race
    /// where the underlying select reports failure spuriously, so callers go
    /// through [`wait_or_backoff`] instead of treating false as fatal.
    fn wait_for_activity(&mut self, timeout_hint: Duration) -> bool;

    /// Transfers finished since the last poll, in no particular order.
    fn poll_finished(&mut self) -> Result<Vec<(JobHandle, RawResult)>, Error>;

    /// Releases a handle. Finished handles are detached by `poll_finished`;
    /// this also reclaims handles of an abandoned batch.
    fn release(&mut self, handle: JobHandle);
}

/// Sleep applied when the wait primitive fails, instead of busy-spinning.
pub const WAIT_FALLBACK: Duration = Duration::from_micros(250);

/// Waits for transport activity, falling back to a short fixed sleep when the
/// primitive reports a spurious failure. Returns whether the wait succeeded.
pub fn wait_or_backoff<T: Transport + ?Sized>(transport: &mut T, timeout_hint: Duration) -> bool {
    if transport.wait_for_activity(timeout_hint) {
        true
    } else {
        thread::sleep(WAIT_FALLBACK);
        false
    }
}
