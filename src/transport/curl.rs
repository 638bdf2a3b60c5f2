//! libcurl multi transport: one `Easy2` handle per in-flight job, all driven
//! by a single `Multi` handle on the calling thread.

use std::collections::HashMap;
use std::str;
use std::time::Duration;

use curl::easy::{Easy2, Handler, List, WriteError};
use curl::multi::{Easy2Handle, Multi};

use crate::error::Error;
use crate::message::TransferInfo;

use super::{JobHandle, RawResult, SubmitParams, Transport};

/// Easy2 handler collecting the header lines and body bytes of one transfer.
pub(crate) struct CollectHandler {
    /// Newline-joined header lines. libcurl delivers every hop's headers
    /// through the same callback, with the blank terminator line between
    /// blocks, so redirect chains arrive as stacked blocks.
    headers: Vec<u8>,
    body: Vec<u8>,
}

impl CollectHandler {
    fn new() -> Self {
        Self {
            headers: Vec::new(),
            body: Vec::new(),
        }
    }
}

impl Handler for CollectHandler {
    fn header(&mut self, data: &[u8]) -> bool {
        if let Ok(s) = str::from_utf8(data) {
            self.headers.extend_from_slice(s.trim_end().as_bytes());
            self.headers.push(b'\n');
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        self.body.extend_from_slice(data);
        Ok(data.len())
    }
}

/// Transport over libcurl's multi interface.
///
/// Handles are keyed by a transport-local monotonic token. The raw curl
/// handle is never used as a key: libcurl reuses handle identities once a
/// transfer is removed, which would misorder batches larger than the
/// connection limit.
pub struct CurlTransport {
    multi: Multi,
    handles: HashMap<u64, Easy2Handle<CollectHandler>>,
    next_token: u64,
}

impl CurlTransport {
    pub fn new() -> Self {
        Self {
            multi: Multi::new(),
            handles: HashMap::new(),
            next_token: 0,
        }
    }
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn transport_err(context: &str, e: impl std::fmt::Display) -> Error {
    Error::Transport(format!("{}: {}", context, e))
}

fn configure(params: &SubmitParams) -> Result<Easy2<CollectHandler>, Error> {
    let mut easy = Easy2::new(CollectHandler::new());
    easy.url(&params.url)
        .map_err(|e| transport_err("curl url", e))?;
    easy.useragent(&params.user_agent)
        .map_err(|e| transport_err("curl useragent", e))?;
    easy.follow_location(params.follow_location)
        .map_err(|e| transport_err("curl follow_location", e))?;
    easy.max_redirections(params.max_redirections)
        .map_err(|e| transport_err("curl max_redirections", e))?;
    easy.ssl_verify_peer(params.ssl_verify_peer)
        .map_err(|e| transport_err("curl ssl_verify_peer", e))?;
    easy.timeout(params.timeout)
        .map_err(|e| transport_err("curl timeout", e))?;
    easy.connect_timeout(params.connect_timeout)
        .map_err(|e| transport_err("curl connect_timeout", e))?;
    if let Some(encoding) = &params.accept_encoding {
        easy.accept_encoding(encoding)
            .map_err(|e| transport_err("curl accept_encoding", e))?;
    }
    if params.nobody {
        easy.nobody(true).map_err(|e| transport_err("curl nobody", e))?;
    }
    if let Some(body) = &params.body {
        easy.post_fields_copy(body)
            .map_err(|e| transport_err("curl post_fields", e))?;
    } else if params.post {
        easy.post(true).map_err(|e| transport_err("curl post", e))?;
    }
    // Set after the body so the verb survives libcurl's POST defaulting.
    if let Some(verb) = &params.custom_method {
        easy.custom_request(verb)
            .map_err(|e| transport_err("curl custom_request", e))?;
    }
    if let Some(cookie) = &params.cookie_header {
        easy.cookie(cookie).map_err(|e| transport_err("curl cookie", e))?;
    }
    if let Some(jar) = &params.cookie_jar {
        easy.cookie_file(jar)
            .map_err(|e| transport_err("curl cookie_file", e))?;
        easy.cookie_jar(jar)
            .map_err(|e| transport_err("curl cookie_jar", e))?;
    }
    if !params.header_lines.is_empty() {
        let mut list = List::new();
        for line in &params.header_lines {
            list.append(line).map_err(|e| transport_err("curl header", e))?;
        }
        easy.http_headers(list)
            .map_err(|e| transport_err("curl http_headers", e))?;
    }
    Ok(easy)
}

impl Transport for CurlTransport {
    fn submit(&mut self, params: SubmitParams) -> Result<JobHandle, Error> {
        let easy = configure(&params)?;
        let handle = self
            .multi
            .add2(easy)
            .map_err(|e| transport_err("curl multi add", e))?;
        let token = self.next_token;
        self.next_token += 1;
        self.handles.insert(token, handle);
        tracing::debug!(url = %params.url, token, "transfer submitted");
        Ok(JobHandle(token))
    }

    fn drive_once(&mut self) -> Result<bool, Error> {
        let running = self
            .multi
            .perform()
            .map_err(|e| transport_err("curl multi perform", e))?;
        Ok(running > 0)
    }

    fn wait_for_activity(&mut self, timeout_hint: Duration) -> bool {
        self.multi.wait(&mut [], timeout_hint).is_ok()
    }

    fn poll_finished(&mut self) -> Result<Vec<(JobHandle, RawResult)>, Error> {
        let mut finished: Vec<(u64, Result<(), curl::Error>)> = Vec::new();
        self.multi.messages(|msg| {
            for (token, handle) in &self.handles {
                if let Some(result) = msg.result_for2(handle) {
                    finished.push((*token, result));
                    break;
                }
            }
        });

        let mut results = Vec::with_capacity(finished.len());
        for (token, result) in finished {
            let handle = match self.handles.remove(&token) {
                Some(handle) => handle,
                None => continue,
            };
            let mut easy = self
                .multi
                .remove2(handle)
                .map_err(|e| transport_err("curl multi remove", e))?;

            let status = easy.response_code().unwrap_or(0);
            let effective_url = easy
                .effective_url()
                .ok()
                .flatten()
                .map(str::to_string)
                .unwrap_or_default();
            let content_type = easy
                .content_type()
                .ok()
                .flatten()
                .map(str::to_string)
                .unwrap_or_default();
            let info = TransferInfo {
                total_time: easy.total_time().unwrap_or_default(),
                namelookup_time: easy.namelookup_time().unwrap_or_default(),
                connect_time: easy.connect_time().unwrap_or_default(),
                redirect_count: easy.redirect_count().unwrap_or(0),
            };
            let (error_code, error_message) = match result {
                Ok(()) => (0, String::new()),
                Err(e) => (e.code() as u32, e.to_string()),
            };

            let handler = easy.get_mut();
            results.push((
                JobHandle(token),
                RawResult {
                    status,
                    header_bytes: std::mem::take(&mut handler.headers),
                    body: std::mem::take(&mut handler.body),
                    error_code,
                    error_message,
                    effective_url,
                    content_type,
                    info,
                },
            ));
        }
        Ok(results)
    }

    fn release(&mut self, handle: JobHandle) {
        // Finished handles were detached in poll_finished; anything left here
        // belongs to an abandoned batch and is dropped with its easy handle.
        self.handles.remove(&handle.0);
    }
}
