//! Scripted in-memory transport for scheduler tests: completes in-flight
//! jobs in a caller-chosen url order and records concurrency high-water marks.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::Error;

use super::{JobHandle, RawResult, SubmitParams, Transport};

pub(crate) struct MockTransport {
    next_token: u64,
    in_flight: Vec<(u64, String)>,
    /// Urls in the order they should complete. Each poll finishes the
    /// earliest entry currently in flight; when empty, in-flight jobs finish
    /// in submission order.
    pub(crate) complete_order: Vec<String>,
    /// Scripted results per url; anything else completes as a plain 200 with
    /// the url as its body.
    pub(crate) results: HashMap<String, RawResult>,
    pub(crate) submitted: Vec<String>,
    pub(crate) max_in_flight: usize,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self {
            next_token: 0,
            in_flight: Vec::new(),
            complete_order: Vec::new(),
            results: HashMap::new(),
            submitted: Vec::new(),
            max_in_flight: 0,
        }
    }

    pub(crate) fn with_order<S: Into<String>>(order: Vec<S>) -> Self {
        let mut mock = Self::new();
        mock.complete_order = order.into_iter().map(Into::into).collect();
        mock
    }

    pub(crate) fn script_result(&mut self, url: &str, result: RawResult) {
        self.results.insert(url.to_string(), result);
    }

    fn take_result(&mut self, url: &str) -> RawResult {
        self.results.remove(url).unwrap_or_else(|| RawResult {
            status: 200,
            header_bytes: b"HTTP/1.1 200 OK\nContent-Type: text/plain\n".to_vec(),
            body: url.as_bytes().to_vec(),
            effective_url: url.to_string(),
            content_type: "text/plain".to_string(),
            ..RawResult::default()
        })
    }

    /// Picks the next in-flight job to finish: the earliest scripted url that
    /// is in flight, or the oldest in-flight job when nothing is scripted.
    fn next_to_finish(&mut self) -> Option<usize> {
        if self.in_flight.is_empty() {
            return None;
        }
        let scripted = self
            .complete_order
            .iter()
            .position(|url| self.in_flight.iter().any(|(_, u)| u == url));
        match scripted {
            Some(pos) => {
                let url = self.complete_order.remove(pos);
                self.in_flight.iter().position(|(_, u)| *u == url)
            }
            None => Some(0),
        }
    }
}

impl Transport for MockTransport {
    fn submit(&mut self, params: SubmitParams) -> Result<JobHandle, Error> {
        let token = self.next_token;
        self.next_token += 1;
        self.submitted.push(params.url.clone());
        self.in_flight.push((token, params.url));
        self.max_in_flight = self.max_in_flight.max(self.in_flight.len());
        Ok(JobHandle(token))
    }

    fn drive_once(&mut self) -> Result<bool, Error> {
        Ok(!self.in_flight.is_empty())
    }

    fn wait_for_activity(&mut self, _timeout_hint: Duration) -> bool {
        true
    }

    fn poll_finished(&mut self) -> Result<Vec<(JobHandle, RawResult)>, Error> {
        // One completion per poll keeps slot backfilling observable.
        match self.next_to_finish() {
            Some(idx) => {
                let (token, url) = self.in_flight.remove(idx);
                let raw = self.take_result(&url);
                Ok(vec![(JobHandle(token), raw)])
            }
            None => Ok(Vec::new()),
        }
    }

    fn release(&mut self, handle: JobHandle) {
        self.in_flight.retain(|(token, _)| *token != handle.0);
    }
}
