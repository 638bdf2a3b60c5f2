//! Request lifecycle hooks.
//!
//! Two fixed hook points: Before fires just before a job goes in flight,
//! Complete fires right after demultiplexing, before the response is
//! recorded. Both run synchronously on the pump-loop thread, so a slow
//! listener delays the whole batch.

use crate::error::Error;
use crate::message::Response;
use crate::request::Request;

pub type BeforeListener = Box<dyn Fn(&Request)>;

/// Complete listeners receive the request, the demuxed response, and whether
/// the call is part of a batch. Returning an error aborts the call and
/// surfaces to the synchronous caller.
pub type CompleteListener = Box<dyn Fn(&Request, &Response, bool) -> Result<(), Error>>;

/// Ordered listener registrations. Higher priority fires earlier; equal
/// priorities fire in registration order.
#[derive(Default)]
pub(crate) struct Listeners {
    before: Vec<(i32, BeforeListener)>,
    complete: Vec<(i32, CompleteListener)>,
}

impl Listeners {
    pub(crate) fn add_before(&mut self, listener: BeforeListener, priority: i32) {
        self.before.push((priority, listener));
        self.before.sort_by_key(|(p, _)| std::cmp::Reverse(*p));
    }

    pub(crate) fn add_complete(&mut self, listener: CompleteListener, priority: i32) {
        self.complete.push((priority, listener));
        self.complete.sort_by_key(|(p, _)| std::cmp::Reverse(*p));
    }

    pub(crate) fn fire_before(&self, request: &Request) {
        for (_, listener) in &self.before {
            listener(request);
        }
    }

    pub(crate) fn fire_complete(
        &self,
        request: &Request,
        response: &Response,
        is_batch: bool,
    ) -> Result<(), Error> {
        for (_, listener) in &self.complete {
            listener(request, response, is_batch)?;
        }
        Ok(())
    }
}

/// The built-in error listener: raises a typed error for 4xx/5xx statuses and
/// transport failures on the single-request path. Batch responses are left
/// for the caller to inspect so one failing request cannot abort the batch.
pub fn http_error_listener() -> CompleteListener {
    Box::new(|_request, response, is_batch| {
        if is_batch {
            return Ok(());
        }
        if response.status >= 400 || response.status == 0 {
            return Err(Error::from_response(response));
        }
        Ok(())
    })
}
