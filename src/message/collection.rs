//! Responses keyed by submission sequence number.
//!
//! The scheduler records completions as they arrive; draining the collection
//! yields submission order, never completion order. Sequence numbers are
//! assigned once at submission and never reused, unlike transport handle
//! identifiers which can be reissued as slots free up.

use std::collections::BTreeMap;

use crate::message::Response;

#[derive(Debug, Default)]
pub(crate) struct ResponseCollection {
    responses: BTreeMap<u64, Response>,
}

impl ResponseCollection {
    pub(crate) fn add(&mut self, seq: u64, response: Response) {
        let previous = self.responses.insert(seq, response);
        debug_assert!(previous.is_none(), "sequence number recorded twice");
    }

    pub(crate) fn len(&self) -> usize {
        self.responses.len()
    }

    /// Drains into a vector ordered by sequence number.
    pub(crate) fn into_ordered(self) -> Vec<Response> {
        self.responses.into_values().collect()
    }
}
