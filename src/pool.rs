//! Connection-pool scheduler: bounded slots over a single cooperative pump
//! loop.
//!
//! Each incoming request becomes a job with a monotonic sequence number
//! assigned at submission. Up to `connections` jobs are in flight at once;
//! the pump loop drives the transport, harvests completions, demultiplexes
//! them, fires hooks, and backfills freed slots until queue and in-flight
//! set are both empty. Results are keyed by sequence number, so the returned
//! collection is in submission order no matter when transfers complete.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use crate::demux;
use crate::error::Error;
use crate::events::Listeners;
use crate::message::{Response, ResponseCollection};
use crate::request::Request;
use crate::transport::{self, JobHandle, SubmitParams, Transport};

/// Upper bound for one blocking wait in the pump loop.
const WAIT_HINT: Duration = Duration::from_millis(100);

struct Job {
    seq: u64,
    request: Request,
    params: SubmitParams,
}

/// Executes `requests` with at most `connections` in flight.
///
/// Urls rejected by the predicate are skipped before they consume a slot and
/// are absent from the output. A failed transfer still completes: its
/// response carries the transport error fields instead of being dropped, and
/// nothing is retried.
pub(crate) fn run_batch<T: Transport>(
    transport: &mut T,
    requests: Vec<(Request, SubmitParams)>,
    connections: usize,
    reject: Option<&dyn Fn(&str) -> bool>,
    listeners: &Listeners,
    is_batch: bool,
) -> Result<Vec<Response>, Error> {
    let connections = connections.max(1);
    let total = requests.len();
    let mut queue: VecDeque<Job> = requests
        .into_iter()
        .enumerate()
        .map(|(seq, (request, params))| Job {
            seq: seq as u64,
            request,
            params,
        })
        .collect();

    let mut in_flight: HashMap<JobHandle, Job> = HashMap::new();
    let mut collection = ResponseCollection::default();
    let mut rejected = 0usize;

    fill_slots(
        transport,
        &mut queue,
        &mut in_flight,
        connections,
        reject,
        listeners,
        &mut rejected,
    )?;

    while !in_flight.is_empty() {
        transport.drive_once()?;

        for (handle, raw) in transport.poll_finished()? {
            let job = match in_flight.remove(&handle) {
                Some(job) => job,
                None => continue,
            };
            let response = demux::parse(raw, job.request.method(), &job.params.url);
            tracing::debug!(
                url = %job.params.url,
                seq = job.seq,
                status = response.status,
                "request complete"
            );
            let hook_result = listeners.fire_complete(&job.request, &response, is_batch);
            transport.release(handle);
            hook_result?;
            collection.add(job.seq, response);
        }

        fill_slots(
            transport,
            &mut queue,
            &mut in_flight,
            connections,
            reject,
            listeners,
            &mut rejected,
        )?;

        if !in_flight.is_empty() {
            transport::wait_or_backoff(transport, WAIT_HINT);
        }
    }

    debug_assert_eq!(collection.len(), total - rejected);
    tracing::debug!(total, rejected, "batch drained");
    Ok(collection.into_ordered())
}

/// Submits queued jobs until every slot is taken or the queue runs dry.
/// Rejected urls never occupy a slot.
fn fill_slots<T: Transport>(
    transport: &mut T,
    queue: &mut VecDeque<Job>,
    in_flight: &mut HashMap<JobHandle, Job>,
    connections: usize,
    reject: Option<&dyn Fn(&str) -> bool>,
    listeners: &Listeners,
    rejected: &mut usize,
) -> Result<(), Error> {
    while in_flight.len() < connections {
        let job = match queue.pop_front() {
            Some(job) => job,
            None => break,
        };
        if let Some(reject) = reject {
            if reject(&job.params.url) {
                tracing::debug!(url = %job.params.url, seq = job.seq, "request rejected");
                *rejected += 1;
                continue;
            }
        }
        listeners.fire_before(&job.request);
        let handle = transport.submit(job.params.clone())?;
        in_flight.insert(handle, job);
    }
    Ok(())
}
