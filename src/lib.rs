//! HTTP client library over libcurl's multi interface.
//!
//! Single requests and bounded-concurrency batches share one cooperative
//! engine: requests are resolved into transfer parameters, driven through a
//! transport, demultiplexed into responses with their redirect chains, and
//! returned in submission order. Failures are classified into typed errors.

pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod message;
pub mod request;
pub mod transport;

mod demux;
mod pool;

pub use client::Client;
pub use config::{ClientConfig, ConfigOverrides};
pub use error::Error;
pub use events::{http_error_listener, BeforeListener, CompleteListener};
pub use message::{Body, FormFile, Headers, Redirect, Response, TransferInfo};
pub use request::{Method, Params, Request, RequestBuilder};
