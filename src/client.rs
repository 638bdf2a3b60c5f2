//! Public client facade: convenience verbs, batch execution, listener
//! registration and per-call configuration overrides.

use std::path::PathBuf;

use crate::config::{ClientConfig, ConfigOverrides};
use crate::error::Error;
use crate::events::{http_error_listener, BeforeListener, CompleteListener, Listeners};
use crate::message::Response;
use crate::pool;
use crate::request::{Method, Params, Request};
use crate::transport::{options, CurlTransport, Transport};

/// HTTP client over a bounded pool of concurrent transfers.
///
/// Single requests run synchronously on the calling thread; batches run the
/// same way but keep up to `connections` transfers in flight. The client is
/// not `Sync`; give each thread its own.
pub struct Client {
    config: ClientConfig,
    connections: usize,
    cookie_jar: Option<PathBuf>,
    listeners: Listeners,
}

impl Client {
    /// Creates a client. With `throw_on_error` set, single requests that end
    /// in a 4xx/5xx status or a transport failure return a typed error
    /// instead of a response; batch responses are always returned for
    /// inspection. A cookie jar path enables cookie persistence across
    /// requests in libcurl's jar format.
    pub fn new(config: ClientConfig, throw_on_error: bool, cookie_jar: Option<PathBuf>) -> Self {
        let connections = config.connections.max(1);
        let mut listeners = Listeners::default();
        if throw_on_error {
            listeners.add_complete(http_error_listener(), i32::MAX);
        }
        Self {
            config,
            connections,
            cookie_jar,
            listeners,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Caps concurrent transfers for batch requests. Clamped to at least 1.
    pub fn set_connections(&mut self, connections: usize) {
        self.connections = connections.max(1);
    }

    /// Registers a hook fired just before a request goes in flight. Higher
    /// priority fires earlier; ties fire in registration order.
    pub fn add_before_listener(&mut self, listener: BeforeListener, priority: i32) {
        self.listeners.add_before(listener, priority);
    }

    /// Registers a hook fired after each response is demultiplexed. An error
    /// returned from the hook aborts the call.
    pub fn add_complete_listener(&mut self, listener: CompleteListener, priority: i32) {
        self.listeners.add_complete(listener, priority);
    }

    pub fn get(&mut self, url: &str, parameters: Params) -> Result<Response, Error> {
        self.send(Method::Get, url, parameters)
    }

    pub fn head(&mut self, url: &str, parameters: Params) -> Result<Response, Error> {
        self.send(Method::Head, url, parameters)
    }

    pub fn post(&mut self, url: &str, parameters: Params) -> Result<Response, Error> {
        self.send(Method::Post, url, parameters)
    }

    pub fn put(&mut self, url: &str, parameters: Params) -> Result<Response, Error> {
        self.send(Method::Put, url, parameters)
    }

    pub fn patch(&mut self, url: &str, parameters: Params) -> Result<Response, Error> {
        self.send(Method::Patch, url, parameters)
    }

    pub fn delete(&mut self, url: &str, parameters: Params) -> Result<Response, Error> {
        self.send(Method::Delete, url, parameters)
    }

    fn send(&mut self, method: Method, url: &str, parameters: Params) -> Result<Response, Error> {
        let request = Request::builder(method, url).parameters(parameters).build()?;
        self.request(request)
    }

    /// Executes one request with the client's configuration.
    pub fn request(&mut self, request: Request) -> Result<Response, Error> {
        self.request_with(request, &ConfigOverrides::default())
    }

    /// Executes one request with per-call overrides. The overrides apply to
    /// this call only; the client's configuration is left untouched.
    pub fn request_with(
        &mut self,
        request: Request,
        overrides: &ConfigOverrides,
    ) -> Result<Response, Error> {
        let config = self.config.merge(overrides);
        let mut transport = CurlTransport::new();
        let mut responses =
            self.execute(&mut transport, vec![request], &config, 1, None, false)?;
        // A single unrejected request always yields exactly one response.
        responses
            .pop()
            .ok_or_else(|| Error::Transport("transfer produced no result".to_string()))
    }

    /// Executes a batch with up to the client's connection limit in flight.
    /// Responses come back in request order. Urls matched by the reject
    /// predicate are skipped and absent from the result.
    pub fn multi_request(
        &mut self,
        requests: Vec<Request>,
        reject: Option<&dyn Fn(&str) -> bool>,
    ) -> Result<Vec<Response>, Error> {
        let config = self.config.clone();
        let connections = self.connections;
        let mut transport = CurlTransport::new();
        self.execute(&mut transport, requests, &config, connections, reject, true)
    }

    /// Resolves requests against a configuration and runs them on the given
    /// transport. Seam for exercising client behavior without sockets.
    pub(crate) fn execute<T: Transport>(
        &self,
        transport: &mut T,
        requests: Vec<Request>,
        config: &ClientConfig,
        connections: usize,
        reject: Option<&dyn Fn(&str) -> bool>,
        is_batch: bool,
    ) -> Result<Vec<Response>, Error> {
        let submissions = requests
            .into_iter()
            .map(|request| {
                let params = options::resolve(&request, config, self.cookie_jar.as_deref())?;
                Ok((request, params))
            })
            .collect::<Result<Vec<_>, Error>>()?;
        pool::run_batch(transport, submissions, connections, reject, &self.listeners, is_batch)
    }
}

impl Default for Client {
    /// A client with default configuration, typed errors disabled and no
    /// cookie jar.
    fn default() -> Self {
        Self::new(ClientConfig::default(), false, None)
    }
}
