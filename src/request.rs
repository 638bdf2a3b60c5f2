//! Logical HTTP requests and their builder.

use crate::error::Error;
use crate::message::{self, Body, Headers};

/// Ordered query/form parameters.
pub type Params = Vec<(String, String)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Methods whose parameters are sent as an url-encoded body rather than
    /// a query string.
    pub fn is_post_type(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }
}

/// An immutable logical request. Built once, then handed to the scheduler;
/// the body is compiled to bytes at build time.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: String,
    headers: Headers,
    parameters: Params,
    body: Option<Vec<u8>>,
    cookies: Vec<String>,
}

impl Request {
    pub fn builder(method: Method, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder {
            method,
            url: url.into(),
            headers: Headers::new(),
            parameters: Vec::new(),
            body: None,
            cookies: Vec::new(),
        }
    }

    /// Shorthand for a request without headers, parameters or body.
    pub fn new(method: Method, url: impl Into<String>) -> Result<Self, Error> {
        Self::builder(method, url).build()
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn parameters(&self) -> &Params {
        &self.parameters
    }

    /// Compiled body bytes, when one was set.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn cookies(&self) -> &[String] {
        &self.cookies
    }
}

#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    url: String,
    headers: Headers,
    parameters: Params,
    body: Option<Body>,
    cookies: Vec<String>,
}

impl RequestBuilder {
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((name.into(), value.into()));
        self
    }

    pub fn parameters(mut self, parameters: Params) -> Self {
        self.parameters.extend(parameters);
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Adds a `name=value` cookie pair sent with the request.
    pub fn cookie(mut self, cookie: &str) -> Self {
        self.cookies.push(cookie.trim().to_string());
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Validates the url and compiles the body. The `Content-Type` header is
    /// set from the body only when not already present.
    pub fn build(self) -> Result<Request, Error> {
        if self.url.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "the request url cannot be empty".to_string(),
            ));
        }

        let mut headers = self.headers;
        let body = match &self.body {
            Some(body) => {
                let compiled = message::compile(body)?;
                if !headers.contains("Content-Type") && !compiled.content_type.is_empty() {
                    headers.set("Content-Type", &compiled.content_type);
                }
                Some(compiled.bytes)
            }
            None => None,
        };

        Ok(Request {
            method: self.method,
            url: self.url,
            headers,
            parameters: self.parameters,
            body,
            cookies: self.cookies,
        })
    }
}
