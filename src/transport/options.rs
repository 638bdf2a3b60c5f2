//! Maps a logical request plus configuration into transport submission
//! parameters: final url with query string, payload, header lines, method
//! semantics and timeouts.

use std::path::Path;

use url::form_urlencoded;
use url::Url;

use crate::config::ClientConfig;
use crate::error::Error;
use crate::request::{Method, Request};

use super::SubmitParams;

/// Resolves a request into submission parameters.
///
/// Parameter placement follows the method: GET/HEAD/DELETE parameters replace
/// the url's query string; POST/PUT/PATCH parameters become an url-encoded
/// body unless an explicit body was set. DELETE sends a body only when one
/// was explicitly set.
pub(crate) fn resolve(
    request: &Request,
    config: &ClientConfig,
    cookie_jar: Option<&Path>,
) -> Result<SubmitParams, Error> {
    let method = request.method();
    let post_type = method.is_post_type();

    let mut url = request.url().to_string();
    if !post_type && !request.parameters().is_empty() {
        let mut parsed = Url::parse(&url)
            .map_err(|e| Error::InvalidArgument(format!("invalid request url {:?}: {}", url, e)))?;
        parsed
            .query_pairs_mut()
            .clear()
            .extend_pairs(request.parameters().iter().map(|(n, v)| (n.as_str(), v.as_str())));
        url = parsed.to_string();
    }

    let mut body = None;
    let mut post = false;
    if post_type || method == Method::Delete {
        if let Some(explicit) = request.body() {
            body = Some(explicit.to_vec());
        } else if post_type {
            let encoded: String = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(request.parameters().iter().map(|(n, v)| (n.as_str(), v.as_str())))
                .finish();
            body = Some(encoded.into_bytes());
            post = true;
        }
    }

    let custom_method = match method {
        Method::Put | Method::Patch | Method::Delete => Some(method.as_str().to_string()),
        _ => None,
    };

    let header_lines = request
        .headers()
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect();

    let cookie_header = if request.cookies().is_empty() {
        None
    } else {
        Some(request.cookies().join("; "))
    };

    Ok(SubmitParams {
        url,
        method,
        header_lines,
        body,
        nobody: method == Method::Head,
        custom_method,
        post,
        cookie_header,
        cookie_jar: cookie_jar.map(Path::to_path_buf),
        timeout: config.timeout(),
        connect_timeout: config.connect_timeout(),
        follow_location: config.follow_location,
        max_redirections: config.max_redirections,
        ssl_verify_peer: config.ssl_verify_peer,
        accept_encoding: config.accept_encoding.clone(),
        user_agent: config.user_agent.clone(),
    })
}
