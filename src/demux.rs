//! Demultiplex a completed transfer into a `Response` and its redirect chain.
//!
//! The transport hands back every hop's header block stacked in one buffer,
//! blank-line separated. The last block belongs to the final response; each
//! earlier block becomes one `Redirect` record, earliest hop first.

use crate::message::{Headers, Redirect, Response};
use crate::request::Method;
use crate::transport::RawResult;

pub(crate) fn parse(raw: RawResult, method: Method, request_url: &str) -> Response {
    let mut response = Response::default();

    let text = String::from_utf8_lossy(&raw.header_bytes).replace("\r\n", "\n");
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        let mut blocks: Vec<&str> = trimmed.split("\n\n").collect();
        if let Some(last) = blocks.pop() {
            for chunk in blocks {
                let block = parse_header_block(chunk);
                response.redirects.push(Redirect {
                    protocol: block.protocol,
                    status: block.status,
                    reason: block.reason,
                    headers: block.headers,
                });
            }
            let block = parse_header_block(last);
            response.protocol = block.protocol;
            response.reason = block.reason;
            response.headers = block.headers;
        }
    }

    // The transport-reported status is authoritative; the reason phrase is
    // normalized from the canonical table when the code is known.
    response.status = raw.status;
    if let Some(phrase) = reason_phrase(raw.status) {
        response.reason = phrase.to_string();
    }
    response.body = if method == Method::Head {
        Vec::new()
    } else {
        raw.body
    };
    response.request_url = request_url.to_string();
    response.effective_url = raw.effective_url;
    response.content_type = raw.content_type;
    response.error_code = raw.error_code;
    response.error_message = raw.error_message;
    response.info = raw.info;
    response
}

struct HeaderBlock {
    protocol: String,
    status: u32,
    reason: String,
    headers: Headers,
}

/// Parses one `PROTOCOL STATUS REASON` status line plus `Name: value` header
/// lines. Values are split on the first separator only, so they may contain
/// colons. Malformed lines are skipped rather than failing the response.
fn parse_header_block(block: &str) -> HeaderBlock {
    let mut lines = block.lines();
    let status_line = lines.next().unwrap_or("");
    let mut parts = status_line.splitn(3, ' ');
    let protocol = parts.next().unwrap_or("").to_string();
    let status = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    let reason = parts.next().unwrap_or("").trim().to_string();

    let mut headers = Headers::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        if let Some((name, value)) = line.split_once(": ") {
            headers.set(name, value);
        } else if let Some((name, value)) = line.split_once(':') {
            headers.set(name, value);
        }
    }

    HeaderBlock {
        protocol,
        status,
        reason,
        headers,
    }
}

/// Canonical reason phrase for known status codes.
fn reason_phrase(status: u32) -> Option<&'static str> {
    Some(match status {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Payload Too Large",
        414 => "URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Range Not Satisfiable",
        417 => "Expectation Failed",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(status: u32, headers: &str, body: &[u8]) -> RawResult {
        RawResult {
            status,
            header_bytes: headers.as_bytes().to_vec(),
            body: body.to_vec(),
            effective_url: "http://example.com/final".to_string(),
            content_type: "text/html".to_string(),
            ..RawResult::default()
        }
    }

    #[test]
    fn single_block_fills_response_fields() {
        let raw = raw(
            200,
            "HTTP/1.1 200 OK\nContent-Type: text/html\nServer: nginx\n",
            b"<html></html>",
        );
        let response = parse(raw, Method::Get, "http://example.com/");
        assert_eq!(response.protocol, "HTTP/1.1");
        assert_eq!(response.status, 200);
        assert_eq!(response.reason, "OK");
        assert_eq!(response.headers.get("server"), Some("nginx"));
        assert_eq!(response.body, b"<html></html>");
        assert_eq!(response.request_url, "http://example.com/");
        assert_eq!(response.effective_url, "http://example.com/final");
        assert!(response.redirects.is_empty());
        assert_eq!(response.error_code, 0);
    }

    #[test]
    fn stacked_blocks_become_redirects_in_hop_order() {
        let raw = raw(
            200,
            "HTTP/1.1 301 Moved Permanently\nLocation: http://example.com/a\n\n\
             HTTP/1.1 302 Found\nLocation: http://example.com/b\n\n\
             HTTP/1.1 200 OK\nContent-Type: text/html\n",
            b"done",
        );
        let response = parse(raw, Method::Get, "http://example.com/");
        assert_eq!(response.redirects.len(), 2);
        assert_eq!(response.redirects[0].status, 301);
        assert_eq!(
            response.redirects[0].headers.get("location"),
            Some("http://example.com/a")
        );
        assert_eq!(response.redirects[1].status, 302);
        assert_eq!(response.status, 200);
        assert_eq!(response.headers.get("content-type"), Some("text/html"));
    }

    #[test]
    fn crlf_separated_blocks_parse_the_same() {
        let raw = raw(
            200,
            "HTTP/1.1 302 Found\r\nLocation: /next\r\n\r\nHTTP/1.1 200 OK\r\n",
            b"ok",
        );
        let response = parse(raw, Method::Get, "http://example.com/");
        assert_eq!(response.redirects.len(), 1);
        assert_eq!(response.redirects[0].headers.get("location"), Some("/next"));
    }

    #[test]
    fn header_values_keep_their_colons() {
        let raw = raw(
            200,
            "HTTP/1.1 200 OK\nLink: <http://example.com/page?x=1>; rel=next\nX-Time: 12:34:56\n",
            b"",
        );
        let response = parse(raw, Method::Get, "http://example.com/");
        assert_eq!(
            response.headers.get("link"),
            Some("<http://example.com/page?x=1>; rel=next")
        );
        assert_eq!(response.headers.get("x-time"), Some("12:34:56"));
    }

    #[test]
    fn head_response_body_is_always_empty() {
        let raw = raw(
            200,
            "HTTP/1.1 200 OK\nContent-Length: 1024\n",
            b"stray body bytes",
        );
        let response = parse(raw, Method::Head, "http://example.com/");
        assert!(response.body.is_empty());
        assert_eq!(response.headers.get("content-length"), Some("1024"));
    }

    #[test]
    fn transport_failure_without_headers_carries_error_fields() {
        let result = RawResult {
            status: 0,
            error_code: 28,
            error_message: "Operation timed out".to_string(),
            ..RawResult::default()
        };
        let response = parse(result, Method::Get, "http://example.com/slow");
        assert_eq!(response.status, 0);
        assert_eq!(response.error_code, 28);
        assert_eq!(response.error_message, "Operation timed out");
        assert!(response.headers.is_empty());
        assert!(response.redirects.is_empty());
        assert_eq!(response.request_url, "http://example.com/slow");
    }

    #[test]
    fn reason_phrase_is_normalized_for_known_codes() {
        let raw = raw(200, "HTTP/1.1 200 Okey-Dokey\n", b"");
        let response = parse(raw, Method::Get, "http://example.com/");
        assert_eq!(response.reason, "OK");
    }

    #[test]
    fn unknown_status_keeps_the_parsed_phrase() {
        let raw = raw(599, "HTTP/1.1 599 Network Timeout\n", b"");
        let response = parse(raw, Method::Get, "http://example.com/");
        assert_eq!(response.status, 599);
        assert_eq!(response.reason, "Network Timeout");
    }

    #[test]
    fn status_line_without_reason_parses() {
        let raw = raw(204, "HTTP/2 204\n", b"");
        let response = parse(raw, Method::Get, "http://example.com/");
        assert_eq!(response.protocol, "HTTP/2");
        assert_eq!(response.reason, "No Content");
    }
}
