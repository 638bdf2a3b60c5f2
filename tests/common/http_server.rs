//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed route table: plain bodies, redirect chains, error statuses
//! and an echo endpoint. Every response carries Content-Length and closes the
//! connection afterwards.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

/// Starts the server in a background thread. Returns the base url, e.g.
/// "http://127.0.0.1:12345". The server runs until the process exits.
pub fn start() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            thread::spawn(move || handle(stream));
        }
    });
    format!("http://127.0.0.1:{}", port)
}

fn handle(mut stream: std::net::TcpStream) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let data = match read_request(&mut stream) {
        Some(data) => data,
        None => return,
    };
    let request = String::from_utf8_lossy(&data).into_owned();
    let (method, target, body) = parse_request(&request);

    match target.split('?').next().unwrap_or("") {
        "/ok" => respond(&mut stream, "200 OK", &[("Content-Type", "text/plain")], b"hello"),
        "/missing" => respond(&mut stream, "404 Not Found", &[], b"not found"),
        "/fail" => respond(
            &mut stream,
            "500 Internal Server Error",
            &[],
            b"server on fire",
        ),
        "/redirect" => respond(&mut stream, "302 Found", &[("Location", "/ok")], b""),
        "/setcookie" => respond(
            &mut stream,
            "200 OK",
            &[("Set-Cookie", "flavor=oatmeal; Path=/")],
            b"baked",
        ),
        "/redirect2" => respond(&mut stream, "302 Found", &[("Location", "/redirect")], b""),
        "/echo" => {
            let line = format!("{} {}", method, body);
            respond(
                &mut stream,
                "200 OK",
                &[("Content-Type", "text/plain")],
                line.as_bytes(),
            )
        }
        "/query" => {
            let query = target.split_once('?').map(|(_, q)| q).unwrap_or("");
            respond(
                &mut stream,
                "200 OK",
                &[("Content-Type", "text/plain")],
                query.as_bytes(),
            )
        }
        path if path.starts_with("/n/") => {
            let id = &path[3..];
            respond(
                &mut stream,
                "200 OK",
                &[("Content-Type", "text/plain")],
                id.as_bytes(),
            )
        }
        _ => respond(&mut stream, "404 Not Found", &[], b""),
    }
}

/// Reads one request: headers, then as many body bytes as Content-Length
/// announces. Bodies may arrive in a separate segment from the headers.
fn read_request(stream: &mut std::net::TcpStream) -> Option<Vec<u8>> {
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(_) => return None,
        };
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&data[..pos]);
            let length = headers
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.trim()
                        .eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())?
                })
                .unwrap_or(0);
            if data.len() >= pos + 4 + length {
                break;
            }
        }
    }
    (!data.is_empty()).then_some(data)
}

fn respond(stream: &mut std::net::TcpStream, status: &str, headers: &[(&str, &str)], body: &[u8]) {
    let mut response = format!("HTTP/1.1 {}\r\n", status);
    for (name, value) in headers {
        response.push_str(&format!("{}: {}\r\n", name, value));
    }
    response.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    ));
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body);
}

/// Returns (method, request target, request body).
fn parse_request(request: &str) -> (String, String, String) {
    let mut lines = request.lines();
    let request_line = lines.next().unwrap_or("");
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let target = parts.next().unwrap_or("").to_string();
    let body = request
        .split_once("\r\n\r\n")
        .map(|(_, b)| b.to_string())
        .unwrap_or_default();
    (method, target, body)
}
