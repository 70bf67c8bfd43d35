//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves static routes from a background thread, one request per
//! connection, and counts the requests it receives.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub body: Vec<u8>,
    /// Advertise a Content-Length of `body.len() + n` and close early,
    /// simulating a connection dropped mid-stream.
    pub short_by: Option<usize>,
    /// Omit the Content-Length header (body delimited by connection close).
    pub no_length: bool,
    /// Send only the first `n` body bytes, then hold the connection open
    /// without sending anything for ten seconds.
    pub stall_after: Option<usize>,
}

impl Route {
    pub fn ok(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            body,
            short_by: None,
            no_length: false,
            stall_after: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: format!("status {}", status).into_bytes(),
            short_by: None,
            no_length: false,
            stall_after: None,
        }
    }
}

pub struct TestServer {
    base: String,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    /// Base URL without trailing slash, e.g. "http://127.0.0.1:12345".
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Number of requests served so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Starts a server for `routes` (path → response). Unknown paths get 404.
/// The server runs until the process exits.
pub fn start(routes: Vec<(&str, Route)>) -> TestServer {
    let routes: Arc<HashMap<String, Route>> = Arc::new(
        routes
            .into_iter()
            .map(|(p, r)| (p.to_string(), r))
            .collect(),
    );
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_srv = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&hits_srv);
            thread::spawn(move || handle(stream, &routes, &hits));
        }
    });
    TestServer {
        base: format!("http://127.0.0.1:{}", port),
        hits,
    }
}

fn handle(mut stream: std::net::TcpStream, routes: &HashMap<String, Route>, hits: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let path = request
        .lines()
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("/");
    // Routes are matched without the query string.
    let path = path.split('?').next().unwrap_or(path);
    hits.fetch_add(1, Ordering::SeqCst);

    let fallback = Route::status(404);
    let route = routes.get(path).unwrap_or(&fallback);
    let reason = match route.status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    };
    let length = if route.no_length {
        String::new()
    } else {
        format!(
            "Content-Length: {}\r\n",
            route.body.len() + route.short_by.unwrap_or(0)
        )
    };
    let head = format!(
        "HTTP/1.1 {} {}\r\n{}Connection: close\r\n\r\n",
        route.status, reason, length
    );
    let _ = stream.write_all(head.as_bytes());
    if let Some(n) = route.stall_after {
        let _ = stream.write_all(&route.body[..n.min(route.body.len())]);
        let _ = stream.flush();
        thread::sleep(std::time::Duration::from_secs(10));
        return;
    }
    let _ = stream.write_all(&route.body);
    let _ = stream.flush();
}
