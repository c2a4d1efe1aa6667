//! Scripted stand-in for the classification service.
//!
//! Binds `127.0.0.1:0`, answers a fixed sequence of requests with canned
//! status/body pairs, and records what it was sent.
#![allow(dead_code)]

use std::io::Read;
use std::thread::{self, JoinHandle};

use tiny_http::{Header, Response, Server, StatusCode};

/// Base address nothing listens on; connections are refused.
pub const DEAD_BASE: &str = "http://127.0.0.1:1";

/// A request the mock server received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub body: String,
}

pub struct MockServer {
    pub base: String,
    handle: Option<JoinHandle<Vec<Recorded>>>,
}

impl MockServer {
    /// Serve one reply per expected request, in order.
    pub fn start(replies: Vec<(u16, &'static str)>) -> Self {
        let server = Server::http("127.0.0.1:0").expect("bind mock server");
        let addr = server
            .server_addr()
            .to_ip()
            .expect("mock server listens on an IP address");

        let handle = thread::spawn(move || {
            let mut seen = Vec::new();
            for (status, body) in replies {
                let Ok(mut request) = server.recv() else {
                    break;
                };
                let mut request_body = String::new();
                let _ = request.as_reader().read_to_string(&mut request_body);
                seen.push(Recorded {
                    method: request.method().to_string(),
                    path: request.url().to_string(),
                    body: request_body,
                });

                let response = Response::from_string(body)
                    .with_status_code(StatusCode(status))
                    .with_header(
                        Header::from_bytes("Content-Type", "application/json; charset=utf-8")
                            .expect("valid header"),
                    );
                let _ = request.respond(response);
            }
            seen
        });

        Self {
            base: format!("http://{addr}"),
            handle: Some(handle),
        }
    }

    /// Wait for every scripted reply to be served and return the requests.
    pub fn finish(mut self) -> Vec<Recorded> {
        self.handle
            .take()
            .expect("finish called once")
            .join()
            .expect("mock server thread panicked")
    }
}
