//! Raw TCP mock of the asset API for unit tests.
//!
//! Every request gets the currently configured status and body, and is
//! recorded before the response is written.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub struct MockServer {
    pub url: String,
    _handle: std::thread::JoinHandle<()>,
    response: Arc<Mutex<(u16, String)>>,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let response = Arc::new(Mutex::new((200, "{}".to_owned())));
        let requests: Arc<Mutex<Vec<CapturedRequest>>> = Arc::new(Mutex::new(Vec::new()));

        let response_clone = Arc::clone(&response);
        let requests_clone = Arc::clone(&requests);
        let handle = std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let response = Arc::clone(&response_clone);
                let reqs = Arc::clone(&requests_clone);

                std::thread::spawn(move || {
                    let mut reader = BufReader::new(stream.try_clone().unwrap());
                    let mut request_line = String::new();
                    if reader.read_line(&mut request_line).is_err() {
                        return;
                    }
                    let parts: Vec<&str> = request_line.trim().splitn(3, ' ').collect();
                    if parts.len() < 2 {
                        return;
                    }

                    let mut content_length: usize = 0;
                    let mut headers = HashMap::new();
                    loop {
                        let mut line = String::new();
                        if reader.read_line(&mut line).is_err() || line.trim().is_empty() {
                            break;
                        }
                        if let Some((k, v)) = line.trim().split_once(": ") {
                            let key = k.to_lowercase();
                            if key == "content-length" {
                                content_length = v.trim().parse().unwrap_or(0);
                            }
                            headers.insert(key, v.to_owned());
                        }
                    }

                    let mut body = vec![0u8; content_length];
                    if content_length > 0 {
                        let _ = reader.read_exact(&mut body);
                    }

                    reqs.lock().unwrap().push(CapturedRequest {
                        method: parts[0].to_owned(),
                        path: parts[1].to_owned(),
                        headers,
                        body,
                    });

                    let (status, payload) = response.lock().unwrap().clone();
                    let head = format!(
                        "HTTP/1.1 {status} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        payload.len()
                    );
                    let _ = stream.write_all(head.as_bytes());
                    let _ = stream.write_all(payload.as_bytes());
                    let _ = stream.flush();
                });
            }
        });

        MockServer {
            url,
            _handle: handle,
            response,
            requests,
        }
    }

    /// Set the status and body returned for every following request.
    pub fn respond(&self, status: u16, body: &str) {
        *self.response.lock().unwrap() = (status, body.to_owned());
    }

    pub fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}
