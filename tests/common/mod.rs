//! Common test utilities: in-memory metadata sources, field builders and a
//! loopback HTTP server standing in for the metadata service.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use npn_metadata::fetch::decode_fields;
use npn_metadata::{MetadataField, MetadataSource, Result, Settings, Workbook};

// ============================================================================
// Field Builders
// ============================================================================

pub fn field(seq: i64, name: &str, description: &str, controlled: &str) -> MetadataField {
    MetadataField {
        sequence_number: seq,
        field_name: name.to_string(),
        field_description: description.to_string(),
        controlled_values: controlled.to_string(),
    }
}

/// `n` numbered fields named after `prefix`.
pub fn fields(prefix: &str, n: i64) -> Vec<MetadataField> {
    (1..=n)
        .map(|i| {
            field(
                i,
                &format!("{prefix}_{i}"),
                &format!("Description of {prefix} field {i}"),
                if i % 2 == 0 { "Y, N" } else { "" },
            )
        })
        .collect()
}

// ============================================================================
// In-Memory Source
// ============================================================================

/// Serves canned field lists and records every type key asked for.
///
/// Unknown type keys answer with no fields.
#[derive(Default)]
pub struct StaticSource {
    responses: HashMap<String, Vec<MetadataField>>,
    failing: Vec<String>,
    requests: RefCell<Vec<String>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, type_key: &str, fields: Vec<MetadataField>) -> Self {
        self.responses.insert(type_key.to_string(), fields);
        self
    }

    /// Make `type_key` fail with a decode error.
    pub fn failing(mut self, type_key: &str) -> Self {
        self.failing.push(type_key.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self, type_key: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|k| k.as_str() == type_key)
            .count()
    }
}

impl MetadataSource for StaticSource {
    fn fetch_fields(&self, type_key: &str) -> Result<Vec<MetadataField>> {
        self.requests.borrow_mut().push(type_key.to_string());
        if self.failing.iter().any(|k| k == type_key) {
            return decode_fields(type_key, "<html>Service Unavailable</html>");
        }
        Ok(self.responses.get(type_key).cloned().unwrap_or_default())
    }
}

// ============================================================================
// Settings and Read-Back
// ============================================================================

/// Settings writing into `dir` and pointing at `domain`.
pub fn settings_for(dir: &Path, domain: &str, release: &str) -> Settings {
    let text = format!(
        "author = \"Test Author\"\n\
         domain = \"{domain}\"\n\
         output_path = {:?}\n\
         timeout_secs = 5\n\
         release = \"{release}\"\n",
        dir.display().to_string()
    );
    Settings::from_toml_str(&text).unwrap()
}

/// Read a written workbook back with the crate's own parser.
pub fn read_back(path: &Path) -> Workbook {
    let bytes = std::fs::read(path).unwrap();
    npn_metadata::parser::parse(&bytes).unwrap()
}

/// Cell text of `row` as display strings.
pub fn row_text(workbook: &Workbook, sheet: usize, row: u32) -> Vec<String> {
    workbook.sheets[sheet]
        .row_values(row)
        .into_iter()
        .map(|v| v.display())
        .collect()
}

// ============================================================================
// Loopback HTTP Service
// ============================================================================

#[derive(Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub body: String,
}

impl CannedResponse {
    pub fn json(body: &str) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

/// Minimal HTTP/1.1 server on 127.0.0.1 answering by the `type=` query value.
///
/// Unknown types get `[]`. Serves `max_requests` connections, then exits.
pub struct MockService {
    pub domain: String,
    seen: Arc<Mutex<Vec<String>>>,
    handle: Option<JoinHandle<()>>,
}

impl MockService {
    pub fn start(responses: HashMap<String, CannedResponse>, max_requests: usize) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let domain = listener.local_addr().unwrap().to_string();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_server = Arc::clone(&seen);

        let handle = std::thread::spawn(move || {
            for stream in listener.incoming().take(max_requests) {
                let Ok(mut stream) = stream else { continue };
                let mut reader = BufReader::new(stream.try_clone().unwrap());

                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                loop {
                    let mut header = String::new();
                    if reader.read_line(&mut header).unwrap() == 0 || header == "\r\n" {
                        break;
                    }
                }

                let target = request_line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or_default()
                    .to_string();
                let type_key = target
                    .split_once("type=")
                    .map(|(_, rest)| rest.split('&').next().unwrap_or_default().to_string())
                    .unwrap_or_default();
                seen_by_server.lock().unwrap().push(target);

                let response = responses
                    .get(&type_key)
                    .cloned()
                    .unwrap_or_else(|| CannedResponse::json("[]"));
                let reply = format!(
                    "HTTP/1.1 {} Canned\r\n\
                     Content-Type: application/json\r\n\
                     Content-Length: {}\r\n\
                     Connection: close\r\n\r\n{}",
                    response.status,
                    response.body.len(),
                    response.body
                );
                stream.write_all(reply.as_bytes()).unwrap();
                stream.flush().unwrap();
            }
        });

        Self {
            domain,
            seen,
            handle: Some(handle),
        }
    }

    /// Request targets received so far, e.g. `/npn_portal/...?type=raw`.
    pub fn requests(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    /// Wait for the server thread after every expected request was served.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap();
        }
    }
}
