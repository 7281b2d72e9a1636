//! Minimal HTTP/1.1 registry stand-in for integration tests.
//!
//! Answers the two GraphQL queries (artifact by name, artifact files) on
//! `POST /graphql` and serves member file bytes on `GET /files/<name>`.
//! One request per connection; every response closes the connection.

use serde_json::{json, Value};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub const ARTIFACT_ID: &str = "QXJ0aWZhY3Q6MTIzNA==";
pub const VERSION_INDEX: u32 = 3;

/// `Authorization` header value for user `api`, key `test-key`.
pub const TEST_KEY_AUTH: &str = "Basic YXBpOnRlc3Qta2V5";
pub const TEST_KEY: &str = "test-key";

#[derive(Debug, Clone)]
pub struct RegistryOptions {
    pub entity: String,
    pub project: String,
    pub collection: String,
    pub alias: String,
    /// Member files of the aliased version: (name, bytes).
    pub files: Vec<(String, Vec<u8>)>,
    /// Added to the real size when reporting `sizeBytes`.
    pub size_skew: u64,
    /// First N GraphQL requests answer 500.
    pub graphql_failures: usize,
    /// Required `Authorization` header value.
    pub authorization: String,
    /// Return every member file regardless of the `fileNames` filter.
    pub ignore_name_filter: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            entity: "daniele5".to_string(),
            project: "model-registry".to_string(),
            collection: "thumbnail-classifier".to_string(),
            alias: "production".to_string(),
            files: vec![("model.onnx".to_string(), model_bytes())],
            size_skew: 0,
            graphql_failures: 0,
            authorization: TEST_KEY_AUTH.to_string(),
            ignore_name_filter: false,
        }
    }
}

/// Deterministic stand-in for an ONNX file.
pub fn model_bytes() -> Vec<u8> {
    (0u8..=250).cycle().take(48 * 1024).collect()
}

pub struct RegistryServer {
    /// e.g. "http://127.0.0.1:40123"
    pub base_url: String,
    pub graphql_hits: Arc<AtomicUsize>,
}

pub fn start() -> RegistryServer {
    start_with_options(RegistryOptions::default())
}

pub fn start_with_options(opts: RegistryOptions) -> RegistryServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let base_url = format!("http://127.0.0.1:{}", port);
    let hits = Arc::new(AtomicUsize::new(0));
    let state = Arc::new((opts, base_url.clone()));
    let hits_srv = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&state);
            let hits = Arc::clone(&hits_srv);
            thread::spawn(move || handle(stream, &state.0, &state.1, &hits));
        }
    });
    RegistryServer {
        base_url,
        graphql_hits: hits,
    }
}

struct Request {
    method: String,
    path: String,
    authorization: Option<String>,
    body: Vec<u8>,
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = std::str::from_utf8(&buf[..header_end]).ok()?.to_string();
    let mut lines = head.lines();
    let mut first = lines.next()?.split_whitespace();
    let method = first.next()?.to_string();
    let path = first.next()?.to_string();
    let mut content_length = 0usize;
    let mut authorization = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            } else if name.eq_ignore_ascii_case("authorization") {
                authorization = Some(value.trim().to_string());
            }
        }
    }
    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    Some(Request {
        method,
        path,
        authorization,
        body,
    })
}

fn respond(stream: &mut TcpStream, status: &str, content_type: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

fn respond_json(stream: &mut TcpStream, value: &Value) {
    let body = serde_json::to_vec(value).unwrap();
    respond(stream, "200 OK", "application/json", &body);
}

fn handle(mut stream: TcpStream, opts: &RegistryOptions, base_url: &str, hits: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let req = match read_request(&mut stream) {
        Some(r) => r,
        None => return,
    };

    if req.authorization.as_deref() != Some(opts.authorization.as_str()) {
        respond(&mut stream, "401 Unauthorized", "text/plain", b"unauthorized");
        return;
    }

    if req.method == "POST" && req.path == "/graphql" {
        let n = hits.fetch_add(1, Ordering::SeqCst);
        if n < opts.graphql_failures {
            respond(&mut stream, "500 Internal Server Error", "text/plain", b"boom");
            return;
        }
        let payload: Value = match serde_json::from_slice(&req.body) {
            Ok(v) => v,
            Err(_) => {
                respond(&mut stream, "400 Bad Request", "text/plain", b"bad json");
                return;
            }
        };
        let reply = graphql(&payload, opts, base_url);
        respond_json(&mut stream, &reply);
        return;
    }

    if req.method == "GET" {
        if let Some(name) = req.path.strip_prefix("/files/") {
            if let Some((_, bytes)) = opts.files.iter().find(|(n, _)| n == name) {
                respond(&mut stream, "200 OK", "application/octet-stream", bytes);
                return;
            }
        }
    }
    respond(&mut stream, "404 Not Found", "text/plain", b"not found");
}

fn graphql(payload: &Value, opts: &RegistryOptions, base_url: &str) -> Value {
    let query = payload["query"].as_str().unwrap_or("");
    let vars = &payload["variables"];

    if query.contains("ArtifactByName") {
        let project_matches = vars["entityName"] == opts.entity.as_str()
            && vars["projectName"] == opts.project.as_str();
        if !project_matches {
            return json!({ "data": { "project": null } });
        }
        let wanted = format!("{}:{}", opts.collection, opts.alias);
        if vars["name"] != wanted.as_str() {
            return json!({ "data": { "project": { "artifact": null } } });
        }
        return json!({ "data": { "project": { "artifact": {
            "id": ARTIFACT_ID,
            "digest": "0f1e2d3c",
            "state": "COMMITTED",
            "size": opts.files.iter().map(|(_, b)| b.len()).sum::<usize>(),
            "versionIndex": VERSION_INDEX,
            "artifactType": { "name": "model" },
            "artifactSequence": { "name": opts.collection },
            "aliases": [ { "alias": opts.alias }, { "alias": "latest" } ]
        } } } });
    }

    if query.contains("ArtifactFiles") {
        if vars["id"] != ARTIFACT_ID {
            return json!({ "data": { "artifact": null } });
        }
        let wanted = vars["fileNames"][0].as_str().unwrap_or("");
        let edges: Vec<Value> = opts
            .files
            .iter()
            .filter(|(n, _)| opts.ignore_name_filter || n == wanted)
            .map(|(n, bytes)| {
                json!({ "node": {
                    "name": n,
                    "directUrl": format!("{}/files/{}", base_url, n),
                    "url": null,
                    "sizeBytes": bytes.len() as u64 + opts.size_skew,
                    "digest": "abc"
                } })
            })
            .collect();
        return json!({ "data": { "artifact": { "files": { "edges": edges } } } });
    }

    json!({ "errors": [ { "message": "unknown query" } ] })
}
