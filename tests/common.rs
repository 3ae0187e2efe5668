#![allow(dead_code)]

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tiny_squeeze::tinify::{Compressor, Preserve};
use tiny_squeeze::{CompressionError, Result, Settings};

/// Stands in for the Tinify service: prefixes the source bytes and counts calls.
#[derive(Default)]
pub struct FakeCompressor {
    pub calls: Cell<usize>,
    pub metadata_calls: Cell<usize>,
    /// 1-based call number that fails.
    pub fail_at: Option<usize>,
    pub failure: Option<fn(String) -> CompressionError>,
    pub reject_key: bool,
}

impl FakeCompressor {
    pub fn failing_at(call: usize, failure: fn(String) -> CompressionError) -> Self {
        Self {
            fail_at: Some(call),
            failure: Some(failure),
            ..Default::default()
        }
    }

    pub fn rejecting_key() -> Self {
        Self {
            reject_key: true,
            ..Default::default()
        }
    }
}

impl Compressor for FakeCompressor {
    fn validate(&self) -> Result<()> {
        if self.reject_key {
            return Err(CompressionError::Account("Credentials are invalid.".to_string()));
        }
        Ok(())
    }

    fn compress(&self, source: &[u8], preserve: &[Preserve]) -> Result<Vec<u8>> {
        let call = self.calls.get() + 1;
        self.calls.set(call);
        if !preserve.is_empty() {
            self.metadata_calls.set(self.metadata_calls.get() + 1);
        }
        if self.fail_at == Some(call) {
            let failure = self.failure.unwrap_or(CompressionError::Unknown);
            return Err(failure(format!("fake failure on call {}", call)));
        }
        Ok([b"tiny:".as_slice(), source].concat())
    }

    fn compression_count(&self) -> Option<u64> {
        Some(self.calls.get() as u64)
    }
}

pub struct Workspace {
    pub temp_dir: TempDir,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("raw_images");
        let output = temp_dir.path().join("compressed_images");
        Self {
            temp_dir,
            input,
            output,
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            api_key: "test-key".to_string(),
            input_path: self.input.clone(),
            output_path: self.output.clone(),
            ..Default::default()
        }
    }

    pub fn add_file(&self, relative: &str, content: &[u8]) -> PathBuf {
        let path = self.input.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    /// Root image, a subdirectory image, a nested image and some noise.
    pub fn add_sample_tree(&self) {
        self.add_file("a.jpg", b"root jpg");
        self.add_file("vacation/photo.jpg", b"vacation jpg");
        self.add_file("vacation/beach/b.png", b"beach png");
        self.add_file("vacation/notes.txt", b"not an image");
        self.add_file(".hidden.jpg", b"hidden");
    }
}

pub fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// A request as received by [`MockService`]. Header names are lowercased.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Local HTTP server standing in for the Tinify API.
pub struct MockService {
    listener: std::net::TcpListener,
    pub url: String,
}

impl MockService {
    pub fn bind() -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        Self { listener, url }
    }

    /// Answers one connection per canned response, in order, and hands back
    /// what was received once every response has been sent.
    pub fn serve(self, responses: Vec<Vec<u8>>) -> thread::JoinHandle<Vec<RecordedRequest>> {
        let listener = self.listener;
        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = TcpListener::from_std(listener).unwrap();
                let mut received = Vec::new();
                for response in responses {
                    let (mut stream, _) = listener.accept().await.unwrap();
                    received.push(read_request(&mut stream).await);
                    stream.write_all(&response).await.unwrap();
                    let _ = stream.shutdown().await;
                }
                received
            })
        })
    }
}

/// Builds a raw HTTP/1.1 response that closes its connection.
pub fn http_response(status: &str, headers: &[(&str, &str)], body: &[u8]) -> Vec<u8> {
    let mut head = format!("HTTP/1.1 {}\r\n", status);
    for (name, value) in headers {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    ));
    [head.into_bytes(), body.to_vec()].concat()
}

async fn read_request(stream: &mut TcpStream) -> RecordedRequest {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let read = stream.read(&mut chunk).await.unwrap();
        assert!(read > 0, "connection closed before the request head");
        buffer.extend_from_slice(&chunk[..read]);
    };

    let head = String::from_utf8_lossy(&buffer[..head_end]).into_owned();
    let mut lines = head.lines();
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    let length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    while buffer.len() < head_end + length {
        let read = stream.read(&mut chunk).await.unwrap();
        assert!(read > 0, "connection closed before the request body");
        buffer.extend_from_slice(&chunk[..read]);
    }

    RecordedRequest {
        method,
        path,
        headers,
        body: buffer[head_end..head_end + length].to_vec(),
    }
}
