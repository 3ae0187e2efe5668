use crate::constants::{
    COMPRESSION_COUNT_HEADER, TINIFY_API_ENDPOINT, TINIFY_AUTH_USER, TINIFY_SHRINK_PATH,
};
use crate::error::{CompressionError, Result};
use reqwest::header::LOCATION;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::cell::Cell;
use tokio::runtime::Runtime;

/// Metadata fields the service can carry over into the compressed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preserve {
    Copyright,
    Creation,
}

impl Preserve {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preserve::Copyright => "copyright",
            Preserve::Creation => "creation",
        }
    }
}

/// Fields kept when a run asks for metadata preservation.
pub const METADATA_FIELDS: &[Preserve] = &[Preserve::Copyright, Preserve::Creation];

/// The remote compression service, as seen by the batch.
pub trait Compressor {
    /// Checks the credentials without spending a compression.
    fn validate(&self) -> Result<()>;

    /// Compresses `source` and returns the optimized bytes.
    fn compress(&self, source: &[u8], preserve: &[Preserve]) -> Result<Vec<u8>>;

    /// Compressions used this month, once the service has reported it.
    fn compression_count(&self) -> Option<u64> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct TinifyOptions {
    pub api_key: String,
    pub endpoint: String,
}

impl TinifyOptions {
    pub fn new(api_key: impl Into<String>, endpoint: Option<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: endpoint.unwrap_or_else(|| TINIFY_API_ENDPOINT.to_string()),
        }
    }

    fn shrink_url(&self) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), TINIFY_SHRINK_PATH)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Blocking client for the Tinify HTTP API.
///
/// Requests run on a private current-thread runtime, one at a time.
pub struct TinifyClient {
    options: TinifyOptions,
    http: Client,
    runtime: Runtime,
    compression_count: Cell<Option<u64>>,
}

impl TinifyClient {
    pub fn new(options: TinifyOptions) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("tiny-squeeze/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CompressionError::Unknown(format!("Failed to build HTTP client: {}", e)))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            options,
            http,
            runtime,
            compression_count: Cell::new(None),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(TINIFY_AUTH_USER, Some(&self.options.api_key))
    }

    /// Sends an authorized request and records the reported compression count.
    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(transport_error)?;

        if let Some(count) = response
            .headers()
            .get(COMPRESSION_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            self.compression_count.set(Some(count));
        }

        Ok(response)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.execute(request).await?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(into_error(response).await)
    }

    /// Uploads the source and returns the location of the compressed result.
    async fn shrink(&self, source: Vec<u8>) -> Result<String> {
        let response = self
            .send(self.http.post(self.options.shrink_url()).body(source))
            .await?;

        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                CompressionError::Unknown("compression response had no Location header".to_string())
            })
    }

    async fn fetch_result(&self, location: &str, preserve: &[Preserve]) -> Result<Vec<u8>> {
        let request = if preserve.is_empty() {
            self.http.get(location)
        } else {
            self.http.post(location).json(&preserve_payload(preserve))
        };

        let response = self.send(request).await?;
        let bytes = response.bytes().await.map_err(transport_error)?;
        Ok(bytes.to_vec())
    }

    async fn compress_async(&self, source: &[u8], preserve: &[Preserve]) -> Result<Vec<u8>> {
        let location = self.shrink(source.to_vec()).await?;
        crate::verbose!("Compressed result available at {}", location);
        self.fetch_result(&location, preserve).await
    }

    async fn validate_async(&self) -> Result<()> {
        let response = self.execute(self.http.post(self.options.shrink_url())).await?;
        let status = response.status();
        match status {
            // The monthly limit is reached, but the key itself is valid.
            _ if status == StatusCode::TOO_MANY_REQUESTS => Ok(()),
            _ if status.is_success() => Ok(()),
            _ => match into_error(response).await {
                // An empty upload is refused as bad input once the key is accepted.
                CompressionError::Client(_) => Ok(()),
                e => Err(e),
            },
        }
    }
}

impl Compressor for TinifyClient {
    fn validate(&self) -> Result<()> {
        self.runtime.block_on(self.validate_async())
    }

    fn compress(&self, source: &[u8], preserve: &[Preserve]) -> Result<Vec<u8>> {
        self.runtime.block_on(self.compress_async(source, preserve))
    }

    fn compression_count(&self) -> Option<u64> {
        self.compression_count.get()
    }
}

/// Maps an unsuccessful HTTP status onto the error taxonomy.
pub fn classify_status(status: u16, detail: &str) -> CompressionError {
    let detail = detail.to_string();
    match status {
        401 | 429 => CompressionError::Account(detail),
        400..=499 => CompressionError::Client(detail),
        500..=599 => CompressionError::Server(detail),
        _ => CompressionError::Unknown(detail),
    }
}

async fn into_error(response: Response) -> CompressionError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    classify_status(status, &error_detail(status, &body))
}

fn error_detail(status: u16, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody {
            error: Some(error),
            message: Some(message),
        }) => format!("{}: {} (HTTP {})", error, message, status),
        Ok(ApiErrorBody {
            error: Some(text), ..
        })
        | Ok(ApiErrorBody {
            message: Some(text),
            ..
        }) => format!("{} (HTTP {})", text, status),
        _ if body.trim().is_empty() => format!("HTTP {}", status),
        _ => format!("{} (HTTP {})", body.trim(), status),
    }
}

fn transport_error(e: reqwest::Error) -> CompressionError {
    if e.is_builder() {
        CompressionError::Unknown(e.to_string())
    } else {
        CompressionError::Connection(e.to_string())
    }
}

fn preserve_payload(preserve: &[Preserve]) -> serde_json::Value {
    let fields: Vec<&str> = preserve.iter().map(Preserve::as_str).collect();
    json!({ "preserve": fields })
}
