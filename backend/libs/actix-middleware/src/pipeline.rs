//! Explicit request-scan pipeline
//!
//! The interceptor chain is modeled as an ordered list of pure stage
//! functions over a snapshot of the inbound request, composed by a runner
//! that short-circuits on the first rejection. Ordering and
//! short-circuiting are plain data here, testable without a server.

use actix_web::http::StatusCode;
use serde_json::{json, Value};
use xss_guard::detector;

/// Request headers the header-scan stage inspects.
pub const SCANNED_HEADERS: &[&str] = &["User-Agent", "Referer", "X-Forwarded-For"];

/// Snapshot of the parts of an inbound request the scan stages consume.
#[derive(Debug, Default)]
pub struct ScanRequest {
    pub path: String,
    pub client_addr: Option<String>,
    /// Allow-listed header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Decoded query parameter name/value pairs.
    pub query: Vec<(String, String)>,
    /// Raw body text, present only for scannable content types.
    pub body: Option<String>,
}

/// Terminal outcome of a blocking stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub status: StatusCode,
    pub body: Value,
}

/// Result of running one stage (or the whole pipeline).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Continue,
    Reject(Rejection),
}

pub trait ScanStage: Send + Sync {
    fn name(&self) -> &'static str;
    fn run(&self, req: &ScanRequest) -> StageOutcome;
}

/// Ordered stage list; the first `Reject` wins and later stages never run.
pub struct ScanPipeline {
    stages: Vec<Box<dyn ScanStage>>,
}

impl ScanPipeline {
    pub fn new(stages: Vec<Box<dyn ScanStage>>) -> Self {
        Self { stages }
    }

    /// The fixed production order: header scan, query scan, body scan.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(HeaderScanStage),
            Box::new(QueryScanStage),
            Box::new(BodyScanStage),
        ])
    }

    pub fn run(&self, req: &ScanRequest) -> StageOutcome {
        for stage in &self.stages {
            if let StageOutcome::Reject(rejection) = stage.run(req) {
                tracing::debug!(stage = stage.name(), path = %req.path, "scan stage rejected request");
                return StageOutcome::Reject(rejection);
            }
        }
        StageOutcome::Continue
    }
}

/// Observe-only scan over the allow-listed request headers.
pub struct HeaderScanStage;

impl ScanStage for HeaderScanStage {
    fn name(&self) -> &'static str {
        "header_scan"
    }

    fn run(&self, req: &ScanRequest) -> StageOutcome {
        for (name, value) in &req.headers {
            if detector().is_match(value) {
                tracing::warn!(
                    header = %name,
                    ip = req.client_addr.as_deref().unwrap_or("unknown"),
                    path = %req.path,
                    "XSS signature detected in request header"
                );
            }
        }
        StageOutcome::Continue
    }
}

/// Observe-only scan over decoded query parameters.
pub struct QueryScanStage;

impl ScanStage for QueryScanStage {
    fn name(&self) -> &'static str {
        "query_scan"
    }

    fn run(&self, req: &ScanRequest) -> StageOutcome {
        for (name, value) in &req.query {
            if detector().is_match(value) {
                tracing::warn!(
                    parameter = %name,
                    ip = req.client_addr.as_deref().unwrap_or("unknown"),
                    path = %req.path,
                    "XSS signature detected in query parameter"
                );
            }
        }
        StageOutcome::Continue
    }
}

/// Blocking scan over the raw request body.
pub struct BodyScanStage;

impl ScanStage for BodyScanStage {
    fn name(&self) -> &'static str {
        "body_scan"
    }

    fn run(&self, req: &ScanRequest) -> StageOutcome {
        let Some(body) = req.body.as_deref() else {
            return StageOutcome::Continue;
        };
        if detector().is_match(body) {
            tracing::warn!(
                ip = req.client_addr.as_deref().unwrap_or("unknown"),
                path = %req.path,
                "XSS signature detected in request body"
            );
            return StageOutcome::Reject(Rejection {
                status: StatusCode::BAD_REQUEST,
                body: json!({
                    "error": "Request contains potentially dangerous content",
                    "message": "XSS content detected"
                }),
            });
        }
        StageOutcome::Continue
    }
}

/// Decode a raw query string into name/value pairs.
pub(crate) fn parse_query(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let name = parts.next().unwrap_or_default();
            let value = parts.next().unwrap_or_default();
            (decode_component(name), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    // Form encoding sends spaces as '+', which percent-decoding alone
    // leaves in place
    let unplussed = raw.replace('+', " ");
    urlencoding::decode(&unplussed)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(unplussed)
}
