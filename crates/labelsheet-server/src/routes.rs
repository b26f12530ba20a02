// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Request routing and the `/generate` handler.

use std::sync::Arc;

use chrono::Local;
use labelsheet_core::error::{LabelsheetError, Result};
use labelsheet_core::human_errors::{Severity, humanize_error};
use labelsheet_core::{AppConfig, RequestId};
use labelsheet_document::{GeneratedSheet, generate_sheet};
use serde::Deserialize;
use tracing::{Instrument, error, info, info_span, warn};

use crate::http::{HttpRequest, HttpResponse};

pub const GENERATE_PATH: &str = "/generate";
pub const HEALTH_PATH: &str = "/health";

pub const DISCARDED_LINES_HEADER: &str = "X-Labelsheet-Discarded-Lines";
pub const SKIPPED_ENTRIES_HEADER: &str = "X-Labelsheet-Skipped-Entries";

/// JSON body of `POST /generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Raw pasted text, one code or label per line.
    #[serde(default)]
    pub codes: String,
    /// Preset key; clients send either `"3"` or `3`.
    #[serde(default)]
    pub preset: Option<serde_json::Value>,
}

impl GenerateRequest {
    pub fn preset_key(&self) -> Option<String> {
        match &self.preset {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Attachment filename for a sheet generated today, in local time.
pub fn attachment_filename() -> String {
    format!("barcodes_{}.pdf", Local::now().format("%Y-%m-%d"))
}

/// Dispatch one request and attach the CORS header to whatever comes back.
pub async fn handle(request: HttpRequest, config: Arc<AppConfig>) -> HttpResponse {
    let (method, path) = (request.method.clone(), request.path.clone());
    let response = match (method.as_str(), path.as_str()) {
        ("OPTIONS", _) => preflight(),
        ("GET", HEALTH_PATH) => {
            HttpResponse::json(200, &serde_json::json!({ "status": "ok" }))
        }
        ("POST", GENERATE_PATH) => generate(request, Arc::clone(&config)).await,
        (_, HEALTH_PATH) => method_not_allowed("GET, OPTIONS"),
        (_, GENERATE_PATH) => method_not_allowed("POST, OPTIONS"),
        (method, path) => {
            warn!(method, path, "no route");
            HttpResponse::error(404, "Not found")
        }
    };
    response.with_header("Access-Control-Allow-Origin", config.cors_allow_origin.as_str())
}

/// Response for a request that failed before routing, e.g. an oversized body.
pub fn error_response(err: &LabelsheetError, config: &AppConfig) -> HttpResponse {
    to_response(err).with_header("Access-Control-Allow-Origin", config.cors_allow_origin.as_str())
}

fn preflight() -> HttpResponse {
    HttpResponse::empty(204)
        .with_header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .with_header("Access-Control-Allow-Headers", "Content-Type")
        .with_header("Access-Control-Max-Age", "86400")
}

fn method_not_allowed(allow: &str) -> HttpResponse {
    HttpResponse::error(405, "Method not allowed").with_header("Allow", allow)
}

async fn generate(request: HttpRequest, config: Arc<AppConfig>) -> HttpResponse {
    let request_id = RequestId::new();
    let span = info_span!("generate", %request_id);

    async move {
        match run_generate(request, config).await {
            Ok(sheet) => {
                info!(
                    bytes = sheet.pdf.len(),
                    pages = sheet.pages,
                    preset = %sheet.preset.key,
                    rendered = sheet.summary.rendered,
                    skipped = sheet.summary.skipped.len(),
                    "sheet generated"
                );
                HttpResponse::empty(200)
                    .with_header(
                        "Content-Disposition",
                        format!("attachment; filename=\"{}\"", attachment_filename()),
                    )
                    .with_header(DISCARDED_LINES_HEADER, sheet.discarded_lines.len().to_string())
                    .with_header(SKIPPED_ENTRIES_HEADER, sheet.summary.skipped.len().to_string())
                    .with_header(
                        "Access-Control-Expose-Headers",
                        format!(
                            "Content-Disposition, {DISCARDED_LINES_HEADER}, {SKIPPED_ENTRIES_HEADER}"
                        ),
                    )
                    .with_body("application/pdf", sheet.pdf)
            }
            Err(err) => to_response(&err),
        }
    }
    .instrument(span)
    .await
}

async fn run_generate(request: HttpRequest, config: Arc<AppConfig>) -> Result<GeneratedSheet> {
    let body: GenerateRequest = serde_json::from_slice(&request.body)
        .map_err(|e| LabelsheetError::InvalidRequest(format!("malformed JSON body: {e}")))?;
    let preset_key = body.preset_key();

    // Layout and PDF serialisation are CPU-bound.
    tokio::task::spawn_blocking(move || {
        generate_sheet(&config.sheet, &body.codes, preset_key.as_deref())
    })
    .await
    .map_err(|e| LabelsheetError::Server(format!("generation task failed: {e}")))?
}

fn to_response(err: &LabelsheetError) -> HttpResponse {
    let human = humanize_error(err);
    match human.severity {
        Severity::ClientInput => warn!(status = human.status, error = %err, "request rejected"),
        Severity::Internal => error!(status = human.status, error = %err, "request failed"),
    }
    HttpResponse::error(human.status, &human.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    async fn request(raw: &[u8]) -> HttpRequest {
        let (mut client, mut server) = tokio::io::duplex(64 * 1024);
        client.write_all(raw).await.expect("write");
        drop(client);
        crate::http::read_request(&mut server, 1024 * 1024)
            .await
            .expect("read")
            .expect("request")
    }

    fn post_generate(body: &str) -> Vec<u8> {
        format!(
            "POST /generate HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        )
        .into_bytes()
    }

    fn config() -> Arc<AppConfig> {
        Arc::new(AppConfig::default())
    }

    fn json_body(resp: &HttpResponse) -> serde_json::Value {
        serde_json::from_slice(&resp.body).expect("json body")
    }

    #[tokio::test]
    async fn generate_returns_pdf_attachment() {
        let req = request(&post_generate(
            r#"{"codes":"Widget A\n12345678\n4006381333931","preset":"3"}"#,
        ))
        .await;
        let resp = handle(req, config()).await;

        assert_eq!(resp.status, 200);
        assert_eq!(resp.header("Content-Type"), Some("application/pdf"));
        assert!(resp.body.starts_with(b"%PDF"));
        let disposition = resp.header("Content-Disposition").expect("disposition");
        assert!(disposition.starts_with("attachment; filename=\"barcodes_"));
        assert!(disposition.ends_with(".pdf\""));
        assert_eq!(resp.header(DISCARDED_LINES_HEADER), Some("0"));
        assert_eq!(resp.header("Access-Control-Allow-Origin"), Some("*"));
    }

    #[tokio::test]
    async fn no_codes_is_a_400_with_message() {
        let req = request(&post_generate(r#"{"codes":"just words\nmore words"}"#)).await;
        let resp = handle(req, config()).await;
        assert_eq!(resp.status, 400);
        assert_eq!(json_body(&resp)["error"], "No valid codes");
    }

    #[tokio::test]
    async fn malformed_json_is_a_400() {
        let resp = handle(request(&post_generate("{not json")).await, config()).await;
        assert_eq!(resp.status, 400);
        assert!(
            json_body(&resp)["error"]
                .as_str()
                .expect("message")
                .starts_with("Invalid request")
        );
    }

    #[tokio::test]
    async fn numeric_preset_is_accepted() {
        let req = request(&post_generate(r#"{"codes":"12345678","preset":4}"#)).await;
        let resp = handle(req, config()).await;
        assert_eq!(resp.status, 200);
    }

    #[tokio::test]
    async fn health_and_preflight() {
        let resp = handle(request(b"GET /health HTTP/1.1\r\n\r\n").await, config()).await;
        assert_eq!(resp.status, 200);
        assert_eq!(json_body(&resp)["status"], "ok");

        let resp = handle(request(b"OPTIONS /generate HTTP/1.1\r\n\r\n").await, config()).await;
        assert_eq!(resp.status, 204);
        assert!(resp.body.is_empty());
        assert!(resp.header("Access-Control-Allow-Methods").is_some());
    }

    #[tokio::test]
    async fn unknown_path_and_wrong_method() {
        let resp = handle(request(b"GET /nope HTTP/1.1\r\n\r\n").await, config()).await;
        assert_eq!(resp.status, 404);

        let resp = handle(request(b"GET /generate HTTP/1.1\r\n\r\n").await, config()).await;
        assert_eq!(resp.status, 405);
        assert_eq!(resp.header("Allow"), Some("POST, OPTIONS"));
    }

    #[test]
    fn filename_embeds_the_date() {
        let name = attachment_filename();
        assert!(name.starts_with("barcodes_"));
        assert!(name.ends_with(".pdf"));
        // barcodes_YYYY-MM-DD.pdf
        assert_eq!(name.len(), "barcodes_".len() + 10 + ".pdf".len());
    }

    #[test]
    fn oversized_body_maps_to_413() {
        let resp = error_response(&LabelsheetError::PayloadTooLarge { limit: 10 }, &AppConfig::default());
        assert_eq!(resp.status, 413);
        assert_eq!(resp.header("Access-Control-Allow-Origin"), Some("*"));
    }
}
