//! HTTP spreadsheet sink.
//!
//! Rows are POSTed as JSON to a configured endpoint with a bearer token.
//! The endpoint is expected to append `values` to the sheet named by
//! `sheet_id`, writing `header` first if the sheet is empty.

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::{SheetConfig, TOKEN_ENV};
use crate::error::{SyncError, SyncResult};
use crate::sink::{RoundSink, SyncRow};

#[derive(Serialize)]
struct AppendRequest<'a> {
    sheet_id: &'a str,
    game: u32,
    round: u32,
    header: &'a [String],
    values: &'a [String],
}

/// Appends rows to a remote sheet over HTTP.
#[derive(Debug)]
pub struct SheetSink {
    client: Client,
    config: SheetConfig,
    token: Option<String>,
}

impl SheetSink {
    /// Build a sink with an explicit token. `None` makes every append fail
    /// with [`SyncError::Unauthorized`].
    pub fn new(config: SheetConfig, token: Option<String>) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| SyncError::Network(e.to_string()))?;
        Ok(Self {
            client,
            config,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Build a sink reading its token from `BOB_SHEET_TOKEN`.
    pub fn from_env(config: SheetConfig) -> SyncResult<Self> {
        Self::new(config, std::env::var(TOKEN_ENV).ok())
    }

    /// Whether a token is present.
    pub fn has_credentials(&self) -> bool {
        self.token.is_some()
    }
}

impl RoundSink for SheetSink {
    fn name(&self) -> &str {
        &self.config.sheet_id
    }

    fn append(&mut self, row: &SyncRow) -> SyncResult<()> {
        let Some(token) = self.token.as_deref() else {
            return Err(SyncError::Unauthorized(format!("{TOKEN_ENV} is not set")));
        };

        let body = AppendRequest {
            sheet_id: &self.config.sheet_id,
            game: row.game,
            round: row.round,
            header: &row.header,
            values: &row.values,
        };
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(token)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    SyncError::Timeout
                } else {
                    SyncError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        debug!(game = row.game, round = row.round, %status, "sheet append answered");
        match status {
            s if s.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(SyncError::Unauthorized(format!("HTTP {}", status.as_u16())))
            }
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => Err(SyncError::Timeout),
            _ => Err(SyncError::Rejected {
                status: status.as_u16(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Answer one request on a local port with `status`. The request head
    /// is sent back through the returned channel.
    fn answer_once(status: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/append", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            let head = loop {
                let n = stream.read(&mut chunk).unwrap();
                request.extend_from_slice(&chunk[..n]);
                let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
                    assert!(n > 0, "connection closed before the request head");
                    continue;
                };
                let head = String::from_utf8_lossy(&request[..end]).to_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= end + 4 + body_len || n == 0 {
                    break head;
                }
            };
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            )
            .unwrap();
            let _ = tx.send(head);
        });
        (url, rx)
    }

    fn sink_for(url: &str) -> SheetSink {
        let cfg = SheetConfig::new(url, "night").with_timeout_secs(5);
        SheetSink::new(cfg, Some("secret".to_string())).unwrap()
    }

    fn row() -> SyncRow {
        SyncRow {
            game: 1,
            round: 1,
            header: vec!["Emotion".to_string()],
            values: vec!["Joy".to_string()],
        }
    }

    #[test]
    fn missing_token_is_unauthorized() {
        let cfg = SheetConfig::new("http://127.0.0.1:9/rows", "night");
        let mut sink = SheetSink::new(cfg, None).unwrap();
        assert!(!sink.has_credentials());
        assert!(matches!(
            sink.append(&row()),
            Err(SyncError::Unauthorized(_))
        ));
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let cfg = SheetConfig::new("http://127.0.0.1:9/rows", "night");
        let sink = SheetSink::new(cfg, Some("  ".to_string())).unwrap();
        assert!(!sink.has_credentials());
    }

    #[test]
    fn unreachable_endpoint_fails_fast() {
        let cfg = SheetConfig::new("http://127.0.0.1:1/rows", "night").with_timeout_secs(2);
        let mut sink = SheetSink::new(cfg, Some("secret".to_string())).unwrap();
        let err = sink.append(&row()).unwrap_err();
        assert!(matches!(err, SyncError::Network(_) | SyncError::Timeout));
    }

    #[test]
    fn sink_is_named_after_sheet() {
        let cfg = SheetConfig::new("http://127.0.0.1:9/rows", "night");
        let sink = SheetSink::new(cfg, None).unwrap();
        assert_eq!(sink.name(), "night");
    }

    #[test]
    fn accepted_row_sends_bearer_token() {
        let (url, head) = answer_once("200 OK");
        sink_for(&url).append(&row()).unwrap();
        let head = head.recv().unwrap();
        assert!(head.starts_with("post /append"));
        assert!(head.contains("authorization: bearer secret"));
    }

    #[test]
    fn refused_credentials_are_unauthorized() {
        for status in ["401 Unauthorized", "403 Forbidden"] {
            let (url, _head) = answer_once(status);
            let err = sink_for(&url).append(&row()).unwrap_err();
            assert!(matches!(err, SyncError::Unauthorized(_)), "{status}: {err}");
        }
    }

    #[test]
    fn gateway_timeout_is_a_timeout() {
        let (url, _head) = answer_once("504 Gateway Timeout");
        assert_eq!(sink_for(&url).append(&row()), Err(SyncError::Timeout));
    }

    #[test]
    fn other_errors_are_rejections() {
        let (url, _head) = answer_once("500 Internal Server Error");
        assert_eq!(
            sink_for(&url).append(&row()),
            Err(SyncError::Rejected { status: 500 })
        );
    }
}
