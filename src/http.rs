//! HTTP access-log integration.
//!
//! `enable_request_rotation` wires a rotating access-log sink to a
//! dedicated secondary logger and hands back a [`RequestLogger`] bound to
//! it. The request logger is framework-agnostic: give it the request
//! parts and response outcome and it writes one Combined-Log-Format line,
//! extended with the values of any allowlisted request headers.

use crate::logger::Logger;
use chrono::Local;
use http::request::Parts;
use http::StatusCode;
use std::net::SocketAddr;
use std::sync::Arc;

/// Write-only adapter forwarding formatted lines into a logger at info
/// level. Trailing newlines are stripped; the sink adds its own.
#[derive(Clone)]
pub struct AccessLogStream {
    logger: Arc<Logger>,
}

impl AccessLogStream {
    pub(crate) fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }

    /// Forward one line to the backing logger.
    pub fn write_line(&self, line: &str) {
        self.logger.info(line.trim_end_matches(['\r', '\n']));
    }
}

/// Formats request/response pairs into access-log lines and writes them
/// to the bound stream.
#[derive(Clone)]
pub struct RequestLogger {
    stream: AccessLogStream,
    xheaders: Vec<String>,
}

impl RequestLogger {
    pub(crate) fn new(stream: AccessLogStream, xheaders: Vec<String>) -> Self {
        Self { stream, xheaders }
    }

    /// The underlying stream, for callers that want to write their own
    /// pre-formatted lines.
    pub fn stream(&self) -> &AccessLogStream {
        &self.stream
    }

    /// Log one completed request.
    pub fn record(
        &self,
        request: &Parts,
        status: StatusCode,
        content_length: Option<u64>,
        remote_addr: Option<SocketAddr>,
    ) {
        self.stream
            .write_line(&self.line(request, status, content_length, remote_addr));
    }

    /// Build the Combined-Log-Format line:
    /// `remote - - [date] "METHOD uri VERSION" status bytes "referrer"
    /// "user-agent"`, followed by a `- (name) value` token per allowlisted
    /// header present on the request.
    pub fn line(
        &self,
        request: &Parts,
        status: StatusCode,
        content_length: Option<u64>,
        remote_addr: Option<SocketAddr>,
    ) -> String {
        let remote = remote_addr.map_or_else(|| "-".to_string(), |addr| addr.ip().to_string());
        let date = Local::now().format("%d/%b/%Y:%H:%M:%S %z");
        let bytes = content_length.map_or_else(|| "-".to_string(), |len| len.to_string());
        let referrer = header_or_dash(request, "referer");
        let user_agent = header_or_dash(request, "user-agent");

        let mut line = format!(
            "{remote} - - [{date}] \"{} {} {:?}\" {} {bytes} \"{referrer}\" \"{user_agent}\"",
            request.method,
            request.uri,
            request.version,
            status.as_u16(),
        );

        for name in &self.xheaders {
            if let Some(value) = request.headers.get(name.as_str()) {
                line.push_str(&format!(
                    " - ({name}) {}",
                    value.to_str().unwrap_or("<binary>")
                ));
            }
        }

        line
    }
}

fn header_or_dash(request: &Parts, name: &str) -> String {
    request
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
        .to_string()
}
