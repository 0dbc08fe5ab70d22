//! HTTP retrieval of metric payloads.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use crate::data::DataSource;
use crate::domain::MetricSelection;
use crate::error::{AppError, FetchError};

/// Environment variable consulted when no endpoint is given on the command line.
pub const ENDPOINT_ENV: &str = "PERF_REPORT_ENDPOINT";

pub struct HttpSource {
    client: Client,
    endpoint: String,
}

impl HttpSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Endpoint from `.env` / the process environment, if set.
    pub fn endpoint_from_env() -> Option<String> {
        dotenvy::dotenv().ok();
        std::env::var(ENDPOINT_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

impl DataSource for HttpSource {
    fn fetch(&self, selection: MetricSelection) -> Result<Value, FetchError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("metric", selection.metric.display_name()),
                ("device", selection.device.display_name()),
            ])
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // A body that is not JSON at all is a shape problem, not a transport one.
        resp.json::<Value>()
            .map_err(|e| FetchError::Shape(format!("response body is not JSON: {e}")))
    }

    fn describe(&self) -> String {
        format!("http {}", self.endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Device, Metric};
    use serde_json::json;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Answer exactly one request with the given status and body. The handle
    /// yields the request line that was received.
    fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/metrics", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                if header == "\r\n" || header.is_empty() {
                    break;
                }
            }
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            request_line.trim_end().to_string()
        });
        (endpoint, handle)
    }

    fn source(endpoint: String) -> HttpSource {
        HttpSource::new(endpoint, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn sends_selection_as_query_and_parses_json() {
        let (endpoint, server) = serve_once("200 OK", r#"{"2001": 1.5}"#);
        let result = source(endpoint).fetch(MetricSelection::new(Metric::Cls, Device::Desktop));

        assert_eq!(server.join().unwrap(), "GET /metrics?metric=CLS&device=Desktop HTTP/1.1");
        assert_eq!(result.unwrap(), json!({"2001": 1.5}));
    }

    #[test]
    fn non_success_status_is_status_error() {
        let (endpoint, server) = serve_once("500 Internal Server Error", "{}");
        let result = source(endpoint).fetch(MetricSelection::new(Metric::Lcp, Device::Mobile));
        server.join().unwrap();

        assert!(matches!(result, Err(FetchError::Status(500))));
    }

    #[test]
    fn non_json_body_is_shape_error() {
        let (endpoint, server) = serve_once("200 OK", "<html>maintenance</html>");
        let result = source(endpoint).fetch(MetricSelection::new(Metric::Lcp, Device::Mobile));
        server.join().unwrap();

        assert!(matches!(result, Err(FetchError::Shape(_))));
    }

    #[test]
    fn refused_connection_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/metrics", listener.local_addr().unwrap());
        drop(listener);

        let result = source(endpoint).fetch(MetricSelection::new(Metric::Lcp, Device::Mobile));
        assert!(matches!(result, Err(FetchError::Transport(_))));
    }

    #[test]
    fn describe_names_endpoint() {
        let s = source("http://localhost:9/m".into());
        assert_eq!(s.describe(), "http http://localhost:9/m");
    }
}
