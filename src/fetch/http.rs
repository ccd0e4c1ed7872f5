use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::{ApiRequest, HttpResponse, Transport, TransportFailure};
use crate::error::{Error, Result};

/// `reqwest`-backed transport against the reporting worker's base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base: Url,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = parse_base_url(base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .timeout(timeout)
            .user_agent(concat!("perfdash/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { base, client })
    }

    /// Full URL for `request`: the path is appended to any path already on the base.
    pub fn endpoint(&self, request: &ApiRequest) -> Url {
        let mut url = self.base.clone();
        let path = format!("{}{}", url.path().trim_end_matches('/'), request.path);
        url.set_path(&path);
        url.set_query(None);
        if !request.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(request.query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        url
    }
}

/// Validate a worker base URL: absolute http(s) with a host.
pub fn parse_base_url(input: &str) -> Result<Url> {
    let url = Url::parse(input.trim())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(Error::UrlParse(format!(
            "worker URL must be an absolute http(s) URL: {input}"
        )));
    }
    Ok(url)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, request: &ApiRequest) -> std::result::Result<HttpResponse, TransportFailure> {
        let url = self.endpoint(request);
        let mut builder = self.client.get(url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportFailure(format!("{} request failed: {e}", request.path)))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportFailure(format!("{} body read failed: {e}", request.path)))?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on loopback; yields the raw request head.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&head).into_owned()
        });
        (format!("http://{addr}"), handle)
    }

    fn ga4_request(bearer: Option<&str>) -> ApiRequest {
        ApiRequest {
            path: "/ga4",
            query: vec![
                ("propertyId", "123".into()),
                ("startDate", "2025-03-01".into()),
                ("endDate", "2025-03-07".into()),
            ],
            bearer: bearer.map(str::to_string),
        }
    }

    #[test]
    fn test_endpoint_appends_path_and_query() {
        let t = HttpTransport::new("https://worker.example.dev/api/", Duration::from_secs(5)).unwrap();
        let url = t.endpoint(&ga4_request(None));
        assert_eq!(
            url.as_str(),
            "https://worker.example.dev/api/ga4?propertyId=123&startDate=2025-03-01&endDate=2025-03-07"
        );
    }

    #[test]
    fn test_endpoint_encodes_event_list() {
        let t = HttpTransport::new("https://worker.example.dev", Duration::from_secs(5)).unwrap();
        let req = ApiRequest {
            path: "/meta-ads",
            query: vec![("events", "purchase,offsite_conversion.fb_pixel_lead".into())],
            bearer: None,
        };
        assert_eq!(
            t.endpoint(&req).as_str(),
            "https://worker.example.dev/meta-ads?events=purchase%2Coffsite_conversion.fb_pixel_lead"
        );
    }

    #[test]
    fn test_parse_base_url_rejects_non_http() {
        assert!(parse_base_url("ftp://example.com").is_err());
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("mailto:someone@example.com").is_err());
        assert!(parse_base_url(" https://example.com ").is_ok());
    }

    #[tokio::test]
    async fn test_get_returns_status_and_body_with_bearer() {
        let (base, server) = serve_once("200 OK", r#"{"ok":true}"#).await;
        let t = HttpTransport::new(&base, Duration::from_secs(5)).unwrap();

        let resp = t.get(&ga4_request(Some("secret-token"))).await.unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, r#"{"ok":true}"#);

        let head = server.await.unwrap().to_lowercase();
        assert!(head.starts_with("get /ga4?propertyid=123&startdate=2025-03-01&enddate=2025-03-07 http/1.1"));
        assert!(head.contains("authorization: bearer secret-token"));
    }

    #[tokio::test]
    async fn test_get_passes_error_status_through() {
        let (base, server) = serve_once("403 Forbidden", "denied").await;
        let t = HttpTransport::new(&base, Duration::from_secs(5)).unwrap();

        let resp = t.get(&ga4_request(None)).await.unwrap();
        assert_eq!(resp.status, 403);
        assert_eq!(resp.body, "denied");
        assert!(!resp.is_success());

        let head = server.await.unwrap().to_lowercase();
        assert!(!head.contains("authorization:"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let t = HttpTransport::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
        let err = t.get(&ga4_request(None)).await.unwrap_err();
        assert!(err.0.starts_with("/ga4 request failed"));
    }
}
