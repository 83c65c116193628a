//! The seam between the client core and whatever performs HTTP I/O.
//!
//! `RequestExecutor` takes an `HttpRequest` and returns the fully read
//! `HttpResponse`. Cancellation is handled one level up by `Context::run`,
//! which drops the executor's future when the context finishes.
//!
//! `HttpExecutor` is the stock implementation on top of `reqwest`.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method};

use crate::config::ClientConfig;
use crate::error::{ConfigError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: RequestExecutor + ?Sized> RequestExecutor for std::sync::Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request).await
    }
}

/// `reqwest`-backed executor. Non-2xx statuses are returned as data so the
/// client can classify them.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    http: Client,
}

impl HttpExecutor {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.access_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                ConfigError::InvalidValue {
                    key: "access_token",
                    value: "<redacted>".to_string(),
                }
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http })
    }

    pub fn from_client(http: Client) -> Self {
        Self { http }
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Patch => Method::PATCH,
    }
}

fn body_text(bytes: Vec<u8>) -> Result<String, TransportError> {
    String::from_utf8(bytes)
        .map_err(|err| TransportError::Http(format!("response body is not valid UTF-8: {err}")))
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.http.request(method(request.method), &request.path);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| TransportError::Http(err.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(key, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (key.as_str().to_string(), value.to_string()))
            })
            .collect();
        // Reading the body to the end hands the connection back to the pool.
        let bytes = response
            .bytes()
            .await
            .map_err(|err| TransportError::Http(format!("failed to read response body: {err}")))?;
        let body = body_text(bytes.to_vec())?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_text_accepts_utf8() {
        let body = body_text(r#"{"title":"Café"}"#.as_bytes().to_vec()).unwrap();
        assert_eq!(body, r#"{"title":"Café"}"#);
    }

    #[test]
    fn body_text_rejects_invalid_utf8() {
        let err = body_text(vec![b'{', 0xff, 0xfe, b'}']).unwrap_err();
        match err {
            TransportError::Http(message) => assert!(message.contains("not valid UTF-8")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
