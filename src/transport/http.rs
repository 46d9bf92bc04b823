//! reqwest-backed transport

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, ClientBuilder};
use serde_json::Value;

use crate::error::{ClientError, Result};

use super::types::{ApiRequest, Method, RequestBody};
use super::Transport;

/// HTTP transport rooted at a base URL
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("truyen-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, request: &ApiRequest) -> String {
        if request.is_absolute() {
            request.path.clone()
        } else {
            format!(
                "{}/{}",
                self.base_url,
                request.path.trim_start_matches('/')
            )
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value> {
        let url = self.url_for(&request);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Multipart(form) => {
                let mut parts = multipart::Form::new();
                for (name, value) in form.fields {
                    parts = parts.text(name, value);
                }
                if let Some(file) = form.file {
                    let part = multipart::Part::bytes(file.bytes)
                        .file_name(file.file_name)
                        .mime_str(&file.mime_type)?;
                    parts = parts.part(file.field, part);
                }
                builder.multipart(parts)
            }
        };

        tracing::debug!(method = ?request.method, url = %url, "Sending request");

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let parsed = if text.trim().is_empty() {
            Ok(Value::Null)
        } else {
            serde_json::from_str::<Value>(&text)
        };

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), url = %url, "Request failed");
            return Err(ClientError::from_response(status.as_u16(), parsed.as_ref().ok()));
        }

        Ok(parsed?)
    }
}
