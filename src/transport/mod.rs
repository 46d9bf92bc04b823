//! Transport module
//!
//! The seam between the stores and the network. Stores only ever see the
//! [`Transport`] trait, so tests substitute an in-memory double.

mod http;
#[cfg(test)]
pub mod mock;
mod types;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use http::HttpTransport;
pub use types::{ApiRequest, FilePart, Method, MultipartForm, RequestBody};

/// Transport trait
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the parsed JSON body.
    ///
    /// Non-2xx responses resolve to `ClientError::Api` carrying the body's
    /// `message` field when present.
    async fn send(&self, request: ApiRequest) -> Result<Value>;
}
