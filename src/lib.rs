//! Truyen Client Core
//!
//! State and data orchestration for a comic reading client.
//!
//! # Modules
//!
//! - `session`: authentication state and persisted tokens
//! - `catalog`: independently loading catalog slices
//! - `reader`: chapter reader state machine and chapter adjacency
//! - `comic`: comic entities and the payload mapping layer
//! - `account`: reading list, progress and favorites
//! - `api`: backend adapters over the `transport` seam

pub mod account;
pub mod api;
pub mod catalog;
pub mod client;
pub mod comic;
pub mod config;
pub mod error;
pub mod reader;
pub mod session;
pub mod storage;
pub mod transport;

mod json;

pub use client::TruyenClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use json::cdn_url;
