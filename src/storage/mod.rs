//! Key-value storage for persisted client state
//!
//! Holds the access/refresh tokens and the cached profile. Only the session
//! store reads or writes through this module.

mod file;
mod memory;

use crate::error::Result;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Persisted key for the access token
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Persisted key for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Persisted key for the serialized user profile
pub const USER_KEY: &str = "user";

/// Key-value store trait
///
/// Every write replaces a whole value; readers never observe a partially
/// written entry.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// Remove several keys in one write
    fn remove_all(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}
