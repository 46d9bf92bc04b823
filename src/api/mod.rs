//! Backend API adapters
//!
//! Each adapter turns transport responses into domain entities through the
//! mapping layer. They hold no state of their own.

mod category;
pub(crate) mod comic;
mod user;

pub use category::CategoryApi;
pub use comic::ComicApi;
pub use user::UserApi;
