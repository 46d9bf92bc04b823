//! Comic catalog state

mod slice;
mod store;

pub use slice::Slice;
pub use store::{CatalogState, CatalogStore};
