//! Authentication session
//!
//! The [`SessionStore`] state container plus the profile types it carries.

mod store;
pub mod token;
mod types;

pub use store::SessionStore;
pub use types::{
    AvatarUpload, LoginOutcome, ProfileUpdate, RegisterRequest, Role, Session, User,
};
