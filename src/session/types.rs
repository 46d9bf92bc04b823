//! Session data types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::json;

/// Account role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Signed-in user profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub avatar: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl User {
    /// Map a backend user object; accepts either `id` or Mongo-style `_id`
    pub fn from_value(raw: &Value) -> Self {
        let id = json::opt_string(raw, "id").unwrap_or_else(|| json::string(raw, "_id"));
        let role = match json::string(raw, "role").as_str() {
            "admin" => Role::Admin,
            _ => Role::User,
        };

        Self {
            id,
            email: json::string(raw, "email"),
            name: json::string(raw, "name"),
            avatar: json::string(raw, "avatar"),
            role,
            phone: json::opt_string(raw, "phone"),
            address: json::opt_string(raw, "address"),
        }
    }
}

/// Authentication state observed by views
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub is_authenticated: bool,
    /// `None` while authenticated means the profile is still loading
    pub user: Option<User>,
}

/// Login result: tokens plus profile
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: User,
}

/// Registration form
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Profile edit; absent fields are left unchanged server-side
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub avatar: Option<AvatarUpload>,
}

/// Avatar image to upload with a profile edit
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_from_value() {
        let raw = json!({
            "_id": "u1",
            "email": "lan@example.com",
            "name": "Lan",
            "avatar": "https://cdn.example/a.png",
            "role": "admin",
            "phone": ""
        });
        let user = User::from_value(&raw);
        assert_eq!(user.id, "u1");
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.phone, None);
    }

    #[test]
    fn test_user_json_roundtrip_tolerates_missing_role() {
        let cached = r#"{"id":"u2","email":"e","name":"n","avatar":""}"#;
        let user: User = serde_json::from_str(cached).unwrap();
        assert_eq!(user.role, Role::User);
    }
}
