//! Account API adapter
//!
//! Thin wrappers over the authenticated `/api` namespace. Protected calls take
//! the bearer token explicitly; reading it from storage is the session
//! store's job.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::account::{ChangePasswordRequest, LibraryEntry, Page, Pagination, ProgressUpdate, FAVORITES_PER_PAGE};
use crate::error::{ClientError, Result};
use crate::json;
use crate::session::{LoginOutcome, ProfileUpdate, RegisterRequest, User};
use crate::transport::{ApiRequest, FilePart, MultipartForm, Transport};

/// Account API client
#[derive(Clone)]
pub struct UserApi {
    transport: Arc<dyn Transport>,
}

impl UserApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Exchange credentials for tokens and a profile
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let response = self
            .transport
            .send(ApiRequest::post("/api/login").json(json!({
                "email": email,
                "password": password,
            })))
            .await?;

        let access_token = json::opt_string(&response, "access_token").ok_or_else(|| {
            ClientError::InvalidResponse("login response has no access_token".to_string())
        })?;

        Ok(LoginOutcome {
            access_token,
            refresh_token: json::opt_string(&response, "refresh_token"),
            user: user_from(&response)?,
        })
    }

    /// Create an account; returns the backend's confirmation message
    pub async fn register(&self, request: &RegisterRequest) -> Result<String> {
        let response = self
            .transport
            .send(ApiRequest::post("/api/register").json(serde_json::to_value(request)?))
            .await?;
        Ok(json::string(&response, "message"))
    }

    pub async fn get_profile(&self, token: &str) -> Result<User> {
        let response = self
            .transport
            .send(ApiRequest::get("/api/profile").bearer(token))
            .await?;
        user_from(&response)
    }

    /// Multipart profile edit; only the provided fields are sent
    pub async fn update_profile(&self, token: &str, update: &ProfileUpdate) -> Result<User> {
        let mut form = MultipartForm::new();
        if let Some(name) = &update.name {
            form = form.text("name", name);
        }
        if let Some(phone) = &update.phone {
            form = form.text("phone", phone);
        }
        if let Some(address) = &update.address {
            form = form.text("address", address);
        }
        if let Some(avatar) = &update.avatar {
            let mime_type = mime_guess::from_path(&avatar.file_name)
                .first_or_octet_stream()
                .to_string();
            form = form.file(FilePart {
                field: "avatar".to_string(),
                file_name: avatar.file_name.clone(),
                mime_type,
                bytes: avatar.bytes.clone(),
            });
        }

        let response = self
            .transport
            .send(ApiRequest::put("/api/profile").bearer(token).multipart(form))
            .await?;
        user_from(&response)
    }

    pub async fn reading_list(&self, token: &str, page: u32, limit: u32) -> Result<Page<LibraryEntry>> {
        let response = self
            .transport
            .send(
                ApiRequest::get("/api/comic/reading-list")
                    .query("page", page)
                    .query("limit", limit)
                    .bearer(token),
            )
            .await?;
        Ok(entries_page(&response, limit as usize))
    }

    pub async fn update_progress(&self, token: &str, update: &ProgressUpdate) -> Result<LibraryEntry> {
        let response = self
            .transport
            .send(
                ApiRequest::post("/api/comic/update-progress")
                    .bearer(token)
                    .json(serde_json::to_value(update)?),
            )
            .await?;

        let data = json::data(&response);
        let mut entry = LibraryEntry::from_value(data);
        if entry.slug.is_empty() {
            entry.slug = update.slug.clone();
        }
        if entry.last_read_chapter.is_none() {
            entry.last_read_chapter = Some(update.chapter.clone());
        }
        Ok(entry)
    }

    pub async fn favorites(&self, token: &str) -> Result<Page<LibraryEntry>> {
        let response = self
            .transport
            .send(ApiRequest::get("/api/comic/favorites").bearer(token))
            .await?;
        Ok(entries_page(&response, FAVORITES_PER_PAGE))
    }

    pub async fn add_favorite(
        &self,
        token: &str,
        slug: &str,
        last_read_chapter: Option<&str>,
    ) -> Result<LibraryEntry> {
        let mut body = json!({ "slug": slug });
        if let Some(chapter) = last_read_chapter {
            body["lastReadChapter"] = Value::String(chapter.to_string());
        }

        let response = self
            .transport
            .send(ApiRequest::post("/api/comic/favorites").bearer(token).json(body))
            .await?;

        let mut entry = LibraryEntry::from_value(json::data(&response));
        if entry.slug.is_empty() {
            entry.slug = slug.to_string();
        }
        Ok(entry)
    }

    pub async fn remove_favorite(&self, token: &str, slug: &str) -> Result<()> {
        let path = format!("/api/comic/favorites/{}", urlencoding::encode(slug));
        self.transport
            .send(ApiRequest::delete(path).bearer(token))
            .await?;
        Ok(())
    }

    pub async fn forgot_password(&self, email: &str) -> Result<String> {
        let response = self
            .transport
            .send(ApiRequest::post("/api/forgot-password").json(json!({ "email": email })))
            .await?;
        Ok(json::string(&response, "message"))
    }

    /// Works signed in or out; the token is attached when present
    pub async fn change_password(
        &self,
        token: Option<&str>,
        request: &ChangePasswordRequest,
    ) -> Result<String> {
        let mut api_request =
            ApiRequest::post("/api/change-password").json(serde_json::to_value(request)?);
        if let Some(token) = token {
            api_request = api_request.bearer(token);
        }

        let response = self.transport.send(api_request).await?;
        Ok(json::string(&response, "message"))
    }

    pub async fn resend_verification(&self, email: &str) -> Result<String> {
        let response = self
            .transport
            .send(ApiRequest::post("/api/resend-verification").json(json!({ "email": email })))
            .await?;
        Ok(json::string(&response, "message"))
    }
}

fn user_from(response: &Value) -> Result<User> {
    response
        .get("user")
        .filter(|u| u.is_object())
        .map(User::from_value)
        .ok_or_else(|| ClientError::InvalidResponse("response has no user".to_string()))
}

fn entries_page(response: &Value, per_page: usize) -> Page<LibraryEntry> {
    let items: Vec<LibraryEntry> = json::array(response, "data")
        .iter()
        .map(LibraryEntry::from_value)
        .filter(|entry| !entry.slug.is_empty())
        .collect();
    let pagination = Pagination::from_value(response, items.len(), per_page);
    Page { items, pagination }
}
