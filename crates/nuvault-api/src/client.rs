//! REST client for the Nuvault password service.
//!
//! Every request carries `Authorization: Bearer <token>` when the session
//! store holds a token. Response bodies are never logged, only a length +
//! digest summary, since they may contain plaintext secrets.

use crate::error::{ApiError, ApiResult};
use crate::models::{
    Category, EntryId, EntryInput, FilterKey, GeneratePasswordOptions, GeneratedPassword,
    HealthScoreResponse, LoginResponse, MessageResponse, Profile, ProfileUpdate, Registration,
    TagType, ToggleFavoriteResponse, UserInfo, VaultEntry,
};
use nuvault_storage::SessionStore;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use url::Url;

fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// Password service client.
#[derive(Clone)]
pub struct NuvaultClient {
    http_client: reqwest::Client,
    api_url: String,
    session: Arc<SessionStore>,
}

impl NuvaultClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `api_url` - Service base URL including the `/api` prefix
    /// * `session` - Token store supplying the bearer credential
    pub fn new(api_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        Self::with_http_client(reqwest::Client::new(), api_url, session)
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_http_client(
        http_client: reqwest::Client,
        api_url: impl Into<String>,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            http_client,
            api_url: api_url.into(),
            session,
        }
    }

    /// The token store this client authenticates with.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Build the URL for an endpoint from path segments.
    ///
    /// Segments are percent-encoded, so ids can never escape their slot.
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = Url::parse(&self.api_url)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request with the standard headers and, if present, the bearer token.
    fn request(&self, method: Method, url: Url) -> ApiResult<RequestBuilder> {
        let mut builder = self
            .http_client
            .request(method, url)
            .header("Accept", "application/json");

        if let Some(token) = self.session.token()? {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        Ok(builder)
    }

    /// Send a request and turn any non-success status into a classified error.
    async fn send(&self, builder: RequestBuilder, operation: &'static str) -> ApiResult<Response> {
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body_summary = summarize_response_body(&body);
            tracing::warn!(
                operation,
                status = %status,
                body_summary = %body_summary,
                "Password service request failed"
            );
            return Err(ApiError::from_status(status, &body));
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        operation: &'static str,
    ) -> ApiResult<T> {
        let response = self.send(builder, operation).await?;
        Ok(response.json().await?)
    }

    // ==========================================
    // Vault entries
    // ==========================================

    /// Fetch the entry list for a filter, with plaintext secrets.
    ///
    /// A body that is not a JSON array is treated as an empty list.
    pub async fn list_entries(&self, filter: FilterKey) -> ApiResult<Vec<VaultEntry>> {
        let body = serde_json::json!({ "show_plaintext": true });

        let builder = match filter {
            FilterKey::All => self
                .request(Method::POST, self.endpoint(&["my-passwords"])?)?
                .json(&body),
            FilterKey::Favorites => self
                .request(Method::POST, self.endpoint(&["favorites"])?)?
                .json(&body),
            FilterKey::Recent | FilterKey::Oldest => {
                let order = if filter == FilterKey::Recent {
                    "recent"
                } else {
                    "oldest"
                };
                let mut url = self.endpoint(&["passwords-sorted"])?;
                url.query_pairs_mut()
                    .append_pair("order", order)
                    .append_pair("show_plaintext", "true");
                self.request(Method::GET, url)?
            }
        };

        tracing::debug!(filter = %filter, "Fetching vault entries");

        let value: serde_json::Value = self.send_json(builder, "list_entries").await?;
        let entries = parse_entry_list(value)?;

        tracing::debug!(filter = %filter, count = entries.len(), "Fetched vault entries");
        Ok(entries)
    }

    /// Fetch a single entry.
    pub async fn get_entry(&self, id: &EntryId) -> ApiResult<VaultEntry> {
        let url = self.endpoint(&["get-password", id.as_str()])?;
        self.send_json(self.request(Method::GET, url)?, "get_entry")
            .await
    }

    /// Create an entry. A duplicate service + username is a `Conflict`.
    pub async fn create_entry(&self, entry: &EntryInput) -> ApiResult<()> {
        let url = self.endpoint(&["add-password"])?;
        self.send(self.request(Method::POST, url)?.json(entry), "create_entry")
            .await?;
        tracing::info!(service = %entry.service, "Vault entry created");
        Ok(())
    }

    /// Replace an entry's fields.
    pub async fn update_entry(&self, id: &EntryId, entry: &EntryInput) -> ApiResult<()> {
        let url = self.endpoint(&["update-password", id.as_str()])?;
        self.send(self.request(Method::PUT, url)?.json(entry), "update_entry")
            .await?;
        tracing::info!(entry_id = %id, "Vault entry updated");
        Ok(())
    }

    /// Delete an entry.
    pub async fn delete_entry(&self, id: &EntryId) -> ApiResult<()> {
        let url = self.endpoint(&["delete-password", id.as_str()])?;
        self.send(self.request(Method::DELETE, url)?, "delete_entry")
            .await?;
        tracing::info!(entry_id = %id, "Vault entry deleted");
        Ok(())
    }

    /// Flip an entry's favorite flag. Returns the new flag.
    pub async fn toggle_favorite(&self, id: &EntryId) -> ApiResult<bool> {
        let url = self.endpoint(&["toggle-favorite", id.as_str()])?;
        let response: ToggleFavoriteResponse = self
            .send_json(self.request(Method::PATCH, url)?, "toggle_favorite")
            .await?;
        tracing::debug!(entry_id = %id, is_favorite = response.is_favorite, "Favorite toggled");
        Ok(response.is_favorite)
    }

    /// Raw health score. May be negative; callers clamp.
    pub async fn health_score(&self) -> ApiResult<i64> {
        let url = self.endpoint(&["health-score"])?;
        let response: HealthScoreResponse = self
            .send_json(self.request(Method::GET, url)?, "health_score")
            .await?;
        Ok(response.health_score)
    }

    /// Re-check the account password before revealing or deleting entries.
    pub async fn verify_vault_access(&self, user_password: &str) -> ApiResult<()> {
        let url = self.endpoint(&["verify-passwords-access"])?;
        let body = serde_json::json!({ "user_password": user_password });
        self.send(
            self.request(Method::POST, url)?.json(&body),
            "verify_vault_access",
        )
        .await?;
        Ok(())
    }

    pub async fn categories(&self) -> ApiResult<Vec<Category>> {
        let url = self.endpoint(&["tags", "categories"])?;
        self.send_json(self.request(Method::GET, url)?, "categories")
            .await
    }

    pub async fn tag_types(&self) -> ApiResult<Vec<TagType>> {
        let url = self.endpoint(&["tags", "types"])?;
        self.send_json(self.request(Method::GET, url)?, "tag_types")
            .await
    }

    /// Ask the server for a random password.
    pub async fn generate_password(
        &self,
        options: &GeneratePasswordOptions,
    ) -> ApiResult<GeneratedPassword> {
        if !options.has_character_class() {
            return Err(ApiError::Validation(
                "Select at least one character type".to_string(),
            ));
        }
        let url = self.endpoint(&["generate-password"])?;
        self.send_json(
            self.request(Method::POST, url)?.json(options),
            "generate_password",
        )
        .await
    }

    // ==========================================
    // Account
    // ==========================================

    /// Log in and persist the issued token.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<()> {
        let url = self.endpoint(&["login"])?;
        let body = serde_json::json!({
            "user_email": email,
            "user_password": password,
        });

        let response: LoginResponse = self
            .send_json(
                self.http_client.post(url).header("Accept", "application/json").json(&body),
                "login",
            )
            .await?;

        self.session.set_token(&response.token)?;
        tracing::info!("Login successful");
        Ok(())
    }

    /// Forget the stored token. Returns whether one was present.
    pub fn logout(&self) -> ApiResult<bool> {
        Ok(self.session.clear_token()?)
    }

    /// Ask the server whether the stored token is still valid.
    pub async fn validate_token(&self) -> ApiResult<()> {
        let url = self.endpoint(&["validate-token"])?;
        self.send(self.request(Method::GET, url)?, "validate_token")
            .await?;
        Ok(())
    }

    /// Send a verification code to `email`.
    pub async fn register_start(&self, email: &str) -> ApiResult<()> {
        let url = self.endpoint(&["register", "start"])?;
        let body = serde_json::json!({ "user_email": email });
        self.send(self.request(Method::POST, url)?.json(&body), "register_start")
            .await?;
        Ok(())
    }

    /// Create the account using the mailed code.
    pub async fn register_confirm(&self, registration: &Registration) -> ApiResult<()> {
        let url = self.endpoint(&["register", "confirm"])?;
        self.send(
            self.request(Method::POST, url)?.json(registration),
            "register_confirm",
        )
        .await?;
        tracing::info!("Registration confirmed");
        Ok(())
    }

    pub async fn user_info(&self) -> ApiResult<UserInfo> {
        let url = self.endpoint(&["user-info"])?;
        self.send_json(self.request(Method::GET, url)?, "user_info")
            .await
    }

    pub async fn profile(&self) -> ApiResult<Profile> {
        let url = self.endpoint(&["profile"])?;
        self.send_json(self.request(Method::GET, url)?, "profile")
            .await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<()> {
        let url = self.endpoint(&["profile"])?;
        self.send(self.request(Method::PUT, url)?.json(update), "update_profile")
            .await?;
        tracing::info!("Profile updated");
        Ok(())
    }

    /// Change the account password.
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> ApiResult<MessageResponse> {
        let url = self.endpoint(&["profile", "password"])?;
        let body = serde_json::json!({
            "current_password": current_password,
            "new_password": new_password,
        });
        self.send_json(
            self.request(Method::PUT, url)?.json(&body),
            "change_password",
        )
        .await
    }

    /// Permanently delete the account. The local token is left for the
    /// caller to clear together with any cached data.
    pub async fn delete_account(&self, user_id: &EntryId) -> ApiResult<()> {
        let url = self.endpoint(&["user", user_id.as_str()])?;
        self.send(self.request(Method::DELETE, url)?, "delete_account")
            .await?;
        tracing::info!("Account deleted");
        Ok(())
    }
}

fn parse_entry_list(value: serde_json::Value) -> ApiResult<Vec<VaultEntry>> {
    if value.is_array() {
        Ok(serde_json::from_value(value)?)
    } else {
        tracing::debug!("Entry list response was not an array; treating as empty");
        Ok(Vec::new())
    }
}
