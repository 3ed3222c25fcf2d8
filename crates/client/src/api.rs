//! REST client for the annotation backend.
//!
//! Every response is decoded into the strict wire schemas from
//! [`lus_core::wire`]; a body that does not match is a
//! [`ClientError::Decode`] rather than a silently defaulted value.

use lus_core::label::Label;
use lus_core::types::DbId;
use lus_core::wire::{
    ChangePasswordRequest, HistoryRecord, LoginRequest, Message, NewHistoryEntry,
    PatientSummary, UserCredentials, UserSummary, VideoFile,
};
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::state::{Patient, User};

/// HTTP client for one backend instance.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// * `base_url` - e.g. `http://localhost:8000`. A trailing slash is ignored.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /users`
    pub async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        let response = self.client.get(self.url("/users")).send().await?;
        let users: Vec<UserSummary> = Self::parse_response(response).await?;
        Ok(users.into_iter().map(User::from).collect())
    }

    /// `POST /users`
    pub async fn create_user(&self, username: &str, password: &str) -> Result<User, ClientError> {
        let body = UserCredentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self.client.post(self.url("/users")).json(&body).send().await?;
        let user: UserSummary = Self::parse_response(response).await?;
        Ok(user.into())
    }

    /// `GET /api/patients`
    pub async fn list_patients(&self) -> Result<Vec<Patient>, ClientError> {
        let response = self.client.get(self.url("/api/patients")).send().await?;
        let patients: Vec<PatientSummary> = Self::parse_response(response).await?;
        Ok(patients.into_iter().map(Patient::from).collect())
    }

    /// `GET /api/patients/{patient_id}/classes`
    pub async fn list_classes(&self, patient_id: &str) -> Result<Vec<Label>, ClientError> {
        let response = self
            .client
            .get(self.segments_url(&["api", "patients", patient_id, "classes"])?)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `GET /api/patients/{patient_id}/classes/{class}/videos`
    ///
    /// Relative video URLs are resolved against the base URL so they can be
    /// handed straight to a media element.
    pub async fn list_videos(
        &self,
        patient_id: &str,
        class: Label,
    ) -> Result<Vec<VideoFile>, ClientError> {
        let response = self
            .client
            .get(self.segments_url(&[
                "api",
                "patients",
                patient_id,
                "classes",
                class.as_str(),
                "videos",
            ])?)
            .send()
            .await?;
        let videos: Vec<VideoFile> = Self::parse_response(response).await?;
        Ok(videos
            .into_iter()
            .map(|v| VideoFile {
                url: self.resolve(&v.url),
                file_name: v.file_name,
            })
            .collect())
    }

    /// `POST /auth/login`. Any 2xx is a successful login.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&body)
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// `POST /auth/change-password`. Returns the server's confirmation.
    pub async fn change_password(
        &self,
        request: &ChangePasswordRequest,
    ) -> Result<String, ClientError> {
        let response = self
            .client
            .post(self.url("/auth/change-password"))
            .json(request)
            .send()
            .await?;
        let message: Message = Self::parse_response(response).await?;
        Ok(message.detail)
    }

    /// `GET /history?annotator=`
    pub async fn list_history(&self, annotator: &str) -> Result<Vec<HistoryRecord>, ClientError> {
        let response = self
            .client
            .get(self.url("/history"))
            .query(&[("annotator", annotator)])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `POST /history`
    pub async fn post_history(&self, entry: &NewHistoryEntry) -> Result<HistoryRecord, ClientError> {
        let response = self
            .client
            .post(self.url("/history"))
            .json(entry)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `DELETE /history/{id}`
    pub async fn delete_history(&self, id: DbId) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("/history/{id}")))
            .send()
            .await?;
        Self::check_status(response).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Base URL plus percent-encoded path segments. Patient folder names
    /// may contain `#`, `?` or `%`.
    fn segments_url(&self, segments: &[&str]) -> Result<reqwest::Url, ClientError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            self.url(url)
        } else {
            format!("{}/{url}", self.base_url)
        }
    }

    /// Return the response unchanged on success, or a [`ClientError::Api`]
    /// carrying the error `detail` (or the raw body) on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn check_status(response: reqwest::Response) -> Result<(), ClientError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

/// Pull `detail` out of a JSON error body, falling back to the raw text.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<Message>(body)
        .map(|m| m.detail)
        .unwrap_or_else(|_| body.to_string())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_resolve_relative_urls() {
        let api = ApiClient::new("http://backend:8000/");
        assert_eq!(api.base_url(), "http://backend:8000");
        assert_eq!(
            api.resolve("/api/videos/abc"),
            "http://backend:8000/api/videos/abc"
        );
        assert_eq!(api.resolve("api/videos/abc"), "http://backend:8000/api/videos/abc");
        assert_eq!(api.resolve("https://cdn/x.mp4"), "https://cdn/x.mp4");
    }

    #[test]
    fn test_patient_segments_are_percent_encoded() {
        let api = ApiClient::new("http://backend:8000/lus/");
        let url = api
            .segments_url(&["api", "patients", "Patient #3?50%", "classes"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://backend:8000/lus/api/patients/Patient%20%233%3F50%25/classes"
        );

        let bad = ApiClient::new("not a url");
        assert_matches!(bad.segments_url(&["api"]), Err(ClientError::InvalidBaseUrl(_)));
    }

    #[test]
    fn test_error_detail_extraction() {
        assert_eq!(
            error_detail(r#"{"error":"x","code":"UNAUTHORIZED","detail":"Invalid username or password"}"#),
            "Invalid username or password"
        );
        assert_eq!(error_detail("Bad Gateway"), "Bad Gateway");
    }
}
