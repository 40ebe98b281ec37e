pub mod http;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::draft::{EducationDraft, ExperienceDraft, ProfileDraft};
use crate::model::{Cv, CvDetail, Profile, VerificationBadge};

pub use http::HttpApi;

/// Why a backend call failed.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, ...).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The backend answered with a non-success status.
    #[error("server returned {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Status { status: u16, message: Option<String> },
    /// The body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// The `error` field the backend put in its response body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Message to show a user: the backend's own wording when it sent one,
    /// `fallback` otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by both register and login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// The part of a `POST /cv` response the client reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CreatedCv {
    pub id: i64,
}

/// Partial update of the caller's own directory entry. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryUpdate {
    pub headline: Option<String>,
    pub location: Option<String>,
}

/// The directory backend. [`HttpApi`] talks to the real service;
/// [`mock::MockApi`] stands in for it in tests.
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError>;
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError>;

    async fn create_cv(&self, draft: &ProfileDraft) -> Result<CreatedCv, ApiError>;
    async fn update_cv(&self, cv_id: i64, draft: &ProfileDraft) -> Result<Cv, ApiError>;
    async fn delete_cv(&self, cv_id: i64) -> Result<(), ApiError>;
    async fn my_cv(&self) -> Result<CvDetail, ApiError>;
    /// Attach an entry. Whatever the backend echoes back is not read.
    async fn add_education(&self, cv_id: i64, entry: &EducationDraft) -> Result<(), ApiError>;
    async fn add_experience(&self, cv_id: i64, entry: &ExperienceDraft) -> Result<(), ApiError>;
    async fn get_cv_by_user(&self, user_id: i64) -> Result<CvDetail, ApiError>;

    async fn join_directory(&self) -> Result<(), ApiError>;
    async fn leave_directory(&self) -> Result<(), ApiError>;
    async fn my_entry(&self) -> Result<Profile, ApiError>;
    async fn update_entry(&self, update: &EntryUpdate) -> Result<Profile, ApiError>;
    async fn set_visibility(&self, visible: bool) -> Result<Profile, ApiError>;

    /// Free-text search. An empty keyword lists every visible entry.
    async fn search(&self, keyword: &str) -> Result<Vec<Profile>, ApiError>;
    async fn filter_by_badge(&self, badge: VerificationBadge) -> Result<Vec<Profile>, ApiError>;
    async fn get_profile(&self, user_id: i64) -> Result<Profile, ApiError>;
}
