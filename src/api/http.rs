use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{
    ApiError, AuthResponse, CreatedCv, DirectoryApi, EntryUpdate, LoginRequest, RegisterRequest,
};
use crate::draft::{EducationDraft, ExperienceDraft, ProfileDraft};
use crate::model::{Cv, CvDetail, Profile, VerificationBadge};
use crate::session::Session;

/// `DirectoryApi` over HTTP.
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
    session: Session,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, session: Session) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(%method, path, "api request");
        let req = self.client.request(method, self.url(path));
        match self.session.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn fetch<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, ApiError> {
        let resp = checked(req.send().await?).await?;
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::warn!(error = %e, "response body did not decode");
            ApiError::Decode(e.to_string())
        })
    }

    async fn execute(req: RequestBuilder) -> Result<(), ApiError> {
        checked(req.send().await?).await?;
        Ok(())
    }
}

/// Turn a non-success response into `ApiError::Status`, pulling the
/// backend's `{"error": "..."}` message out of the body when present.
async fn checked(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = error_message(&text);
    tracing::warn!(status = status.as_u16(), message = ?message, "api error");
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

fn error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<String>,
    }
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty())
}

/// `{"results": [...], "count": n}`. A bare array is rejected.
#[derive(Deserialize)]
struct SearchEnvelope {
    results: Vec<Profile>,
    #[serde(default)]
    count: Option<usize>,
}

impl SearchEnvelope {
    fn into_results(self) -> Vec<Profile> {
        if let Some(count) = self.count
            && count != self.results.len()
        {
            tracing::debug!(count, len = self.results.len(), "search count mismatch");
        }
        self.results
    }
}

/// `{"message": "...", "entry": {...}}` returned by directory updates.
#[derive(Deserialize)]
struct EntryEnvelope {
    entry: Profile,
}

#[async_trait]
impl DirectoryApi for HttpApi {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        Self::fetch(self.request(Method::POST, "/auth/register").json(request)).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        Self::fetch(self.request(Method::POST, "/auth/login").json(request)).await
    }

    async fn create_cv(&self, draft: &ProfileDraft) -> Result<CreatedCv, ApiError> {
        Self::fetch(self.request(Method::POST, "/cv").json(draft)).await
    }

    async fn update_cv(&self, cv_id: i64, draft: &ProfileDraft) -> Result<Cv, ApiError> {
        Self::fetch(self.request(Method::PUT, &format!("/cv/{cv_id}")).json(draft)).await
    }

    async fn delete_cv(&self, cv_id: i64) -> Result<(), ApiError> {
        Self::execute(self.request(Method::DELETE, &format!("/cv/{cv_id}"))).await
    }

    async fn my_cv(&self) -> Result<CvDetail, ApiError> {
        Self::fetch(self.request(Method::GET, "/cv/me")).await
    }

    async fn add_education(&self, cv_id: i64, entry: &EducationDraft) -> Result<(), ApiError> {
        let path = format!("/cv/{cv_id}/education");
        Self::execute(self.request(Method::POST, &path).json(entry)).await
    }

    async fn add_experience(&self, cv_id: i64, entry: &ExperienceDraft) -> Result<(), ApiError> {
        let path = format!("/cv/{cv_id}/experience");
        Self::execute(self.request(Method::POST, &path).json(entry)).await
    }

    async fn get_cv_by_user(&self, user_id: i64) -> Result<CvDetail, ApiError> {
        Self::fetch(self.request(Method::GET, &format!("/cv/user/{user_id}"))).await
    }

    async fn join_directory(&self) -> Result<(), ApiError> {
        Self::execute(self.request(Method::POST, "/directory/me/join")).await
    }

    async fn leave_directory(&self) -> Result<(), ApiError> {
        Self::execute(self.request(Method::DELETE, "/directory/me/leave")).await
    }

    async fn my_entry(&self) -> Result<Profile, ApiError> {
        Self::fetch(self.request(Method::GET, "/directory/me")).await
    }

    async fn update_entry(&self, update: &EntryUpdate) -> Result<Profile, ApiError> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(headline) = &update.headline {
            params.push(("headline", headline.as_str()));
        }
        if let Some(location) = &update.location {
            params.push(("location", location.as_str()));
        }
        let req = self.request(Method::PUT, "/directory/me").query(&params);
        let envelope: EntryEnvelope = Self::fetch(req).await?;
        Ok(envelope.entry)
    }

    async fn set_visibility(&self, visible: bool) -> Result<Profile, ApiError> {
        let req = self
            .request(Method::PUT, "/directory/me/visibility")
            .query(&[("visible", visible)]);
        let envelope: EntryEnvelope = Self::fetch(req).await?;
        Ok(envelope.entry)
    }

    async fn search(&self, keyword: &str) -> Result<Vec<Profile>, ApiError> {
        let keyword = keyword.trim();
        let mut req = self.request(Method::GET, "/directory/search");
        if !keyword.is_empty() {
            req = req.query(&[("q", keyword)]);
        }
        let envelope: SearchEnvelope = Self::fetch(req).await?;
        Ok(envelope.into_results())
    }

    async fn filter_by_badge(&self, badge: VerificationBadge) -> Result<Vec<Profile>, ApiError> {
        let path = format!("/directory/filter/badge/{}", badge.as_str());
        let envelope: SearchEnvelope = Self::fetch(self.request(Method::GET, &path)).await?;
        Ok(envelope.into_results())
    }

    async fn get_profile(&self, user_id: i64) -> Result<Profile, ApiError> {
        Self::fetch(self.request(Method::GET, &format!("/directory/profile/{user_id}"))).await
    }
}
