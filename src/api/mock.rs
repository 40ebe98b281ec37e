use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;

use super::{
    ApiError, AuthResponse, CreatedCv, DirectoryApi, EntryUpdate, LoginRequest, RegisterRequest,
};
use crate::draft::{EducationDraft, ExperienceDraft, ProfileDraft};
use crate::model::{Cv, CvDetail, Profile, VerificationBadge};

/// The user every mock call acts as.
pub const MOCK_USER_ID: i64 = 1;

/// One backend operation, for scripting failures and counting calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Register,
    Login,
    CreateCv,
    UpdateCv,
    DeleteCv,
    MyCv,
    AddEducation,
    AddExperience,
    GetCvByUser,
    JoinDirectory,
    LeaveDirectory,
    MyEntry,
    UpdateEntry,
    SetVisibility,
    Search,
    FilterByBadge,
    GetProfile,
}

/// An in-memory backend for tests. Records every call in order and fails
/// the operations it was told to fail.
pub struct MockApi {
    calls: Mutex<Vec<Op>>,
    failures: HashMap<Op, (u16, Option<String>)>,
    directory: Vec<Profile>,
    cvs: HashMap<i64, CvDetail>,
    education: Mutex<Vec<(i64, EducationDraft)>>,
    experience: Mutex<Vec<(i64, ExperienceDraft)>>,
    next_id: AtomicI64,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failures: HashMap::new(),
            directory: Vec::new(),
            cvs: HashMap::new(),
            education: Mutex::new(Vec::new()),
            experience: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(100),
        }
    }

    /// Seed the directory with entries.
    pub fn with_profiles(mut self, profiles: Vec<Profile>) -> Self {
        self.directory = profiles;
        self
    }

    /// Seed a CV for a user.
    pub fn with_cv(mut self, user_id: i64, detail: CvDetail) -> Self {
        self.cvs.insert(user_id, detail);
        self
    }

    /// Make `op` fail with the given status and optional `error` message.
    pub fn fail(mut self, op: Op, status: u16, message: Option<&str>) -> Self {
        self.failures
            .insert(op, (status, message.map(str::to_string)));
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<Op> {
        self.calls.lock().unwrap().clone()
    }

    /// How many times `op` was called.
    pub fn count(&self, op: Op) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    /// Education entries received, with the CV id they were attached to.
    pub fn education_received(&self) -> Vec<(i64, EducationDraft)> {
        self.education.lock().unwrap().clone()
    }

    /// Experience entries received, with the CV id they were attached to.
    pub fn experience_received(&self) -> Vec<(i64, ExperienceDraft)> {
        self.experience.lock().unwrap().clone()
    }

    fn record(&self, op: Op) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(op);
        match self.failures.get(&op) {
            Some((status, message)) => Err(ApiError::Status {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn not_found(message: &str) -> ApiError {
        ApiError::Status {
            status: 404,
            message: Some(message.to_string()),
        }
    }

    fn auth_response(email: &str, full_name: &str) -> AuthResponse {
        AuthResponse {
            token: format!("mock-token-{email}"),
            email: email.to_string(),
            full_name: full_name.to_string(),
            roles: vec!["USER".to_string()],
        }
    }

    fn cv_from(&self, id: i64, draft: &ProfileDraft) -> Cv {
        Cv {
            id,
            user_id: MOCK_USER_ID,
            headline: draft.headline.clone(),
            summary: Some(draft.summary.clone()),
            is_public: draft.is_public,
        }
    }

    fn own_entry(&self) -> Result<Profile, ApiError> {
        self.directory
            .iter()
            .find(|p| p.user_id == MOCK_USER_ID)
            .cloned()
            .ok_or_else(|| Self::not_found("User not in directory"))
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DirectoryApi for MockApi {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.record(Op::Register)?;
        Ok(Self::auth_response(&request.email, &request.full_name))
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.record(Op::Login)?;
        Ok(Self::auth_response(&request.email, "Mock User"))
    }

    async fn create_cv(&self, _draft: &ProfileDraft) -> Result<CreatedCv, ApiError> {
        self.record(Op::CreateCv)?;
        Ok(CreatedCv { id: self.next_id() })
    }

    async fn update_cv(&self, cv_id: i64, draft: &ProfileDraft) -> Result<Cv, ApiError> {
        self.record(Op::UpdateCv)?;
        Ok(self.cv_from(cv_id, draft))
    }

    async fn delete_cv(&self, _cv_id: i64) -> Result<(), ApiError> {
        self.record(Op::DeleteCv)
    }

    async fn my_cv(&self) -> Result<CvDetail, ApiError> {
        self.record(Op::MyCv)?;
        self.cvs
            .get(&MOCK_USER_ID)
            .cloned()
            .ok_or_else(|| Self::not_found("CV not found for user: 1"))
    }

    async fn add_education(&self, cv_id: i64, entry: &EducationDraft) -> Result<(), ApiError> {
        self.record(Op::AddEducation)?;
        self.education.lock().unwrap().push((cv_id, entry.clone()));
        Ok(())
    }

    async fn add_experience(&self, cv_id: i64, entry: &ExperienceDraft) -> Result<(), ApiError> {
        self.record(Op::AddExperience)?;
        self.experience.lock().unwrap().push((cv_id, entry.clone()));
        Ok(())
    }

    async fn get_cv_by_user(&self, user_id: i64) -> Result<CvDetail, ApiError> {
        self.record(Op::GetCvByUser)?;
        self.cvs
            .get(&user_id)
            .cloned()
            .ok_or_else(|| Self::not_found("CV not found for this user"))
    }

    async fn join_directory(&self) -> Result<(), ApiError> {
        self.record(Op::JoinDirectory)
    }

    async fn leave_directory(&self) -> Result<(), ApiError> {
        self.record(Op::LeaveDirectory)
    }

    async fn my_entry(&self) -> Result<Profile, ApiError> {
        self.record(Op::MyEntry)?;
        self.own_entry()
    }

    async fn update_entry(&self, update: &EntryUpdate) -> Result<Profile, ApiError> {
        self.record(Op::UpdateEntry)?;
        let mut entry = self.own_entry()?;
        if let Some(headline) = &update.headline {
            entry.headline = Some(headline.clone());
        }
        if let Some(location) = &update.location {
            entry.location = Some(location.clone());
        }
        Ok(entry)
    }

    async fn set_visibility(&self, visible: bool) -> Result<Profile, ApiError> {
        self.record(Op::SetVisibility)?;
        let mut entry = self.own_entry()?;
        entry.is_visible = visible;
        Ok(entry)
    }

    async fn search(&self, keyword: &str) -> Result<Vec<Profile>, ApiError> {
        self.record(Op::Search)?;
        let needle = keyword.trim().to_lowercase();
        Ok(self
            .directory
            .iter()
            .filter(|p| p.is_visible)
            .filter(|p| needle.is_empty() || searchable_text(p).contains(&needle))
            .cloned()
            .collect())
    }

    async fn filter_by_badge(&self, badge: VerificationBadge) -> Result<Vec<Profile>, ApiError> {
        self.record(Op::FilterByBadge)?;
        Ok(self
            .directory
            .iter()
            .filter(|p| p.is_visible && p.verification_badge == badge)
            .cloned()
            .collect())
    }

    async fn get_profile(&self, user_id: i64) -> Result<Profile, ApiError> {
        self.record(Op::GetProfile)?;
        self.directory
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned()
            .ok_or_else(|| Self::not_found("User not found in directory"))
    }
}

fn searchable_text(profile: &Profile) -> String {
    [
        Some(profile.full_name.as_str()),
        profile.headline.as_deref(),
        profile.location.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}
