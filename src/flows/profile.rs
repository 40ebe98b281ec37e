use crate::api::DirectoryApi;
use crate::consts::PROFILE_LOAD_FAILED;
use crate::model::{CvDetail, Profile};

/// A directory profile with whatever CV detail could be found for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub profile: Profile,
    /// `None` means no CV on file, which is not an error.
    pub cv: Option<CvDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ProfileLoadError(pub String);

/// Fetch a user's public profile, then their CV if they have one.
pub async fn load_profile(
    api: &dyn DirectoryApi,
    user_id: i64,
) -> Result<ProfileView, ProfileLoadError> {
    let profile = api.get_profile(user_id).await.map_err(|e| {
        tracing::warn!(user_id, error = %e, "profile fetch failed");
        ProfileLoadError(PROFILE_LOAD_FAILED.to_string())
    })?;

    let cv = match api.get_cv_by_user(user_id).await {
        Ok(detail) => Some(detail),
        Err(e) => {
            tracing::debug!(user_id, error = %e, "no cv on file");
            None
        }
    };

    Ok(ProfileView { profile, cv })
}

/// Same as [`load_profile`] for the logged-in user's own entry and CV.
pub async fn load_own_profile(api: &dyn DirectoryApi) -> Result<ProfileView, ProfileLoadError> {
    let profile = api.my_entry().await.map_err(|e| {
        tracing::warn!(error = %e, "own entry fetch failed");
        ProfileLoadError(PROFILE_LOAD_FAILED.to_string())
    })?;

    let cv = match api.my_cv().await {
        Ok(detail) => Some(detail),
        Err(e) => {
            tracing::debug!(error = %e, "no cv on file");
            None
        }
    };

    Ok(ProfileView { profile, cv })
}
