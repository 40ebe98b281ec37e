//! Records returned by the directory backend.
//!
//! These are read-only projections: nothing in the client mutates them,
//! they are fetched, rendered and dropped.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Verification level computed by the backend, ordered low to high.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerificationBadge {
    #[default]
    None,
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl VerificationBadge {
    /// Every level, lowest first.
    pub const ALL: [VerificationBadge; 5] = [
        VerificationBadge::None,
        VerificationBadge::Bronze,
        VerificationBadge::Silver,
        VerificationBadge::Gold,
        VerificationBadge::Platinum,
    ];

    /// Wire name, as used in paths like `/directory/filter/badge/GOLD`.
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationBadge::None => "NONE",
            VerificationBadge::Bronze => "BRONZE",
            VerificationBadge::Silver => "SILVER",
            VerificationBadge::Gold => "GOLD",
            VerificationBadge::Platinum => "PLATINUM",
        }
    }
}

impl fmt::Display for VerificationBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid badge level '{0}'. Use: NONE, BRONZE, SILVER, GOLD, or PLATINUM")]
pub struct BadgeParseError(pub String);

impl FromStr for VerificationBadge {
    type Err = BadgeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|badge| badge.as_str() == wanted)
            .ok_or_else(|| BadgeParseError(s.to_string()))
    }
}

/// A directory entry: the publicly discoverable face of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub verification_badge: VerificationBadge,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default)]
    pub profile_views: u64,
}

/// The CV header record created by `POST /cv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cv {
    pub id: i64,
    pub user_id: i64,
    pub headline: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default = "default_true")]
    pub is_public: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: i64,
    pub cv_id: i64,
    pub institution: String,
    pub degree: String,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Absent means the studies are ongoing.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: i64,
    pub cv_id: i64,
    pub company: String,
    pub role: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub is_verified: bool,
}

impl Experience {
    /// End date as it should be shown. A current position is open-ended
    /// whatever the backend has stored.
    pub fn effective_end(&self) -> Option<NaiveDate> {
        if self.is_current { None } else { self.end_date }
    }
}

/// A CV with its attached entries, as returned by the CV read endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvDetail {
    pub cv: Cv,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub experience: Vec<Experience>,
}

fn default_true() -> bool {
    true
}
