//! Editable CV drafts and their pre-submission validation.
//!
//! Drafts are values: every edit returns a new [`CvDraft`] and leaves the
//! original untouched.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const HEADLINE_MAX: usize = 200;
const SUMMARY_MAX: usize = 2000;
const INSTITUTION_MAX: usize = 200;
const COMPANY_MAX: usize = 200;
const DEGREE_MAX: usize = 100;
const FIELD_OF_STUDY_MAX: usize = 100;
const ROLE_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 2000;

/// The CV header fields sent to `POST /cv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDraft {
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default = "default_true")]
    pub is_public: bool,
}

impl Default for ProfileDraft {
    fn default() -> Self {
        Self {
            headline: String::new(),
            summary: String::new(),
            is_public: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationDraft {
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub field_of_study: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl EducationDraft {
    /// Entries without an institution are left out of a submission.
    pub fn is_blank(&self) -> bool {
        self.institution.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceDraft {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
}

impl ExperienceDraft {
    /// Entries without a company are left out of a submission.
    pub fn is_blank(&self) -> bool {
        self.company.trim().is_empty()
    }

    /// The entry as it goes on the wire: a current position carries no end date.
    pub fn normalized(&self) -> ExperienceDraft {
        let mut out = self.clone();
        if out.is_current {
            out.end_date = None;
        }
        out
    }
}

/// Which list of entries an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Education,
    Experience,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Education => f.write_str("education"),
            Section::Experience => f.write_str("experience"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("no {section} entry at index {index} (draft has {len})")]
    IndexOutOfRange {
        section: Section,
        index: usize,
        len: usize,
    },
}

/// A full CV submission: header plus ordered education and experience entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvDraft {
    #[serde(default)]
    pub profile: ProfileDraft,
    #[serde(default)]
    pub education: Vec<EducationDraft>,
    #[serde(default)]
    pub experience: Vec<ExperienceDraft>,
}

impl Default for CvDraft {
    /// A fresh form: one blank entry in each section.
    fn default() -> Self {
        Self {
            profile: ProfileDraft::default(),
            education: vec![EducationDraft::default()],
            experience: vec![ExperienceDraft::default()],
        }
    }
}

impl CvDraft {
    /// Load a draft from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read draft {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse draft {}", path.display()))
    }

    pub fn with_profile(&self, profile: ProfileDraft) -> CvDraft {
        CvDraft {
            profile,
            ..self.clone()
        }
    }

    /// Replace the education entry at `index`.
    pub fn with_education(
        &self,
        index: usize,
        entry: EducationDraft,
    ) -> Result<CvDraft, DraftError> {
        let education = replace_at(&self.education, index, entry, Section::Education)?;
        Ok(CvDraft {
            education,
            ..self.clone()
        })
    }

    /// Replace the experience entry at `index`.
    pub fn with_experience(
        &self,
        index: usize,
        entry: ExperienceDraft,
    ) -> Result<CvDraft, DraftError> {
        let experience = replace_at(&self.experience, index, entry, Section::Experience)?;
        Ok(CvDraft {
            experience,
            ..self.clone()
        })
    }

    /// Append a blank education entry.
    pub fn push_education(&self) -> CvDraft {
        let mut education = self.education.clone();
        education.push(EducationDraft::default());
        CvDraft {
            education,
            ..self.clone()
        }
    }

    /// Append a blank experience entry.
    pub fn push_experience(&self) -> CvDraft {
        let mut experience = self.experience.clone();
        experience.push(ExperienceDraft::default());
        CvDraft {
            experience,
            ..self.clone()
        }
    }

    /// Remove the education entry at `index`. The last remaining entry is kept.
    pub fn without_education(&self, index: usize) -> Result<CvDraft, DraftError> {
        let education = remove_at(&self.education, index, Section::Education)?;
        Ok(CvDraft {
            education,
            ..self.clone()
        })
    }

    /// Remove the experience entry at `index`. The last remaining entry is kept.
    pub fn without_experience(&self, index: usize) -> Result<CvDraft, DraftError> {
        let experience = remove_at(&self.experience, index, Section::Experience)?;
        Ok(CvDraft {
            experience,
            ..self.clone()
        })
    }

    /// Check every field constraint the backend enforces. Blank entries are
    /// skipped at submission and therefore not validated.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        if self.profile.headline.trim().is_empty() {
            errors.push(FieldError::new("headline", "Headline is required"));
        } else if too_long(&self.profile.headline, HEADLINE_MAX) {
            errors.push(FieldError::new(
                "headline",
                format!("Headline must be less than {HEADLINE_MAX} characters"),
            ));
        }
        if too_long(&self.profile.summary, SUMMARY_MAX) {
            errors.push(FieldError::new(
                "summary",
                format!("Summary must be less than {SUMMARY_MAX} characters"),
            ));
        }

        for (i, edu) in self.education.iter().enumerate() {
            if edu.is_blank() {
                continue;
            }
            let at = |field: &str| format!("education[{i}].{field}");
            if too_long(&edu.institution, INSTITUTION_MAX) {
                errors.push(FieldError::new(
                    at("institution"),
                    format!("Institution name must be less than {INSTITUTION_MAX} characters"),
                ));
            }
            if edu.degree.trim().is_empty() {
                errors.push(FieldError::new(at("degree"), "Degree is required"));
            } else if too_long(&edu.degree, DEGREE_MAX) {
                errors.push(FieldError::new(
                    at("degree"),
                    format!("Degree must be less than {DEGREE_MAX} characters"),
                ));
            }
            if too_long(&edu.field_of_study, FIELD_OF_STUDY_MAX) {
                errors.push(FieldError::new(
                    at("fieldOfStudy"),
                    format!("Field of study must be less than {FIELD_OF_STUDY_MAX} characters"),
                ));
            }
            if ends_before_start(edu.start_date, edu.end_date) {
                errors.push(FieldError::new(
                    at("endDate"),
                    "End date must not be before start date",
                ));
            }
        }

        for (i, exp) in self.experience.iter().enumerate() {
            if exp.is_blank() {
                continue;
            }
            let at = |field: &str| format!("experience[{i}].{field}");
            if too_long(&exp.company, COMPANY_MAX) {
                errors.push(FieldError::new(
                    at("company"),
                    format!("Company name must be less than {COMPANY_MAX} characters"),
                ));
            }
            if exp.role.trim().is_empty() {
                errors.push(FieldError::new(at("role"), "Role is required"));
            } else if too_long(&exp.role, ROLE_MAX) {
                errors.push(FieldError::new(
                    at("role"),
                    format!("Role must be less than {ROLE_MAX} characters"),
                ));
            }
            if too_long(&exp.description, DESCRIPTION_MAX) {
                errors.push(FieldError::new(
                    at("description"),
                    format!("Description must be less than {DESCRIPTION_MAX} characters"),
                ));
            }
            let exp = exp.normalized();
            if ends_before_start(exp.start_date, exp.end_date) {
                errors.push(FieldError::new(
                    at("endDate"),
                    "End date must not be before start date",
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

/// One failed field constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All constraint violations found in a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

fn replace_at<T: Clone>(
    items: &[T],
    index: usize,
    entry: T,
    section: Section,
) -> Result<Vec<T>, DraftError> {
    if index >= items.len() {
        return Err(DraftError::IndexOutOfRange {
            section,
            index,
            len: items.len(),
        });
    }
    Ok(items
        .iter()
        .enumerate()
        .map(|(i, item)| if i == index { entry.clone() } else { item.clone() })
        .collect())
}

fn remove_at<T: Clone>(items: &[T], index: usize, section: Section) -> Result<Vec<T>, DraftError> {
    if index >= items.len() {
        return Err(DraftError::IndexOutOfRange {
            section,
            index,
            len: items.len(),
        });
    }
    if items.len() == 1 {
        return Ok(items.to_vec());
    }
    Ok(items
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, item)| item.clone())
        .collect())
}

fn too_long(value: &str, max: usize) -> bool {
    value.chars().count() > max
}

fn ends_before_start(start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    matches!((start, end), (Some(s), Some(e)) if e < s)
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn valid_draft() -> CvDraft {
        CvDraft {
            profile: ProfileDraft {
                headline: "Backend Engineer".to_string(),
                summary: "Ten years of services.".to_string(),
                is_public: true,
            },
            education: vec![EducationDraft {
                institution: "MIT".to_string(),
                degree: "BSc".to_string(),
                field_of_study: "CS".to_string(),
                start_date: date(2010, 9, 1),
                end_date: date(2014, 6, 1),
            }],
            experience: vec![ExperienceDraft {
                company: "Acme".to_string(),
                role: "Engineer".to_string(),
                description: String::new(),
                start_date: date(2014, 7, 1),
                end_date: None,
                is_current: true,
            }],
        }
    }

    #[test]
    fn new_draft_has_one_blank_entry_per_section() {
        let draft = CvDraft::default();
        assert_eq!(draft.education.len(), 1);
        assert_eq!(draft.experience.len(), 1);
        assert!(draft.education[0].is_blank());
        assert!(draft.experience[0].is_blank());
        assert!(draft.profile.is_public);
    }

    #[test]
    fn with_education_leaves_original_untouched() {
        let original = CvDraft::default();
        let entry = EducationDraft {
            institution: "ETH".to_string(),
            ..EducationDraft::default()
        };
        let updated = original.with_education(0, entry).unwrap();

        assert!(original.education[0].is_blank());
        assert_eq!(updated.education[0].institution, "ETH");
    }

    #[test]
    fn with_experience_out_of_range_fails() {
        let err = CvDraft::default()
            .with_experience(3, ExperienceDraft::default())
            .unwrap_err();
        assert_eq!(
            err,
            DraftError::IndexOutOfRange {
                section: Section::Experience,
                index: 3,
                len: 1
            }
        );
        assert!(err.to_string().contains("experience"));
    }

    #[test]
    fn push_then_remove_entries() {
        let draft = CvDraft::default().push_education().push_education();
        assert_eq!(draft.education.len(), 3);

        let draft = draft.without_education(1).unwrap();
        assert_eq!(draft.education.len(), 2);
    }

    #[test]
    fn removing_last_entry_keeps_it() {
        let draft = CvDraft::default();
        let after = draft.without_experience(0).unwrap();
        assert_eq!(after.experience.len(), 1);
    }

    #[test]
    fn remove_out_of_range_fails() {
        assert!(CvDraft::default().without_education(5).is_err());
    }

    #[test]
    fn valid_draft_passes() {
        assert!(valid_draft().validate().is_ok());
    }

    #[test]
    fn missing_headline_is_reported() {
        let draft = valid_draft().with_profile(ProfileDraft {
            headline: "   ".to_string(),
            ..ProfileDraft::default()
        });
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.0.len(), 1);
        assert_eq!(errors.0[0].field, "headline");
    }

    #[test]
    fn headline_length_counts_surrounding_spaces() {
        let headline = format!("  {}  ", "x".repeat(HEADLINE_MAX - 1));
        let draft = valid_draft().with_profile(ProfileDraft {
            headline,
            ..ProfileDraft::default()
        });
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.0[0].field, "headline");
        assert!(errors.0[0].message.contains("less than"));
    }

    #[test]
    fn long_summary_is_reported() {
        let draft = valid_draft().with_profile(ProfileDraft {
            headline: "ok".to_string(),
            summary: "x".repeat(SUMMARY_MAX + 1),
            is_public: true,
        });
        let errors = draft.validate().unwrap_err();
        assert!(errors.0.iter().any(|e| e.field == "summary"));
    }

    #[test]
    fn blank_entries_are_not_validated() {
        let draft = valid_draft().push_education().push_experience();
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn all_violations_are_collected() {
        let draft = valid_draft()
            .with_education(
                0,
                EducationDraft {
                    institution: "MIT".to_string(),
                    ..EducationDraft::default()
                },
            )
            .unwrap()
            .with_experience(
                0,
                ExperienceDraft {
                    company: "Acme".to_string(),
                    ..ExperienceDraft::default()
                },
            )
            .unwrap();
        let errors = draft.validate().unwrap_err();
        let fields: Vec<&str> = errors.0.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["education[0].degree", "experience[0].role"]);
        assert!(errors.to_string().contains("Degree is required"));
    }

    #[test]
    fn end_before_start_is_rejected() {
        let draft = valid_draft()
            .with_education(
                0,
                EducationDraft {
                    institution: "MIT".to_string(),
                    degree: "BSc".to_string(),
                    start_date: date(2014, 1, 1),
                    end_date: date(2010, 1, 1),
                    ..EducationDraft::default()
                },
            )
            .unwrap();
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.0[0].field, "education[0].endDate");
    }

    #[test]
    fn current_experience_ignores_stale_end_date_when_validating() {
        let draft = valid_draft()
            .with_experience(
                0,
                ExperienceDraft {
                    company: "Acme".to_string(),
                    role: "Engineer".to_string(),
                    start_date: date(2020, 1, 1),
                    end_date: date(2019, 1, 1),
                    is_current: true,
                    ..ExperienceDraft::default()
                },
            )
            .unwrap();
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn normalized_drops_end_date_for_current_position() {
        let exp = ExperienceDraft {
            company: "Acme".to_string(),
            end_date: date(2022, 1, 1),
            is_current: true,
            ..ExperienceDraft::default()
        };
        assert_eq!(exp.normalized().end_date, None);

        let past = ExperienceDraft {
            is_current: false,
            ..exp
        };
        assert_eq!(past.normalized().end_date, date(2022, 1, 1));
    }

    #[test]
    fn draft_serializes_camel_case() {
        let json = serde_json::to_value(valid_draft()).unwrap();
        assert_eq!(json["profile"]["isPublic"], true);
        assert_eq!(json["education"][0]["fieldOfStudy"], "CS");
        assert_eq!(json["education"][0]["startDate"], "2010-09-01");
        assert_eq!(json["experience"][0]["isCurrent"], true);
    }

    #[test]
    fn load_reads_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.json");
        std::fs::write(
            &path,
            r#"{"profile": {"headline": "Dev"}, "education": [{"institution": "MIT", "degree": "BSc"}]}"#,
        )
        .unwrap();

        let draft = CvDraft::load(&path).unwrap();
        assert_eq!(draft.profile.headline, "Dev");
        assert!(draft.profile.is_public);
        assert_eq!(draft.education.len(), 1);
        assert!(draft.experience.is_empty());
    }

    #[test]
    fn load_missing_file_fails_with_path() {
        let err = CvDraft::load(Path::new("/nonexistent/draft.json")).unwrap_err();
        assert!(err.to_string().contains("draft.json"));
    }
}
