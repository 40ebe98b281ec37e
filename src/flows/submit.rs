use std::fmt;
use std::sync::Arc;

use crate::api::{ApiError, DirectoryApi};
use crate::consts::SUBMIT_FAILED;
use crate::draft::{CvDraft, ValidationErrors};
use crate::events::{Event, EventBus};

/// The stage a submission was in when it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CreateCv,
    AttachEducation,
    AttachExperience,
    JoinDirectory,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::CreateCv => "create CV",
            Stage::AttachEducation => "attach education",
            Stage::AttachExperience => "attach experience",
            Stage::JoinDirectory => "join directory",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The draft broke a field constraint; nothing was sent.
    #[error("{0}")]
    Invalid(#[from] ValidationErrors),
    /// A backend call failed. Earlier stages are not rolled back, so
    /// `cv_id` is set when the CV record already exists.
    #[error("{message}")]
    Failed {
        stage: Stage,
        cv_id: Option<i64>,
        message: String,
    },
}

/// A completed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub cv_id: i64,
    pub education_attached: usize,
    pub experience_attached: usize,
}

/// Creates a CV, attaches its entries and joins the directory, one awaited
/// call at a time. The first failure stops everything after it.
pub struct Submitter {
    api: Arc<dyn DirectoryApi>,
    events: Option<Arc<EventBus>>,
}

impl Submitter {
    pub fn new(api: Arc<dyn DirectoryApi>) -> Self {
        Self { api, events: None }
    }

    /// Publish progress on `events` as stages complete.
    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    pub async fn submit(&self, draft: &CvDraft) -> Result<SubmitReceipt, SubmitError> {
        draft.validate()?;

        let cv = self
            .api
            .create_cv(&draft.profile)
            .await
            .map_err(|e| failed(Stage::CreateCv, None, e))?;
        let cv_id = cv.id;
        tracing::info!(cv_id, "cv created");
        self.emit(Event::CvCreated { cv_id });

        let mut education_attached = 0;
        for (index, entry) in draft.education.iter().enumerate() {
            if entry.is_blank() {
                self.emit(Event::EntrySkipped {
                    section: "education",
                    index,
                });
                continue;
            }
            self.api
                .add_education(cv_id, entry)
                .await
                .map_err(|e| failed(Stage::AttachEducation, Some(cv_id), e))?;
            education_attached += 1;
            self.emit(Event::EducationAttached {
                index,
                institution: entry.institution.clone(),
            });
        }

        let mut experience_attached = 0;
        for (index, entry) in draft.experience.iter().enumerate() {
            if entry.is_blank() {
                self.emit(Event::EntrySkipped {
                    section: "experience",
                    index,
                });
                continue;
            }
            self.api
                .add_experience(cv_id, &entry.normalized())
                .await
                .map_err(|e| failed(Stage::AttachExperience, Some(cv_id), e))?;
            experience_attached += 1;
            self.emit(Event::ExperienceAttached {
                index,
                company: entry.company.clone(),
            });
        }

        self.api
            .join_directory()
            .await
            .map_err(|e| failed(Stage::JoinDirectory, Some(cv_id), e))?;
        self.emit(Event::DirectoryJoined);

        tracing::info!(
            cv_id,
            education_attached,
            experience_attached,
            "submission complete"
        );
        Ok(SubmitReceipt {
            cv_id,
            education_attached,
            experience_attached,
        })
    }

    fn emit(&self, event: Event) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }
}

fn failed(stage: Stage, cv_id: Option<i64>, err: ApiError) -> SubmitError {
    tracing::warn!(%stage, ?cv_id, error = %err, "submission stopped");
    SubmitError::Failed {
        stage,
        cv_id,
        message: err.user_message(SUBMIT_FAILED),
    }
}
