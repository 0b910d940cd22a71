use std::fmt::Display;

use super::domain::{FormStage, SubmissionDraft, SubmissionState};
use super::validation::{validate, ValidatedSubmission, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Editing,
    Submitting,
    Succeeded,
    Failed,
}

/// Why the form refused an edit or a submit request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormRejection {
    #[error("a submission is already in flight")]
    InFlight,
    #[error("the submission has already been recorded")]
    AlreadySubmitted,
    #[error("the compensation section is not complete yet")]
    Incomplete,
    #[error("the form has validation errors: {0}")]
    Invalid(ValidationErrors),
}

/// Four-stage submission form.
///
/// Stage unlocking and full-form validity are tracked separately: a stage
/// stays unlocked once revealed even if a later edit breaks its gate, while
/// submission is gated on [`validate`] every time.
#[derive(Debug, Clone)]
pub struct SubmissionForm {
    draft: SubmissionDraft,
    unlocked: FormStage,
    phase: Phase,
    last_error: Option<String>,
}

impl Default for SubmissionForm {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionForm {
    pub fn new() -> Self {
        Self {
            draft: SubmissionDraft::default(),
            unlocked: FormStage::Specialty,
            phase: Phase::Editing,
            last_error: None,
        }
    }

    pub fn with_draft(draft: SubmissionDraft) -> Self {
        let mut form = Self::new();
        form.draft = draft;
        form.advance();
        form
    }

    pub fn draft(&self) -> &SubmissionDraft {
        &self.draft
    }

    pub fn state(&self) -> SubmissionState {
        match self.phase {
            Phase::Editing => self.unlocked.into(),
            Phase::Submitting => SubmissionState::Submitting,
            Phase::Succeeded => SubmissionState::Succeeded,
            Phase::Failed => SubmissionState::Failed,
        }
    }

    /// Furthest stage revealed so far.
    pub fn current_stage(&self) -> FormStage {
        self.unlocked
    }

    pub fn is_unlocked(&self, stage: FormStage) -> bool {
        stage <= self.unlocked
    }

    pub fn is_complete(&self, stage: FormStage) -> bool {
        stage.is_complete(&self.draft)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Apply an edit to the draft and reveal any stage it completes.
    ///
    /// Editing a failed submission returns the form to its current stage.
    pub fn edit<F>(&mut self, change: F) -> Result<(), FormRejection>
    where
        F: FnOnce(&mut SubmissionDraft),
    {
        match self.phase {
            Phase::Submitting => return Err(FormRejection::InFlight),
            Phase::Succeeded => return Err(FormRejection::AlreadySubmitted),
            Phase::Failed => self.phase = Phase::Editing,
            Phase::Editing => {}
        }

        change(&mut self.draft);
        self.advance();
        Ok(())
    }

    pub fn replace_draft(&mut self, draft: SubmissionDraft) -> Result<(), FormRejection> {
        self.edit(|current| *current = draft)
    }

    fn advance(&mut self) {
        while self.unlocked.is_complete(&self.draft) {
            match self.unlocked.next() {
                Some(next) => {
                    tracing::debug!(stage = next.label(), "unlocked form stage");
                    self.unlocked = next;
                }
                None => break,
            }
        }
    }

    pub fn validate(&self) -> Result<ValidatedSubmission, ValidationErrors> {
        validate(&self.draft)
    }

    pub fn can_submit(&self) -> bool {
        matches!(self.phase, Phase::Editing | Phase::Failed)
            && self.is_unlocked(FormStage::Optional)
            && self.validate().is_ok()
    }

    /// Move into `Submitting`. A second call while in flight is rejected and
    /// leaves the form untouched.
    pub fn begin_submit(&mut self) -> Result<ValidatedSubmission, FormRejection> {
        match self.phase {
            Phase::Submitting => return Err(FormRejection::InFlight),
            Phase::Succeeded => return Err(FormRejection::AlreadySubmitted),
            Phase::Editing | Phase::Failed => {}
        }

        if !self.is_unlocked(FormStage::Optional) {
            return Err(FormRejection::Incomplete);
        }

        let submission = self.validate().map_err(FormRejection::Invalid)?;
        self.phase = Phase::Submitting;
        self.last_error = None;
        Ok(submission)
    }

    /// Record the persist result. Success clears the draft; failure keeps it for a retry.
    pub fn finish_submit<T, E: Display>(&mut self, result: &Result<T, E>) {
        if self.phase != Phase::Submitting {
            return;
        }

        match result {
            Ok(_) => {
                self.phase = Phase::Succeeded;
                self.draft = SubmissionDraft::default();
            }
            Err(err) => {
                self.phase = Phase::Failed;
                self.last_error = Some(err.to_string());
            }
        }
    }
}
