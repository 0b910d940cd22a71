//! Four-stage salary submission form and its persistence workflow.

pub mod domain;
mod machine;
pub mod router;
pub mod service;
pub mod sessions;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    DraftField, DraftLocation, FormStage, Gender, SalaryType, SubmissionDraft, SubmissionState,
};
pub use machine::{FormRejection, SubmissionForm};
pub use router::submission_router;
pub use service::{
    SubmissionError, SubmissionReceipt, SubmissionService, SubmitOutcome, DEFAULT_REDIRECT,
};
pub use sessions::{DraftId, FormView, SessionError, StageView, SubmissionSessions};
pub use validation::{validate, ValidatedSubmission, ValidationErrors};
