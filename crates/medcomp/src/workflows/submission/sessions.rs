use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use super::domain::{FormStage, SubmissionDraft, SubmissionState};
use super::machine::{FormRejection, SubmissionForm};
use super::service::{SubmissionError, SubmissionReceipt, SubmissionService};
use super::validation::ValidationErrors;
use crate::workflows::store::CompensationStore;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftId(pub String);

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static DRAFT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_draft_id() -> DraftId {
    let id = DRAFT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    DraftId(format!("draft-{id:06}"))
}

#[derive(Debug, Clone, Serialize)]
pub struct StageView {
    pub stage: FormStage,
    pub label: &'static str,
    pub unlocked: bool,
    pub complete: bool,
}

/// Everything the presentation layer needs to render one form session.
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub draft_id: DraftId,
    pub state: SubmissionState,
    pub state_label: &'static str,
    pub stages: Vec<StageView>,
    pub draft: SubmissionDraft,
    /// Errors for fields the user has filled in; untouched required fields stay quiet.
    #[serde(skip_serializing_if = "ValidationErrors::is_empty")]
    pub errors: ValidationErrors,
    pub can_submit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl FormView {
    fn of(draft_id: &DraftId, form: &SubmissionForm) -> Self {
        let stages = FormStage::ordered()
            .into_iter()
            .map(|stage| StageView {
                stage,
                label: stage.label(),
                unlocked: form.is_unlocked(stage),
                complete: form.is_complete(stage),
            })
            .collect();
        let state = form.state();
        let draft = form.draft();
        let mut errors = form.validate().err().unwrap_or_default();
        errors.retain(|field| field.is_touched(draft));

        Self {
            draft_id: draft_id.clone(),
            state,
            state_label: state.label(),
            stages,
            draft: draft.clone(),
            errors,
            can_submit: form.can_submit(),
            last_error: form.last_error().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("draft {0} not found")]
    NotFound(DraftId),
    #[error(transparent)]
    Rejected(#[from] FormRejection),
    #[error(transparent)]
    Persist(#[from] SubmissionError),
}

/// In-process registry of open form sessions.
///
/// The session map is never locked across a store call, so a second submit
/// for the same draft observes `Submitting` and is turned away. A successful
/// submit destroys the session.
pub struct SubmissionSessions<S> {
    service: SubmissionService<S>,
    forms: Mutex<HashMap<DraftId, SubmissionForm>>,
}

impl<S> SubmissionSessions<S>
where
    S: CompensationStore + 'static,
{
    pub fn new(service: SubmissionService<S>) -> Self {
        Self {
            service,
            forms: Mutex::new(HashMap::new()),
        }
    }

    fn forms(&self) -> MutexGuard<'_, HashMap<DraftId, SubmissionForm>> {
        self.forms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn open(&self) -> FormView {
        let draft_id = next_draft_id();
        let form = SubmissionForm::new();
        let view = FormView::of(&draft_id, &form);
        self.forms().insert(draft_id.clone(), form);
        tracing::debug!(%draft_id, "opened submission draft");
        view
    }

    pub fn view(&self, draft_id: &DraftId) -> Result<FormView, SessionError> {
        let forms = self.forms();
        let form = forms
            .get(draft_id)
            .ok_or_else(|| SessionError::NotFound(draft_id.clone()))?;
        Ok(FormView::of(draft_id, form))
    }

    pub fn update_draft(
        &self,
        draft_id: &DraftId,
        draft: SubmissionDraft,
    ) -> Result<FormView, SessionError> {
        let mut forms = self.forms();
        let form = forms
            .get_mut(draft_id)
            .ok_or_else(|| SessionError::NotFound(draft_id.clone()))?;
        form.replace_draft(draft)?;
        Ok(FormView::of(draft_id, form))
    }

    pub fn submit(&self, draft_id: &DraftId) -> Result<SubmissionReceipt, SessionError> {
        let submission = {
            let mut forms = self.forms();
            let form = forms
                .get_mut(draft_id)
                .ok_or_else(|| SessionError::NotFound(draft_id.clone()))?;
            form.begin_submit()?
        };

        tracing::info!(%draft_id, "submitting salary draft");
        let result = self.service.persist(&submission);

        {
            let mut forms = self.forms();
            match &result {
                Ok(_) => {
                    if forms.remove(draft_id).is_some() {
                        tracing::debug!(%draft_id, "draft destroyed after submission");
                    }
                }
                Err(error) => {
                    match forms.get_mut(draft_id) {
                        Some(form) => form.finish_submit(&result),
                        None => tracing::debug!(%draft_id, "draft abandoned while submitting"),
                    }
                    tracing::warn!(
                        %draft_id,
                        %error,
                        "salary submission failed; draft kept for retry"
                    );
                }
            }
        }

        Ok(result?)
    }

    /// Number of sessions still holding a draft.
    pub fn open_drafts(&self) -> usize {
        self.forms().len()
    }

    pub fn abandon(&self, draft_id: &DraftId) -> Result<(), SessionError> {
        self.forms()
            .remove(draft_id)
            .map(|_| ())
            .ok_or_else(|| SessionError::NotFound(draft_id.clone()))
    }

    #[cfg(test)]
    pub(crate) fn with_form<T>(
        &self,
        draft_id: &DraftId,
        f: impl FnOnce(&mut SubmissionForm) -> T,
    ) -> Option<T> {
        self.forms().get_mut(draft_id).map(f)
    }
}
