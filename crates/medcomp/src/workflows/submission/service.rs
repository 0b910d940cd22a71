use std::sync::Arc;

use serde::Serialize;

use super::machine::SubmissionForm;
use super::validation::ValidatedSubmission;
use super::FormRejection;
use crate::workflows::store::{CompensationStore, LocationKey, LocationRecord, StoreError};

pub const DEFAULT_REDIRECT: &str = "/";

/// Identifiers handed back after a successful submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub salary_id: String,
    pub location_id: String,
    pub redirect_to: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmissionError {
    #[error("unable to resolve location: {0}")]
    Location(#[source] StoreError),
    #[error("unable to record salary: {0}")]
    Insert(#[source] StoreError),
}

/// Result of driving a form through one submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Recorded(SubmissionReceipt),
    Rejected(FormRejection),
    Failed(SubmissionError),
}

/// Performs the dependent location and salary writes for a validated draft.
pub struct SubmissionService<S> {
    store: Arc<S>,
    redirect_to: String,
}

impl<S> SubmissionService<S>
where
    S: CompensationStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_redirect(store, DEFAULT_REDIRECT)
    }

    pub fn with_redirect(store: Arc<S>, redirect_to: impl Into<String>) -> Self {
        Self {
            store,
            redirect_to: redirect_to.into(),
        }
    }

    /// Find the exact triple or create it. A concurrent create is resolved by re-reading.
    pub fn resolve_location(&self, key: &LocationKey) -> Result<LocationRecord, SubmissionError> {
        let existing = self
            .store
            .find_location(key)
            .map_err(SubmissionError::Location)?;
        if let Some(existing) = existing {
            tracing::debug!(location_id = %existing.id, "reusing location");
            return Ok(existing);
        }

        match self.store.create_location(key) {
            Ok(created) => {
                tracing::info!(location_id = %created.id, city = %key.city, "created location");
                Ok(created)
            }
            Err(StoreError::Conflict) => self
                .store
                .find_location(key)
                .map_err(SubmissionError::Location)?
                .ok_or(SubmissionError::Location(StoreError::Conflict)),
            Err(other) => Err(SubmissionError::Location(other)),
        }
    }

    pub fn persist(
        &self,
        submission: &ValidatedSubmission,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let location = self.resolve_location(&submission.location)?;
        let record = submission.salary_record(&location.id);

        let salary_id = self.store.insert_salary(&record).map_err(|error| {
            tracing::warn!(location_id = %location.id, %error, "salary insert failed");
            SubmissionError::Insert(error)
        })?;

        tracing::info!(%salary_id, location_id = %location.id, "recorded salary submission");
        Ok(SubmissionReceipt {
            salary_id,
            location_id: location.id,
            redirect_to: self.redirect_to.clone(),
        })
    }

    /// Run a whole submit cycle against a form owned by the caller.
    pub fn submit(&self, form: &mut SubmissionForm) -> SubmitOutcome {
        let submission = match form.begin_submit() {
            Ok(submission) => submission,
            Err(rejection) => return SubmitOutcome::Rejected(rejection),
        };

        let result = self.persist(&submission);
        form.finish_submit(&result);

        match result {
            Ok(receipt) => SubmitOutcome::Recorded(receipt),
            Err(error) => SubmitOutcome::Failed(error),
        }
    }
}
