use std::sync::{Arc, Mutex};

use medcomp::workflows::compensation::SalaryRow;
use medcomp::workflows::store::{
    CompensationStore, LocationKey, LocationRecord, NewSalaryRecord, PositionListing,
    SalaryQuery, SpecialtyRecord, StoreError, SubspecialtyRecord,
};
use medcomp::workflows::submission::{
    DraftField, DraftLocation, FormRejection, FormStage, SessionError, SubmissionDraft,
    SubmissionService, SubmissionSessions, SubmissionState,
};

#[derive(Default)]
struct LedgerStore {
    locations: Mutex<Vec<LocationRecord>>,
    salaries: Mutex<Vec<NewSalaryRecord>>,
}

impl CompensationStore for LedgerStore {
    fn salary_rows(&self, _query: &SalaryQuery) -> Result<Vec<SalaryRow>, StoreError> {
        Ok(Vec::new())
    }

    fn specialties(&self) -> Result<Vec<SpecialtyRecord>, StoreError> {
        Ok(Vec::new())
    }

    fn subspecialties(&self, _specialty_id: &str) -> Result<Vec<SubspecialtyRecord>, StoreError> {
        Ok(Vec::new())
    }

    fn positions(&self, _category_id: &str) -> Result<PositionListing, StoreError> {
        Err(StoreError::NotFound)
    }

    fn find_location(&self, key: &LocationKey) -> Result<Option<LocationRecord>, StoreError> {
        let locations = self.locations.lock().expect("locations mutex");
        Ok(locations.iter().find(|record| &record.key() == key).cloned())
    }

    fn create_location(&self, key: &LocationKey) -> Result<LocationRecord, StoreError> {
        let mut locations = self.locations.lock().expect("locations mutex");
        let record = LocationRecord {
            id: format!("loc-{}", locations.len() + 1),
            city: key.city.clone(),
            state: key.state.clone(),
            country: key.country.clone(),
        };
        locations.push(record.clone());
        Ok(record)
    }

    fn insert_salary(&self, record: &NewSalaryRecord) -> Result<String, StoreError> {
        let mut salaries = self.salaries.lock().expect("salaries mutex");
        salaries.push(record.clone());
        Ok(format!("sal-{}", salaries.len()))
    }
}

fn sessions(store: Arc<LedgerStore>) -> SubmissionSessions<LedgerStore> {
    SubmissionSessions::new(SubmissionService::with_redirect(store, "/salaries"))
}

fn stage_unlocked(view: &medcomp::workflows::submission::FormView, stage: FormStage) -> bool {
    view.stages
        .iter()
        .find(|entry| entry.stage == stage)
        .map(|entry| entry.unlocked)
        .unwrap_or(false)
}

#[test]
fn form_walkthrough_records_one_salary() {
    let store = Arc::new(LedgerStore::default());
    let sessions = sessions(store.clone());
    let draft_id = sessions.open().draft_id;

    let mut draft = SubmissionDraft {
        specialty: Some("6d0d1c3e-9a57-4c43-bb19-7e9c1f0a2b11".to_string()),
        job_family: Some("7e1e2d4f-0b68-4d54-8c2a-8f0d2a1b3c22".to_string()),
        position: Some("8f2f3e5a-1c79-4e65-9d3b-902e3b2c4d33".to_string()),
        ..SubmissionDraft::default()
    };
    let view = sessions
        .update_draft(&draft_id, draft.clone())
        .expect("specialty stage saved");
    assert_eq!(view.state, SubmissionState::Experience);

    draft.location = DraftLocation {
        display: "Rochester, MN, USA".to_string(),
        city: Some("Rochester".to_string()),
        state: Some("MN".to_string()),
        country: Some("USA".to_string()),
    };
    draft.years_in_position = Some(2.0);
    draft.years_experience = Some(9.0);
    let view = sessions
        .update_draft(&draft_id, draft.clone())
        .expect("experience stage saved");
    assert_eq!(view.state, SubmissionState::Compensation);
    assert!(!view.can_submit);

    assert_eq!(
        sessions.submit(&draft_id),
        Err(SessionError::Rejected(FormRejection::Incomplete))
    );

    draft.base_salary = Some(155.0);
    draft.salary_type = Some("hourly".to_string());
    draft.bonus_compensation = Some(12_000.0);
    draft.gender = Some("female".to_string());
    let view = sessions
        .update_draft(&draft_id, draft)
        .expect("compensation stage saved");
    assert_eq!(view.state, SubmissionState::Optional);
    assert!(view.can_submit);

    let receipt = sessions.submit(&draft_id).expect("submission recorded");
    assert_eq!(receipt.salary_id, "sal-1");
    assert_eq!(receipt.redirect_to, "/salaries");

    assert_eq!(
        sessions.view(&draft_id).map(|view| view.state),
        Err(SessionError::NotFound(draft_id.clone()))
    );
    assert_eq!(sessions.open_drafts(), 0);

    let salaries = store.salaries.lock().expect("salaries mutex");
    assert_eq!(salaries.len(), 1);
    assert_eq!(salaries[0].bonus_compensation, Some(12_000.0));
    assert_eq!(salaries[0].years_experience, 9);
}

#[test]
fn unlocked_stages_survive_a_regressing_edit() {
    let sessions = sessions(Arc::new(LedgerStore::default()));
    let draft_id = sessions.open().draft_id;

    let full = SubmissionDraft {
        specialty: Some("6d0d1c3e-9a57-4c43-bb19-7e9c1f0a2b11".to_string()),
        job_family: Some("7e1e2d4f-0b68-4d54-8c2a-8f0d2a1b3c22".to_string()),
        position: Some("8f2f3e5a-1c79-4e65-9d3b-902e3b2c4d33".to_string()),
        location: DraftLocation {
            display: "Rochester".to_string(),
            ..DraftLocation::default()
        },
        years_in_position: Some(10.0),
        years_experience: Some(5.0),
        base_salary: Some(1.0),
        salary_type: Some("annually".to_string()),
        ..SubmissionDraft::default()
    };
    let view = sessions.update_draft(&draft_id, full).expect("saved");
    assert!(stage_unlocked(&view, FormStage::Optional));
    assert_eq!(
        view.errors.get(DraftField::YearsExperience),
        Some("Years of experience cannot be less than years in position")
    );
    assert!(view.errors.get(DraftField::Location).is_some());
    assert!(!view.can_submit);

    let view = sessions
        .update_draft(&draft_id, SubmissionDraft::default())
        .expect("cleared");
    for stage in FormStage::ordered() {
        assert!(stage_unlocked(&view, stage));
    }
}
