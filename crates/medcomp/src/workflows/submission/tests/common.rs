use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::compensation::domain::SalaryRow;
use crate::workflows::store::{
    CompensationStore, EmploymentCategoryRecord, LocationKey, LocationRecord, NewSalaryRecord,
    PositionListing, SalaryQuery, SpecialtyRecord, StoreError, SubspecialtyRecord,
};
use crate::workflows::submission::{
    DraftLocation, SubmissionDraft, SubmissionService, SubmissionSessions,
};

pub(super) const SPECIALTY_ID: &str = "1f6f1f8e-4c1e-4d5b-9a53-0c1d2b3a4f51";
pub(super) const JOB_FAMILY_ID: &str = "2a7e2d9f-5d2f-4e6c-8b64-1d2e3c4b5a62";
pub(super) const POSITION_ID: &str = "3b8f3eaf-6e3f-4f7d-9c75-2e3f4d5c6b73";

pub(super) fn location() -> DraftLocation {
    DraftLocation {
        display: "Seattle, WA, USA".to_string(),
        city: Some("Seattle".to_string()),
        state: Some("WA".to_string()),
        country: Some("USA".to_string()),
    }
}

pub(super) fn valid_draft() -> SubmissionDraft {
    SubmissionDraft {
        specialty: Some(SPECIALTY_ID.to_string()),
        subspecialty: None,
        job_family: Some(JOB_FAMILY_ID.to_string()),
        position: Some(POSITION_ID.to_string()),
        location: location(),
        years_in_position: Some(3.0),
        years_experience: Some(8.0),
        base_salary: Some(285_000.0),
        salary_type: Some("annually".to_string()),
        bonus_compensation: None,
        gender: None,
    }
}

/// In-memory store that counts writes and can be told to misbehave.
#[derive(Default)]
pub(super) struct MemoryStore {
    pub locations: Mutex<Vec<LocationRecord>>,
    pub salaries: Mutex<Vec<NewSalaryRecord>>,
    pub location_writes: AtomicUsize,
    pub salary_writes: AtomicUsize,
    /// Insert attempts that fail before inserts start succeeding.
    pub failing_inserts: AtomicUsize,
    /// `find_location` calls that miss an existing row, simulating a racing writer.
    pub missed_lookups: AtomicUsize,
}

impl MemoryStore {
    pub fn failing_inserts(count: usize) -> Self {
        let store = Self::default();
        store.failing_inserts.store(count, Ordering::SeqCst);
        store
    }

    pub fn writes(&self) -> (usize, usize) {
        (
            self.location_writes.load(Ordering::SeqCst),
            self.salary_writes.load(Ordering::SeqCst),
        )
    }

    pub fn location_count(&self) -> usize {
        self.locations.lock().expect("locations mutex").len()
    }

    pub fn seed_location(&self, id: &str, key: &LocationKey) {
        self.locations.lock().expect("locations mutex").push(LocationRecord {
            id: id.to_string(),
            city: key.city.clone(),
            state: key.state.clone(),
            country: key.country.clone(),
        });
    }
}

fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
        .is_ok()
}

impl CompensationStore for MemoryStore {
    fn salary_rows(&self, _query: &SalaryQuery) -> Result<Vec<SalaryRow>, StoreError> {
        Ok(Vec::new())
    }

    fn specialties(&self) -> Result<Vec<SpecialtyRecord>, StoreError> {
        Ok(Vec::new())
    }

    fn subspecialties(&self, _specialty_id: &str) -> Result<Vec<SubspecialtyRecord>, StoreError> {
        Ok(Vec::new())
    }

    fn positions(&self, category_id: &str) -> Result<PositionListing, StoreError> {
        Ok(PositionListing {
            category: EmploymentCategoryRecord {
                id: category_id.to_string(),
                name: "hospital_based".to_string(),
            },
            positions: Vec::new(),
        })
    }

    fn find_location(&self, key: &LocationKey) -> Result<Option<LocationRecord>, StoreError> {
        if take_one(&self.missed_lookups) {
            return Ok(None);
        }
        let locations = self.locations.lock().expect("locations mutex");
        Ok(locations.iter().find(|record| &record.key() == key).cloned())
    }

    fn create_location(&self, key: &LocationKey) -> Result<LocationRecord, StoreError> {
        let mut locations = self.locations.lock().expect("locations mutex");
        if locations.iter().any(|record| &record.key() == key) {
            return Err(StoreError::Conflict);
        }
        self.location_writes.fetch_add(1, Ordering::SeqCst);
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
        if take_one(&self.failing_inserts) {
            return Err(StoreError::Unavailable("insert timed out".to_string()));
        }
        self.salary_writes.fetch_add(1, Ordering::SeqCst);
        let mut salaries = self.salaries.lock().expect("salaries mutex");
        salaries.push(record.clone());
        Ok(format!("salary-{}", salaries.len()))
    }
}

/// Store whose every call fails.
pub(super) struct UnavailableStore;

impl CompensationStore for UnavailableStore {
    fn salary_rows(&self, _query: &SalaryQuery) -> Result<Vec<SalaryRow>, StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn specialties(&self) -> Result<Vec<SpecialtyRecord>, StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn subspecialties(&self, _specialty_id: &str) -> Result<Vec<SubspecialtyRecord>, StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn positions(&self, _category_id: &str) -> Result<PositionListing, StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn find_location(&self, _key: &LocationKey) -> Result<Option<LocationRecord>, StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn create_location(&self, _key: &LocationKey) -> Result<LocationRecord, StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn insert_salary(&self, _record: &NewSalaryRecord) -> Result<String, StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }
}

/// Memory store that parks the first location lookup until the test releases it.
pub(super) struct GatedStore {
    pub inner: MemoryStore,
    pub entered: Barrier,
    pub release: Barrier,
    gated: AtomicBool,
}

impl GatedStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::default(),
            entered: Barrier::new(2),
            release: Barrier::new(2),
            gated: AtomicBool::new(true),
        }
    }
}

impl CompensationStore for GatedStore {
    fn salary_rows(&self, query: &SalaryQuery) -> Result<Vec<SalaryRow>, StoreError> {
        self.inner.salary_rows(query)
    }

    fn specialties(&self) -> Result<Vec<SpecialtyRecord>, StoreError> {
        self.inner.specialties()
    }

    fn subspecialties(&self, specialty_id: &str) -> Result<Vec<SubspecialtyRecord>, StoreError> {
        self.inner.subspecialties(specialty_id)
    }

    fn positions(&self, category_id: &str) -> Result<PositionListing, StoreError> {
        self.inner.positions(category_id)
    }

    fn find_location(&self, key: &LocationKey) -> Result<Option<LocationRecord>, StoreError> {
        if self.gated.swap(false, Ordering::SeqCst) {
            self.entered.wait();
            self.release.wait();
        }
        self.inner.find_location(key)
    }

    fn create_location(&self, key: &LocationKey) -> Result<LocationRecord, StoreError> {
        self.inner.create_location(key)
    }

    fn insert_salary(&self, record: &NewSalaryRecord) -> Result<String, StoreError> {
        self.inner.insert_salary(record)
    }
}

pub(super) fn sessions_with<S>(store: Arc<S>) -> Arc<SubmissionSessions<S>>
where
    S: CompensationStore + 'static,
{
    Arc::new(SubmissionSessions::new(SubmissionService::with_redirect(
        store, "/thanks",
    )))
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}
