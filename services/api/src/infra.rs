use medcomp::error::AppError;
use medcomp::workflows::compensation::{PracticeCategory, SalaryRow};
use medcomp::workflows::store::{
    CompensationStore, EmploymentCategoryRecord, LocationKey, LocationRecord, NewSalaryRecord,
    PositionListing, PositionRecord, SalaryQuery, SpecialtyRecord, StoreError,
    SubspecialtyRecord,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) const CARDIOLOGY_ID: &str = "0b5c6f0e-2f4d-4a8e-9d3c-5a1b2c3d4e01";
pub(crate) const PEDIATRICS_ID: &str = "0b5c6f0e-2f4d-4a8e-9d3c-5a1b2c3d4e02";
pub(crate) const INTERVENTIONAL_ID: &str = "1c6d7a1f-3a5e-4b9f-8e4d-6b2c3d4e5f01";
pub(crate) const HOSPITAL_CATEGORY_ID: &str = "2d7e8b2a-4b6f-4cae-9f5e-7c3d4e5f6a01";
pub(crate) const ACADEMIC_CATEGORY_ID: &str = "2d7e8b2a-4b6f-4cae-9f5e-7c3d4e5f6a02";
pub(crate) const STAFF_PHYSICIAN_ID: &str = "3e8f9c3b-5c7a-4dbf-8a6f-8d4e5f6a7b01";
pub(crate) const PROFESSOR_ID: &str = "3e8f9c3b-5c7a-4dbf-8a6f-8d4e5f6a7b02";

#[derive(Default)]
struct StoreState {
    rows: Vec<(String, SalaryRow)>,
    specialties: Vec<SpecialtyRecord>,
    subspecialties: Vec<SubspecialtyRecord>,
    categories: Vec<EmploymentCategoryRecord>,
    positions: Vec<PositionRecord>,
    locations: Vec<LocationRecord>,
    salaries: Vec<NewSalaryRecord>,
}

/// Process-local store backing the HTTP service and the CLI demo.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCompensationStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryCompensationStore {
    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store preloaded with a small reference dataset.
    pub(crate) fn seeded() -> Self {
        let store = Self::default();
        {
            let mut state = store.state();
            state.specialties = vec![
                specialty(CARDIOLOGY_ID, "Cardiology"),
                specialty(PEDIATRICS_ID, "Pediatrics"),
            ];
            state.subspecialties = vec![SubspecialtyRecord {
                id: INTERVENTIONAL_ID.to_string(),
                specialty_id: CARDIOLOGY_ID.to_string(),
                name: "Interventional".to_string(),
            }];
            state.categories = vec![
                EmploymentCategoryRecord {
                    id: HOSPITAL_CATEGORY_ID.to_string(),
                    name: "hospital_based".to_string(),
                },
                EmploymentCategoryRecord {
                    id: ACADEMIC_CATEGORY_ID.to_string(),
                    name: "academic_medicine".to_string(),
                },
            ];
            state.positions = vec![
                PositionRecord {
                    id: STAFF_PHYSICIAN_ID.to_string(),
                    category_id: HOSPITAL_CATEGORY_ID.to_string(),
                    name: "Staff Physician".to_string(),
                },
                PositionRecord {
                    id: PROFESSOR_ID.to_string(),
                    category_id: ACADEMIC_CATEGORY_ID.to_string(),
                    name: "Associate Professor".to_string(),
                },
            ];
            state.rows = SEED_ROWS.iter().map(SeedRow::to_row).collect();
        }
        store
    }

    pub(crate) fn submitted(&self) -> Vec<NewSalaryRecord> {
        self.state().salaries.clone()
    }

    pub(crate) fn location_count(&self) -> usize {
        self.state().locations.len()
    }
}

/// Resolve category keys from a request or the command line; empty means `fallback`.
pub(crate) fn categories_from_keys(
    keys: &[String],
    fallback: &[PracticeCategory],
) -> Result<Vec<PracticeCategory>, AppError> {
    if keys.is_empty() {
        return Ok(fallback.to_vec());
    }

    let mut categories = Vec::with_capacity(keys.len());
    for key in keys {
        let category = PracticeCategory::from_key(key)
            .ok_or_else(|| AppError::InvalidInput(format!("unknown category '{key}'")))?;
        if !categories.contains(&category) {
            categories.push(category);
        }
    }
    Ok(categories)
}

fn specialty(id: &str, name: &str) -> SpecialtyRecord {
    SpecialtyRecord {
        id: id.to_string(),
        name: name.to_string(),
    }
}

struct SeedRow {
    specialty_id: &'static str,
    specialty: &'static str,
    subspecialty: Option<&'static str>,
    position: &'static str,
    category: PracticeCategory,
    city: &'static str,
    state: &'static str,
    years_experience: u32,
    base: f64,
    bonus: Option<f64>,
}

impl SeedRow {
    fn to_row(&self) -> (String, SalaryRow) {
        let row = SalaryRow {
            id: None,
            specialty: self.specialty.to_string(),
            subspecialty: self.subspecialty.map(str::to_string),
            position: self.position.to_string(),
            category: self.category.key().to_string(),
            city: self.city.to_string(),
            state: self.state.to_string(),
            country: Some("USA".to_string()),
            years_experience: self.years_experience,
            years_in_position: None,
            base: Some(self.base),
            bonus: self.bonus,
            stock: None,
            other: None,
            reported_on: None,
            gender: None,
        };
        (self.specialty_id.to_string(), row)
    }
}

const SEED_ROWS: &[SeedRow] = &[
    SeedRow {
        specialty_id: CARDIOLOGY_ID,
        specialty: "Cardiology",
        subspecialty: Some("Interventional"),
        position: "Staff Physician",
        category: PracticeCategory::Hospital,
        city: "Boston",
        state: "MA",
        years_experience: 12,
        base: 420_000.0,
        bonus: Some(60_000.0),
    },
    SeedRow {
        specialty_id: CARDIOLOGY_ID,
        specialty: "Cardiology",
        subspecialty: None,
        position: "Staff Physician",
        category: PracticeCategory::Hospital,
        city: "Boston",
        state: "MA",
        years_experience: 6,
        base: 380_000.0,
        bonus: None,
    },
    SeedRow {
        specialty_id: CARDIOLOGY_ID,
        specialty: "Cardiology",
        subspecialty: None,
        position: "Section Chief",
        category: PracticeCategory::Hospital,
        city: "Houston",
        state: "TX",
        years_experience: 21,
        base: 510_000.0,
        bonus: Some(85_000.0),
    },
    SeedRow {
        specialty_id: CARDIOLOGY_ID,
        specialty: "Cardiology",
        subspecialty: None,
        position: "Associate Professor",
        category: PracticeCategory::Academia,
        city: "Ann Arbor",
        state: "MI",
        years_experience: 9,
        base: 290_000.0,
        bonus: Some(10_000.0),
    },
    SeedRow {
        specialty_id: CARDIOLOGY_ID,
        specialty: "Cardiology",
        subspecialty: None,
        position: "Partner",
        category: PracticeCategory::PrivatePractice,
        city: "Scottsdale",
        state: "AZ",
        years_experience: 16,
        base: 640_000.0,
        bonus: Some(110_000.0),
    },
    SeedRow {
        specialty_id: PEDIATRICS_ID,
        specialty: "Pediatrics",
        subspecialty: None,
        position: "Assistant Professor",
        category: PracticeCategory::Academia,
        city: "Ann Arbor",
        state: "MI",
        years_experience: 3,
        base: 205_000.0,
        bonus: None,
    },
    SeedRow {
        specialty_id: PEDIATRICS_ID,
        specialty: "Pediatrics",
        subspecialty: None,
        position: "Staff Physician",
        category: PracticeCategory::Hospital,
        city: "Denver",
        state: "CO",
        years_experience: 4,
        base: 240_000.0,
        bonus: Some(15_000.0),
    },
    SeedRow {
        specialty_id: PEDIATRICS_ID,
        specialty: "Pediatrics",
        subspecialty: None,
        position: "Principal Investigator",
        category: PracticeCategory::Research,
        city: "Bethesda",
        state: "MD",
        years_experience: 14,
        base: 230_000.0,
        bonus: None,
    },
];

fn matches_query(
    state: &StoreState,
    specialty_id: &str,
    row: &SalaryRow,
    query: &SalaryQuery,
) -> bool {
    if query
        .specialty_id
        .as_deref()
        .is_some_and(|wanted| wanted != specialty_id)
    {
        return false;
    }

    if let Some(wanted) = query.subspecialty_id.as_deref() {
        let name = state
            .subspecialties
            .iter()
            .find(|record| record.id == wanted)
            .map(|record| record.name.as_str());
        if name.is_none() || row.subspecialty.as_deref() != name {
            return false;
        }
    }

    if query
        .category
        .as_deref()
        .is_some_and(|wanted| wanted.trim() != row.category)
    {
        return false;
    }

    if query
        .position
        .as_deref()
        .is_some_and(|wanted| !row.position.eq_ignore_ascii_case(wanted.trim()))
    {
        return false;
    }

    query.location.as_deref().map_or(true, |wanted| {
        format!("{}, {}", row.city, row.state).eq_ignore_ascii_case(wanted.trim())
    })
}

/// Reporting row for a submitted salary, resolved against the reference tables.
fn submitted_row(state: &StoreState, record: &NewSalaryRecord) -> SalaryRow {
    let specialty_id = record.specialty_id.to_string();
    let specialty = state
        .specialties
        .iter()
        .find(|entry| entry.id == specialty_id)
        .map(|entry| entry.name.clone())
        .unwrap_or_default();
    let subspecialty = record.subspecialty_id.and_then(|id| {
        let id = id.to_string();
        state
            .subspecialties
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.name.clone())
    });
    let position_id = record.position_id.to_string();
    let position = state.positions.iter().find(|entry| entry.id == position_id);
    let category = position
        .and_then(|position| {
            state
                .categories
                .iter()
                .find(|entry| entry.id == position.category_id)
        })
        .map(|entry| PracticeCategory::from_backend(&entry.name).key().to_string())
        .unwrap_or_default();
    let location = state
        .locations
        .iter()
        .find(|entry| entry.id == record.location_id);

    SalaryRow {
        id: None,
        specialty,
        subspecialty,
        position: position.map(|entry| entry.name.clone()).unwrap_or_default(),
        category,
        city: location.map(|entry| entry.city.clone()).unwrap_or_default(),
        state: location.map(|entry| entry.state.clone()).unwrap_or_default(),
        country: location.map(|entry| entry.country.clone()),
        years_experience: record.years_experience,
        years_in_position: Some(record.years_in_position),
        base: Some(record.base_salary),
        bonus: record.bonus_compensation,
        stock: None,
        other: None,
        reported_on: None,
        gender: record.gender,
    }
}

impl CompensationStore for InMemoryCompensationStore {
    fn salary_rows(&self, query: &SalaryQuery) -> Result<Vec<SalaryRow>, StoreError> {
        let state = self.state();
        Ok(state
            .rows
            .iter()
            .filter(|(specialty_id, row)| matches_query(&state, specialty_id, row, query))
            .map(|(_, row)| row.clone())
            .collect())
    }

    fn specialties(&self) -> Result<Vec<SpecialtyRecord>, StoreError> {
        Ok(self.state().specialties.clone())
    }

    fn subspecialties(&self, specialty_id: &str) -> Result<Vec<SubspecialtyRecord>, StoreError> {
        let state = self.state();
        if !state.specialties.iter().any(|record| record.id == specialty_id) {
            return Err(StoreError::NotFound);
        }
        Ok(state
            .subspecialties
            .iter()
            .filter(|record| record.specialty_id == specialty_id)
            .cloned()
            .collect())
    }

    fn positions(&self, category_id: &str) -> Result<PositionListing, StoreError> {
        let state = self.state();
        let category = state
            .categories
            .iter()
            .find(|record| record.id == category_id)
            .cloned()
            .ok_or(StoreError::NotFound)?;
        let positions = state
            .positions
            .iter()
            .filter(|record| record.category_id == category_id)
            .cloned()
            .collect();
        Ok(PositionListing {
            category,
            positions,
        })
    }

    fn find_location(&self, key: &LocationKey) -> Result<Option<LocationRecord>, StoreError> {
        Ok(self
            .state()
            .locations
            .iter()
            .find(|record| &record.key() == key)
            .cloned())
    }

    fn create_location(&self, key: &LocationKey) -> Result<LocationRecord, StoreError> {
        let mut state = self.state();
        if state.locations.iter().any(|record| &record.key() == key) {
            return Err(StoreError::Conflict);
        }
        let record = LocationRecord {
            id: uuid::Uuid::new_v4().to_string(),
            city: key.city.clone(),
            state: key.state.clone(),
            country: key.country.clone(),
        };
        state.locations.push(record.clone());
        Ok(record)
    }

    fn insert_salary(&self, record: &NewSalaryRecord) -> Result<String, StoreError> {
        let mut state = self.state();
        let id = uuid::Uuid::new_v4().to_string();
        let mut row = submitted_row(&state, record);
        row.id = Some(id.clone());
        state.rows.push((record.specialty_id.to_string(), row));
        state.salaries.push(record.clone());
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medcomp::workflows::submission::domain::{Gender, SalaryType};

    #[test]
    fn salary_rows_filter_by_specialty_category_and_location() {
        let store = InMemoryCompensationStore::seeded();

        let cardiology = SalaryQuery {
            specialty_id: Some(CARDIOLOGY_ID.to_string()),
            ..SalaryQuery::default()
        };
        assert_eq!(store.salary_rows(&cardiology).expect("rows").len(), 5);

        let boston_hospital = SalaryQuery {
            category: Some("hospital".to_string()),
            location: Some("boston, ma".to_string()),
            ..SalaryQuery::default()
        };
        assert_eq!(store.salary_rows(&boston_hospital).expect("rows").len(), 2);

        let interventional = SalaryQuery {
            subspecialty_id: Some(INTERVENTIONAL_ID.to_string()),
            ..SalaryQuery::default()
        };
        assert_eq!(store.salary_rows(&interventional).expect("rows").len(), 1);

        let staff = SalaryQuery {
            specialty_id: Some(CARDIOLOGY_ID.to_string()),
            position: Some(" staff physician ".to_string()),
            ..SalaryQuery::default()
        };
        let rows = store.salary_rows(&staff).expect("rows");
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.position == "Staff Physician"));
    }

    #[test]
    fn inserted_salaries_show_up_in_report_rows() {
        let store = InMemoryCompensationStore::seeded();
        let location = store
            .create_location(&LocationKey {
                city: "Worcester".to_string(),
                state: "MA".to_string(),
                country: "USA".to_string(),
            })
            .expect("location");
        let record = NewSalaryRecord {
            specialty_id: CARDIOLOGY_ID.parse().expect("uuid"),
            subspecialty_id: Some(INTERVENTIONAL_ID.parse().expect("uuid")),
            job_family_id: HOSPITAL_CATEGORY_ID.parse().expect("uuid"),
            position_id: STAFF_PHYSICIAN_ID.parse().expect("uuid"),
            location_id: location.id,
            years_in_position: 2,
            years_experience: 8,
            base_salary: 400_000.0,
            salary_type: SalaryType::Annually,
            bonus_compensation: Some(20_000.0),
            gender: Some(Gender::Female),
        };
        let id = store.insert_salary(&record).expect("inserted");

        let query = SalaryQuery {
            location: Some("Worcester, MA".to_string()),
            ..SalaryQuery::default()
        };
        let rows = store.salary_rows(&query).expect("rows");
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.id.as_deref(), Some(id.as_str()));
        assert_eq!(row.specialty, "Cardiology");
        assert_eq!(row.subspecialty.as_deref(), Some("Interventional"));
        assert_eq!(row.position, "Staff Physician");
        assert_eq!(row.category, "hospital");
        assert_eq!(row.gender, Some(Gender::Female));
        assert_eq!(store.submitted(), vec![record]);
    }

    #[test]
    fn create_location_rejects_duplicate_triples() {
        let store = InMemoryCompensationStore::seeded();
        let key = LocationKey {
            city: "Boston".to_string(),
            state: "MA".to_string(),
            country: "USA".to_string(),
        };

        let created = store.create_location(&key).expect("created");
        assert_eq!(store.create_location(&key), Err(StoreError::Conflict));
        assert_eq!(store.find_location(&key), Ok(Some(created)));
        assert_eq!(store.location_count(), 1);
    }

    #[test]
    fn category_keys_fall_back_and_reject_unknown_values() {
        let fallback = PracticeCategory::ordered();
        assert_eq!(
            categories_from_keys(&[], &fallback).expect("fallback"),
            fallback.to_vec()
        );

        let keys = vec!["research".to_string(), "research".to_string()];
        assert_eq!(
            categories_from_keys(&keys, &fallback).expect("parsed"),
            vec![PracticeCategory::Research]
        );

        let keys = vec!["veterinary".to_string()];
        assert!(matches!(
            categories_from_keys(&keys, &fallback),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn unknown_lookups_are_not_found() {
        let store = InMemoryCompensationStore::seeded();
        assert_eq!(store.subspecialties("missing"), Err(StoreError::NotFound));
        assert!(matches!(
            store.positions("missing"),
            Err(StoreError::NotFound)
        ));
    }
}
