//! Data-store collaborator shared by the report and submission workflows.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::compensation::domain::SalaryRow;
use super::submission::domain::{Gender, SalaryType};

/// Filter set a salary report is fetched for. Also the key of a refresh scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SalaryQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subspecialty_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Position title, matched case-insensitively.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialtyRecord {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubspecialtyRecord {
    pub id: String,
    pub specialty_id: String,
    pub name: String,
}

/// Backend employment category; `name` carries the backend enumeration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentCategoryRecord {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub id: String,
    pub category_id: String,
    pub name: String,
}

/// Positions of one employment category together with the category metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionListing {
    pub category: EmploymentCategoryRecord,
    pub positions: Vec<PositionRecord>,
}

/// Identity of a persisted location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationKey {
    pub city: String,
    pub state: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

impl LocationRecord {
    pub fn key(&self) -> LocationKey {
        LocationKey {
            city: self.city.clone(),
            state: self.state.clone(),
            country: self.country.clone(),
        }
    }
}

/// Salary row written by a successful submission. Absent optionals persist as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSalaryRecord {
    pub specialty_id: Uuid,
    pub subspecialty_id: Option<Uuid>,
    pub job_family_id: Uuid,
    pub position_id: Uuid,
    pub location_id: String,
    pub years_in_position: u32,
    pub years_experience: u32,
    pub base_salary: f64,
    pub salary_type: SalaryType,
    pub bonus_compensation: Option<f64>,
    pub gender: Option<Gender>,
}

/// Storage abstraction so the workflows can be exercised in isolation.
pub trait CompensationStore: Send + Sync {
    fn salary_rows(&self, query: &SalaryQuery) -> Result<Vec<SalaryRow>, StoreError>;
    fn specialties(&self) -> Result<Vec<SpecialtyRecord>, StoreError>;
    fn subspecialties(&self, specialty_id: &str) -> Result<Vec<SubspecialtyRecord>, StoreError>;
    fn positions(&self, category_id: &str) -> Result<PositionListing, StoreError>;

    /// Exact `(city, state, country)` lookup.
    fn find_location(&self, key: &LocationKey) -> Result<Option<LocationRecord>, StoreError>;
    /// Must answer [`StoreError::Conflict`] when the triple already exists.
    fn create_location(&self, key: &LocationKey) -> Result<LocationRecord, StoreError>;
    /// Returns the identifier of the inserted salary row.
    fn insert_salary(&self, record: &NewSalaryRecord) -> Result<String, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
