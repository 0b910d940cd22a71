use super::import::normalize_label;
use crate::workflows::submission::domain::Gender;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Practice-setting classification used to partition compensation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeCategory {
    Academia,
    Hospital,
    PrivatePractice,
    Research,
}

impl PracticeCategory {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Academia,
            Self::Hospital,
            Self::PrivatePractice,
            Self::Research,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Academia => "academia",
            Self::Hospital => "hospital",
            Self::PrivatePractice => "private_practice",
            Self::Research => "research",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Academia => "Academic Medicine",
            Self::Hospital => "Hospital Practice",
            Self::PrivatePractice => "Private Practice",
            Self::Research => "Research",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|category| category.key() == key.trim())
    }

    /// Map a backend employment-category value onto a display category.
    ///
    /// Total: anything unrecognized is reported as [`PracticeCategory::Hospital`],
    /// matching how the dashboards have always bucketed unknown values.
    pub fn from_backend(value: &str) -> Self {
        match super::import::category_for_backend(value) {
            Some(category) => category,
            None => {
                tracing::warn!(
                    value = %normalize_label(value),
                    "unmapped practice category, defaulting to hospital"
                );
                Self::Hospital
            }
        }
    }
}

impl fmt::Display for PracticeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw salary row as returned by the data store or a CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRow {
    #[serde(default)]
    pub id: Option<String>,
    pub specialty: String,
    #[serde(default)]
    pub subspecialty: Option<String>,
    pub position: String,
    pub category: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub country: Option<String>,
    pub years_experience: u32,
    #[serde(default)]
    pub years_in_position: Option<u32>,
    #[serde(default)]
    pub base: Option<f64>,
    #[serde(default)]
    pub bonus: Option<f64>,
    #[serde(default)]
    pub stock: Option<f64>,
    #[serde(default)]
    pub other: Option<f64>,
    #[serde(default)]
    pub reported_on: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<Gender>,
}

/// Compensation breakdown; optional components are absent, not zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Compensation {
    pub base: f64,
    pub bonus: Option<f64>,
    pub stock: Option<f64>,
    pub other: Option<f64>,
}

impl Compensation {
    pub fn total(&self) -> f64 {
        self.base
            + [self.bonus, self.stock, self.other]
                .into_iter()
                .flatten()
                .sum::<f64>()
    }
}

/// A salary row that passed the data-quality gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryRecord {
    pub id: Option<String>,
    pub specialty: String,
    pub subspecialty: Option<String>,
    pub position: String,
    pub category: String,
    pub city: String,
    pub state: String,
    pub country: Option<String>,
    pub years_experience: u32,
    pub years_in_position: Option<u32>,
    pub compensation: Compensation,
    pub total_compensation: f64,
    pub reported_on: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

impl SalaryRecord {
    pub fn from_row(row: SalaryRow) -> Result<Self, DataQualityIssue> {
        let base = match row.base {
            None => return Err(DataQualityIssue::MissingBase),
            Some(value) if !value.is_finite() => {
                return Err(DataQualityIssue::NonFiniteAmount { field: "base" })
            }
            Some(value) if value < 0.0 => return Err(DataQualityIssue::NegativeBase { value }),
            Some(value) => value,
        };

        for (field, amount) in [("bonus", row.bonus), ("stock", row.stock), ("other", row.other)] {
            if amount.is_some_and(|value| !value.is_finite()) {
                return Err(DataQualityIssue::NonFiniteAmount { field });
            }
        }

        let compensation = Compensation {
            base,
            bonus: row.bonus,
            stock: row.stock,
            other: row.other,
        };

        Ok(Self {
            id: row.id,
            specialty: row.specialty,
            subspecialty: row.subspecialty,
            position: row.position,
            category: row.category,
            city: row.city,
            state: row.state,
            country: row.country,
            years_experience: row.years_experience,
            years_in_position: row.years_in_position,
            total_compensation: compensation.total(),
            compensation,
            reported_on: row.reported_on,
            gender: row.gender,
        })
    }

    pub fn practice_category(&self) -> Option<PracticeCategory> {
        PracticeCategory::from_key(&self.category)
    }

    /// `"City, ST"` with whitespace collapsed and the state upper-cased.
    pub fn location_key(&self) -> String {
        let city = normalize_label(&self.city);
        let state = normalize_label(&self.state).to_uppercase();
        match (city.is_empty(), state.is_empty()) {
            (false, false) => format!("{city}, {state}"),
            (false, true) => city,
            (true, _) => state,
        }
    }
}

/// Reason a row was excluded from aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityIssue {
    MissingBase,
    NegativeBase { value: f64 },
    NonFiniteAmount { field: &'static str },
}

impl DataQualityIssue {
    pub fn summary(&self) -> String {
        match self {
            DataQualityIssue::MissingBase => "missing base compensation".to_string(),
            DataQualityIssue::NegativeBase { value } => {
                format!("negative base compensation ({value})")
            }
            DataQualityIssue::NonFiniteAmount { field } => {
                format!("{field} compensation is not a finite number")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQualityWarning {
    pub row_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    pub issue: DataQualityIssue,
    pub detail: String,
}
