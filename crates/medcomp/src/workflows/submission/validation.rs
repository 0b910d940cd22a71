use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use super::domain::{text, DraftField, Gender, SalaryType, SubmissionDraft};
use crate::workflows::store::{LocationKey, NewSalaryRecord};

const MAX_YEARS: f64 = 100.0;

/// Per-field messages for a draft that failed full-form validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<DraftField, String>);

impl ValidationErrors {
    fn add(&mut self, field: DraftField, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: DraftField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = DraftField> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn retain(&mut self, mut keep: impl FnMut(DraftField) -> bool) {
        self.0.retain(|field, _| keep(*field));
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.values().map(String::as_str).collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// A draft that passed every field rule, typed for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSubmission {
    pub specialty_id: Uuid,
    pub subspecialty_id: Option<Uuid>,
    pub job_family_id: Uuid,
    pub position_id: Uuid,
    pub location: LocationKey,
    pub years_in_position: u32,
    pub years_experience: u32,
    pub base_salary: f64,
    pub salary_type: SalaryType,
    pub bonus_compensation: Option<f64>,
    pub gender: Option<Gender>,
}

impl ValidatedSubmission {
    pub fn salary_record(&self, location_id: &str) -> NewSalaryRecord {
        NewSalaryRecord {
            specialty_id: self.specialty_id,
            subspecialty_id: self.subspecialty_id,
            job_family_id: self.job_family_id,
            position_id: self.position_id,
            location_id: location_id.to_string(),
            years_in_position: self.years_in_position,
            years_experience: self.years_experience,
            base_salary: self.base_salary,
            salary_type: self.salary_type,
            bonus_compensation: self.bonus_compensation,
            gender: self.gender,
        }
    }
}

pub fn validate(draft: &SubmissionDraft) -> Result<ValidatedSubmission, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let specialty = required_id(
        &mut errors,
        DraftField::Specialty,
        "Specialty",
        &draft.specialty,
    );
    let job_family = required_id(
        &mut errors,
        DraftField::JobFamily,
        "Job family",
        &draft.job_family,
    );
    let position = required_id(&mut errors, DraftField::Position, "Position", &draft.position);
    let subspecialty = match text(&draft.subspecialty) {
        None => None,
        Some(value) => match Uuid::parse_str(value) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.add(
                    DraftField::Subspecialty,
                    "Subspecialty must be a valid identifier",
                );
                None
            }
        },
    };

    let years_in_position = years(
        &mut errors,
        DraftField::YearsInPosition,
        "Years in position",
        draft.years_in_position,
    );
    let years_experience = years(
        &mut errors,
        DraftField::YearsExperience,
        "Years of experience",
        draft.years_experience,
    );
    if let (Some(in_position), Some(experience)) = (years_in_position, years_experience) {
        if experience < in_position {
            errors.add(
                DraftField::YearsExperience,
                "Years of experience cannot be less than years in position",
            );
        }
    }

    let location = if draft.location.display.trim().is_empty() {
        errors.add(DraftField::Location, "Location is required");
        None
    } else {
        match (
            text(&draft.location.city),
            text(&draft.location.state),
            text(&draft.location.country),
        ) {
            (Some(city), Some(state), Some(country)) => Some(LocationKey {
                city: city.to_string(),
                state: state.to_string(),
                country: country.to_string(),
            }),
            _ => {
                errors.add(
                    DraftField::Location,
                    "Select a location with a city, state and country",
                );
                None
            }
        }
    };

    let base_salary = match draft.base_salary {
        None => {
            errors.add(DraftField::BaseSalary, "Base salary is required");
            None
        }
        Some(value) if value.is_finite() && value > 0.0 => Some(value),
        Some(_) => {
            errors.add(DraftField::BaseSalary, "Base salary must be a positive number");
            None
        }
    };

    let salary_type = match text(&draft.salary_type) {
        None => {
            errors.add(DraftField::SalaryType, "Salary type is required");
            None
        }
        Some(value) => {
            let parsed = SalaryType::parse(value);
            if parsed.is_none() {
                errors.add(
                    DraftField::SalaryType,
                    "Salary type must be annually or hourly",
                );
            }
            parsed
        }
    };

    let bonus_compensation = match draft.bonus_compensation {
        Some(value) if !value.is_finite() => {
            errors.add(
                DraftField::BonusCompensation,
                "Bonus compensation must be a number",
            );
            None
        }
        Some(value) if value < 0.0 => {
            errors.add(
                DraftField::BonusCompensation,
                "Bonus compensation cannot be negative",
            );
            None
        }
        other => other,
    };

    let gender = match text(&draft.gender) {
        None => None,
        Some(value) => {
            let parsed = Gender::parse(value);
            if parsed.is_none() {
                errors.add(
                    DraftField::Gender,
                    "Gender must be male, female, other or prefer_not_to_say",
                );
            }
            parsed
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    match (
        specialty,
        job_family,
        position,
        location,
        years_in_position,
        years_experience,
        base_salary,
        salary_type,
    ) {
        (
            Some(specialty_id),
            Some(job_family_id),
            Some(position_id),
            Some(location),
            Some(years_in_position),
            Some(years_experience),
            Some(base_salary),
            Some(salary_type),
        ) => Ok(ValidatedSubmission {
            specialty_id,
            subspecialty_id: subspecialty,
            job_family_id,
            position_id,
            location,
            years_in_position,
            years_experience,
            base_salary,
            salary_type,
            bonus_compensation,
            gender,
        }),
        _ => Err(errors),
    }
}

fn required_id(
    errors: &mut ValidationErrors,
    field: DraftField,
    name: &str,
    value: &Option<String>,
) -> Option<Uuid> {
    match text(value) {
        None => {
            errors.add(field, format!("{name} is required"));
            None
        }
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.add(field, format!("{name} must be a valid identifier"));
                None
            }
        },
    }
}

fn years(
    errors: &mut ValidationErrors,
    field: DraftField,
    name: &str,
    value: Option<f64>,
) -> Option<u32> {
    match value {
        None => {
            errors.add(field, format!("{name} is required"));
            None
        }
        Some(value) if !value.is_finite() || value.fract() != 0.0 => {
            errors.add(field, format!("{name} must be a whole number"));
            None
        }
        Some(value) if value < 0.0 => {
            errors.add(field, format!("{name} cannot be negative"));
            None
        }
        Some(value) if value > MAX_YEARS => {
            errors.add(field, format!("{name} cannot exceed 100"));
            None
        }
        Some(value) => Some(value as u32),
    }
}
