use serde::{Deserialize, Serialize};

/// One of the four sequential sections of the submission form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStage {
    Specialty,
    Experience,
    Compensation,
    Optional,
}

impl FormStage {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Specialty,
            Self::Experience,
            Self::Compensation,
            Self::Optional,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Specialty => "Specialty & Position",
            Self::Experience => "Experience & Location",
            Self::Compensation => "Compensation",
            Self::Optional => "Optional Details",
        }
    }

    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Specialty => Some(Self::Experience),
            Self::Experience => Some(Self::Compensation),
            Self::Compensation => Some(Self::Optional),
            Self::Optional => None,
        }
    }

    /// Completeness gate that unlocks the following stage.
    pub fn is_complete(self, draft: &SubmissionDraft) -> bool {
        match self {
            Self::Specialty => {
                is_set(&draft.specialty) && is_set(&draft.job_family) && is_set(&draft.position)
            }
            Self::Experience => {
                draft.years_in_position.is_some()
                    && draft.years_experience.is_some()
                    && !draft.location.display.trim().is_empty()
            }
            Self::Compensation => draft.base_salary.is_some() && is_set(&draft.salary_type),
            Self::Optional => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Specialty,
    Experience,
    Compensation,
    Optional,
    Submitting,
    Succeeded,
    Failed,
}

impl SubmissionState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Specialty => "Specialty",
            Self::Experience => "Experience",
            Self::Compensation => "Compensation",
            Self::Optional => "Optional",
            Self::Submitting => "Submitting",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
        }
    }
}

impl From<FormStage> for SubmissionState {
    fn from(stage: FormStage) -> Self {
        match stage {
            FormStage::Specialty => Self::Specialty,
            FormStage::Experience => Self::Experience,
            FormStage::Compensation => Self::Compensation,
            FormStage::Optional => Self::Optional,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryType {
    Annually,
    Hourly,
}

impl SalaryType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "annually" => Some(Self::Annually),
            "hourly" => Some(Self::Hourly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

impl Gender {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            "other" => Some(Self::Other),
            "prefer_not_to_say" => Some(Self::PreferNotToSay),
            _ => None,
        }
    }
}

/// Location as picked in the form; only a suggestion carries the resolved parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftLocation {
    pub display: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Form values as entered. Free-form so that validation can report per field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionDraft {
    pub specialty: Option<String>,
    pub subspecialty: Option<String>,
    pub job_family: Option<String>,
    pub position: Option<String>,
    pub location: DraftLocation,
    pub years_in_position: Option<f64>,
    pub years_experience: Option<f64>,
    pub base_salary: Option<f64>,
    pub salary_type: Option<String>,
    pub bonus_compensation: Option<f64>,
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    Specialty,
    Subspecialty,
    JobFamily,
    Position,
    Location,
    YearsInPosition,
    YearsExperience,
    BaseSalary,
    SalaryType,
    BonusCompensation,
    Gender,
}

impl DraftField {
    /// Whether the user has entered anything for this field yet.
    pub fn is_touched(self, draft: &SubmissionDraft) -> bool {
        match self {
            Self::Specialty => draft.specialty.is_some(),
            Self::Subspecialty => draft.subspecialty.is_some(),
            Self::JobFamily => draft.job_family.is_some(),
            Self::Position => draft.position.is_some(),
            Self::Location => {
                let location = &draft.location;
                !location.display.is_empty()
                    || location.city.is_some()
                    || location.state.is_some()
                    || location.country.is_some()
            }
            Self::YearsInPosition => draft.years_in_position.is_some(),
            Self::YearsExperience => draft.years_experience.is_some(),
            Self::BaseSalary => draft.base_salary.is_some(),
            Self::SalaryType => draft.salary_type.is_some(),
            Self::BonusCompensation => draft.bonus_compensation.is_some(),
            Self::Gender => draft.gender.is_some(),
        }
    }
}

pub(crate) fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|value| !value.trim().is_empty())
}

/// Non-blank, trimmed contents of an optional text field.
pub(crate) fn text(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
