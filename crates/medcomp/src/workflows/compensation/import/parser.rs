use super::normalizer::{normalize_alias, normalize_label};
use crate::workflows::compensation::domain::{PracticeCategory, SalaryRow};
use crate::workflows::submission::domain::Gender;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::io::Read;

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<SalaryRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for record in csv_reader.deserialize::<CsvSalaryRow>() {
        rows.push(record?.into_row());
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct CsvSalaryRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    specialty: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    subspecialty: Option<String>,
    position: String,
    category: String,
    city: String,
    state: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    country: Option<String>,
    years_experience: u32,
    #[serde(default)]
    years_in_position: Option<u32>,
    #[serde(default)]
    base: Option<f64>,
    #[serde(default)]
    bonus: Option<f64>,
    #[serde(default)]
    stock: Option<f64>,
    #[serde(default)]
    other: Option<f64>,
    #[serde(default)]
    reported_on: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    gender: Option<String>,
}

impl CsvSalaryRow {
    fn into_row(self) -> SalaryRow {
        SalaryRow {
            id: self.id,
            specialty: normalize_label(&self.specialty),
            subspecialty: self.subspecialty.map(|value| normalize_label(&value)),
            position: normalize_label(&self.position),
            category: PracticeCategory::from_backend(&self.category)
                .key()
                .to_string(),
            city: normalize_label(&self.city),
            state: normalize_label(&self.state),
            country: self.country.map(|value| normalize_label(&value)),
            years_experience: self.years_experience,
            years_in_position: self.years_in_position,
            base: self.base,
            bonus: self.bonus,
            stock: self.stock,
            other: self.other,
            reported_on: self.reported_on,
            gender: self.gender.as_deref().and_then(parse_gender),
        }
    }
}

/// Unrecognized gender values are dropped rather than failing the import.
fn parse_gender(value: &str) -> Option<Gender> {
    let key = normalize_alias(value).replace(' ', "_");
    let gender = Gender::parse(&key);
    if gender.is_none() {
        tracing::debug!(value, "ignoring unrecognized gender value");
    }
    gender
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
