//! CSV ingestion of salary exports into raw [`SalaryRow`]s.

mod mapping;
mod normalizer;
mod parser;

use super::domain::SalaryRow;
use std::io::Read;
use std::path::Path;

pub(crate) use mapping::category_for_backend;
pub(crate) use normalizer::normalize_label;

#[derive(Debug)]
pub enum SalaryImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for SalaryImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SalaryImportError::Io(err) => write!(f, "failed to read salary export: {}", err),
            SalaryImportError::Csv(err) => write!(f, "invalid salary CSV data: {}", err),
        }
    }
}

impl std::error::Error for SalaryImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SalaryImportError::Io(err) => Some(err),
            SalaryImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SalaryImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SalaryImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct SalaryCsvImporter;

impl SalaryCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<SalaryRow>, SalaryImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<SalaryRow>, SalaryImportError> {
        let rows = parser::parse_rows(reader)?;
        tracing::debug!(rows = rows.len(), "parsed salary export");
        Ok(rows)
    }
}
