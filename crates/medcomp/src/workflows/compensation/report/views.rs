use super::super::aggregate::{ExperiencePoint, LocationCount, PositionStat};
use super::super::domain::{DataQualityWarning, PracticeCategory, SalaryRecord};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryAverageEntry {
    pub category: PracticeCategory,
    pub category_label: &'static str,
    pub record_count: usize,
    pub has_data: bool,
    pub average_total_compensation: Option<f64>,
    pub min_total_compensation: Option<f64>,
    pub max_total_compensation: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationRankingEntry {
    pub category: PracticeCategory,
    pub category_label: &'static str,
    pub top_locations: Vec<LocationCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionGroupEntry {
    pub category: PracticeCategory,
    pub category_label: &'static str,
    pub positions: Vec<PositionStat>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompensationReportSummary {
    pub category_averages: Vec<CategoryAverageEntry>,
    pub experience_series: Vec<ExperiencePoint>,
    pub top_locations: Vec<LocationRankingEntry>,
    pub position_groups: Vec<PositionGroupEntry>,
    pub records: Vec<SalaryRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<DataQualityWarning>,
    pub total_rows: usize,
    pub valid_records: usize,
    pub excluded_rows: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExperienceBuckets {
    pub entry: usize,
    pub mid: usize,
    pub senior: usize,
}

/// Respondent counts by self-reported gender; `unspecified` covers rows without one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenderBreakdown {
    pub male: usize,
    pub female: usize,
    pub other: usize,
    pub prefer_not_to_say: usize,
    pub unspecified: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompensationInsights {
    pub total_reports: usize,
    pub overall_average: Option<f64>,
    pub private_practice_average: Option<f64>,
    pub academia_average: Option<f64>,
    pub average_base_salary: Option<f64>,
    pub average_years_experience: Option<f64>,
    pub experience_buckets: ExperienceBuckets,
    pub gender_breakdown: GenderBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_common_location: Option<LocationCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_paying_category: Option<&'static str>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub observations: Vec<String>,
}
