//! Salary aggregation, report views, and the report refresh pipeline.

mod aggregate;
pub mod domain;
mod import;
mod refresh;
pub mod report;
pub mod router;
pub mod service;

pub use aggregate::{
    aggregate, AggregatedView, CategoryTotal, CompensationAggregator, ExperiencePoint,
    LocationCount, LocationTally, PositionStat,
};
pub use domain::{
    Compensation, DataQualityIssue, DataQualityWarning, PracticeCategory, SalaryRecord, SalaryRow,
};
pub use import::{SalaryCsvImporter, SalaryImportError};
pub use refresh::{RefreshOutcome, RefreshTicket, ReportRefresh, ViewState};
pub use report::views::{
    CategoryAverageEntry, CompensationInsights, CompensationReportSummary, ExperienceBuckets,
    GenderBreakdown, LocationRankingEntry, PositionGroupEntry,
};
pub use router::compensation_router;
pub use service::{CompensationReport, CompensationReportService, PositionListingView, ReportState};
