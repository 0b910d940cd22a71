use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use lru::LruCache;
use serde::Serialize;

use super::aggregate::CompensationAggregator;
use super::domain::{PracticeCategory, SalaryRow};
use super::refresh::{RefreshOutcome, ReportRefresh, ViewState};
use super::report::views::{CompensationInsights, CompensationReportSummary};
use crate::config::AggregationConfig;
use crate::workflows::store::{
    CompensationStore, PositionRecord, SalaryQuery, SpecialtyRecord, StoreError,
    SubspecialtyRecord,
};

/// Report body handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct CompensationReport {
    pub report: CompensationReportSummary,
    pub insights: CompensationInsights,
}

#[derive(Debug, Clone)]
pub enum ReportState {
    Ready(CompensationReport),
    /// The latest fetch failed; the previous report is still shown.
    Degraded {
        report: CompensationReport,
        error: String,
    },
    /// A newer request for the same scope has not finished yet.
    Pending,
    Unavailable {
        error: String,
    },
}

/// Position list with the display category resolved from backend metadata.
#[derive(Debug, Clone, Serialize)]
pub struct PositionListingView {
    pub category_id: String,
    pub category_name: String,
    pub display_category: PracticeCategory,
    pub display_label: &'static str,
    pub positions: Vec<PositionRecord>,
}

/// Refresh gate for one query scope; `id` tells a re-created gate from an evicted one.
struct ScopeGate {
    id: u64,
    refresh: ReportRefresh<CompensationReport>,
}

/// Fetches rows, aggregates them and gates results per query scope.
///
/// Scopes holding a report are kept in an LRU of `report_scopes` entries.
/// Scopes that end without a report and with nothing in flight are dropped.
pub struct CompensationReportService<S> {
    store: Arc<S>,
    aggregator: CompensationAggregator,
    top_locations: usize,
    next_scope: AtomicU64,
    scopes: Mutex<LruCache<SalaryQuery, ScopeGate>>,
}

impl<S> CompensationReportService<S>
where
    S: CompensationStore + 'static,
{
    pub fn new(store: Arc<S>, config: &AggregationConfig) -> Self {
        let capacity = NonZeroUsize::new(config.report_scopes).unwrap_or(NonZeroUsize::MIN);
        Self {
            store,
            aggregator: CompensationAggregator::new(config.categories.clone()),
            top_locations: config.top_locations,
            next_scope: AtomicU64::new(0),
            scopes: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn new_scope(&self) -> ScopeGate {
        ScopeGate {
            id: self.next_scope.fetch_add(1, Ordering::Relaxed),
            refresh: ReportRefresh::default(),
        }
    }

    pub fn report(&self, query: &SalaryQuery) -> ReportState {
        let (scope_id, ticket) = {
            let mut scopes = self.scopes.lock().unwrap_or_else(PoisonError::into_inner);
            let gate = scopes.get_or_insert_mut(query.clone(), || self.new_scope());
            (gate.id, gate.refresh.begin())
        };

        let fetched = self
            .store
            .salary_rows(query)
            .map(|rows| self.build_report(&rows));

        let mut scopes = self.scopes.lock().unwrap_or_else(PoisonError::into_inner);
        let outcome = match scopes.get_mut(query) {
            Some(gate) if gate.id == scope_id => gate.refresh.complete(ticket, fetched),
            Some(_) => RefreshOutcome::Stale,
            None => {
                tracing::debug!(?query, "report scope evicted during fetch");
                let gate = scopes.get_or_insert_mut(query.clone(), || self.new_scope());
                let ticket = gate.refresh.begin();
                gate.refresh.complete(ticket, fetched)
            }
        };

        let Some(gate) = scopes.get(query) else {
            return ReportState::Pending;
        };
        let state = report_state(query, outcome, &gate.refresh);
        if !gate.refresh.is_in_flight() && gate.refresh.current().is_none() {
            scopes.pop(query);
        }
        state
    }

    /// Number of query scopes currently retained.
    pub fn cached_scopes(&self) -> usize {
        self.scopes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn build_report(&self, rows: &[SalaryRow]) -> CompensationReport {
        let view = self.aggregator.aggregate(rows);
        let report = view.summary(self.top_locations);
        let insights = report.insights(&view);
        CompensationReport { report, insights }
    }

    pub fn specialties(&self) -> Result<Vec<SpecialtyRecord>, StoreError> {
        self.store.specialties()
    }

    pub fn subspecialties(
        &self,
        specialty_id: &str,
    ) -> Result<Vec<SubspecialtyRecord>, StoreError> {
        self.store.subspecialties(specialty_id)
    }

    pub fn positions(&self, category_id: &str) -> Result<PositionListingView, StoreError> {
        let listing = self.store.positions(category_id)?;
        let display_category = PracticeCategory::from_backend(&listing.category.name);
        Ok(PositionListingView {
            category_id: listing.category.id,
            category_name: listing.category.name,
            display_category,
            display_label: display_category.label(),
            positions: listing.positions,
        })
    }
}

fn report_state(
    query: &SalaryQuery,
    outcome: RefreshOutcome,
    gate: &ReportRefresh<CompensationReport>,
) -> ReportState {
    match (outcome, gate.state()) {
        (RefreshOutcome::Unavailable, ViewState::Ready(report)) => {
            let error = gate.last_error().unwrap_or_default().to_string();
            tracing::warn!(?query, %error, "salary fetch failed, serving previous report");
            ReportState::Degraded {
                report: report.clone(),
                error,
            }
        }
        (RefreshOutcome::Unavailable, _) => {
            let error = gate.last_error().unwrap_or_default().to_string();
            tracing::warn!(?query, %error, "salary fetch failed, no data available");
            ReportState::Unavailable { error }
        }
        (_, ViewState::Ready(report)) => ReportState::Ready(report.clone()),
        (_, ViewState::Pending) => ReportState::Pending,
        (_, ViewState::NoData) => ReportState::Unavailable {
            error: "no data available".to_string(),
        },
    }
}
