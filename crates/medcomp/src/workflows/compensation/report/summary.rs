use super::super::aggregate::AggregatedView;
use super::views::{
    CategoryAverageEntry, CompensationInsights, CompensationReportSummary, LocationRankingEntry,
    PositionGroupEntry,
};

impl AggregatedView {
    /// Serializable report in configured category order.
    pub fn summary(&self, top_locations: usize) -> CompensationReportSummary {
        let category_averages = self
            .categories()
            .iter()
            .map(|&category| {
                let totals = self.category_total(category);
                let average = totals.average();
                CategoryAverageEntry {
                    category,
                    category_label: category.label(),
                    record_count: totals.count,
                    has_data: average.is_some(),
                    average_total_compensation: average,
                    min_total_compensation: totals.min,
                    max_total_compensation: totals.max,
                }
            })
            .collect();

        let top = self
            .categories()
            .iter()
            .filter_map(|&category| {
                self.location_counts(category)
                    .map(|tally| LocationRankingEntry {
                        category,
                        category_label: category.label(),
                        top_locations: tally.top(top_locations),
                    })
            })
            .collect();

        let position_groups = self
            .categories()
            .iter()
            .filter(|&&category| !self.position_stats(category).is_empty())
            .map(|&category| PositionGroupEntry {
                category,
                category_label: category.label(),
                positions: self.position_stats(category).to_vec(),
            })
            .collect();

        CompensationReportSummary {
            category_averages,
            experience_series: self.experience_series().to_vec(),
            top_locations: top,
            position_groups,
            records: self.records().to_vec(),
            warnings: self.warnings().to_vec(),
            total_rows: self.total_rows(),
            valid_records: self.records().len(),
            excluded_rows: self.warnings().len(),
        }
    }
}

impl CompensationReportSummary {
    pub fn insights(&self, view: &AggregatedView) -> CompensationInsights {
        super::generate_insights(self, view)
    }
}
