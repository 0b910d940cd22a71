use super::domain::{DataQualityWarning, PracticeCategory, SalaryRecord, SalaryRow};
use serde::Serialize;
use std::collections::HashMap;

/// One point of the experience scatter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExperiencePoint {
    pub years: u32,
    pub total_compensation: f64,
    pub category: PracticeCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationCount {
    pub location: String,
    pub count: usize,
}

/// Location counter that remembers first-seen order for tie-breaks.
#[derive(Debug, Clone, Default)]
pub struct LocationTally {
    entries: Vec<LocationCount>,
    index: HashMap<String, usize>,
}

impl LocationTally {
    pub fn record(&mut self, location: String) {
        match self.index.get(&location) {
            Some(&slot) => self.entries[slot].count += 1,
            None => {
                self.index.insert(location.clone(), self.entries.len());
                self.entries.push(LocationCount { location, count: 1 });
            }
        }
    }

    pub fn count(&self, location: &str) -> usize {
        self.index
            .get(location)
            .map(|&slot| self.entries[slot].count)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest counts first; equal counts keep first-seen order.
    pub fn top(&self, n: usize) -> Vec<LocationCount> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(n);
        ranked
    }
}

/// Rounded per-position compensation means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionStat {
    pub position: String,
    pub count: usize,
    pub base: i64,
    pub bonus: i64,
    pub other: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Default)]
struct PositionAccumulator {
    position: String,
    count: usize,
    base: f64,
    bonus: f64,
    other: f64,
    total: f64,
}

impl PositionAccumulator {
    fn add(&mut self, record: &SalaryRecord) {
        let compensation = &record.compensation;
        self.count += 1;
        self.base += compensation.base;
        self.bonus += compensation.bonus.unwrap_or(0.0);
        self.other += compensation.other.unwrap_or(0.0);
        self.total += record.total_compensation;
    }

    fn finish(&self) -> PositionStat {
        let count = self.count as f64;
        PositionStat {
            position: self.position.clone(),
            count: self.count,
            base: round_half_up(self.base / count),
            bonus: round_half_up(self.bonus / count),
            other: round_half_up(self.other / count),
            total: round_half_up(self.total / count),
        }
    }
}

pub(crate) fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryTotal {
    pub count: usize,
    pub sum: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl CategoryTotal {
    fn add(&mut self, total: f64) {
        self.count += 1;
        self.sum += total;
        self.min = Some(self.min.map_or(total, |min| min.min(total)));
        self.max = Some(self.max.map_or(total, |max| max.max(total)));
    }

    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Grouped statistics derived from one fetch of salary rows.
#[derive(Debug, Clone, Default)]
pub struct AggregatedView {
    categories: Vec<PracticeCategory>,
    category_totals: HashMap<PracticeCategory, CategoryTotal>,
    experience_points: Vec<ExperiencePoint>,
    location_counts: HashMap<PracticeCategory, LocationTally>,
    overall_locations: LocationTally,
    position_stats: HashMap<PracticeCategory, Vec<PositionStat>>,
    records: Vec<SalaryRecord>,
    warnings: Vec<DataQualityWarning>,
    total_rows: usize,
}

impl AggregatedView {
    pub fn categories(&self) -> &[PracticeCategory] {
        &self.categories
    }

    /// `None` means "no data"; never zero for an empty partition.
    pub fn average_total_compensation(&self, category: PracticeCategory) -> Option<f64> {
        self.category_totals
            .get(&category)
            .and_then(CategoryTotal::average)
    }

    pub fn category_total(&self, category: PracticeCategory) -> CategoryTotal {
        self.category_totals
            .get(&category)
            .copied()
            .unwrap_or_default()
    }

    /// Averages in configured category order.
    pub fn average_by_category(&self) -> Vec<(PracticeCategory, Option<f64>)> {
        self.categories
            .iter()
            .map(|&category| (category, self.average_total_compensation(category)))
            .collect()
    }

    pub fn experience_series(&self) -> &[ExperiencePoint] {
        &self.experience_points
    }

    pub fn experience_series_for(&self, category: PracticeCategory) -> Vec<ExperiencePoint> {
        self.experience_points
            .iter()
            .filter(|point| point.category == category)
            .copied()
            .collect()
    }

    pub fn location_counts(&self, category: PracticeCategory) -> Option<&LocationTally> {
        self.location_counts.get(&category)
    }

    pub fn top_locations(&self, category: PracticeCategory, n: usize) -> Vec<LocationCount> {
        self.location_counts
            .get(&category)
            .map(|tally| tally.top(n))
            .unwrap_or_default()
    }

    /// Location tally over every recognized record regardless of category.
    pub fn overall_locations(&self) -> &LocationTally {
        &self.overall_locations
    }

    pub fn position_stats(&self, category: PracticeCategory) -> &[PositionStat] {
        self.position_stats
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every valid record, including those outside the recognized categories.
    pub fn records(&self) -> &[SalaryRecord] {
        &self.records
    }

    pub fn recognized_records(&self) -> impl Iterator<Item = &SalaryRecord> {
        self.records.iter().filter(|record| {
            record
                .practice_category()
                .is_some_and(|category| self.categories.contains(&category))
        })
    }

    pub fn warnings(&self) -> &[DataQualityWarning] {
        &self.warnings
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }
}

/// Turns raw rows into an [`AggregatedView`] over a fixed set of recognized categories.
#[derive(Debug, Clone)]
pub struct CompensationAggregator {
    categories: Vec<PracticeCategory>,
}

impl CompensationAggregator {
    pub fn new(categories: Vec<PracticeCategory>) -> Self {
        Self { categories }
    }

    pub fn standard() -> Self {
        Self::new(PracticeCategory::ordered().to_vec())
    }

    pub fn categories(&self) -> &[PracticeCategory] {
        &self.categories
    }

    pub fn aggregate(&self, rows: &[SalaryRow]) -> AggregatedView {
        let mut view = AggregatedView {
            categories: self.categories.clone(),
            total_rows: rows.len(),
            ..AggregatedView::default()
        };
        let mut positions: HashMap<PracticeCategory, Vec<PositionAccumulator>> = HashMap::new();

        for category in &self.categories {
            view.category_totals.insert(*category, CategoryTotal::default());
        }

        for (row_index, row) in rows.iter().enumerate() {
            let record = match SalaryRecord::from_row(row.clone()) {
                Ok(record) => record,
                Err(issue) => {
                    tracing::debug!(row_index, detail = %issue.summary(), "excluding salary row");
                    view.warnings.push(DataQualityWarning {
                        row_index,
                        record_id: row.id.clone(),
                        detail: issue.summary(),
                        issue,
                    });
                    continue;
                }
            };

            let recognized = record
                .practice_category()
                .filter(|category| self.categories.contains(category));

            if let Some(category) = recognized {
                view.category_totals
                    .entry(category)
                    .or_default()
                    .add(record.total_compensation);

                view.experience_points.push(ExperiencePoint {
                    years: record.years_experience,
                    total_compensation: record.total_compensation,
                    category,
                });

                let location = record.location_key();
                view.overall_locations.record(location.clone());
                view.location_counts
                    .entry(category)
                    .or_default()
                    .record(location);

                let accumulators = positions.entry(category).or_default();
                match accumulators
                    .iter_mut()
                    .find(|acc| acc.position == record.position)
                {
                    Some(acc) => acc.add(&record),
                    None => {
                        let mut acc = PositionAccumulator {
                            position: record.position.clone(),
                            ..PositionAccumulator::default()
                        };
                        acc.add(&record);
                        accumulators.push(acc);
                    }
                }
            }

            view.records.push(record);
        }

        view.experience_points.sort_by_key(|point| point.years);
        view.position_stats = positions
            .into_iter()
            .map(|(category, accumulators)| {
                let stats = accumulators.iter().map(PositionAccumulator::finish).collect();
                (category, stats)
            })
            .collect();

        tracing::debug!(
            rows = view.total_rows,
            valid = view.records.len(),
            excluded = view.warnings.len(),
            "aggregated salary rows"
        );

        view
    }
}

impl Default for CompensationAggregator {
    fn default() -> Self {
        Self::standard()
    }
}

pub fn aggregate(rows: &[SalaryRow], categories: &[PracticeCategory]) -> AggregatedView {
    CompensationAggregator::new(categories.to_vec()).aggregate(rows)
}
