use super::super::aggregate::AggregatedView;
use super::super::domain::PracticeCategory;
use super::views::{
    CompensationInsights, CompensationReportSummary, ExperienceBuckets, GenderBreakdown,
};
use crate::workflows::submission::domain::Gender;

const MID_CAREER_YEARS: u32 = 5;
const SENIOR_YEARS: u32 = 15;

pub(crate) fn generate_insights(
    summary: &CompensationReportSummary,
    view: &AggregatedView,
) -> CompensationInsights {
    let total_reports: usize = summary
        .category_averages
        .iter()
        .map(|entry| entry.record_count)
        .sum();

    let averages: Vec<f64> = summary
        .category_averages
        .iter()
        .filter_map(|entry| entry.average_total_compensation)
        .collect();
    let overall_average = if averages.is_empty() {
        None
    } else {
        Some(averages.iter().sum::<f64>() / averages.len() as f64)
    };

    let average_for = |category: PracticeCategory| {
        summary
            .category_averages
            .iter()
            .find(|entry| entry.category == category)
            .and_then(|entry| entry.average_total_compensation)
    };
    let private_practice_average = average_for(PracticeCategory::PrivatePractice);
    let academia_average = average_for(PracticeCategory::Academia);

    let mut experience_buckets = ExperienceBuckets::default();
    let mut gender_breakdown = GenderBreakdown::default();
    let mut base_sum = 0.0;
    let mut years_sum = 0u64;
    let mut recognized = 0usize;
    for record in view.recognized_records() {
        match record.years_experience {
            years if years < MID_CAREER_YEARS => experience_buckets.entry += 1,
            years if years < SENIOR_YEARS => experience_buckets.mid += 1,
            _ => experience_buckets.senior += 1,
        }
        match record.gender {
            Some(Gender::Male) => gender_breakdown.male += 1,
            Some(Gender::Female) => gender_breakdown.female += 1,
            Some(Gender::Other) => gender_breakdown.other += 1,
            Some(Gender::PreferNotToSay) => gender_breakdown.prefer_not_to_say += 1,
            None => gender_breakdown.unspecified += 1,
        }
        base_sum += record.compensation.base;
        years_sum += u64::from(record.years_experience);
        recognized += 1;
    }
    let average_base_salary = (recognized > 0).then(|| base_sum / recognized as f64);
    let average_years_experience =
        (recognized > 0).then(|| years_sum as f64 / recognized as f64);

    let most_common_location = view.overall_locations().top(1).into_iter().next();

    let mut highest: Option<(&'static str, f64)> = None;
    for entry in &summary.category_averages {
        if let Some(average) = entry.average_total_compensation {
            if highest.map_or(true, |(_, best)| average > best) {
                highest = Some((entry.category_label, average));
            }
        }
    }
    let highest_paying_category = highest.map(|(label, _)| label);

    let mut observations = Vec::new();
    if total_reports > 0 {
        observations.push(format!(
            "{} report{} across {} categor{} with data",
            total_reports,
            if total_reports == 1 { "" } else { "s" },
            averages.len(),
            if averages.len() == 1 { "y" } else { "ies" }
        ));
    }

    if let (Some(private), Some(academia)) = (private_practice_average, academia_average) {
        if academia > 0.0 {
            let gap = (private - academia) / academia * 100.0;
            observations.push(format!(
                "Private practice averages {:.0}% {} than academic medicine",
                gap.abs(),
                if gap >= 0.0 { "more" } else { "less" }
            ));
        }
    }

    if summary.excluded_rows > 0 {
        observations.push(format!(
            "{} row(s) excluded for data-quality issues",
            summary.excluded_rows
        ));
    }

    if observations.is_empty() {
        observations.push("No compensation data available for this selection".to_string());
    }

    CompensationInsights {
        total_reports,
        overall_average,
        private_practice_average,
        academia_average,
        average_base_salary,
        average_years_experience,
        experience_buckets,
        gender_breakdown,
        most_common_location,
        highest_paying_category,
        observations,
    }
}
