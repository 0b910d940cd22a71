use crate::infra::{
    categories_from_keys, InMemoryCompensationStore, CARDIOLOGY_ID, HOSPITAL_CATEGORY_ID,
    INTERVENTIONAL_ID, STAFF_PHYSICIAN_ID,
};
use clap::Args;
use medcomp::config::AggregationConfig;
use medcomp::error::AppError;
use medcomp::workflows::compensation::{
    CompensationAggregator, CompensationInsights, CompensationReportService,
    CompensationReportSummary, ReportState, SalaryCsvImporter,
};
use medcomp::workflows::store::SalaryQuery;
use medcomp::workflows::submission::{
    DraftLocation, FormView, SessionError, SubmissionDraft, SubmissionService,
    SubmissionSessions,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Restrict the demo report to these category keys (repeatable)
    #[arg(long)]
    pub(crate) category: Vec<String>,
    /// Skip the submission form portion of the demo
    #[arg(long)]
    pub(crate) skip_submission: bool,
}

#[derive(Args, Debug)]
pub(crate) struct SalaryReportArgs {
    /// Salary CSV export to aggregate
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Recognized category keys (repeatable); defaults to all four
    #[arg(long)]
    pub(crate) category: Vec<String>,
    /// Number of locations to rank per category
    #[arg(long)]
    pub(crate) top: Option<usize>,
    /// Print every valid record after the summary
    #[arg(long)]
    pub(crate) list_records: bool,
}

pub(crate) fn run_salary_report(args: SalaryReportArgs) -> Result<(), AppError> {
    let SalaryReportArgs {
        csv,
        category,
        top,
        list_records,
    } = args;

    let defaults = AggregationConfig::default();
    let categories = categories_from_keys(&category, &defaults.categories)?;
    let top = match top {
        Some(0) => return Err(AppError::InvalidInput("--top must be at least 1".to_string())),
        Some(value) => value,
        None => defaults.top_locations,
    };

    let rows = SalaryCsvImporter::from_path(&csv)?;
    let view = CompensationAggregator::new(categories).aggregate(&rows);
    let summary = view.summary(top);
    let insights = summary.insights(&view);

    println!("Compensation report for {}", csv.display());
    render_report(&summary, &insights, list_records);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        category,
        skip_submission,
    } = args;

    let mut aggregation = AggregationConfig::default();
    aggregation.categories = categories_from_keys(&category, &aggregation.categories)?;

    let store = Arc::new(InMemoryCompensationStore::seeded());
    let reports = CompensationReportService::new(store.clone(), &aggregation);

    println!("Medical compensation demo");
    let query = SalaryQuery {
        specialty_id: Some(CARDIOLOGY_ID.to_string()),
        ..SalaryQuery::default()
    };
    match reports.report(&query) {
        ReportState::Ready(body) | ReportState::Degraded { report: body, .. } => {
            println!("Cardiology report (seeded data)");
            render_report(&body.report, &body.insights, false);
        }
        ReportState::Pending => println!("Cardiology report still loading"),
        ReportState::Unavailable { error } => println!("Cardiology report unavailable: {error}"),
    }

    match reports.positions(HOSPITAL_CATEGORY_ID) {
        Ok(listing) => {
            println!(
                "\nPositions for {} ({})",
                listing.category_name, listing.display_label
            );
            for position in &listing.positions {
                println!("- {}", position.name);
            }
        }
        Err(err) => println!("\nPosition lookup unavailable: {err}"),
    }

    if skip_submission {
        return Ok(());
    }

    println!("\nSubmission form walkthrough");
    let sessions = SubmissionSessions::new(SubmissionService::with_redirect(
        store.clone(),
        "/salaries",
    ));

    for attempt in 1..=2 {
        let draft_id = sessions.open().draft_id;
        let mut draft = SubmissionDraft::default();

        for (step, apply) in demo_steps().into_iter().enumerate() {
            apply(&mut draft);
            match sessions.update_draft(&draft_id, draft.clone()) {
                Ok(view) => render_form_step(attempt, step + 1, &view),
                Err(err) => println!("  Draft update rejected: {err}"),
            }
        }

        match sessions.submit(&draft_id) {
            Ok(receipt) => println!(
                "  Submitted salary {} at location {} -> redirect {}",
                receipt.salary_id, receipt.location_id, receipt.redirect_to
            ),
            Err(SessionError::Persist(err)) => println!("  Submission failed, draft kept: {err}"),
            Err(err) => println!("  Submission rejected: {err}"),
        }
    }

    println!(
        "Stored {} submission(s) across {} location record(s)",
        store.submitted().len(),
        store.location_count()
    );

    Ok(())
}

type DraftStep = fn(&mut SubmissionDraft);

fn demo_steps() -> [DraftStep; 4] {
    [
        |draft| {
            draft.specialty = Some(CARDIOLOGY_ID.to_string());
            draft.subspecialty = Some(INTERVENTIONAL_ID.to_string());
            draft.job_family = Some(HOSPITAL_CATEGORY_ID.to_string());
            draft.position = Some(STAFF_PHYSICIAN_ID.to_string());
        },
        |draft| {
            draft.years_in_position = Some(4.0);
            draft.years_experience = Some(11.0);
            draft.location = DraftLocation {
                display: "Boston, MA, USA".to_string(),
                city: Some("Boston".to_string()),
                state: Some("MA".to_string()),
                country: Some("USA".to_string()),
            };
        },
        |draft| {
            draft.base_salary = Some(415_000.0);
            draft.salary_type = Some("annually".to_string());
        },
        |draft| {
            draft.bonus_compensation = Some(45_000.0);
        },
    ]
}

fn render_form_step(attempt: usize, step: usize, view: &FormView) {
    let unlocked: Vec<&str> = view
        .stages
        .iter()
        .filter(|stage| stage.unlocked)
        .map(|stage| stage.label)
        .collect();
    println!(
        "  [{} {}.{}] state {} | unlocked: {} | can submit: {}",
        view.draft_id,
        attempt,
        step,
        view.state_label,
        unlocked.join(", "),
        view.can_submit
    );
}

pub(crate) fn render_report(
    summary: &CompensationReportSummary,
    insights: &CompensationInsights,
    list_records: bool,
) {
    println!(
        "Rows: {} total | {} valid | {} excluded",
        summary.total_rows, summary.valid_records, summary.excluded_rows
    );

    println!("\nAverage total compensation");
    for entry in &summary.category_averages {
        match entry.average_total_compensation {
            Some(average) => println!(
                "- {}: ${:.0} ({} report{}, range ${:.0} to ${:.0})",
                entry.category_label,
                average,
                entry.record_count,
                if entry.record_count == 1 { "" } else { "s" },
                entry.min_total_compensation.unwrap_or(average),
                entry.max_total_compensation.unwrap_or(average)
            ),
            None => println!("- {}: no data", entry.category_label),
        }
    }

    if !summary.top_locations.is_empty() {
        println!("\nTop locations");
        for ranking in &summary.top_locations {
            let places: Vec<String> = ranking
                .top_locations
                .iter()
                .map(|entry| format!("{} ({})", entry.location, entry.count))
                .collect();
            println!("- {}: {}", ranking.category_label, places.join(", "));
        }
    }

    if !summary.position_groups.is_empty() {
        println!("\nPositions");
        for group in &summary.position_groups {
            println!("{}", group.category_label);
            for stat in &group.positions {
                println!(
                    "  - {} x{}: base ${} | bonus ${} | other ${} | total ${}",
                    stat.position, stat.count, stat.base, stat.bonus, stat.other, stat.total
                );
            }
        }
    }

    println!("\nInsights");
    match insights.overall_average {
        Some(average) => println!("- Overall average: ${average:.0}"),
        None => println!("- Overall average: no data"),
    }
    if let (Some(base), Some(years)) = (
        insights.average_base_salary,
        insights.average_years_experience,
    ) {
        println!("- Average base salary: ${base:.0} | average experience: {years:.1} years");
    }
    let genders = insights.gender_breakdown;
    println!(
        "- Gender: {} male | {} female | {} other | {} prefer not to say | {} unspecified",
        genders.male, genders.female, genders.other, genders.prefer_not_to_say, genders.unspecified
    );
    println!(
        "- Experience: {} entry | {} mid-career | {} senior",
        insights.experience_buckets.entry,
        insights.experience_buckets.mid,
        insights.experience_buckets.senior
    );
    if let Some(location) = &insights.most_common_location {
        println!(
            "- Most common location: {} ({})",
            location.location, location.count
        );
    }
    if let Some(category) = insights.highest_paying_category {
        println!("- Highest paying category: {category}");
    }
    for note in &insights.observations {
        println!("- {note}");
    }

    if !summary.warnings.is_empty() {
        println!("\nData-quality warnings");
        for warning in &summary.warnings {
            match &warning.record_id {
                Some(id) => println!("- row {} ({}): {}", warning.row_index, id, warning.detail),
                None => println!("- row {}: {}", warning.row_index, warning.detail),
            }
        }
    }

    if list_records {
        println!("\nRecords");
        for record in &summary.records {
            println!(
                "- {} | {} | {} | {}y | ${:.0}",
                record.specialty,
                record.position,
                record.location_key(),
                record.years_experience,
                record.total_compensation
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../crates/medcomp/tests/fixtures/salary_export.csv")
    }

    #[test]
    fn salary_report_runs_against_fixture_export() {
        run_salary_report(SalaryReportArgs {
            csv: fixture(),
            category: vec!["hospital".to_string(), "academia".to_string()],
            top: Some(2),
            list_records: true,
        })
        .expect("report renders");
    }

    #[test]
    fn salary_report_rejects_unknown_category_and_zero_top() {
        let unknown = run_salary_report(SalaryReportArgs {
            csv: fixture(),
            category: vec!["veterinary".to_string()],
            top: None,
            list_records: false,
        });
        assert!(matches!(unknown, Err(AppError::InvalidInput(_))));

        let zero = run_salary_report(SalaryReportArgs {
            csv: fixture(),
            category: Vec::new(),
            top: Some(0),
            list_records: false,
        });
        assert!(matches!(zero, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn missing_export_surfaces_import_error() {
        let result = run_salary_report(SalaryReportArgs {
            csv: PathBuf::from("does-not-exist.csv"),
            category: Vec::new(),
            top: None,
            list_records: false,
        });
        assert!(matches!(result, Err(AppError::Import(_))));
    }

    #[test]
    fn demo_steps_complete_every_stage() {
        let mut draft = SubmissionDraft::default();
        for apply in demo_steps() {
            apply(&mut draft);
        }
        assert!(medcomp::workflows::submission::validate(&draft).is_ok());
    }

    #[test]
    fn demo_runs_end_to_end() {
        run_demo(DemoArgs::default()).expect("demo completes");
    }
}
