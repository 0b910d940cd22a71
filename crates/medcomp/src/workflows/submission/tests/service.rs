use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

use super::common::*;
use crate::workflows::store::LocationKey;
use crate::workflows::submission::{
    validate, DraftField, DraftId, FormRejection, SessionError, SubmissionDraft,
    SubmissionError, SubmissionForm, SubmissionService, SubmissionState, SubmitOutcome,
};

fn seattle() -> LocationKey {
    LocationKey {
        city: "Seattle".to_string(),
        state: "WA".to_string(),
        country: "USA".to_string(),
    }
}

#[test]
fn persist_creates_location_then_salary_with_explicit_nulls() {
    let store = Arc::new(MemoryStore::default());
    let service = SubmissionService::new(store.clone());
    let submission = validate(&valid_draft()).expect("valid");

    let receipt = service.persist(&submission).expect("persisted");
    assert_eq!(receipt.location_id, "loc-1");
    assert_eq!(receipt.salary_id, "salary-1");
    assert_eq!(receipt.redirect_to, "/");

    let salaries = store.salaries.lock().expect("salaries mutex");
    let json = serde_json::to_value(&salaries[0]).expect("serializes");
    assert!(json["bonus_compensation"].is_null());
    assert!(json["gender"].is_null());
    assert!(json["subspecialty_id"].is_null());
    assert_eq!(json["location_id"], "loc-1");
    assert_eq!(json["salary_type"], "annually");
}

#[test]
fn repeated_submits_share_one_location() {
    let store = Arc::new(MemoryStore::default());
    let service = SubmissionService::new(store.clone());

    for _ in 0..2 {
        let mut form = SubmissionForm::with_draft(valid_draft());
        match service.submit(&mut form) {
            SubmitOutcome::Recorded(receipt) => assert_eq!(receipt.location_id, "loc-1"),
            other => panic!("expected recorded submission, got {other:?}"),
        }
    }

    assert_eq!(store.location_count(), 1);
    assert_eq!(store.writes(), (1, 2));
}

#[test]
fn existing_location_is_reused_without_writing() {
    let store = Arc::new(MemoryStore::default());
    store.seed_location("loc-existing", &seattle());
    let service = SubmissionService::new(store.clone());

    let location = service.resolve_location(&seattle()).expect("resolved");
    assert_eq!(location.id, "loc-existing");
    assert_eq!(store.writes(), (0, 0));
}

#[test]
fn concurrent_create_conflict_rereads_the_triple() {
    let store = Arc::new(MemoryStore::default());
    store.seed_location("loc-raced", &seattle());
    store.missed_lookups.store(1, Ordering::SeqCst);
    let service = SubmissionService::new(store.clone());

    let location = service.resolve_location(&seattle()).expect("resolved after conflict");
    assert_eq!(location.id, "loc-raced");
    assert_eq!(store.location_count(), 1);
}

#[test]
fn failed_insert_keeps_draft_and_retry_reuses_orphaned_location() {
    let store = Arc::new(MemoryStore::failing_inserts(1));
    let service = SubmissionService::new(store.clone());
    let mut form = SubmissionForm::with_draft(valid_draft());

    match service.submit(&mut form) {
        SubmitOutcome::Failed(SubmissionError::Insert(_)) => {}
        other => panic!("expected insert failure, got {other:?}"),
    }
    assert_eq!(form.state(), SubmissionState::Failed);
    assert_eq!(form.draft(), &valid_draft());
    assert_eq!(store.writes(), (1, 0));

    match service.submit(&mut form) {
        SubmitOutcome::Recorded(receipt) => assert_eq!(receipt.location_id, "loc-1"),
        other => panic!("expected retry to succeed, got {other:?}"),
    }
    assert_eq!(store.location_count(), 1);
    assert_eq!(store.writes(), (1, 1));
}

#[test]
fn unavailable_store_fails_location_step() {
    let service = SubmissionService::new(Arc::new(UnavailableStore));
    let mut form = SubmissionForm::with_draft(valid_draft());

    match service.submit(&mut form) {
        SubmitOutcome::Failed(SubmissionError::Location(_)) => {}
        other => panic!("expected location failure, got {other:?}"),
    }
    assert!(form.can_submit());
}

#[test]
fn second_submit_while_in_flight_writes_nothing() {
    let store = Arc::new(GatedStore::new());
    let sessions = sessions_with(store.clone());
    let draft_id = sessions.open().draft_id;
    sessions
        .update_draft(&draft_id, valid_draft())
        .expect("draft updated");

    let first = {
        let sessions = sessions.clone();
        let draft_id = draft_id.clone();
        thread::spawn(move || sessions.submit(&draft_id))
    };

    store.entered.wait();
    assert_eq!(
        sessions.view(&draft_id).expect("view").state,
        SubmissionState::Submitting
    );
    assert_eq!(
        sessions.submit(&draft_id),
        Err(SessionError::Rejected(FormRejection::InFlight))
    );
    assert_eq!(store.inner.writes(), (0, 0));
    store.release.wait();

    let receipt = first.join().expect("thread joins").expect("first submit succeeds");
    assert_eq!(receipt.redirect_to, "/thanks");
    assert_eq!(store.inner.writes(), (1, 1));
    assert_eq!(
        sessions.view(&draft_id).map(|view| view.state),
        Err(SessionError::NotFound(draft_id.clone()))
    );
    assert_eq!(sessions.open_drafts(), 0);
}

#[test]
fn successful_submits_leave_no_sessions_behind() {
    let store = Arc::new(MemoryStore::default());
    let sessions = sessions_with(store.clone());

    for _ in 0..50 {
        let draft_id = sessions.open().draft_id;
        sessions
            .update_draft(&draft_id, valid_draft())
            .expect("draft updated");
        sessions.submit(&draft_id).expect("submitted");
        assert_eq!(
            sessions.submit(&draft_id),
            Err(SessionError::NotFound(draft_id))
        );
    }

    assert_eq!(sessions.open_drafts(), 0);
    assert_eq!(store.writes(), (1, 50));
}

#[test]
fn fresh_session_shows_no_field_errors() {
    let sessions = sessions_with(Arc::new(MemoryStore::default()));
    let opened = sessions.open();

    assert!(opened.errors.is_empty());
    assert!(!opened.can_submit);
    assert!(sessions.view(&opened.draft_id).expect("view").errors.is_empty());
}

#[test]
fn view_errors_cover_only_touched_fields() {
    let sessions = sessions_with(Arc::new(MemoryStore::default()));
    let draft_id = sessions.open().draft_id;
    sessions
        .update_draft(&draft_id, valid_draft())
        .expect("every stage unlocked");
    let draft = SubmissionDraft {
        base_salary: Some(-1.0),
        ..SubmissionDraft::default()
    };

    let view = sessions.update_draft(&draft_id, draft).expect("updated");
    let fields: Vec<DraftField> = view.errors.fields().collect();
    assert_eq!(fields, vec![DraftField::BaseSalary]);

    match sessions.submit(&draft_id) {
        Err(SessionError::Rejected(FormRejection::Invalid(errors))) => {
            assert!(errors.get(DraftField::Specialty).is_some());
            assert!(errors.get(DraftField::BaseSalary).is_some());
        }
        other => panic!("expected full validation errors, got {other:?}"),
    }
}

#[test]
fn sessions_report_missing_drafts() {
    let sessions = sessions_with(Arc::new(MemoryStore::default()));
    let missing = DraftId("draft-999999".to_string());

    assert_eq!(
        sessions.view(&missing).map(|view| view.draft_id),
        Err(SessionError::NotFound(missing.clone()))
    );
    assert_eq!(
        sessions.abandon(&missing),
        Err(SessionError::NotFound(missing))
    );
}

#[test]
fn abandon_removes_the_session() {
    let sessions = sessions_with(Arc::new(MemoryStore::default()));
    let draft_id = sessions.open().draft_id;

    sessions.abandon(&draft_id).expect("abandoned");
    assert!(sessions.with_form(&draft_id, |_| ()).is_none());
}

#[test]
fn failed_session_submit_surfaces_persist_error() {
    let store = Arc::new(MemoryStore::failing_inserts(1));
    let sessions = sessions_with(store.clone());
    let draft_id = sessions.open().draft_id;
    sessions
        .update_draft(&draft_id, valid_draft())
        .expect("draft updated");

    match sessions.submit(&draft_id) {
        Err(SessionError::Persist(SubmissionError::Insert(_))) => {}
        other => panic!("expected persist failure, got {other:?}"),
    }

    let view = sessions.view(&draft_id).expect("view");
    assert_eq!(view.state, SubmissionState::Failed);
    assert_eq!(view.draft, valid_draft());
    assert!(view.can_submit);
    assert!(view.last_error.is_some());
}
