use serde_json::json;

use super::*;
use crate::fixtures::{job_document, job_record, record};

#[test]
fn failed_completion_is_eligible() {
    let disposition = classify(&job_record("r1", "int-1")).unwrap();

    let Disposition::Eligible(event) = disposition else {
        panic!("expected an eligible job, got {disposition:?}");
    };
    assert_eq!(event.integration_id.as_str(), "int-1");
}

#[test]
fn other_completions_are_skipped() {
    for (status, conclusion) in [
        ("completed", json!("success")),
        ("completed", json!("cancelled")),
        ("in_progress", json!(null)),
        ("queued", json!("failure")),
    ] {
        let mut document = job_document("int-1");
        document["workflow_event"]["workflow_job"]["status"] = json!(status);
        document["workflow_event"]["workflow_job"]["conclusion"] = conclusion;

        let disposition = classify(&record("r1", document)).unwrap();
        assert!(
            matches!(disposition, Disposition::Skipped(SkipReason::NotFailed { .. })),
            "{status}: {disposition:?}"
        );
    }
}

#[test]
fn removals_are_skipped_without_an_image() {
    let mut removal = job_record("r1", "int-1");
    removal.event_kind = EventKind::Remove;
    removal.new_image = None;

    assert_eq!(
        classify(&removal).unwrap(),
        Disposition::Skipped(SkipReason::EventKind(EventKind::Remove))
    );
}

#[test]
fn other_event_types_are_skipped() {
    let run = record("r1", json!({ "event_type": "workflow_run", "id": "555" }));
    let push = record("r2", json!({ "event_type": "push" }));

    assert_eq!(
        classify(&run).unwrap(),
        Disposition::Skipped(SkipReason::EventType("workflow_run".into()))
    );
    assert_eq!(
        classify(&push).unwrap(),
        Disposition::Skipped(SkipReason::EventType("push".into()))
    );
}

#[test]
fn insert_without_image_is_a_decode_error() {
    let mut insert = job_record("r1", "int-1");
    insert.new_image = None;

    assert!(matches!(classify(&insert), Err(DecodeError::MissingImage)));
}

#[test]
fn malformed_job_document_is_a_decode_error() {
    let mut document = job_document("int-1");
    document["workflow_event"].as_object_mut().unwrap().remove("sender");

    assert!(matches!(classify(&record("r1", document)), Err(DecodeError::Shape { .. })));
}

#[test]
fn skip_reasons_read_well_in_logs() {
    let reason = SkipReason::NotFailed {
        status: "in_progress".into(),
        conclusion: None,
    };
    assert_eq!(reason.to_string(), "job in_progress with conclusion none");
    assert_eq!(SkipReason::EventType(String::new()).to_string(), "no event type");
}
