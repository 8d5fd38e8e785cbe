use chrono::NaiveDate;
use fitout_timeline::api::error_reason;
use fitout_timeline::commands::{
    milestone_edit_draft, parse_date, response_id, task_edit_draft, MilestoneChanges, TaskChanges,
};
use fitout_timeline::config::Config;
use fitout_timeline::locale::Locale;
use fitout_timeline::models::{Milestone, MilestoneCategory, Priority, Task, TaskDraft, TaskStatus};
use fitout_timeline::tui::app::{App, Form, FormKind, InputMode};
use reqwest::StatusCode;
use serde_json::json;

fn d(y: i32, m: u32, dd: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, dd).unwrap()
}

#[test]
fn test_new_task_draft() {
    let draft = TaskChanges {
        title: Some("Install doors".into()),
        start: Some("2024-02-01".into()),
        end: Some("2024-02-03".into()),
        status: Some("on-hold".into()),
        priority: Some("URGENT".into()),
        progress: Some(150),
        ..Default::default()
    }
    .into_new_draft()
    .unwrap();

    assert_eq!(draft.title, "Install doors");
    assert_eq!(draft.start_date, d(2024, 2, 1));
    assert_eq!(draft.end_date, d(2024, 2, 3));
    assert_eq!(draft.status, TaskStatus::OnHold);
    assert_eq!(draft.priority, Priority::Urgent);
    assert_eq!(draft.progress, 100);

    let body = serde_json::to_value(&draft).unwrap();
    assert_eq!(body["startDate"], "2024-02-01");
    assert_eq!(body["status"], "on-hold");
}

#[test]
fn test_task_draft_requires_fields() {
    assert!(TaskChanges::default().into_new_draft().is_err());
    let err = TaskChanges {
        title: Some("x".into()),
        start: Some("01/02/2024".into()),
        end: Some("2024-02-03".into()),
        ..Default::default()
    }
    .into_new_draft()
    .unwrap_err();
    assert!(err.to_string().contains("YYYY-MM-DD"));

    let err = TaskChanges {
        title: Some("x".into()),
        start: Some("2024-02-01".into()),
        end: Some("2024-02-03".into()),
        status: Some("done".into()),
        ..Default::default()
    }
    .into_new_draft()
    .unwrap_err();
    assert!(err.to_string().contains("Unknown status"));
}

#[test]
fn test_task_changes_only_touch_given_fields() {
    let mut draft = TaskDraft {
        property: "p1".into(),
        title: "Paint".into(),
        description: "Two coats".into(),
        start_date: d(2024, 1, 1),
        end_date: d(2024, 1, 5),
        status: TaskStatus::Pending,
        priority: Priority::Low,
        progress: 10,
    };
    TaskChanges { end: Some("2024-01-09".into()), progress: Some(60), ..Default::default() }
        .apply(&mut draft)
        .unwrap();
    assert_eq!(draft.end_date, d(2024, 1, 9));
    assert_eq!(draft.progress, 60);
    assert_eq!(draft.title, "Paint");
    assert_eq!(draft.description, "Two coats");
}

#[test]
fn test_new_milestone_draft() {
    let draft = MilestoneChanges {
        title: Some("Final payment".into()),
        date: Some("2024-06-30".into()),
        category: Some("payment".into()),
        ..Default::default()
    }
    .into_new_draft()
    .unwrap();
    assert_eq!(draft.category, MilestoneCategory::Payment);
    assert_eq!(draft.notify_before, 7);

    let body = serde_json::to_value(&draft).unwrap();
    assert_eq!(body["notifyBefore"], 7);
    assert_eq!(body["date"], "2024-06-30");
}

#[test]
fn test_response_id_envelopes() {
    assert_eq!(response_id(&json!({ "_id": "a" })).as_deref(), Some("a"));
    assert_eq!(response_id(&json!({ "success": true, "data": { "_id": "b" } })).as_deref(), Some("b"));
    assert_eq!(response_id(&json!({ "data": { "data": { "id": "c" } } })).as_deref(), Some("c"));
    assert_eq!(response_id(&json!({ "success": true })), None);
}

#[test]
fn test_error_reason_prefers_server_message() {
    let reason = error_reason(StatusCode::BAD_REQUEST, r#"{"success":false,"message":"End date is required"}"#);
    assert_eq!(reason, "End date is required");
    let reason = error_reason(StatusCode::INTERNAL_SERVER_ERROR, "");
    assert_eq!(reason, "500 Internal Server Error");
    let reason = error_reason(StatusCode::BAD_GATEWAY, "upstream down");
    assert_eq!(reason, "502 Bad Gateway - upstream down");
}

#[test]
fn test_parse_date() {
    assert_eq!(parse_date(" 2024-03-01 ").unwrap(), d(2024, 3, 1));
    assert!(parse_date("2024-3-1x").is_err());
}

#[test]
fn test_config_overrides() {
    let cfg = Config::new(Some("https://example.com/api/".into()), Some("  ".into()), Some("ar".into()));
    assert_eq!(cfg.api_url, "https://example.com/api/");
    assert_eq!(cfg.token, None);
    assert_eq!(cfg.locale, Locale::Ar);

    let ctx = Config::new(None, Some("secret".into()), Some("klingon".into())).request_context();
    assert_eq!(ctx.base_url, "http://localhost:5000/api");
    assert_eq!(ctx.token.as_deref(), Some("secret"));
}

#[test]
fn test_form_builds_drafts() {
    let mut form = Form::new(FormKind::Task);
    form.values[0] = "Grout".into();
    form.values[2] = "2024-04-01".into();
    form.values[3] = "2024-04-02".into();
    let draft = form.task_draft().unwrap();
    assert_eq!(draft.status, TaskStatus::Pending);
    assert_eq!(draft.priority, Priority::Medium);
    assert_eq!(draft.progress, 0);
    assert_eq!(draft.property, "");

    form.values[6] = "abc".into();
    assert!(form.task_draft().is_err());

    let mut form = Form::new(FormKind::Milestone);
    assert_eq!(form.prompt(), "Title");
    form.values[0] = "Handover".into();
    form.values[2] = "2024-05-05".into();
    form.values[3] = "delivery".into();
    let draft = form.milestone_draft().unwrap();
    assert_eq!(draft.category, MilestoneCategory::Delivery);
    assert!(!form.is_last_step());
}

#[test]
fn test_edit_form_round_trips_draft() {
    let draft = TaskDraft {
        property: "p9".into(),
        title: "Ceiling".into(),
        description: "Skim coat before paint".into(),
        start_date: d(2024, 7, 1),
        end_date: d(2024, 7, 10),
        status: TaskStatus::Completed,
        priority: Priority::High,
        progress: 100,
    };
    let form = Form::for_task("t9", &draft);
    assert_eq!(form.editing.as_deref(), Some("t9"));
    assert_eq!(form.task_draft().unwrap().description, "Skim coat before paint");
    assert_eq!(form.task_draft().unwrap(), draft);
}

fn task_without_end() -> Task {
    serde_json::from_value(json!({
        "_id": "t4",
        "title": "Tiling",
        "description": "Bathroom floor",
        "startDate": "2024-06-01",
        "endDate": null,
        "status": "on-hold",
        "priority": "urgent",
        "progress": 35,
        "property": { "_id": "p7", "address": "8 Gezira St" }
    }))
    .unwrap()
}

#[test]
fn test_edit_with_unreadable_end_keeps_stored_fields() {
    let task = task_without_end();
    let draft = task_edit_draft(&task, TaskChanges { end: Some("2024-06-04".into()), ..Default::default() }).unwrap();
    assert_eq!(draft.start_date, d(2024, 6, 1));
    assert_eq!(draft.end_date, d(2024, 6, 4));
    assert_eq!(draft.status, TaskStatus::OnHold);
    assert_eq!(draft.priority, Priority::Urgent);
    assert_eq!(draft.progress, 35);
    assert_eq!(draft.property, "p7");
    assert_eq!(draft.description, "Bathroom floor");

    let err = task_edit_draft(&task, TaskChanges { title: Some("Tiles".into()), ..Default::default() }).unwrap_err();
    assert!(err.to_string().contains("no usable dates"), "{}", err);
}

#[test]
fn test_milestone_edit_with_unreadable_date_keeps_stored_fields() {
    let milestone: Milestone = serde_json::from_value(json!({
        "_id": "m3", "title": "Payment 2", "date": "someday",
        "category": "payment", "notifyBefore": 3, "property": "p2"
    }))
    .unwrap();
    let draft = milestone_edit_draft(&milestone, MilestoneChanges { date: Some("2024-09-01".into()), ..Default::default() })
        .unwrap();
    assert_eq!(draft.date, d(2024, 9, 1));
    assert_eq!(draft.category, MilestoneCategory::Payment);
    assert_eq!(draft.notify_before, 3);
    assert_eq!(draft.property, "p2");
    assert!(milestone_edit_draft(&milestone, MilestoneChanges::default()).is_err());

    let form = Form::for_milestone_record(&milestone);
    assert_eq!(form.values, vec!["Payment 2", "p2", "", "payment", "3"]);
}

#[test]
fn test_edit_form_for_task_with_unreadable_end() {
    let form = Form::for_task_record(&task_without_end());
    assert_eq!(form.editing.as_deref(), Some("t4"));
    assert_eq!(form.values, vec!["Tiling", "p7", "2024-06-01", "", "on-hold", "urgent", "35"]);
    assert_eq!(form.description, "Bathroom floor");
}

#[tokio::test]
async fn test_failed_submit_keeps_form_open() {
    let mut app = App::new(Config::default());
    app.start_add(FormKind::Task);
    for value in ["Grout", "", "2024-04-01", "not-a-date", "pending", "medium", "0"] {
        app.input_buffer = value.to_string();
        app.handle_input().await;
    }

    assert!(app.input_mode == InputMode::Form);
    let form = app.form.as_ref().unwrap();
    assert!(form.is_last_step());
    assert_eq!(form.values[0], "Grout");
    assert_eq!(form.values[3], "not-a-date");
    assert!(matches!(app.status, Some((_, true))));
}
