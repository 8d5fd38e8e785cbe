use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use fitout_timeline::calendar::{
    events_in_range, project_calendar, CalendarView, EventClass, EventSource, MILESTONE_MARKER,
};
use fitout_timeline::gantt::{bar_span, bounds, project_gantt, GanttScale};
use fitout_timeline::locale::Locale;
use fitout_timeline::models::{Milestone, Task, TaskStatus};
use serde_json::{json, Value};

fn task(id: &str, start: Value, end: Value) -> Task {
    Task {
        id: id.into(),
        title: format!("Task {}", id),
        start_date: start,
        end_date: end,
        ..Default::default()
    }
}

fn milestone(id: &str, date: Value, completed: bool) -> Milestone {
    Milestone {
        id: id.into(),
        title: "Handover".into(),
        date,
        is_completed: completed,
        ..Default::default()
    }
}

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

#[test]
fn test_calendar_events_always_have_positive_length() {
    let tasks = vec![
        task("1", json!("2024-01-01"), json!("2024-01-05")),
        task("2", json!("2024-01-10"), json!("2024-01-10")),
        task("3", json!("2024-01-10"), json!("2024-01-05")),
        task("4", json!("2024-01-10T12:00:00Z"), json!("2024-01-10T09:00:00Z")),
    ];
    let events = project_calendar(&tasks, &[]);
    assert_eq!(events.len(), 4);
    for e in &events {
        assert!(e.end > e.start, "{}", e.id);
    }
    assert_eq!(events[0].end, day(2024, 1, 5));
    assert_eq!(events[1].end, day(2024, 1, 11));
    assert_eq!(events[2].end, day(2024, 1, 11));
    assert_eq!(events[3].end, events[3].start + Duration::days(1));
}

#[test]
fn test_calendar_drops_undrawable_records() {
    let tasks = vec![
        task("ok", json!("2024-01-01"), json!("2024-01-02")),
        task("no-start", Value::Null, json!("2024-01-02")),
        task("bad-end", json!("2024-01-01"), json!("soon")),
    ];
    let milestones = vec![milestone("m1", json!(""), false), milestone("m2", json!("2024-03-01"), false)];
    let events = project_calendar(&tasks, &milestones);
    let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["task-ok", "milestone-m2"]);
}

#[test]
fn test_task_events_carry_status_class() {
    let mut t = task("1", json!("2024-01-01"), json!("2024-01-02"));
    for status in TaskStatus::ALL {
        t.status = status;
        let events = project_calendar(std::slice::from_ref(&t), &[]);
        assert_eq!(events[0].class, EventClass::for_status(status));
        assert!(matches!(events[0].source, EventSource::Task(_)));
        assert!(!events[0].all_day);
    }
    t.status = TaskStatus::InProgress;
    let events = project_calendar(&[t], &[]);
    assert_eq!(events[0].class.class_name(), "event-in-progress");
    assert_eq!(events[0].title, "Task 1");
}

#[test]
fn test_open_milestone_is_one_all_day_event() {
    let events = project_calendar(&[], &[milestone("m1", json!("2024-03-01"), false)]);
    assert_eq!(events.len(), 1);
    let e = &events[0];
    assert_eq!(e.id, "milestone-m1");
    assert!(e.all_day);
    assert_eq!(e.start, day(2024, 3, 1));
    assert_eq!(e.end, day(2024, 3, 2));
    assert_eq!(e.class, EventClass::Milestone);
    assert_eq!(e.title, format!("{}Handover", MILESTONE_MARKER));
    assert_eq!(e.source.kind(), "milestone");
}

#[test]
fn test_completed_milestone_uses_completed_class() {
    let events = project_calendar(&[], &[milestone("m1", json!("2024-03-01"), true)]);
    assert_eq!(events[0].class, EventClass::Completed);
    assert_eq!(events[0].class.color(), "#10b981");
}

#[test]
fn test_gantt_repairs_inverted_range() {
    let rows = project_gantt(&[task("1", json!("2024-01-10"), json!("2024-01-05"))], Locale::En);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].start, day(2024, 1, 10));
    assert_eq!(rows[0].end, day(2024, 1, 11));
}

#[test]
fn test_gantt_display_order_has_no_gaps() {
    let tasks = vec![
        task("a", json!("2024-01-01"), json!("2024-01-03")),
        task("b", json!("2024-01-02"), json!("not-a-date")),
        task("c", json!("2024-01-04"), json!("2024-01-06")),
    ];
    let rows = project_gantt(&tasks, Locale::En);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, "a");
    assert_eq!(rows[0].display_order, 0);
    assert_eq!(rows[1].id, "c");
    assert_eq!(rows[1].display_order, 1);
}

#[test]
fn test_gantt_display_order_is_contiguous_with_many_skips() {
    let tasks: Vec<Task> = (0..10)
        .map(|i| {
            if i % 3 == 0 {
                task(&i.to_string(), Value::Null, Value::Null)
            } else {
                task(&i.to_string(), json!("2024-05-01"), json!("2024-05-02"))
            }
        })
        .collect();
    let rows = project_gantt(&tasks, Locale::En);
    let orders: Vec<usize> = rows.iter().map(|r| r.display_order).collect();
    assert_eq!(orders, (0..rows.len()).collect::<Vec<_>>());
    assert_eq!(rows.len(), 6);
}

#[test]
fn test_gantt_defaults() {
    let mut untitled = task("", json!("2024-01-01"), json!("2024-01-02"));
    untitled.title = String::new();
    untitled.progress = None;
    let mut done = task("x", json!("2024-01-01"), json!("2024-01-02"));
    done.progress = Some(85);

    let rows = project_gantt(&[untitled.clone(), done], Locale::En);
    assert_eq!(rows[0].name, "Untitled task");
    assert_eq!(rows[0].id, "task-0");
    assert_eq!(rows[0].progress, 0);
    assert_eq!(rows[0].styles.progress_color, "#ef4444");
    assert_eq!(rows[0].styles.progress_color, rows[0].styles.progress_selected_color);
    assert_eq!(rows[1].styles.progress_color, "#10b981");

    let rows = project_gantt(&[untitled], Locale::Ar);
    assert_eq!(rows[0].name, "مهمة بدون عنوان");
}

#[test]
fn test_gantt_bars() {
    let tasks = vec![
        task("a", json!("2024-01-01"), json!("2024-01-02")),
        task("b", json!("2024-01-08"), json!("2024-01-22")),
    ];
    let rows = project_gantt(&tasks, Locale::En);
    let (origin, end) = bounds(&rows).unwrap();
    assert_eq!(origin, day(2024, 1, 1));
    assert_eq!(end, day(2024, 1, 22));

    assert_eq!(bar_span(&rows[0], origin, GanttScale::Day), (0, 1));
    assert_eq!(bar_span(&rows[1], origin, GanttScale::Day), (7, 14));
    assert_eq!(bar_span(&rows[1], origin, GanttScale::Week), (1, 2));
    assert_eq!(bar_span(&rows[1], origin, GanttScale::Month), (0, 1));
    assert!(bounds(&[]).is_none());
}

#[test]
fn test_view_ranges_and_filtering() {
    let anchor = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
    let d = |m, dd| NaiveDate::from_ymd_opt(2024, m, dd).unwrap();
    assert_eq!(CalendarView::Month.range(anchor), (d(3, 1), d(4, 1)));
    assert_eq!(CalendarView::Week.range(anchor), (d(3, 11), d(3, 18)));
    assert_eq!(CalendarView::Day.range(anchor), (d(3, 13), d(3, 14)));
    assert_eq!(CalendarView::Agenda.range(anchor), (d(3, 13), d(4, 12)));

    let tasks = vec![
        task("late", json!("2024-03-20"), json!("2024-03-22")),
        task("spans", json!("2024-02-25"), json!("2024-03-02")),
        task("before", json!("2024-02-01"), json!("2024-02-05")),
    ];
    let events = project_calendar(&tasks, &[milestone("m", json!("2024-03-01"), false)]);
    let (from, to) = CalendarView::Month.range(anchor);
    let ids: Vec<String> = events_in_range(&events, from, to).into_iter().map(|e| e.id).collect();
    assert_eq!(ids, vec!["task-spans", "milestone-m", "task-late"]);
}

#[test]
fn test_last_representable_instant_is_skipped_not_repaired() {
    let last = DateTime::<Utc>::MAX_UTC.timestamp_millis();
    let tasks = vec![
        task("edge", json!(last), json!(last)),
        task("ok", json!("2024-01-01"), json!("2024-01-02")),
    ];
    let milestones = vec![milestone("edge", json!(last), false)];

    let events = project_calendar(&tasks, &milestones);
    let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["task-ok"]);

    let rows = project_gantt(&tasks, Locale::En);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "ok");
    assert_eq!(rows[0].display_order, 0);

    // A range that is already ordered needs no repair and is kept.
    let earlier = last - 86_400_000;
    let kept = project_gantt(&[task("near", json!(earlier), json!(last))], Locale::En);
    assert_eq!(kept.len(), 1);
}

#[test]
fn test_view_ranges_stop_at_calendar_edges() {
    let (from, to) = CalendarView::Agenda.range(NaiveDate::MAX);
    assert_eq!((from, to), (NaiveDate::MAX, NaiveDate::MAX));
    let (from, _) = CalendarView::Week.range(NaiveDate::MIN);
    assert_eq!(from, NaiveDate::MIN);
}
