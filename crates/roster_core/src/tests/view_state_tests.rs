use crate::error::ErrorContext;

use super::*;

fn child(id: &str, name: &str, birth_date: &str) -> Child {
    Child {
        id: ChildId::new(id),
        name: name.to_string(),
        birth_date: NaiveDate::parse_from_str(birth_date, "%Y-%m-%d").expect("date"),
    }
}

fn loaded_view() -> (RecordStore, ViewState) {
    let mut store = RecordStore::default();
    store.replace(
        vec![
            child("1", "Bob", "2019-05-01"),
            child("2", "alice", "2020-02-14"),
            child("3", "Carla", "2018-09-30"),
        ],
        23,
    );
    let mut view = ViewState::new(1);
    view.begin_loading(1);
    view.set_loading(true);
    view.rebuild(&store);
    view.set_loading(false);
    (store, view)
}

#[test]
fn rebuild_sorts_by_name_ascending_by_default() {
    let (_store, view) = loaded_view();
    let snapshot = view.snapshot(vec![1, 2, 3]);
    assert_eq!(snapshot.names(), ["alice", "Bob", "Carla"]);
    assert_eq!(snapshot.status, PageStatus::LoadedOk);
    assert!(!snapshot.loading);
    assert_eq!(snapshot.total_count, 23);
}

#[test]
fn rebuild_keeps_the_remembered_name_direction() {
    let (store, mut view) = loaded_view();
    assert!(!view.sort_by(SortKey::Name));
    view.rebuild(&store);
    assert_eq!(view.snapshot(Vec::new()).names(), ["Carla", "Bob", "alice"]);
}

#[test]
fn view_shares_records_with_the_store() {
    let (store, view) = loaded_view();
    let snapshot = view.snapshot(Vec::new());
    assert!(snapshot
        .children
        .iter()
        .all(|child| store.children().iter().any(|held| Arc::ptr_eq(held, child))));
}

#[test]
fn filter_applies_on_top_of_current_order() {
    let (_store, mut view) = loaded_view();
    view.sort_by(SortKey::BirthDate);
    view.set_filter("  A ");
    assert_eq!(view.snapshot(Vec::new()).names(), ["alice", "Carla"]);
    assert_eq!(view.snapshot(Vec::new()).filter_text, "a");

    view.set_filter("");
    assert_eq!(view.projection().len(), 3);
}

#[test]
fn failed_load_keeps_previous_children() {
    let (_store, mut view) = loaded_view();
    view.begin_loading(2);
    view.set_loading(true);
    assert!(view.loading());
    view.fail_load(ReportedError::new(ErrorContext::LoadPage, "boom"));
    view.set_loading(false);

    let snapshot = view.snapshot(Vec::new());
    assert!(!snapshot.loading);
    assert_eq!(snapshot.status, PageStatus::LoadedError);
    assert_eq!(snapshot.current_page, 2);
    assert_eq!(snapshot.children.len(), 3);
    assert_eq!(
        snapshot.last_error.as_ref().map(ReportedError::message),
        Some("boom")
    );
}

#[test]
fn render_computes_ages_for_the_given_day() {
    let (_store, view) = loaded_view();
    let today = NaiveDate::from_ymd_opt(2024, 5, 1).expect("date");
    let page = view.snapshot(vec![1, 2, 3]).render(today);
    let ages: Vec<i32> = page.rows.iter().map(|row| row.age).collect();
    assert_eq!(ages, [4, 5, 5]);

    let json = serde_json::to_value(&page).expect("json");
    assert_eq!(json["rows"][0]["birthDate"], "2020-02-14");
    assert_eq!(json["pages"], serde_json::json!([1, 2, 3]));
    assert!(json.get("error").is_none());
}

#[test]
fn reported_errors_do_not_change_status() {
    let (_store, mut view) = loaded_view();
    view.report(ReportedError::new(ErrorContext::CancelRegistration, "nope"));
    let snapshot = view.snapshot(Vec::new());
    assert_eq!(snapshot.status, PageStatus::LoadedOk);
    assert_eq!(
        snapshot.last_error.map(|error| error.context()),
        Some(ErrorContext::CancelRegistration)
    );
}
