//! Page records and the projection handed to the renderer.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use shared::domain::{Child, ChildId};

use crate::{
    age::age,
    error::ReportedError,
    filter::{filter_children, normalize_needle},
    sorter::{sort_children, SortKey, SortToggles},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    Idle,
    Loading,
    LoadedOk,
    LoadedError,
}

/// Source of truth for the loaded page. Only the controller replaces it.
#[derive(Debug, Default)]
pub struct RecordStore {
    children: Vec<Arc<Child>>,
    total_count: u64,
}

impl RecordStore {
    pub fn replace(&mut self, children: Vec<Child>, total_count: u64) {
        self.children = children.into_iter().map(Arc::new).collect();
        self.total_count = total_count;
    }

    pub fn children(&self) -> &[Arc<Child>] {
        &self.children
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }
}

/// Ordered handles into the store plus the UI flags around them.
#[derive(Debug)]
pub struct ViewState {
    ordered: Vec<Arc<Child>>,
    total_count: u64,
    current_page: u32,
    loading: bool,
    filter_text: String,
    sort: SortToggles,
    status: PageStatus,
    last_error: Option<ReportedError>,
}

impl ViewState {
    pub fn new(start_page: u32) -> Self {
        Self {
            ordered: Vec::new(),
            total_count: 0,
            current_page: start_page,
            loading: false,
            filter_text: String::new(),
            sort: SortToggles::default(),
            status: PageStatus::Idle,
            last_error: None,
        }
    }

    pub fn begin_loading(&mut self, page: u32) {
        self.current_page = page;
        self.status = PageStatus::Loading;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Rebuilds the ordering from the store and re-applies the remembered
    /// name direction without toggling it.
    pub fn rebuild(&mut self, store: &RecordStore) {
        self.ordered = store.children().to_vec();
        self.total_count = store.total_count();
        sort_children(&mut self.ordered, SortKey::Name, self.sort.name_ascending);
        self.status = PageStatus::LoadedOk;
        self.last_error = None;
    }

    /// Loaded children stay untouched on failure.
    pub fn fail_load(&mut self, error: ReportedError) {
        self.status = PageStatus::LoadedError;
        self.last_error = Some(error);
    }

    pub fn report(&mut self, error: ReportedError) {
        self.last_error = Some(error);
    }

    pub fn sort_by(&mut self, key: SortKey) -> bool {
        let ascending = self.sort.toggle(key);
        sort_children(&mut self.ordered, key, ascending);
        ascending
    }

    pub fn set_filter(&mut self, raw: &str) {
        self.filter_text = normalize_needle(raw);
    }

    pub fn projection(&self) -> Vec<Arc<Child>> {
        filter_children(&self.ordered, &self.filter_text)
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn status(&self) -> PageStatus {
        self.status
    }

    pub fn snapshot(&self, pages: Vec<u32>) -> ViewSnapshot {
        ViewSnapshot {
            children: self.projection(),
            total_count: self.total_count,
            current_page: self.current_page,
            pages,
            loading: self.loading,
            status: self.status,
            filter_text: self.filter_text.clone(),
            sort: self.sort,
            last_error: self.last_error.clone(),
        }
    }
}

/// Read-only copy of the view at one instant.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub children: Vec<Arc<Child>>,
    pub total_count: u64,
    pub current_page: u32,
    pub pages: Vec<u32>,
    pub loading: bool,
    pub status: PageStatus,
    pub filter_text: String,
    pub sort: SortToggles,
    pub last_error: Option<ReportedError>,
}

impl ViewSnapshot {
    pub fn names(&self) -> Vec<&str> {
        self.children.iter().map(|child| child.name.as_str()).collect()
    }

    /// One render pass. Ages are computed here against `today` and not kept.
    pub fn render(&self, today: NaiveDate) -> RenderedPage {
        RenderedPage {
            rows: self
                .children
                .iter()
                .map(|child| ChildRow {
                    id: child.id.clone(),
                    name: child.name.clone(),
                    birth_date: child.birth_date,
                    age: age(child.birth_date, today),
                })
                .collect(),
            current_page: self.current_page,
            pages: self.pages.clone(),
            total_count: self.total_count,
            loading: self.loading,
            status: self.status,
            filter: self.filter_text.clone(),
            sort: self.sort,
            error: self.last_error.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRow {
    pub id: ChildId,
    pub name: String,
    pub birth_date: NaiveDate,
    pub age: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedPage {
    pub rows: Vec<ChildRow>,
    pub current_page: u32,
    pub pages: Vec<u32>,
    pub total_count: u64,
    pub loading: bool,
    pub status: PageStatus,
    pub filter: String,
    pub sort: SortToggles,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ReportedError>,
}

#[cfg(test)]
#[path = "tests/view_state_tests.rs"]
mod tests;
