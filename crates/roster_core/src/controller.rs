use std::{num::NonZeroU32, sync::Arc};

use shared::{
    domain::{Child, ChildId},
    protocol::ChildrenPage,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::{
    backend::ChildrenBackend,
    config::Settings,
    error::{ControllerError, ReportedError},
    sorter::SortKey,
    view_state::{RecordStore, ViewSnapshot, ViewState},
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Upper bound on the pager; totals needing more pages are rejected on load.
pub const MAX_PAGE_COUNT: u32 = 100_000;

/// Notifications for the surrounding router/renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterEvent {
    PageSelected(u32),
    PageLoaded { page: u32, total_count: u64 },
    Error(ReportedError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer request was issued while this one was in flight; its result was dropped.
    Superseded,
}

/// Number of pages needed for `total_count` records; zero when there are none.
pub fn page_count(total_count: u64, children_per_page: NonZeroU32) -> u32 {
    let pages = total_count.div_ceil(u64::from(children_per_page.get()));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Page numbers `1..=page_count`, never more than [`MAX_PAGE_COUNT`] of them.
pub fn page_numbers(total_count: u64, children_per_page: NonZeroU32) -> Vec<u32> {
    (1..=page_count(total_count, children_per_page).min(MAX_PAGE_COUNT)).collect()
}

struct ControllerState {
    store: RecordStore,
    view: ViewState,
    latest_request: u64,
    load_pending: bool,
    cancellation_in_flight: bool,
}

impl ControllerState {
    fn sync_loading(&mut self) {
        let loading = self.load_pending || self.cancellation_in_flight;
        self.view.set_loading(loading);
    }

    /// Starts a fenced load and returns its request token.
    fn begin_load(&mut self, page: u32) -> u64 {
        self.latest_request += 1;
        self.load_pending = true;
        self.view.begin_loading(page);
        self.sync_loading();
        self.latest_request
    }
}

pub struct PageController {
    backend: Arc<dyn ChildrenBackend>,
    children_per_page: NonZeroU32,
    start_page: u32,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<RosterEvent>,
}

impl PageController {
    pub fn new(
        backend: Arc<dyn ChildrenBackend>,
        children_per_page: NonZeroU32,
        start_page: u32,
    ) -> Arc<Self> {
        let start_page = start_page.max(1);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            backend,
            children_per_page,
            start_page,
            inner: Mutex::new(ControllerState {
                store: RecordStore::default(),
                view: ViewState::new(start_page),
                latest_request: 0,
                load_pending: false,
                cancellation_in_flight: false,
            }),
            events,
        })
    }

    pub fn from_settings(backend: Arc<dyn ChildrenBackend>, settings: &Settings) -> Arc<Self> {
        Self::new(backend, settings.children_per_page, settings.start_page)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<RosterEvent> {
        self.events.subscribe()
    }

    pub fn children_per_page(&self) -> NonZeroU32 {
        self.children_per_page
    }

    /// First load of the start page. Does not announce a page change.
    pub async fn init(&self) -> Result<LoadOutcome, ControllerError> {
        let token = {
            let mut guard = self.inner.lock().await;
            if guard.cancellation_in_flight {
                drop(guard);
                warn!(
                    page = self.start_page,
                    "initial load rejected while a cancellation is in flight"
                );
                return Err(self.reject(ControllerError::Busy));
            }
            guard.begin_load(self.start_page)
        };
        self.load_page(self.start_page, token).await
    }

    pub async fn select_page(&self, page: u32) -> Result<LoadOutcome, ControllerError> {
        let token = {
            let mut guard = self.inner.lock().await;
            if guard.cancellation_in_flight {
                drop(guard);
                warn!(page, "page navigation rejected while a cancellation is in flight");
                return Err(self.reject(ControllerError::Busy));
            }
            let total_count = guard.store.total_count();
            let last = page_count(total_count, self.children_per_page);
            if page == 0 || (total_count > 0 && page > last) {
                drop(guard);
                warn!(page, last, "page out of range");
                return Err(self.reject(ControllerError::InvalidPage { page, last }));
            }
            guard.begin_load(page)
        };

        let _ = self.events.send(RosterEvent::PageSelected(page));
        self.load_page(page, token).await
    }

    /// Deletes one child and reloads the current page in place on success.
    pub async fn cancel_registration(
        &self,
        id: &ChildId,
    ) -> Result<LoadOutcome, ControllerError> {
        let page = {
            let mut guard = self.inner.lock().await;
            if guard.cancellation_in_flight {
                drop(guard);
                warn!(child_id = %id, "cancellation rejected while another is in flight");
                return Err(self.reject(ControllerError::Busy));
            }
            guard.cancellation_in_flight = true;
            guard.sync_loading();
            guard.view.current_page()
        };

        let deleted = self.backend.delete_child(id, page).await;

        let mut guard = self.inner.lock().await;
        guard.cancellation_in_flight = false;
        match deleted {
            Ok(()) => {
                info!(child_id = %id, page, "registration cancelled; reloading page");
                let token = guard.begin_load(page);
                drop(guard);
                let _ = self.events.send(RosterEvent::PageSelected(page));
                self.load_page(page, token).await
            }
            Err(source) => {
                let err = ControllerError::Delete {
                    id: id.clone(),
                    source,
                };
                guard.sync_loading();
                guard.view.report(ReportedError::from(&err));
                drop(guard);
                error!(child_id = %id, page, error = %err, "error canceling registration");
                let _ = self.events.send(RosterEvent::Error(ReportedError::from(&err)));
                Err(err)
            }
        }
    }

    pub async fn apply_filter(&self, text: &str) {
        self.inner.lock().await.view.set_filter(text);
    }

    /// Returns the new direction for the name key.
    pub async fn sort_by_name(&self) -> bool {
        self.inner.lock().await.view.sort_by(SortKey::Name)
    }

    pub async fn sort_by_birth_date(&self) -> bool {
        self.inner.lock().await.view.sort_by(SortKey::BirthDate)
    }

    pub async fn all_pages(&self) -> Vec<u32> {
        let total_count = self.inner.lock().await.store.total_count();
        page_numbers(total_count, self.children_per_page)
    }

    pub async fn view_state(&self) -> ViewSnapshot {
        let guard = self.inner.lock().await;
        let pages = page_numbers(guard.store.total_count(), self.children_per_page);
        guard.view.snapshot(pages)
    }

    /// Fetches `page` and applies it if `token` is still the latest request.
    /// A page that no longer exists under the fetched total falls back to the
    /// last page, announced like a regular selection.
    async fn load_page(
        &self,
        mut page: u32,
        mut token: u64,
    ) -> Result<LoadOutcome, ControllerError> {
        loop {
            let result = match self.backend.fetch_page(page).await {
                Ok(raw) => validate_page(page, raw, self.children_per_page),
                Err(source) => Err(ControllerError::Fetch { page, source }),
            };

            let mut guard = self.inner.lock().await;
            if guard.latest_request != token {
                debug!(
                    page,
                    token,
                    latest = guard.latest_request,
                    "dropping superseded page load"
                );
                return Ok(LoadOutcome::Superseded);
            }

            if let Ok((_, total_count)) = &result {
                let last = page_count(*total_count, self.children_per_page);
                if *total_count > 0 && page > last {
                    token = guard.begin_load(last);
                    drop(guard);
                    warn!(page, last, "page no longer exists; loading the last page");
                    let _ = self.events.send(RosterEvent::PageSelected(last));
                    page = last;
                    continue;
                }
            }

            guard.load_pending = false;
            guard.sync_loading();

            return match result {
                Ok((children, total_count)) => {
                    let state = &mut *guard;
                    state.store.replace(children, total_count);
                    state.view.rebuild(&state.store);
                    drop(guard);
                    info!(page, total_count, "children page loaded");
                    let _ = self
                        .events
                        .send(RosterEvent::PageLoaded { page, total_count });
                    Ok(LoadOutcome::Applied)
                }
                Err(err) => {
                    guard.view.fail_load(ReportedError::from(&err));
                    drop(guard);
                    error!(page, error = %err, "error loading children");
                    let _ = self.events.send(RosterEvent::Error(ReportedError::from(&err)));
                    Err(err)
                }
            };
        }
    }

    /// Announces a refused request without touching view state.
    fn reject(&self, err: ControllerError) -> ControllerError {
        let _ = self.events.send(RosterEvent::Error(ReportedError::from(&err)));
        err
    }
}

/// Every entry must convert; one bad entry rejects the whole page. The total
/// must fit in [`MAX_PAGE_COUNT`] pages.
fn validate_page(
    page: u32,
    raw: ChildrenPage,
    children_per_page: NonZeroU32,
) -> Result<(Vec<Child>, u64), ControllerError> {
    if page_count(raw.total_count, children_per_page) > MAX_PAGE_COUNT {
        return Err(ControllerError::TotalCountOutOfRange {
            page,
            total_count: raw.total_count,
            max_pages: MAX_PAGE_COUNT,
        });
    }
    let children = raw
        .children
        .into_iter()
        .map(Child::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| ControllerError::InvalidRecord { page, source })?;
    Ok((children, raw.total_count))
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
