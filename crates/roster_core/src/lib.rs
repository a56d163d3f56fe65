//! View-state controller for the paginated list of registered children.
//!
//! [`PageController`] owns the loaded page and is the only writer of it.
//! Sorting, filtering and age derivation read shared [`shared::domain::Child`]
//! handles and never mutate them.

pub mod age;
pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod sorter;
pub mod view_state;

pub use backend::{ChildrenBackend, HttpChildrenBackend, MissingChildrenBackend};
pub use config::{load_settings, Settings};
pub use controller::{
    page_count, page_numbers, LoadOutcome, PageController, RosterEvent, MAX_PAGE_COUNT,
};
pub use error::{ControllerError, ErrorContext, ReportedError};
pub use sorter::{SortKey, SortToggles};
pub use view_state::{ChildRow, PageStatus, RenderedPage, ViewSnapshot};
