use serde::{Deserialize, Serialize};

use crate::domain::RawChild;

/// Header carrying the size of the whole record set on a page response.
pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

/// One page as returned by the remote source, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildrenPage {
    pub children: Vec<RawChild>,
    pub total_count: u64,
}

impl ChildrenPage {
    pub fn new(children: Vec<RawChild>, total_count: u64) -> Self {
        Self {
            children,
            total_count,
        }
    }
}
