//! Client-side ordering of the loaded page.

use std::{cmp::Ordering, sync::Arc};

use serde::{Deserialize, Serialize};
use shared::domain::Child;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    BirthDate,
}

/// Remembered direction per key. The flags are independent: toggling one
/// never resets the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortToggles {
    pub name_ascending: bool,
    pub birth_date_ascending: bool,
}

impl Default for SortToggles {
    fn default() -> Self {
        Self {
            name_ascending: true,
            birth_date_ascending: true,
        }
    }
}

impl SortToggles {
    pub fn ascending(&self, key: SortKey) -> bool {
        match key {
            SortKey::Name => self.name_ascending,
            SortKey::BirthDate => self.birth_date_ascending,
        }
    }

    /// Flips the flag for `key` and returns the new direction.
    pub fn toggle(&mut self, key: SortKey) -> bool {
        let flag = match key {
            SortKey::Name => &mut self.name_ascending,
            SortKey::BirthDate => &mut self.birth_date_ascending,
        };
        *flag = !*flag;
        *flag
    }
}

fn compare(a: &Child, b: &Child, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::BirthDate => a.birth_date.cmp(&b.birth_date),
    }
}

/// Reorders handles only; the children themselves are never touched.
pub fn sort_children(children: &mut [Arc<Child>], key: SortKey, ascending: bool) {
    children.sort_by(|a, b| {
        let ordering = compare(a, b, key);
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

#[cfg(test)]
#[path = "tests/sorter_tests.rs"]
mod tests;
