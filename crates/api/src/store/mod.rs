//! In-memory record collaborators (users, notes, reminders).
//!
//! These stand in for the relational database. They know nothing about
//! credentials or permissions: callers pass the acting user's id explicitly.

use serde::{Deserialize, Serialize};

pub mod notes;
pub mod password;
pub mod reminders;
pub mod users;

pub use notes::{NewNote, Note, NoteFilter, NoteStore, NoteUpdate};
pub use password::Argon2PasswordHasher;
pub use reminders::{NewReminder, Reminder, ReminderFilter, ReminderStore, ReminderUpdate};
pub use users::{LoginError, UserDirectory, UserFilter, UserRecord};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// One page of results plus the total match count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

/// 1-based paging parameters as they arrive in query strings.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Paging {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl Paging {
    fn resolve(self) -> (usize, usize) {
        let page = self.page.filter(|p| *p > 0).unwrap_or(1);
        let page_size = self
            .page_size
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        (page, page_size)
    }

    pub fn apply<T>(self, matches: Vec<T>) -> Page<T> {
        let (page, page_size) = self.resolve();
        let total = matches.len();
        let items = matches
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect();
        Page {
            items,
            total,
            page,
            page_size,
        }
    }
}

/// Case-insensitive substring match; `None`/blank needle matches everything.
pub(crate) fn contains_ci(haystack: &str, needle: Option<&str>) -> bool {
    match needle.map(str::trim).filter(|n| !n.is_empty()) {
        None => true,
        Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
    }
}
