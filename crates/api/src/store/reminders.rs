use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use notekeep_core::{DomainError, DomainResult, ReminderId, UserId};

use super::{Page, Paging};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub owner: UserId,
    pub body: String,
    pub remind_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReminder {
    pub body: String,
    pub remind_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReminderUpdate {
    pub body: Option<String>,
    pub remind_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReminderFilter {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl ReminderFilter {
    pub fn paging(&self) -> Paging {
        Paging {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Default)]
struct ReminderTable {
    last_id: i64,
    by_id: BTreeMap<ReminderId, Reminder>,
}

/// Reminders scoped by owner, listed soonest first.
#[derive(Debug, Default)]
pub struct ReminderStore {
    inner: RwLock<ReminderTable>,
}

impl ReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, ReminderTable>> {
        self.inner
            .read()
            .map_err(|_| DomainError::internal("reminder store lock poisoned"))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, ReminderTable>> {
        self.inner
            .write()
            .map_err(|_| DomainError::internal("reminder store lock poisoned"))
    }

    pub fn create(&self, owner: UserId, reminder: NewReminder) -> DomainResult<Reminder> {
        let body = reminder.body.trim();
        if body.is_empty() {
            return Err(DomainError::validation("body must not be empty"));
        }

        let mut table = self.write()?;
        table.last_id += 1;
        let reminder = Reminder {
            id: ReminderId::new(table.last_id),
            owner,
            body: body.to_string(),
            remind_at: reminder.remind_at,
        };
        table.by_id.insert(reminder.id, reminder.clone());
        Ok(reminder)
    }

    pub fn get(&self, owner: UserId, id: ReminderId) -> DomainResult<Reminder> {
        self.read()?
            .by_id
            .get(&id)
            .filter(|r| r.owner == owner)
            .cloned()
            .ok_or(DomainError::not_found("reminder"))
    }

    pub fn list(&self, owner: UserId, filter: &ReminderFilter) -> DomainResult<Page<Reminder>> {
        let mut matches: Vec<Reminder> = self
            .read()?
            .by_id
            .values()
            .filter(|r| r.owner == owner)
            .cloned()
            .collect();
        matches.sort_by_key(|r| (r.remind_at, r.id));
        Ok(filter.paging().apply(matches))
    }

    pub fn update(&self, owner: UserId, id: ReminderId, update: ReminderUpdate) -> DomainResult<Reminder> {
        let mut table = self.write()?;
        let reminder = table
            .by_id
            .get_mut(&id)
            .filter(|r| r.owner == owner)
            .ok_or(DomainError::not_found("reminder"))?;

        if let Some(body) = update.body.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
            reminder.body = body.to_string();
        }
        if let Some(remind_at) = update.remind_at {
            reminder.remind_at = remind_at;
        }
        Ok(reminder.clone())
    }

    pub fn delete(&self, owner: UserId, id: ReminderId) -> DomainResult<()> {
        let mut table = self.write()?;
        match table.by_id.get(&id) {
            Some(r) if r.owner == owner => {
                table.by_id.remove(&id);
                Ok(())
            }
            _ => Err(DomainError::not_found("reminder")),
        }
    }

    pub fn delete_owned_by(&self, owner: UserId) -> DomainResult<usize> {
        let mut table = self.write()?;
        let before = table.by_id.len();
        table.by_id.retain(|_, r| r.owner != owner);
        Ok(before - table.by_id.len())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);

    fn new_reminder(body: &str, remind_at: DateTime<Utc>) -> NewReminder {
        NewReminder {
            body: body.to_string(),
            remind_at,
        }
    }

    #[test]
    fn reminders_are_invisible_to_other_owners() {
        let store = ReminderStore::new();
        let r = store.create(ALICE, new_reminder("call mum", Utc::now())).unwrap();

        assert_eq!(store.get(ALICE, r.id).unwrap().body, "call mum");
        assert_eq!(store.get(BOB, r.id), Err(DomainError::not_found("reminder")));
        assert!(store.delete(BOB, r.id).is_err());
        assert_eq!(store.list(BOB, &ReminderFilter::default()).unwrap().total, 0);
    }

    #[test]
    fn list_is_ordered_by_remind_at_and_paged() {
        let store = ReminderStore::new();
        let now = Utc::now();
        store.create(ALICE, new_reminder("later", now + Duration::hours(2))).unwrap();
        store.create(ALICE, new_reminder("sooner", now + Duration::hours(1))).unwrap();
        store.create(ALICE, new_reminder("latest", now + Duration::hours(3))).unwrap();

        let page = store
            .list(ALICE, &ReminderFilter { page: Some(1), page_size: Some(2) })
            .unwrap();
        assert_eq!(page.total, 3);
        let bodies: Vec<_> = page.items.iter().map(|r| r.body.as_str()).collect();
        assert_eq!(bodies, ["sooner", "later"]);
    }

    #[test]
    fn update_moves_the_reminder() {
        let store = ReminderStore::new();
        let now = Utc::now();
        let r = store.create(ALICE, new_reminder("dentist", now)).unwrap();
        let moved = store
            .update(
                ALICE,
                r.id,
                ReminderUpdate {
                    body: Some("  ".to_string()),
                    remind_at: Some(now + Duration::days(1)),
                },
            )
            .unwrap();
        assert_eq!(moved.body, "dentist");
        assert_eq!(moved.remind_at, now + Duration::days(1));
    }

    #[test]
    fn blank_body_is_rejected() {
        let store = ReminderStore::new();
        let err = store.create(ALICE, new_reminder(" ", Utc::now())).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
