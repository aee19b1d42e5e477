use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use notekeep_core::{DomainError, DomainResult, NoteId, UserId};

use super::{Page, Paging, contains_ci};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: NoteId,
    pub owner: UserId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewNote {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Partial update; absent or blank fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteFilter {
    /// Creation day (UTC), e.g. `2024-05-01`.
    pub date: Option<NaiveDate>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl NoteFilter {
    pub fn paging(&self) -> Paging {
        Paging {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Default)]
struct NoteTable {
    last_id: i64,
    by_id: BTreeMap<NoteId, Note>,
}

/// Notes scoped by owner.
///
/// Every operation takes the acting user's id; a note owned by someone else
/// is reported as not found rather than forbidden, so ids do not leak.
#[derive(Debug, Default)]
pub struct NoteStore {
    inner: RwLock<NoteTable>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, NoteTable>> {
        self.inner
            .read()
            .map_err(|_| DomainError::internal("note store lock poisoned"))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, NoteTable>> {
        self.inner
            .write()
            .map_err(|_| DomainError::internal("note store lock poisoned"))
    }

    pub fn create(&self, owner: UserId, note: NewNote, now: DateTime<Utc>) -> DomainResult<Note> {
        let title = note.title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("title must not be empty"));
        }

        let mut table = self.write()?;
        table.last_id += 1;
        let note = Note {
            id: NoteId::new(table.last_id),
            owner,
            title: title.to_string(),
            content: note.content,
            created_at: now,
        };
        table.by_id.insert(note.id, note.clone());
        Ok(note)
    }

    pub fn get(&self, owner: UserId, id: NoteId) -> DomainResult<Note> {
        self.read()?
            .by_id
            .get(&id)
            .filter(|n| n.owner == owner)
            .cloned()
            .ok_or(DomainError::not_found("note"))
    }

    pub fn list(&self, owner: UserId, filter: &NoteFilter) -> DomainResult<Page<Note>> {
        let matches: Vec<Note> = self
            .read()?
            .by_id
            .values()
            .filter(|n| n.owner == owner)
            .filter(|n| filter.date.is_none_or(|d| n.created_at.date_naive() == d))
            .filter(|n| contains_ci(&n.title, filter.title.as_deref()))
            .filter(|n| contains_ci(&n.content, filter.content.as_deref()))
            .cloned()
            .collect();
        Ok(filter.paging().apply(matches))
    }

    pub fn update(&self, owner: UserId, id: NoteId, update: NoteUpdate) -> DomainResult<Note> {
        let mut table = self.write()?;
        let note = table
            .by_id
            .get_mut(&id)
            .filter(|n| n.owner == owner)
            .ok_or(DomainError::not_found("note"))?;

        if let Some(title) = update.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            note.title = title.to_string();
        }
        if let Some(content) = update.content.filter(|c| !c.trim().is_empty()) {
            note.content = content;
        }
        Ok(note.clone())
    }

    pub fn delete(&self, owner: UserId, id: NoteId) -> DomainResult<()> {
        let mut table = self.write()?;
        match table.by_id.get(&id) {
            Some(n) if n.owner == owner => {
                table.by_id.remove(&id);
                Ok(())
            }
            _ => Err(DomainError::not_found("note")),
        }
    }

    /// Drop every note owned by `owner`; returns how many were removed.
    pub fn delete_owned_by(&self, owner: UserId) -> DomainResult<usize> {
        let mut table = self.write()?;
        let before = table.by_id.len();
        table.by_id.retain(|_, n| n.owner != owner);
        Ok(before - table.by_id.len())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);

    fn new_note(title: &str, content: &str) -> NewNote {
        NewNote {
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn notes_are_invisible_to_other_owners() {
        let store = NoteStore::new();
        let note = store.create(ALICE, new_note("groceries", "milk"), Utc::now()).unwrap();

        assert_eq!(store.get(ALICE, note.id).unwrap().title, "groceries");
        assert_eq!(store.get(BOB, note.id), Err(DomainError::not_found("note")));
        assert!(store.update(BOB, note.id, NoteUpdate::default()).is_err());
        assert!(store.delete(BOB, note.id).is_err());
        assert_eq!(store.list(BOB, &NoteFilter::default()).unwrap().total, 0);
    }

    #[test]
    fn blank_title_is_rejected() {
        let store = NoteStore::new();
        let err = store.create(ALICE, new_note("  ", "x"), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn update_ignores_blank_fields() {
        let store = NoteStore::new();
        let note = store.create(ALICE, new_note("t", "c"), Utc::now()).unwrap();
        let updated = store
            .update(
                ALICE,
                note.id,
                NoteUpdate {
                    title: Some(" ".to_string()),
                    content: Some("new".to_string()),
                },
            )
            .unwrap();
        assert_eq!(updated.title, "t");
        assert_eq!(updated.content, "new");
    }

    #[test]
    fn list_filters_title_and_content() {
        let store = NoteStore::new();
        store.create(ALICE, new_note("Shopping", "eggs"), Utc::now()).unwrap();
        store.create(ALICE, new_note("Work", "send eggs report"), Utc::now()).unwrap();
        store.create(ALICE, new_note("Gym", "legs"), Utc::now()).unwrap();

        let filter = NoteFilter {
            content: Some("EGGS".to_string()),
            ..NoteFilter::default()
        };
        assert_eq!(store.list(ALICE, &filter).unwrap().total, 2);

        let filter = NoteFilter {
            title: Some("shop".to_string()),
            content: Some("eggs".to_string()),
            ..NoteFilter::default()
        };
        assert_eq!(store.list(ALICE, &filter).unwrap().total, 1);
    }

    #[test]
    fn list_filters_by_creation_day() {
        let store = NoteStore::new();
        let may_first = Utc.with_ymd_and_hms(2024, 5, 1, 23, 30, 0).unwrap();
        let may_second = Utc.with_ymd_and_hms(2024, 5, 2, 0, 15, 0).unwrap();
        store.create(ALICE, new_note("late", ""), may_first).unwrap();
        store.create(ALICE, new_note("early", ""), may_second).unwrap();

        let filter = NoteFilter {
            date: NaiveDate::from_ymd_opt(2024, 5, 2),
            ..NoteFilter::default()
        };
        let page = store.list(ALICE, &filter).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].title, "early");
    }

    #[test]
    fn delete_owned_by_only_touches_that_owner() {
        let store = NoteStore::new();
        store.create(ALICE, new_note("a", ""), Utc::now()).unwrap();
        store.create(ALICE, new_note("b", ""), Utc::now()).unwrap();
        store.create(BOB, new_note("c", ""), Utc::now()).unwrap();

        assert_eq!(store.delete_owned_by(ALICE).unwrap(), 2);
        assert_eq!(store.list(BOB, &NoteFilter::default()).unwrap().total, 1);
    }
}
