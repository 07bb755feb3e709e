//! In-memory home of live workout sessions and template drafts.
//!
//! Entries expire after a period without access. A lookup by anyone other
//! than the owner behaves as if the entry did not exist.

use moka::sync::Cache;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use crate::domain::session::WorkoutSession;
use crate::domain::template_editor::TemplateDraft;
use crate::errors::AppError;

pub trait Owned {
    fn id(&self) -> Uuid;
    fn owner(&self) -> Uuid;
}

pub struct DraftStore<T> {
    entries: Cache<Uuid, Arc<Mutex<T>>>,
    kind: &'static str,
}

pub type SessionStore = DraftStore<WorkoutSession>;
pub type TemplateDraftStore = DraftStore<TemplateDraft>;

impl<T> DraftStore<T>
where
    T: Owned + Clone + Send + 'static,
{
    pub fn new(kind: &'static str, capacity: u64, idle: Duration) -> Self {
        DraftStore {
            entries: Cache::builder()
                .max_capacity(capacity)
                .time_to_idle(idle)
                .build(),
            kind,
        }
    }

    pub fn insert(&self, item: T) -> Uuid {
        let id = item.id();
        self.entries.insert(id, Arc::new(Mutex::new(item)));
        id
    }

    fn entry(&self, id: Uuid, owner: Uuid) -> Result<Arc<Mutex<T>>, AppError> {
        let not_found = || AppError::NotFound(format!("{} not found", self.kind));
        let entry = self.entries.get(&id).ok_or_else(not_found)?;
        let is_owner = entry
            .lock()
            .map(|item| item.owner() == owner)
            .map_err(|_| AppError::InternalServerError("Draft state is unavailable".to_string()))?;
        if !is_owner {
            return Err(not_found());
        }
        Ok(entry)
    }

    /// Runs `f` against the owner's entry while holding its lock.
    pub fn with<R, F>(&self, id: Uuid, owner: Uuid, f: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut T) -> Result<R, AppError>,
    {
        let entry = self.entry(id, owner)?;
        let mut item = entry
            .lock()
            .map_err(|_| AppError::InternalServerError("Draft state is unavailable".to_string()))?;
        f(&mut *item)
    }

    pub fn snapshot(&self, id: Uuid, owner: Uuid) -> Result<T, AppError> {
        self.with(id, owner, |item| Ok(item.clone()))
    }

    /// Removes the entry and hands it over to the caller. Used before
    /// persisting so a second submit of the same entry finds nothing.
    pub fn take(&self, id: Uuid, owner: Uuid) -> Result<T, AppError> {
        self.entry(id, owner)?;
        // Only one caller gets the removed value back
        let entry = self
            .entries
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("{} not found", self.kind)))?;
        let item = entry
            .lock()
            .map_err(|_| AppError::InternalServerError("Draft state is unavailable".to_string()))?;
        Ok(item.clone())
    }

    /// Puts back an entry whose save failed so the user can retry.
    pub fn restore(&self, item: T) {
        self.insert(item);
    }

    pub fn discard(&self, id: Uuid, owner: Uuid) -> Result<(), AppError> {
        self.entry(id, owner)?;
        self.entries.invalidate(&id);
        Ok(())
    }
}
