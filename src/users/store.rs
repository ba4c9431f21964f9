use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: u32,
    pub name: String,
}

impl User {
    pub fn new(id: u32, name: impl Into<String>) -> User {
        User {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("user id {0} is already taken")]
    IdCollision(u32),
    #[error("no user ids left to assign")]
    IdsExhausted,
}

/// Users in insertion order. Every operation holds the lock for its whole
/// duration, so id assignment and the uniqueness check are one step.
#[derive(Debug, Default)]
pub struct UserStore {
    users: Mutex<Vec<User>>,
}

impl UserStore {
    pub fn new() -> UserStore {
        UserStore::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> UserStore {
        UserStore {
            users: Mutex::new(users.into_iter().collect()),
        }
    }

    pub fn seeded() -> UserStore {
        UserStore::with_users([
            User::new(1, "John"),
            User::new(2, "Alice"),
            User::new(3, "Bob"),
            User::new(4, "Emily"),
        ])
    }

    // A panic while holding the lock can't leave the Vec half-updated, so
    // the poisoned data is still good.
    fn lock(&self) -> MutexGuard<'_, Vec<User>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn list(&self) -> Vec<User> {
        self.lock().clone()
    }

    pub fn get(&self, id: u32) -> Option<User> {
        self.lock().iter().find(|u| u.id == id).cloned()
    }

    pub fn create(&self, name: impl Into<String>) -> Result<User, StoreError> {
        let mut users = self.lock();

        let id = match users.iter().map(|u| u.id).max() {
            Some(max) => max.checked_add(1).ok_or(StoreError::IdsExhausted)?,
            None => 1,
        };
        if users.iter().any(|u| u.id == id) {
            return Err(StoreError::IdCollision(id));
        }

        let user = User::new(id, name);
        users.push(user.clone());
        Ok(user)
    }

    pub fn update(&self, id: u32, name: impl Into<String>) -> Option<User> {
        let mut users = self.lock();
        let user = users.iter_mut().find(|u| u.id == id)?;
        user.name = name.into();
        Some(user.clone())
    }

    pub fn delete(&self, id: u32) -> Option<User> {
        let mut users = self.lock();
        let pos = users.iter().position(|u| u.id == id)?;
        Some(users.remove(pos))
    }
}
