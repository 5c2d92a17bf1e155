//! Keyed user records with create/read/update/destroy.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("User does not exist!")]
    UserNotFound(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

/// User registry. Ids start at 1 and are never reused.
#[derive(Debug)]
pub struct Registry {
    users: BTreeMap<u64, User>,
    next_id: u64,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            users: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, name: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.users.insert(id, User { id, name: name.into() });
        id
    }

    pub fn read(&self, id: u64) -> Result<&User, RegistryError> {
        self.users.get(&id).ok_or(RegistryError::UserNotFound(id))
    }

    pub fn update(&mut self, id: u64, name: impl Into<String>) -> Result<(), RegistryError> {
        let user = self.users.get_mut(&id).ok_or(RegistryError::UserNotFound(id))?;
        user.name = name.into();
        Ok(())
    }

    pub fn destroy(&mut self, id: u64) -> Result<User, RegistryError> {
        self.users.remove(&id).ok_or(RegistryError::UserNotFound(id))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
