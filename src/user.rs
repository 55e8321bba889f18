//! Signed-in user and its persistence
//!
//! The current user is stored as a single JSON blob under a fixed key of a
//! small string store. The store is a trait so the host can back it with
//! whatever local storage it has.

use std::{collections::HashMap, fmt::Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::account::STORAGE_KEY;

/// Role a user signs up with
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Student
    #[default]
    Student,
    /// Teaching staff
    Teacher,
    /// School administration
    Admin,
    /// Security staff
    Security,
    /// School nurse
    Nurse,
    /// Parent or guardian
    Parent,
}

impl Role {
    /// Every role, in the order offered at sign up
    pub const ALL: [Self; 6] = [
        Self::Student,
        Self::Teacher,
        Self::Admin,
        Self::Security,
        Self::Nurse,
        Self::Parent,
    ];

    /// Human readable label
    pub fn label(self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Teacher => "Teacher",
            Self::Admin => "Administrator",
            Self::Security => "Security Staff",
            Self::Nurse => "School Nurse",
            Self::Parent => "Parent/Guardian",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Role
    pub role: Role,
}

/// A string key-value store
pub trait Store {
    /// Value stored under `key`, if any
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: String);

    /// Removes `key`
    fn remove(&mut self, key: &str);
}

/// In-memory [`Store`]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_owned(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Errors reading or writing the stored user
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The stored blob is not a valid user record
    #[error("stored user is corrupt: {0}")]
    Corrupt(String),
    /// The record could not be encoded
    #[error("user could not be encoded: {0}")]
    Encode(String),
}

/// Provider of the signed-in user over a [`Store`]
#[derive(Debug, Clone, Default)]
pub struct UserSession<S> {
    store: S,
}

impl<S: Store> UserSession<S> {
    /// Wraps `store`
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The signed-in user, or `None` when signed out
    ///
    /// # Errors
    ///
    /// Returns [`Error::Corrupt`] if the stored blob does not decode.
    pub fn get(&self) -> Result<Option<UserRecord>, Error> {
        self.store
            .get(STORAGE_KEY)
            .map(|blob| serde_json::from_str(&blob).map_err(|e| Error::Corrupt(e.to_string())))
            .transpose()
    }

    /// Stores `user` as the signed-in user
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if the record cannot be serialized.
    pub fn set(&mut self, user: &UserRecord) -> Result<(), Error> {
        let blob = serde_json::to_string(user).map_err(|e| Error::Encode(e.to_string()))?;
        self.store.set(STORAGE_KEY, blob);
        tracing::debug!(email = %user.email, role = %user.role, "user stored");
        Ok(())
    }

    /// Forgets the signed-in user
    pub fn clear(&mut self) {
        self.store.remove(STORAGE_KEY);
        tracing::debug!("user cleared");
    }

    /// Whether a user is signed in
    pub fn is_signed_in(&self) -> bool {
        self.store.get(STORAGE_KEY).is_some()
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }
}
