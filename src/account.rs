//! Local account stub
//!
//! Registration does not talk to any server: it validates the form and
//! records `{name, email, logged: true}` under its own key. Nothing in the
//! chat session code reads this record.

use crate::error::{MetiorError, Result};
use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Persisted user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Display name
    pub name: String,
    /// Email address as entered
    pub email: String,
    /// Whether the user is considered signed in
    pub logged: bool,
}

/// Registration form input
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Password; only compared, never stored
    pub password: String,
    /// Must equal `password`
    pub confirm_password: String,
    /// Whether the terms of use were accepted
    pub accepted_terms: bool,
}

impl RegistrationForm {
    /// Check the form without touching storage
    ///
    /// # Errors
    ///
    /// Returns `MetiorError::Validation` when the passwords differ or the
    /// terms were not accepted
    pub fn validate(&self) -> Result<()> {
        if self.password != self.confirm_password {
            return Err(MetiorError::Validation("Passwords do not match".to_string()).into());
        }
        if !self.accepted_terms {
            return Err(MetiorError::Validation("You must accept the terms".to_string()).into());
        }
        Ok(())
    }
}

/// Reads and writes the user record and wipes local data
pub struct AccountStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl AccountStore {
    /// Create an account store writing under `key`
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Validate the form and record the user as signed in
    ///
    /// The password is only compared against its confirmation; it is never
    /// stored.
    ///
    /// # Errors
    ///
    /// Returns `MetiorError::Validation` for a rejected form (nothing is
    /// written) or the storage error if the record cannot be saved
    ///
    /// # Examples
    ///
    /// ```
    /// use metior::account::{AccountStore, RegistrationForm};
    /// use metior::storage::MemoryStore;
    /// use std::sync::Arc;
    ///
    /// let accounts = AccountStore::new(Arc::new(MemoryStore::new()), "meteior-user");
    /// let user = accounts
    ///     .register(&RegistrationForm {
    ///         name: "Ada".into(),
    ///         email: "ada@example.com".into(),
    ///         password: "secret".into(),
    ///         confirm_password: "secret".into(),
    ///         accepted_terms: true,
    ///     })
    ///     .unwrap();
    /// assert!(user.logged);
    /// ```
    pub fn register(&self, form: &RegistrationForm) -> Result<UserRecord> {
        form.validate()?;

        let record = UserRecord {
            name: form.name.clone(),
            email: form.email.clone(),
            logged: true,
        };
        let raw = serde_json::to_string(&record)?;
        self.store.set(&self.key, &raw)?;

        tracing::info!(email = %record.email, "Registered local user");
        Ok(record)
    }

    /// The registered user, if any
    ///
    /// # Errors
    ///
    /// Returns `MetiorError::Storage` if the stored record is malformed
    pub fn current_user(&self) -> Result<Option<UserRecord>> {
        match self.store.get(&self.key)? {
            Some(raw) => {
                let record = serde_json::from_str(&raw)
                    .map_err(|e| MetiorError::Storage(format!("Malformed user record: {}", e)))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Remove every chat and the user record
    pub fn clear_all_data(&self) -> Result<()> {
        self.store.clear()?;
        tracing::info!("Cleared all local data");
        Ok(())
    }
}
