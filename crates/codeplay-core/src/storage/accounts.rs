//! Account directory on top of a [`KeyValueStore`].
//!
//! All accounts live as one JSON object under `allUsers`, keyed by username.
//! Entries are decoded one at a time so a single damaged record only hides
//! that account.

use std::collections::BTreeMap;

use serde_json::Value;

use super::kv::KeyValueStore;
use crate::account::{Account, KidAccount};
use crate::error::{AuthError, Result};

/// Key of the account directory.
pub const ALL_USERS_KEY: &str = "allUsers";
/// Key of the active session record.
pub const CURRENT_USER_KEY: &str = "currentUser";

/// Username-keyed account storage.
#[derive(Debug)]
pub struct AccountStore<S> {
    backend: S,
}

impl<S: KeyValueStore> AccountStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Look up an account.
    ///
    /// Missing and malformed records both come back as `None`.
    pub fn get(&self, username: &str) -> Result<Option<Account>> {
        let Some(directory) = self.read_directory_lenient()? else {
            return Ok(None);
        };
        Ok(directory.get(username).and_then(|raw| decode(username, raw)))
    }

    /// Convenience lookup that only yields kid accounts.
    pub fn get_kid(&self, username: &str) -> Result<Option<KidAccount>> {
        Ok(match self.get(username)? {
            Some(Account::Kid(kid)) => Some(kid),
            _ => None,
        })
    }

    /// Insert or replace an account by username.
    pub fn put(&self, account: &Account) -> Result<()> {
        let mut directory = self.read_directory_strict()?;
        directory.insert(account.username().to_string(), serde_json::to_value(account)?);
        self.write_directory(&directory)?;
        tracing::debug!(username = account.username(), "account stored");
        Ok(())
    }

    /// Insert several new accounts in one write.
    ///
    /// Fails with `Conflict` and writes nothing if any username is already
    /// taken, including by a malformed record, or appears twice in `accounts`.
    pub fn insert_new(&self, accounts: &[Account]) -> Result<()> {
        let mut directory = self.read_directory_strict()?;
        for account in accounts {
            let username = account.username();
            if directory.contains_key(username) {
                return Err(AuthError::Conflict {
                    username: username.to_string(),
                }
                .into());
            }
            directory.insert(username.to_string(), serde_json::to_value(account)?);
        }
        self.write_directory(&directory)?;
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn read_raw(&self) -> Result<Option<String>> {
        Ok(self.backend.kv_get(ALL_USERS_KEY)?)
    }

    /// Unreadable directory reads as empty.
    fn read_directory_lenient(&self) -> Result<Option<BTreeMap<String, Value>>> {
        let Some(raw) = self.read_raw()? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(directory) => Ok(Some(directory)),
            Err(e) => {
                tracing::warn!(error = %e, "account directory is unreadable; treating as empty");
                Ok(None)
            }
        }
    }

    /// Unreadable directory is an error so a write cannot clobber it.
    fn read_directory_strict(&self) -> Result<BTreeMap<String, Value>> {
        match self.read_raw()? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(BTreeMap::new()),
        }
    }

    fn write_directory(&self, directory: &BTreeMap<String, Value>) -> Result<()> {
        let raw = serde_json::to_string(directory)?;
        self.backend.kv_set(ALL_USERS_KEY, &raw)?;
        Ok(())
    }
}

/// Decode one stored record, failing closed.
fn decode(username: &str, raw: &Value) -> Option<Account> {
    match serde_json::from_value::<Account>(raw.clone()) {
        Ok(account) if account.username() == username => Some(account),
        Ok(account) => {
            tracing::warn!(
                key = username,
                stored = account.username(),
                "account record filed under a different username; ignoring"
            );
            None
        }
        Err(e) => {
            tracing::warn!(key = username, error = %e, "malformed account record; ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::ParentAccount;
    use crate::error::CoreError;
    use crate::storage::MemoryStore;
    use chrono::Utc;

    fn store() -> AccountStore<MemoryStore> {
        AccountStore::new(MemoryStore::new())
    }

    #[test]
    fn get_on_empty_store_is_none() {
        let s = store();
        assert!(s.get("nobody").unwrap().is_none());
        assert!(s.backend().is_empty());
    }

    #[test]
    fn put_upserts_by_username() {
        let s = store();
        let mut kid = KidAccount::new("ada", Utc::now());
        s.put(&kid.clone().into()).unwrap();
        kid.screen_time_limit_min = 30;
        s.put(&kid.clone().into()).unwrap();
        assert_eq!(s.get_kid("ada").unwrap().unwrap().screen_time_limit_min, 30);
        let raw = s.backend().kv_get(ALL_USERS_KEY).unwrap().unwrap();
        let directory: serde_json::Map<String, Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn malformed_record_fails_closed() {
        let s = store();
        s.backend()
            .kv_set(ALL_USERS_KEY, r#"{"ada":{"type":"kid","username":"ada"}}"#)
            .unwrap();
        // Missing last_login: present but unusable.
        assert!(s.get("ada").unwrap().is_none());
        // Still occupies the name.
        let err = s
            .insert_new(&[KidAccount::new("ada", Utc::now()).into()])
            .unwrap_err();
        assert!(matches!(err, CoreError::Auth(AuthError::Conflict { .. })));
    }

    #[test]
    fn record_under_wrong_key_fails_closed() {
        let s = store();
        let parent = Account::from(ParentAccount::new("pat", "p@example.com", "ada"));
        let mut directory = serde_json::Map::new();
        directory.insert("mallory".into(), serde_json::to_value(&parent).unwrap());
        s.backend()
            .kv_set(ALL_USERS_KEY, &Value::Object(directory).to_string())
            .unwrap();
        assert!(s.get("mallory").unwrap().is_none());
    }

    #[test]
    fn unreadable_directory_reads_empty_but_refuses_writes() {
        let s = store();
        s.backend().kv_set(ALL_USERS_KEY, "not json").unwrap();
        assert!(s.get("ada").unwrap().is_none());
        let kid = KidAccount::new("ada", Utc::now());
        assert!(matches!(s.put(&kid.into()), Err(CoreError::Json(_))));
        assert_eq!(
            s.backend().kv_get(ALL_USERS_KEY).unwrap().as_deref(),
            Some("not json")
        );
    }

    #[test]
    fn insert_new_rejects_taken_names_without_writing() {
        let s = store();
        s.put(&KidAccount::new("ada", Utc::now()).into()).unwrap();
        let before = s.backend().kv_get(ALL_USERS_KEY).unwrap();

        let err = s
            .insert_new(&[
                ParentAccount::new("pat", "p@example.com", "ada").into(),
                KidAccount::new("ada", Utc::now()).into(),
            ])
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Auth(AuthError::Conflict { ref username }) if username == "ada"
        ));
        assert_eq!(s.backend().kv_get(ALL_USERS_KEY).unwrap(), before);
        assert!(s.get("pat").unwrap().is_none());
    }

    #[test]
    fn insert_new_rejects_duplicate_within_batch() {
        let s = store();
        let err = s
            .insert_new(&[
                ParentAccount::new("sam", "s@example.com", "sam").into(),
                KidAccount::new("sam", Utc::now()).into(),
            ])
            .unwrap_err();
        assert!(matches!(err, CoreError::Auth(AuthError::Conflict { .. })));
        assert!(s.backend().kv_get(ALL_USERS_KEY).unwrap().is_none());
    }
}
