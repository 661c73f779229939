//! Session manager.
//!
//! Owns the single "current user" slot. The slot is an explicit object the
//! caller holds, persisted under `currentUser` so a restarted front end picks
//! the session back up.
//!
//! Login is a mock by default: username + account type is enough. Setting
//! `auth.require_password` also checks the password captured at signup.

use chrono::{DateTime, Utc};

use crate::account::{Account, AccountType, Credential, KidAccount, ParentAccount};
use crate::error::{AuthError, Result};
use crate::storage::{AccountStore, AuthConfig, KeyValueStore, CURRENT_USER_KEY};
use crate::timer::{Clock, ScreenTimeGate};

/// Everything the signup form collects.
#[derive(Debug, Clone, Default)]
pub struct SignupRequest {
    pub parent_username: String,
    pub parent_email: String,
    pub kid_username: String,
    pub parent_password: Option<String>,
    pub kid_password: Option<String>,
    /// Starting limit for the kid; 0 = unlimited.
    pub screen_time_limit_min: u32,
}

/// Login/logout and the active-session cache.
#[derive(Debug)]
pub struct SessionManager<S, C> {
    store: AccountStore<S>,
    clock: C,
    auth: AuthConfig,
    current: Option<Account>,
}

impl<S: KeyValueStore, C: Clock> SessionManager<S, C> {
    /// Build a manager and restore any persisted session.
    ///
    /// A malformed `currentUser` record is ignored.
    pub fn new(store: AccountStore<S>, clock: C) -> Result<Self> {
        let current = match store.backend().kv_get(CURRENT_USER_KEY)? {
            Some(raw) => match serde_json::from_str::<Account>(&raw) {
                Ok(account) => Some(account),
                Err(e) => {
                    tracing::warn!(error = %e, "stored session is malformed; starting logged out");
                    None
                }
            },
            None => None,
        };
        Ok(Self {
            store,
            clock,
            auth: AuthConfig::default(),
            current,
        })
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    pub fn store(&self) -> &AccountStore<S> {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn current_session(&self) -> Option<&Account> {
        self.current.as_ref()
    }

    /// The active session as a kid account.
    pub fn current_kid(&self) -> std::result::Result<&KidAccount, AuthError> {
        match &self.current {
            Some(Account::Kid(kid)) => Ok(kid),
            Some(Account::Parent(_)) => Err(AuthError::WrongAccountType { expected: "kid" }),
            None => Err(AuthError::NoSession),
        }
    }

    /// The active session as a parent account.
    pub fn current_parent(&self) -> std::result::Result<&ParentAccount, AuthError> {
        match &self.current {
            Some(Account::Parent(parent)) => Ok(parent),
            Some(Account::Kid(_)) => Err(AuthError::WrongAccountType { expected: "parent" }),
            None => Err(AuthError::NoSession),
        }
    }

    /// Resolve a parent's kid reference through the store.
    pub fn kid_of(&self, parent: &ParentAccount) -> Result<Option<KidAccount>> {
        self.store.get_kid(&parent.kid_username)
    }

    /// Screen-time gate for the active kid session, evaluated now.
    pub fn screen_time_gate(&self) -> std::result::Result<ScreenTimeGate, AuthError> {
        let kid = self.current_kid()?;
        Ok(ScreenTimeGate::new(
            kid.screen_time_limit_min,
            kid.session_start_ms,
            self.clock.now_ms(),
        ))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Log in as `username`, claiming `claimed` as its account type.
    ///
    /// Unknown username, type mismatch and a failed password check all map to
    /// errors with the same message. A kid login restarts the screen-time
    /// window and is written back to the store.
    pub fn login(
        &mut self,
        username: &str,
        claimed: AccountType,
        password: Option<&str>,
    ) -> Result<Account> {
        let username = username.trim();
        let Some(mut account) = self.store.get(username)? else {
            tracing::info!(username, "login rejected");
            return Err(AuthError::NotFound.into());
        };
        if account.account_type() != claimed {
            tracing::info!(username, "login rejected");
            return Err(AuthError::TypeMismatch.into());
        }
        if self.auth.require_password {
            let verified = match (account.credential(), password) {
                (Some(credential), Some(password)) => credential.verify(password),
                _ => false,
            };
            if !verified {
                tracing::info!(username, "login rejected");
                return Err(AuthError::InvalidCredentials.into());
            }
        }

        if let Account::Kid(kid) = &mut account {
            let now_ms = self.clock.now_ms();
            kid.session_start_ms = now_ms;
            kid.last_login = timestamp(now_ms);
            self.store.put(&account)?;
        }

        self.set_current(Some(account.clone()))?;
        tracing::info!(username, account_type = %claimed, "logged in");
        Ok(account)
    }

    /// Clear the active session. Stored accounts are untouched.
    pub fn logout(&mut self) -> Result<()> {
        if let Some(account) = &self.current {
            tracing::info!(username = account.username(), "logged out");
        }
        self.set_current(None)
    }

    /// Create a parent and kid pair and log the parent in.
    ///
    /// Fails with `Conflict` without writing anything when either username is
    /// taken or both usernames are the same.
    pub fn signup(&mut self, request: SignupRequest) -> Result<ParentAccount> {
        let parent_username = request.parent_username.trim();
        let kid_username = request.kid_username.trim();
        if parent_username.is_empty() || kid_username.is_empty() {
            return Err(AuthError::EmptyUsername.into());
        }

        let now_ms = self.clock.now_ms();
        let mut kid = KidAccount::new(kid_username, timestamp(now_ms));
        kid.screen_time_limit_min = request.screen_time_limit_min;
        let mut parent = ParentAccount::new(parent_username, request.parent_email.trim(), kid_username);

        parent.credential = credential_for(request.parent_password.as_deref())?;
        kid.credential = credential_for(request.kid_password.as_deref())?;

        self.store
            .insert_new(&[Account::Parent(parent.clone()), Account::Kid(kid)])?;
        self.set_current(Some(Account::Parent(parent.clone())))?;
        tracing::info!(parent = parent_username, kid = kid_username, "signed up");
        Ok(parent)
    }

    /// Write a kid record through to the store.
    ///
    /// When the kid is the active session the cached copy is replaced too, so
    /// displayed scores and limits match the store.
    pub fn update_kid(&mut self, kid: &KidAccount) -> Result<()> {
        self.store.put(&Account::Kid(kid.clone()))?;
        let is_active = matches!(
            &self.current,
            Some(Account::Kid(active)) if active.username == kid.username
        );
        if is_active {
            self.set_current(Some(Account::Kid(kid.clone())))?;
        }
        Ok(())
    }

    /// Parent dashboard: set the linked kid's screen-time limit.
    pub fn set_screen_time_limit(&mut self, minutes: u32) -> Result<KidAccount> {
        let parent = self.current_parent()?.clone();
        let mut kid = self
            .kid_of(&parent)?
            .ok_or_else(|| AuthError::DanglingKid {
                username: parent.kid_username.clone(),
            })?;
        kid.screen_time_limit_min = minutes;
        self.update_kid(&kid)?;
        tracing::info!(kid = %kid.username, minutes, "screen time limit updated");
        Ok(kid)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn set_current(&mut self, account: Option<Account>) -> Result<()> {
        match &account {
            Some(account) => {
                let raw = serde_json::to_string(account)?;
                self.store.backend().kv_set(CURRENT_USER_KEY, &raw)?;
            }
            None => self.store.backend().kv_remove(CURRENT_USER_KEY)?,
        }
        self.current = account;
        Ok(())
    }
}

fn timestamp(ms: u64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms as i64).unwrap_or_else(Utc::now)
}

/// Blank or missing passwords store no credential.
fn credential_for(password: Option<&str>) -> Result<Option<Credential>> {
    password
        .filter(|p| !p.is_empty())
        .map(Credential::new)
        .transpose()
}
