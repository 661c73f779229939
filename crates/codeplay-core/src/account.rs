//! Account data model.
//!
//! Kid and parent accounts share one flat username namespace. A parent
//! points at exactly one kid by username; kids may exist without a parent.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{CoreError, Result};

pub type LevelId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Kid,
    Parent,
}

impl AccountType {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountType::Kid => "kid",
            AccountType::Parent => "parent",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kid" => Ok(AccountType::Kid),
            "parent" => Ok(AccountType::Parent),
            other => Err(format!("unknown account type '{other}' (expected kid or parent)")),
        }
    }
}

/// Salted SHA-256 password digest, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub salt: String,
    pub digest: String,
}

impl Credential {
    /// Derive a credential with a fresh random salt.
    pub fn new(password: &str) -> Result<Self> {
        let mut salt = [0u8; 16];
        getrandom::getrandom(&mut salt)
            .map_err(|e| CoreError::Io(std::io::Error::other(e.to_string())))?;
        Ok(Self::with_salt(password, &hex::encode(salt)))
    }

    pub fn with_salt(password: &str, salt: &str) -> Self {
        Self {
            salt: salt.to_string(),
            digest: digest(password, salt),
        }
    }

    pub fn verify(&self, password: &str) -> bool {
        digest(password, &self.salt) == self.digest
    }
}

fn digest(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Kid profile: scores and screen-time settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KidAccount {
    pub username: String,
    /// Best score per level.
    #[serde(default, with = "level_scores")]
    pub scores: BTreeMap<LevelId, u32>,
    pub last_login: DateTime<Utc>,
    /// Minutes per session; 0 means unlimited.
    #[serde(default)]
    pub screen_time_limit_min: u32,
    /// Epoch milliseconds of the last login; 0 before the first one.
    #[serde(default)]
    pub session_start_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<Credential>,
}

impl KidAccount {
    pub fn new(username: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            username: username.into(),
            scores: BTreeMap::new(),
            last_login: now,
            screen_time_limit_min: 0,
            session_start_ms: 0,
            credential: None,
        }
    }

    pub fn best_score(&self, level_id: LevelId) -> u32 {
        self.scores.get(&level_id).copied().unwrap_or(0)
    }

    pub fn total_score(&self) -> u32 {
        self.scores.values().sum()
    }
}

/// Supervising profile linked to one kid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentAccount {
    pub username: String,
    pub email: String,
    pub kid_username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<Credential>,
}

impl ParentAccount {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        kid_username: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            kid_username: kid_username.into(),
            credential: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Account {
    Kid(KidAccount),
    Parent(ParentAccount),
}

impl Account {
    pub fn username(&self) -> &str {
        match self {
            Account::Kid(k) => &k.username,
            Account::Parent(p) => &p.username,
        }
    }

    pub fn account_type(&self) -> AccountType {
        match self {
            Account::Kid(_) => AccountType::Kid,
            Account::Parent(_) => AccountType::Parent,
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        match self {
            Account::Kid(k) => k.credential.as_ref(),
            Account::Parent(p) => p.credential.as_ref(),
        }
    }

    pub fn as_kid(&self) -> Option<&KidAccount> {
        match self {
            Account::Kid(k) => Some(k),
            Account::Parent(_) => None,
        }
    }
}

impl From<KidAccount> for Account {
    fn from(kid: KidAccount) -> Self {
        Account::Kid(kid)
    }
}

impl From<ParentAccount> for Account {
    fn from(parent: ParentAccount) -> Self {
        Account::Parent(parent)
    }
}

/// Level-id keyed maps stored with string keys.
///
/// Accounts are internally tagged, and serde cannot read integer map keys
/// back through the buffered tagged content.
mod level_scores {
    use std::collections::BTreeMap;

    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::LevelId;

    pub fn serialize<S: Serializer>(
        scores: &BTreeMap<LevelId, u32>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        scores
            .iter()
            .map(|(level, score)| (level.to_string(), *score))
            .collect::<BTreeMap<String, u32>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<LevelId, u32>, D::Error> {
        BTreeMap::<String, u32>::deserialize(deserializer)?
            .into_iter()
            .map(|(level, score)| {
                level
                    .parse::<LevelId>()
                    .map(|level| (level, score))
                    .map_err(|_| D::Error::custom(format!("invalid level id '{level}'")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_json_carries_type_tag() {
        let kid = KidAccount::new("ada", Utc::now());
        let json = serde_json::to_value(Account::from(kid)).unwrap();
        assert_eq!(json["type"], "kid");
        assert_eq!(json["username"], "ada");
        assert!(json.get("credential").is_none());

        let parent = ParentAccount::new("grace", "g@example.com", "ada");
        let json = serde_json::to_value(Account::from(parent)).unwrap();
        assert_eq!(json["type"], "parent");
        assert_eq!(json["kid_username"], "ada");
    }

    #[test]
    fn scores_survive_json_with_integer_keys() {
        let mut kid = KidAccount::new("ada", Utc::now());
        kid.scores.insert(3, 50);
        let text = serde_json::to_string(&Account::Kid(kid.clone())).unwrap();
        let back: Account = serde_json::from_str(&text).unwrap();
        assert_eq!(back.as_kid().unwrap().best_score(3), 50);
        assert_eq!(back.as_kid().unwrap().best_score(1), 0);
    }

    #[test]
    fn parent_missing_kid_reference_is_rejected() {
        let text = r#"{"type":"parent","username":"p","email":"e"}"#;
        assert!(serde_json::from_str::<Account>(text).is_err());
    }

    #[test]
    fn credential_verifies_only_matching_password() {
        let cred = Credential::with_salt("hunter2", "00ff");
        assert!(cred.verify("hunter2"));
        assert!(!cred.verify("hunter3"));
        assert_eq!(cred.digest.len(), 64);
    }

    #[test]
    fn fresh_credentials_use_distinct_salts() {
        let a = Credential::new("pw").unwrap();
        let b = Credential::new("pw").unwrap();
        assert_ne!(a.salt, b.salt);
        assert!(a.verify("pw") && b.verify("pw"));
    }

    #[test]
    fn account_type_parses_case_insensitively() {
        assert_eq!("Kid".parse::<AccountType>().unwrap(), AccountType::Kid);
        assert_eq!(" parent ".parse::<AccountType>().unwrap(), AccountType::Parent);
        assert!("admin".parse::<AccountType>().is_err());
    }
}
