pub mod account;
pub mod config;
pub mod hint;
pub mod levels;
pub mod parent;
pub mod play;
pub mod time;

use codeplay_core::storage::{AccountStore, Database};
use codeplay_core::{Config, SessionManager, SystemClock};

pub type Session = SessionManager<Database, SystemClock>;

/// Open the on-disk store and restore the active session.
pub fn open_session(config: &Config) -> Result<Session, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    tracing::debug!("database opened");
    let session = SessionManager::new(AccountStore::new(db), SystemClock)?;
    Ok(session.with_auth(config.auth.clone()))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
