//! # CodePlay Core Library
//!
//! Game logic for CodePlay, a coding game for kids. Every operation is
//! available through the `codeplay` CLI, which is a thin layer over this
//! crate.
//!
//! ## Architecture
//!
//! - **Accounts & sessions**: kid and parent accounts in a key-value store,
//!   with one persisted "current user" slot
//! - **Progress**: best score per kid and level
//! - **Screen time**: a per-kid countdown that locks play when it runs out
//! - **Levels**: quiz, block-assembly and grid-navigation engines. Timed
//!   transitions are applied when the caller invokes `tick(now_ms)`
//! - **Storage**: SQLite key-value table and TOML configuration
//! - **Collaborators**: hint client for the Gemini API and a narrator trait
//!
//! ## Key Components
//!
//! - [`SessionManager`]: login, signup and the active session
//! - [`LevelEngine`]: a running level
//! - [`execute`]: the puzzle command-execution model
//! - [`ScreenTimeGate`]: the screen-time countdown
//! - [`Database`]: kv persistence
//! - [`Config`]: application configuration

pub mod account;
pub mod error;
pub mod events;
pub mod hint;
pub mod levels;
pub mod narration;
pub mod progress;
pub mod session;
pub mod storage;
pub mod timer;

pub use account::{Account, AccountType, Credential, KidAccount, LevelId, ParentAccount};
pub use error::{AuthError, ConfigError, CoreError, DatabaseError, LevelError, PuzzleError};
pub use events::Event;
pub use hint::HintClient;
pub use levels::{execute, LevelContent, LevelEngine, RunOutcome, RunReport};
pub use narration::{LogNarrator, Narrator, NullNarrator};
pub use progress::{progress_report, LevelProgress};
pub use session::{SessionManager, SignupRequest};
pub use storage::{AccountStore, Config, Database, KeyValueStore, MemoryStore};
pub use timer::{Clock, GateState, ManualClock, ScreenTimeGate, SystemClock};
