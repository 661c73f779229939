//! Screen-time gate.
//!
//! A parent sets a daily limit in minutes (0 = unlimited). The countdown
//! starts at the kid's session-start stamp, which login resets.
//!
//! ## States
//!
//! ```text
//! Unlimited
//! Counting -> Locked
//! ```
//!
//! `Locked` is terminal. Access comes back only through logout + login,
//! which builds a fresh gate from a new session-start.

use serde::{Deserialize, Serialize};

use crate::events::Event;

/// Remaining allowed play time in whole seconds.
///
/// Returns `None` when `limit_min` is 0. Partial seconds round up, so the
/// value reaches exactly 0 at `session_start_ms + limit_min * 60s`.
/// A `now_ms` earlier than the session start counts as no time elapsed.
pub fn remaining_seconds(limit_min: u32, session_start_ms: u64, now_ms: u64) -> Option<u64> {
    if limit_min == 0 {
        return None;
    }
    let limit_ms = u64::from(limit_min) * 60 * 1000;
    let elapsed_ms = now_ms.saturating_sub(session_start_ms);
    Some(limit_ms.saturating_sub(elapsed_ms).div_ceil(1000))
}

/// Formats seconds as `"Mm Ss"` for the countdown badge.
pub fn format_remaining(secs: u64) -> String {
    format!("{}m {}s", secs / 60, secs % 60)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum GateState {
    Unlimited,
    Counting { remaining_secs: u64 },
    Locked,
}

/// Countdown gate for one kid session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenTimeGate {
    limit_min: u32,
    session_start_ms: u64,
    state: GateState,
}

impl ScreenTimeGate {
    /// Build the gate and evaluate it at `now_ms`.
    ///
    /// A session that is already over the limit starts out `Locked`.
    pub fn new(limit_min: u32, session_start_ms: u64, now_ms: u64) -> Self {
        let state = match remaining_seconds(limit_min, session_start_ms, now_ms) {
            None => GateState::Unlimited,
            Some(0) => GateState::Locked,
            Some(remaining_secs) => GateState::Counting { remaining_secs },
        };
        Self {
            limit_min,
            session_start_ms,
            state,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn limit_min(&self) -> u32 {
        self.limit_min
    }

    pub fn session_start_ms(&self) -> u64 {
        self.session_start_ms
    }

    pub fn is_locked(&self) -> bool {
        self.state == GateState::Locked
    }

    pub fn remaining_secs(&self) -> Option<u64> {
        match self.state {
            GateState::Unlimited => None,
            GateState::Counting { remaining_secs } => Some(remaining_secs),
            GateState::Locked => Some(0),
        }
    }

    /// Call about once per second.
    ///
    /// Returns `ScreenTimeLocked` on the tick that reaches zero,
    /// `ScreenTimeTick` when the remaining whole seconds changed, and
    /// nothing while unlimited or already locked.
    pub fn tick(&mut self, now_ms: u64) -> Option<Event> {
        let GateState::Counting { remaining_secs } = self.state else {
            return None;
        };
        let now_remaining = remaining_seconds(self.limit_min, self.session_start_ms, now_ms)
            .unwrap_or(0)
            // A clock that went backwards must not give time back.
            .min(remaining_secs);

        if now_remaining == 0 {
            self.state = GateState::Locked;
            tracing::info!(limit_min = self.limit_min, "screen time limit reached");
            return Some(Event::ScreenTimeLocked { at_ms: now_ms });
        }
        if now_remaining != remaining_secs {
            self.state = GateState::Counting {
                remaining_secs: now_remaining,
            };
            return Some(Event::ScreenTimeTick {
                remaining_secs: now_remaining,
                at_ms: now_ms,
            });
        }
        None
    }
}
