use chrono::DateTime;
use codeplay_core::timer::format_remaining;
use codeplay_core::{Clock, Config, GateState};
use serde_json::json;

use super::{open_session, print_json};

/// Print the kid's screen-time status as JSON.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let session = open_session(&config)?;
    let gate = session.screen_time_gate()?;
    let kid = session.current_kid()?;

    let display = match gate.state() {
        GateState::Unlimited => "unlimited".to_string(),
        GateState::Counting { remaining_secs } => format_remaining(remaining_secs),
        GateState::Locked => "time is up".to_string(),
    };
    let started = i64::try_from(gate.session_start_ms())
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|t| t.to_rfc3339());
    print_json(&json!({
        "kid": kid.username,
        "limit_min": gate.limit_min(),
        "session_start_ms": gate.session_start_ms(),
        "session_started": started,
        "now_ms": session.clock().now_ms(),
        "gate": gate.state(),
        "remaining": display,
    }))
}
