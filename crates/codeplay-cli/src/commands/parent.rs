use clap::Subcommand;
use codeplay_core::levels::LEVELS;
use codeplay_core::{progress_report, AuthError, Config};
use serde_json::json;

use super::{open_session, print_json};

#[derive(Subcommand)]
pub enum ParentAction {
    /// Show the linked kid's progress and screen-time settings
    Dashboard,
    /// Set the linked kid's screen-time limit
    SetLimit {
        /// Minutes per session (0 = unlimited)
        minutes: u32,
    },
}

pub fn run(action: ParentAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut session = open_session(&config)?;

    match action {
        ParentAction::Dashboard => {
            let parent = session.current_parent()?.clone();
            let kid = session
                .kid_of(&parent)?
                .ok_or_else(|| AuthError::DanglingKid {
                    username: parent.kid_username.clone(),
                })?;
            print_json(&json!({
                "parent": parent.username,
                "kid": kid.username,
                "last_login": kid.last_login,
                "screen_time_limit_min": kid.screen_time_limit_min,
                "total_score": kid.total_score(),
                "levels": progress_report(&kid, LEVELS),
            }))?;
        }
        ParentAction::SetLimit { minutes } => {
            let kid = session.set_screen_time_limit(minutes)?;
            if minutes == 0 {
                println!("Screen time for '{}' is now unlimited", kid.username);
            } else {
                println!(
                    "Screen time for '{}' set to {minutes} minutes",
                    kid.username
                );
            }
        }
    }
    Ok(())
}
