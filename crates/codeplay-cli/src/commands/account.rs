use clap::Subcommand;
use codeplay_core::{Account, AccountType, Config, SignupRequest};
use serde_json::json;

use super::{open_session, print_json};

#[derive(Subcommand)]
pub enum AccountAction {
    /// Create a parent account together with its kid account
    Signup {
        /// Parent username
        #[arg(long)]
        parent: String,
        /// Parent email
        #[arg(long)]
        email: String,
        /// Kid username
        #[arg(long)]
        kid: String,
        /// Parent password (checked when auth.require_password is on)
        #[arg(long)]
        password: Option<String>,
        /// Kid password
        #[arg(long)]
        kid_password: Option<String>,
        /// Kid screen-time limit in minutes (0 = unlimited)
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Log in as a kid or parent
    Login {
        username: String,
        /// Account type: kid or parent
        #[arg(long = "as")]
        account_type: AccountType,
        #[arg(long)]
        password: Option<String>,
    },
    /// Log out of the current session
    Logout,
    /// Print the current session as JSON
    Whoami,
}

pub fn run(action: AccountAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut session = open_session(&config)?;

    match action {
        AccountAction::Signup {
            parent,
            email,
            kid,
            password,
            kid_password,
            limit,
        } => {
            let parent = session.signup(SignupRequest {
                parent_username: parent,
                parent_email: email,
                kid_username: kid,
                parent_password: password,
                kid_password,
                screen_time_limit_min: limit.unwrap_or(config.screen_time.default_limit_min),
            })?;
            println!(
                "Signed up parent '{}' with kid '{}'",
                parent.username, parent.kid_username
            );
        }
        AccountAction::Login {
            username,
            account_type,
            password,
        } => {
            let account = session.login(&username, account_type, password.as_deref())?;
            println!("Logged in as {} ({})", account.username(), account.account_type());
        }
        AccountAction::Logout => {
            session.logout()?;
            println!("Logged out");
        }
        AccountAction::Whoami => {
            let summary = match session.current_session() {
                None => json!({ "logged_in": false }),
                Some(Account::Kid(kid)) => json!({
                    "logged_in": true,
                    "type": "kid",
                    "username": kid.username,
                    "scores": kid.scores,
                    "total_score": kid.total_score(),
                    "screen_time_limit_min": kid.screen_time_limit_min,
                    "last_login": kid.last_login,
                }),
                Some(Account::Parent(parent)) => json!({
                    "logged_in": true,
                    "type": "parent",
                    "username": parent.username,
                    "email": parent.email,
                    "kid_username": parent.kid_username,
                }),
            };
            print_json(&summary)?;
        }
    }
    Ok(())
}
