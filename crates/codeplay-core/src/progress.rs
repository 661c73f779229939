//! Best-score tracking per kid and level.

use serde::Serialize;

use crate::account::{KidAccount, LevelId};
use crate::error::{AuthError, Result};
use crate::levels::LevelInfo;
use crate::session::SessionManager;
use crate::storage::KeyValueStore;
use crate::timer::Clock;

/// Merge a completion into a score table entry.
///
/// Returns `true` when `score` beat the previous best.
pub fn merge_best(kid: &mut KidAccount, level_id: LevelId, score: u32) -> bool {
    let best = kid.scores.entry(level_id).or_insert(0);
    if score > *best {
        *best = score;
        true
    } else {
        false
    }
}

/// One row of the parent dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelProgress {
    pub level_id: LevelId,
    pub title: &'static str,
    pub best: u32,
    pub max_points: u32,
}

/// Best score against the card points for each level, in catalog order.
pub fn progress_report(kid: &KidAccount, levels: &[LevelInfo]) -> Vec<LevelProgress> {
    levels
        .iter()
        .map(|level| LevelProgress {
            level_id: level.id,
            title: level.title,
            best: kid.best_score(level.id),
            max_points: level.points,
        })
        .collect()
}

impl<S: KeyValueStore, C: Clock> SessionManager<S, C> {
    /// Record a finished level for `kid` and persist the new best.
    ///
    /// The stored record is the base for the merge, so a stale `kid` cannot
    /// roll back scores recorded elsewhere.
    pub fn record_completion(
        &mut self,
        kid: &KidAccount,
        level_id: LevelId,
        score: u32,
    ) -> Result<KidAccount> {
        let mut stored = self
            .store()
            .get_kid(&kid.username)?
            .ok_or(AuthError::NotFound)?;
        let improved = merge_best(&mut stored, level_id, score);
        self.update_kid(&stored)?;
        tracing::info!(
            kid = %stored.username,
            level = level_id,
            score,
            best = stored.best_score(level_id),
            improved,
            "level completed"
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::LEVELS;
    use crate::session::SignupRequest;
    use crate::storage::{AccountStore, MemoryStore};
    use crate::timer::ManualClock;
    use chrono::Utc;
    use proptest::prelude::*;

    fn manager(clock: &ManualClock) -> SessionManager<MemoryStore, &ManualClock> {
        let mut m = SessionManager::new(AccountStore::new(MemoryStore::new()), clock).unwrap();
        m.signup(SignupRequest {
            parent_username: "pat".into(),
            parent_email: "pat@example.com".into(),
            kid_username: "ada".into(),
            ..SignupRequest::default()
        })
        .unwrap();
        m
    }

    #[test]
    fn merge_keeps_the_higher_score() {
        let mut kid = KidAccount::new("ada", Utc::now());
        assert!(merge_best(&mut kid, 1, 30));
        assert!(!merge_best(&mut kid, 1, 20));
        assert!(!merge_best(&mut kid, 1, 30));
        assert_eq!(kid.best_score(1), 30);
    }

    #[test]
    fn zero_score_still_creates_entry() {
        let mut kid = KidAccount::new("ada", Utc::now());
        merge_best(&mut kid, 2, 0);
        assert_eq!(kid.scores.get(&2), Some(&0));
    }

    #[test]
    fn record_completion_is_visible_immediately() {
        let clock = ManualClock::new(1_700_000_000_000);
        let mut m = manager(&clock);
        let kid = m.login("ada", crate::account::AccountType::Kid, None).unwrap();
        let kid = kid.as_kid().unwrap().clone();

        let updated = m.record_completion(&kid, 1, 40).unwrap();
        assert_eq!(updated.best_score(1), 40);
        assert_eq!(m.store().get_kid("ada").unwrap().unwrap().best_score(1), 40);
        assert_eq!(m.current_kid().unwrap().best_score(1), 40);
    }

    #[test]
    fn stale_copy_cannot_lower_best() {
        let clock = ManualClock::new(0);
        let mut m = manager(&clock);
        let stale = m.store().get_kid("ada").unwrap().unwrap();
        m.record_completion(&stale, 3, 50).unwrap();
        let after = m.record_completion(&stale, 3, 10).unwrap();
        assert_eq!(after.best_score(3), 50);
    }

    #[test]
    fn unknown_kid_is_not_found() {
        let clock = ManualClock::new(0);
        let mut m = manager(&clock);
        let ghost = KidAccount::new("ghost", Utc::now());
        assert!(m.record_completion(&ghost, 1, 10).is_err());
    }

    #[test]
    fn report_lists_every_level() {
        let mut kid = KidAccount::new("ada", Utc::now());
        merge_best(&mut kid, 2, 40);
        let report = progress_report(&kid, LEVELS);
        assert_eq!(report.len(), 3);
        assert_eq!(report[0].best, 0);
        assert_eq!(report[1].best, 40);
        assert_eq!(report[1].max_points, 100);
        assert_eq!(report[2].title, "Puzzle Quest");
    }

    proptest! {
        #[test]
        fn best_is_running_maximum(scores in proptest::collection::vec(0u32..200, 1..20)) {
            let mut kid = KidAccount::new("ada", Utc::now());
            let mut expected = 0;
            for score in scores {
                let before = kid.best_score(1);
                merge_best(&mut kid, 1, score);
                expected = expected.max(score);
                prop_assert!(kid.best_score(1) >= before);
                prop_assert_eq!(kid.best_score(1), expected);
            }
        }
    }
}
