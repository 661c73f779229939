//! Block-assembly engine.
//!
//! The player builds a workspace from toolbox blocks and runs it. A run is
//! checked against the problem's solution rule; a correct run shows the
//! expected output and schedules the next problem.

use serde::{Deserialize, Serialize};

use crate::error::LevelError;
use crate::events::Event;
use crate::storage::TimingConfig;
use crate::timer::Scheduler;

/// Points per solved problem.
pub const POINTS_PER_PROBLEM: u32 = 20;

const SUCCESS_MESSAGE: &str = "Success! Great job!";
const RETRY_MESSAGE: &str = "Not quite, try rearranging your blocks!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Action,
    Loop,
    Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub text: String,
    pub kind: BlockKind,
}

impl Block {
    pub fn new(id: impl Into<String>, text: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind,
        }
    }
}

/// Acceptance rule for a workspace, by block id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "blocks", rename_all = "snake_case")]
pub enum Solution {
    /// Workspace must be exactly these blocks in this order.
    Exact(Vec<String>),
    /// Workspace must contain every one of these blocks, in any order.
    Contains(Vec<String>),
}

impl Solution {
    pub fn accepts(&self, workspace: &[String]) -> bool {
        match self {
            Solution::Exact(ids) => workspace == ids.as_slice(),
            Solution::Contains(ids) => ids.iter().all(|id| workspace.contains(id)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockProblem {
    pub id: u32,
    pub goal: String,
    pub toolbox: Vec<Block>,
    pub solution: Solution,
    /// Output displayed when the workspace is accepted.
    pub output: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Advance;

#[derive(Debug)]
pub struct BlockEngine {
    level_id: u32,
    problems: Vec<BlockProblem>,
    index: usize,
    workspace: Vec<String>,
    output: Vec<String>,
    message: Option<&'static str>,
    score: u32,
    completed: bool,
    advance_ms: u64,
    scheduler: Scheduler<Advance>,
}

impl BlockEngine {
    pub fn new(
        level_id: u32,
        problems: Vec<BlockProblem>,
        timing: &TimingConfig,
    ) -> Result<Self, LevelError> {
        if problems.is_empty() {
            return Err(LevelError::EmptyLevel(level_id));
        }
        Ok(Self {
            level_id,
            problems,
            index: 0,
            workspace: Vec::new(),
            output: Vec::new(),
            message: None,
            score: 0,
            completed: false,
            advance_ms: timing.blocks_advance_ms,
            scheduler: Scheduler::new(),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn level_id(&self) -> u32 {
        self.level_id
    }

    pub fn problem(&self) -> &BlockProblem {
        &self.problems[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn workspace(&self) -> &[String] {
        &self.workspace
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn message(&self) -> Option<&str> {
        self.message
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Due time of the pending advance, if any.
    pub fn next_due(&self) -> Option<u64> {
        self.scheduler.next_due()
    }

    /// Whether a solved problem is waiting to advance.
    pub fn is_advancing(&self) -> bool {
        !self.scheduler.is_empty()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Append a toolbox block to the workspace.
    pub fn add_block(&mut self, id: &str) -> Result<(), LevelError> {
        self.ensure_editable()?;
        if !self.problem().toolbox.iter().any(|b| b.id == id) {
            return Err(LevelError::UnknownBlock(id.to_string()));
        }
        self.workspace.push(id.to_string());
        Ok(())
    }

    pub fn remove_block(&mut self, index: usize) -> Result<String, LevelError> {
        self.ensure_editable()?;
        if index >= self.workspace.len() {
            return Err(LevelError::OutOfBounds {
                index,
                len: self.workspace.len(),
            });
        }
        Ok(self.workspace.remove(index))
    }

    /// Empty the workspace and clear the last run's feedback.
    pub fn clear(&mut self) -> Result<(), LevelError> {
        self.ensure_editable()?;
        self.workspace.clear();
        self.output.clear();
        self.message = None;
        Ok(())
    }

    /// Check the workspace against the current problem.
    pub fn run(&mut self, now_ms: u64) -> Result<Event, LevelError> {
        self.ensure_editable()?;
        let problem = &self.problems[self.index];
        let correct = problem.solution.accepts(&self.workspace);
        let problem_id = problem.id;

        if correct {
            self.output = problem.output.clone();
            self.score += POINTS_PER_PROBLEM;
            self.message = Some(SUCCESS_MESSAGE);
            self.scheduler.schedule(now_ms + self.advance_ms, Advance);
        } else {
            self.output.clear();
            self.message = Some(RETRY_MESSAGE);
        }
        tracing::debug!(level = self.level_id, problem_id, correct, "blocks evaluated");

        Ok(Event::BlocksEvaluated {
            problem_id,
            correct,
            output: self.output.clone(),
            score: self.score,
        })
    }

    pub fn tick(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        while self.scheduler.pop_due(now_ms).is_some() {
            if self.index + 1 < self.problems.len() {
                self.index += 1;
                self.reset_workspace();
                events.push(Event::ProblemAdvanced {
                    problem_id: self.problems[self.index].id,
                });
            } else {
                self.completed = true;
                events.push(Event::LevelCompleted {
                    level_id: self.level_id,
                    score: self.score,
                });
            }
        }
        events
    }

    /// Abandon a pending advance. The solved problem goes back to unsolved
    /// and its points are taken back, so it can be scored only once.
    pub fn teardown(&mut self) {
        if self.is_advancing() {
            self.scheduler.cancel_all();
            self.score -= POINTS_PER_PROBLEM;
            self.reset_workspace();
        }
    }

    pub fn restart(&mut self) {
        self.scheduler.cancel_all();
        self.index = 0;
        self.score = 0;
        self.completed = false;
        self.reset_workspace();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn ensure_editable(&self) -> Result<(), LevelError> {
        if self.completed {
            Err(LevelError::Completed)
        } else if self.is_advancing() {
            Err(LevelError::Busy)
        } else {
            Ok(())
        }
    }

    fn reset_workspace(&mut self) {
        self.workspace.clear();
        self.output.clear();
        self.message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::catalog;

    fn engine() -> BlockEngine {
        BlockEngine::new(2, catalog::block_problems(), &TimingConfig::default()).unwrap()
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn exact_rule_demands_sequence() {
        let rule = Solution::Exact(ids(&["print_hello"]));
        assert!(rule.accepts(&ids(&["print_hello"])));
        assert!(!rule.accepts(&ids(&["print_hello", "print_hello"])));
        assert!(!rule.accepts(&[]));
    }

    #[test]
    fn contains_rule_ignores_order_and_extras() {
        let rule = Solution::Contains(ids(&["loop_3", "print_play"]));
        assert!(rule.accepts(&ids(&["print_play", "loop_3"])));
        assert!(rule.accepts(&ids(&["print_hello", "loop_3", "print_play"])));
        assert!(!rule.accepts(&ids(&["loop_3"])));
    }

    #[test]
    fn wrong_workspace_stays_on_problem() {
        let mut b = engine();
        b.add_block("print_play").unwrap();
        let event = b.run(0).unwrap();
        assert_eq!(
            event,
            Event::BlocksEvaluated {
                problem_id: 1,
                correct: false,
                output: vec![],
                score: 0
            }
        );
        assert_eq!(b.message(), Some(RETRY_MESSAGE));
        assert!(b.tick(10_000).is_empty());
        assert_eq!(b.workspace(), &ids(&["print_play"])[..]);
    }

    #[test]
    fn solving_both_problems_completes_level() {
        let mut b = engine();
        b.add_block("print_hello").unwrap();
        b.run(0).unwrap();
        assert_eq!(b.output(), &ids(&["Hello Coder!"])[..]);
        assert_eq!(b.add_block("loop_3"), Err(LevelError::Busy));

        assert!(b.tick(1999).is_empty());
        assert_eq!(b.tick(2000), vec![Event::ProblemAdvanced { problem_id: 2 }]);
        assert!(b.workspace().is_empty());

        b.add_block("print_play").unwrap();
        b.add_block("loop_3").unwrap();
        let event = b.run(3000).unwrap();
        assert!(matches!(
            event,
            Event::BlocksEvaluated { correct: true, ref output, score: 40, .. } if output.len() == 3
        ));
        assert_eq!(
            b.tick(5000),
            vec![Event::LevelCompleted {
                level_id: 2,
                score: 40
            }]
        );
        assert!(b.is_completed());
    }

    #[test]
    fn unknown_block_is_rejected() {
        let mut b = engine();
        assert!(matches!(
            b.add_block("rm_rf"),
            Err(LevelError::UnknownBlock(_))
        ));
    }

    #[test]
    fn remove_and_clear_edit_the_workspace() {
        let mut b = engine();
        b.add_block("print_hello").unwrap();
        b.add_block("loop_3").unwrap();
        assert_eq!(b.remove_block(1).unwrap(), "loop_3");
        assert!(matches!(
            b.remove_block(4),
            Err(LevelError::OutOfBounds { index: 4, len: 1 })
        ));
        b.run(0).unwrap();
        b.teardown();
        b.add_block("print_hello").unwrap();
        b.clear().unwrap();
        assert!(b.workspace().is_empty());
        assert!(b.message().is_none());
    }

    #[test]
    fn teardown_takes_back_unadvanced_points() {
        let mut b = engine();
        b.add_block("print_hello").unwrap();
        b.run(0).unwrap();
        assert_eq!(b.score(), 20);

        b.teardown();
        assert_eq!(b.score(), 0);
        assert_eq!(b.index(), 0);
        assert!(!b.is_advancing());
        assert!(b.workspace().is_empty());
        assert!(b.tick(10_000).is_empty());

        // Replaying the same problem then finishing cannot exceed 40.
        b.add_block("print_hello").unwrap();
        b.run(20_000).unwrap();
        b.tick(22_000);
        b.add_block("loop_3").unwrap();
        b.add_block("print_play").unwrap();
        b.run(23_000).unwrap();
        assert_eq!(
            b.tick(25_000),
            vec![Event::LevelCompleted {
                level_id: 2,
                score: 40
            }]
        );
    }

    #[test]
    fn teardown_while_editing_keeps_workspace() {
        let mut b = engine();
        b.add_block("print_play").unwrap();
        b.run(0).unwrap();
        b.teardown();
        assert_eq!(b.workspace(), &ids(&["print_play"])[..]);
        assert_eq!(b.score(), 0);
    }

    #[test]
    fn restart_resets_progress() {
        let mut b = engine();
        b.add_block("print_hello").unwrap();
        b.run(0).unwrap();
        b.tick(2000);
        b.restart();
        assert_eq!(b.index(), 0);
        assert_eq!(b.score(), 0);
        assert!(!b.is_advancing());
    }
}
