//! Stateful puzzle runner.
//!
//! Planning -> Running -> (Succeeded | Failed) -> (Completed | Planning).
//!
//! The run outcome is computed up front by [`execute`]; the engine then
//! replays the trail one step per `puzzle_step_ms` so the player can watch
//! the character move. All transitions are driven by `tick(now_ms)`.

use serde::{Deserialize, Serialize};

use super::{execute, Cell, MoveCommand, Puzzle, RunReport};
use crate::error::LevelError;
use crate::events::Event;
use crate::storage::TimingConfig;
use crate::timer::Scheduler;

/// Score awarded for solving a puzzle.
pub const PUZZLE_REWARD: u32 = 50;

const PLANNING_MESSAGE: &str = "Add commands and press Run!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Editing the command list.
    Planning,
    /// Replaying steps.
    Running,
    /// Hit something or missed the goal; waiting to reset.
    Failed,
    /// Reached the goal; waiting to report completion.
    Succeeded,
    /// Level finished. Terminal until `restart`.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Pending {
    Step,
    Reset,
    Complete,
}

#[derive(Debug)]
pub struct GridEngine {
    level_id: u32,
    puzzle: Puzzle,
    timing: TimingConfig,
    commands: Vec<MoveCommand>,
    position: Cell,
    phase: RunPhase,
    run: Option<RunReport>,
    replayed: usize,
    message: String,
    score: Option<u32>,
    scheduler: Scheduler<Pending>,
}

impl GridEngine {
    pub fn new(level_id: u32, puzzle: Puzzle, timing: TimingConfig) -> Self {
        let position = puzzle.start();
        Self {
            level_id,
            puzzle,
            timing,
            commands: Vec::new(),
            position,
            phase: RunPhase::Planning,
            run: None,
            replayed: 0,
            message: PLANNING_MESSAGE.to_string(),
            score: None,
            scheduler: Scheduler::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn level_id(&self) -> u32 {
        self.level_id
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn commands(&self) -> &[MoveCommand] {
        &self.commands
    }

    /// Where the character is drawn right now.
    pub fn position(&self) -> Cell {
        self.position
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_completed(&self) -> bool {
        self.phase == RunPhase::Completed
    }

    /// Final score once completed.
    pub fn score(&self) -> Option<u32> {
        self.score
    }

    /// Due time of the next scheduled transition.
    pub fn next_due(&self) -> Option<u64> {
        self.scheduler.next_due()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn push_command(&mut self, command: MoveCommand) -> Result<(), LevelError> {
        self.ensure_planning()?;
        self.commands.push(command);
        Ok(())
    }

    pub fn remove_command(&mut self, index: usize) -> Result<MoveCommand, LevelError> {
        self.ensure_planning()?;
        if index >= self.commands.len() {
            return Err(LevelError::OutOfBounds {
                index,
                len: self.commands.len(),
            });
        }
        Ok(self.commands.remove(index))
    }

    pub fn clear_commands(&mut self) -> Result<(), LevelError> {
        self.ensure_planning()?;
        self.commands.clear();
        Ok(())
    }

    /// Start replaying the current command list.
    ///
    /// The first step lands one step interval after `now_ms`.
    pub fn run(&mut self, now_ms: u64) -> Result<Event, LevelError> {
        self.ensure_planning()?;
        let report = execute(&self.puzzle, &self.commands);
        tracing::debug!(
            level = self.level_id,
            commands = self.commands.len(),
            outcome = ?report.outcome,
            "puzzle run started"
        );
        self.run = Some(report);
        self.replayed = 0;
        self.position = self.puzzle.start();
        self.phase = RunPhase::Running;
        self.message = "Running...".to_string();
        self.scheduler
            .schedule(now_ms + self.timing.puzzle_step_ms, Pending::Step);
        Ok(Event::RunStarted {
            commands: self.commands.len(),
            at_ms: now_ms,
        })
    }

    /// Apply every transition due at or before `now_ms`, in due order.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some((due_ms, action)) = self.scheduler.pop_due(now_ms) {
            match action {
                Pending::Step => self.step(due_ms, &mut events),
                Pending::Reset => self.reset(&mut events),
                Pending::Complete => self.complete(&mut events),
            }
        }
        events
    }

    /// Drop pending transitions and return to planning.
    ///
    /// Used when the player leaves the level mid-run. A completed level
    /// stays completed.
    pub fn teardown(&mut self) {
        self.scheduler.cancel_all();
        if self.phase != RunPhase::Completed {
            self.back_to_planning();
        }
    }

    /// Start the level over from scratch.
    pub fn restart(&mut self) {
        self.scheduler.cancel_all();
        self.score = None;
        self.back_to_planning();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn ensure_planning(&self) -> Result<(), LevelError> {
        match self.phase {
            RunPhase::Planning => Ok(()),
            RunPhase::Completed => Err(LevelError::Completed),
            _ => Err(LevelError::Busy),
        }
    }

    fn step(&mut self, due_ms: u64, events: &mut Vec<Event>) {
        let Some(report) = &self.run else {
            return;
        };

        if let Some(cell) = report.trail.get(self.replayed).copied() {
            let command = self.commands[self.replayed];
            self.position = cell;
            self.replayed += 1;
            events.push(Event::StepApplied {
                step: self.replayed,
                command,
                position: cell,
            });
            self.scheduler
                .schedule(due_ms + self.timing.puzzle_step_ms, Pending::Step);
            return;
        }

        let outcome = report.outcome;
        self.message = outcome.message().to_string();
        events.push(Event::RunFinished {
            outcome,
            position: self.position,
            message: self.message.clone(),
        });
        if outcome.is_success() {
            self.phase = RunPhase::Succeeded;
            self.scheduler
                .schedule(due_ms + self.timing.puzzle_success_ms, Pending::Complete);
        } else {
            self.phase = RunPhase::Failed;
            self.scheduler
                .schedule(due_ms + self.timing.puzzle_reset_ms, Pending::Reset);
        }
        tracing::debug!(level = self.level_id, ?outcome, "puzzle run finished");
    }

    fn reset(&mut self, events: &mut Vec<Event>) {
        self.back_to_planning();
        events.push(Event::RunReset {
            position: self.position,
        });
    }

    fn complete(&mut self, events: &mut Vec<Event>) {
        self.phase = RunPhase::Completed;
        self.score = Some(PUZZLE_REWARD);
        events.push(Event::LevelCompleted {
            level_id: self.level_id,
            score: PUZZLE_REWARD,
        });
    }

    fn back_to_planning(&mut self) {
        self.commands.clear();
        self.run = None;
        self.replayed = 0;
        self.position = self.puzzle.start();
        self.phase = RunPhase::Planning;
        self.message = PLANNING_MESSAGE.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::grid::RunOutcome;
    use MoveCommand::*;

    fn engine() -> GridEngine {
        let puzzle = Puzzle::new(
            1,
            5,
            Cell::new(0, 0),
            Cell::new(4, 4),
            [Cell::new(2, 1), Cell::new(2, 2), Cell::new(2, 3)],
        )
        .unwrap();
        GridEngine::new(3, puzzle, TimingConfig::default())
    }

    fn plan(e: &mut GridEngine, commands: &[MoveCommand]) {
        for c in commands {
            e.push_command(*c).unwrap();
        }
    }

    #[test]
    fn steps_replay_at_fixed_cadence() {
        let mut e = engine();
        plan(&mut e, &[Right, Right]);
        e.run(0).unwrap();

        assert!(e.tick(499).is_empty());
        let events = e.tick(500);
        assert_eq!(
            events,
            vec![Event::StepApplied {
                step: 1,
                command: Right,
                position: Cell::new(1, 0)
            }]
        );
        assert_eq!(e.position(), Cell::new(1, 0));
        e.tick(1000);
        assert_eq!(e.position(), Cell::new(2, 0));
    }

    #[test]
    fn success_then_completion_after_delay() {
        let mut e = engine();
        plan(&mut e, &[Right, Right, Right, Right, Backward, Backward, Backward, Backward]);
        e.run(0).unwrap();

        // 8 steps at 500..=4000, goal check at 4500.
        let events = e.tick(4500);
        assert_eq!(events.len(), 9);
        assert!(matches!(
            events.last(),
            Some(Event::RunFinished {
                outcome: RunOutcome::Success,
                ..
            })
        ));
        assert_eq!(e.phase(), RunPhase::Succeeded);
        assert!(e.tick(5999).is_empty());

        let done = e.tick(6000);
        assert_eq!(
            done,
            vec![Event::LevelCompleted {
                level_id: 3,
                score: PUZZLE_REWARD
            }]
        );
        assert!(e.is_completed());
        assert_eq!(e.score(), Some(50));
        assert_eq!(e.push_command(Left), Err(LevelError::Completed));
    }

    #[test]
    fn collision_resets_after_delay() {
        let mut e = engine();
        plan(&mut e, &[Backward, Backward, Right, Right, Right, Right, Backward, Backward]);
        e.run(0).unwrap();

        let events = e.tick(2000);
        assert_eq!(events.len(), 4);
        match &events[3] {
            Event::RunFinished {
                outcome, position, ..
            } => {
                assert_eq!(*outcome, RunOutcome::Collision);
                assert_eq!(*position, Cell::new(1, 2));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(e.phase(), RunPhase::Failed);

        let events = e.tick(4000);
        assert_eq!(
            events,
            vec![Event::RunReset {
                position: Cell::new(0, 0)
            }]
        );
        assert_eq!(e.phase(), RunPhase::Planning);
        assert!(e.commands().is_empty());
    }

    #[test]
    fn empty_plan_is_goal_mismatch() {
        let mut e = engine();
        e.run(0).unwrap();
        let events = e.tick(500);
        assert!(matches!(
            events.as_slice(),
            [Event::RunFinished {
                outcome: RunOutcome::GoalMismatch,
                ..
            }]
        ));
        e.tick(2500);
        assert_eq!(e.phase(), RunPhase::Planning);
    }

    #[test]
    fn editing_is_locked_while_running() {
        let mut e = engine();
        plan(&mut e, &[Right]);
        e.run(0).unwrap();
        assert_eq!(e.push_command(Left), Err(LevelError::Busy));
        assert_eq!(e.remove_command(0), Err(LevelError::Busy));
        assert_eq!(e.clear_commands(), Err(LevelError::Busy));
        assert!(matches!(e.run(10), Err(LevelError::Busy)));
        assert_eq!(e.commands(), &[Right]);
    }

    #[test]
    fn remove_command_checks_index() {
        let mut e = engine();
        plan(&mut e, &[Right, Backward]);
        assert_eq!(e.remove_command(0), Ok(Right));
        assert_eq!(
            e.remove_command(5),
            Err(LevelError::OutOfBounds { index: 5, len: 1 })
        );
    }

    #[test]
    fn teardown_cancels_pending_completion() {
        let mut e = engine();
        plan(&mut e, &[Right, Right, Right, Right, Backward, Backward, Backward, Backward]);
        e.run(0).unwrap();
        e.tick(4500);
        assert_eq!(e.phase(), RunPhase::Succeeded);

        e.teardown();
        assert!(e.tick(10_000).is_empty());
        assert!(!e.is_completed());
        assert_eq!(e.score(), None);
        assert_eq!(e.phase(), RunPhase::Planning);
    }

    #[test]
    fn late_tick_drains_everything_in_order() {
        let mut e = engine();
        plan(&mut e, &[Forward]);
        e.run(0).unwrap();
        // Failure at 500, reset at 2500.
        let events = e.tick(60_000);
        assert!(matches!(
            events.as_slice(),
            [
                Event::RunFinished {
                    outcome: RunOutcome::OutOfBounds,
                    ..
                },
                Event::RunReset { .. }
            ]
        ));
    }

    #[test]
    fn restart_clears_completion() {
        let mut e = engine();
        plan(&mut e, &[Right, Right, Right, Right, Backward, Backward, Backward, Backward]);
        e.run(0).unwrap();
        e.tick(10_000);
        assert!(e.is_completed());
        e.restart();
        assert_eq!(e.phase(), RunPhase::Planning);
        assert_eq!(e.score(), None);
        assert!(e.push_command(Right).is_ok());
    }
}
