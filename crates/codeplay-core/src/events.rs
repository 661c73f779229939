use serde::{Deserialize, Serialize};

use crate::levels::grid::{Cell, MoveCommand, RunOutcome};

/// Every state change in the game produces an Event.
/// Front ends render them; they also serialize as tagged JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Screen-time countdown second boundary.
    ScreenTimeTick {
        remaining_secs: u64,
        at_ms: u64,
    },
    /// Screen-time limit reached; terminal until the next login.
    ScreenTimeLocked {
        at_ms: u64,
    },
    /// A quiz answer was judged.
    QuestionAnswered {
        index: usize,
        correct: bool,
        score: u32,
    },
    /// Quiz moved on to the next question.
    QuestionAdvanced {
        index: usize,
    },
    /// A block program was evaluated.
    BlocksEvaluated {
        problem_id: u32,
        correct: bool,
        output: Vec<String>,
        score: u32,
    },
    /// Block level moved on to the next problem.
    ProblemAdvanced {
        problem_id: u32,
    },
    /// A puzzle run began.
    RunStarted {
        commands: usize,
        at_ms: u64,
    },
    /// One puzzle command was applied and the character settled on `position`.
    StepApplied {
        step: usize,
        command: MoveCommand,
        position: Cell,
    },
    /// A puzzle run ended.
    RunFinished {
        outcome: RunOutcome,
        position: Cell,
        message: String,
    },
    /// Puzzle commands and position went back to start.
    RunReset {
        position: Cell,
    },
    /// A level reported its final score. Fired once per playthrough.
    LevelCompleted {
        level_id: u32,
        score: u32,
    },
}
