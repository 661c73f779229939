//! Level engines.
//!
//! Every engine follows the same contract: input methods return an event or
//! a [`LevelError`], timed transitions are applied by `tick(now_ms)`, and
//! completion is reported exactly once as [`Event::LevelCompleted`].
//! `teardown` cancels anything still pending and rolls back the step that was
//! waiting on it, so the engine is playable again and no points are counted
//! twice. A completed engine keeps its result.

pub mod blocks;
pub mod catalog;
pub mod grid;
pub mod quiz;

pub use blocks::{Block, BlockEngine, BlockKind, BlockProblem, Solution};
pub use catalog::{level, LevelInfo, Lesson, Tutorial, LEVELS};
pub use grid::{execute, Cell, GridEngine, MoveCommand, Puzzle, RunOutcome, RunPhase, RunReport};
pub use quiz::{QuizEngine, QuizQuestion};

use crate::error::{CoreError, LevelError};
use crate::events::Event;
use crate::storage::TimingConfig;

/// Playable content for one level.
#[derive(Debug, Clone)]
pub enum LevelContent {
    Quiz(Vec<QuizQuestion>),
    Blocks(Vec<BlockProblem>),
    Grid(Puzzle),
}

impl LevelContent {
    /// Built-in content for a catalog level.
    pub fn builtin(level_id: u32) -> Result<Self, CoreError> {
        Ok(match level_id {
            catalog::QUIZ_LEVEL => LevelContent::Quiz(catalog::quiz_questions()),
            catalog::BLOCKS_LEVEL => LevelContent::Blocks(catalog::block_problems()),
            catalog::PUZZLE_LEVEL => LevelContent::Grid(catalog::reference_puzzle()?),
            other => return Err(LevelError::UnknownLevel(other).into()),
        })
    }
}

#[derive(Debug)]
pub enum LevelEngine {
    Quiz(QuizEngine),
    Blocks(BlockEngine),
    Grid(GridEngine),
}

impl LevelEngine {
    /// Build the engine for `content`, ready to play.
    pub fn start(
        level_id: u32,
        content: LevelContent,
        timing: &TimingConfig,
    ) -> Result<Self, LevelError> {
        Ok(match content {
            LevelContent::Quiz(questions) => {
                LevelEngine::Quiz(QuizEngine::new(level_id, questions, timing)?)
            }
            LevelContent::Blocks(problems) => {
                LevelEngine::Blocks(BlockEngine::new(level_id, problems, timing)?)
            }
            LevelContent::Grid(puzzle) => {
                LevelEngine::Grid(GridEngine::new(level_id, puzzle, *timing))
            }
        })
    }

    /// Engine for a built-in catalog level.
    pub fn builtin(level_id: u32, timing: &TimingConfig) -> Result<Self, CoreError> {
        let content = LevelContent::builtin(level_id)?;
        Ok(Self::start(level_id, content, timing)?)
    }

    pub fn level_id(&self) -> u32 {
        match self {
            LevelEngine::Quiz(e) => e.level_id(),
            LevelEngine::Blocks(e) => e.level_id(),
            LevelEngine::Grid(e) => e.level_id(),
        }
    }

    pub fn is_completed(&self) -> bool {
        match self {
            LevelEngine::Quiz(e) => e.is_completed(),
            LevelEngine::Blocks(e) => e.is_completed(),
            LevelEngine::Grid(e) => e.is_completed(),
        }
    }

    /// Score so far. For puzzles this stays 0 until completion.
    pub fn score(&self) -> u32 {
        match self {
            LevelEngine::Quiz(e) => e.score(),
            LevelEngine::Blocks(e) => e.score(),
            LevelEngine::Grid(e) => e.score().unwrap_or(0),
        }
    }

    pub fn next_due(&self) -> Option<u64> {
        match self {
            LevelEngine::Quiz(e) => e.next_due(),
            LevelEngine::Blocks(e) => e.next_due(),
            LevelEngine::Grid(e) => e.next_due(),
        }
    }

    pub fn tick(&mut self, now_ms: u64) -> Vec<Event> {
        match self {
            LevelEngine::Quiz(e) => e.tick(now_ms),
            LevelEngine::Blocks(e) => e.tick(now_ms),
            LevelEngine::Grid(e) => e.tick(now_ms),
        }
    }

    pub fn teardown(&mut self) {
        match self {
            LevelEngine::Quiz(e) => e.teardown(),
            LevelEngine::Blocks(e) => e.teardown(),
            LevelEngine::Grid(e) => e.teardown(),
        }
    }

    pub fn restart(&mut self) {
        match self {
            LevelEngine::Quiz(e) => e.restart(),
            LevelEngine::Blocks(e) => e.restart(),
            LevelEngine::Grid(e) => e.restart(),
        }
    }
}

/// Completion carried by an event batch, if any.
pub fn completion(events: &[Event]) -> Option<(u32, u32)> {
    events.iter().find_map(|e| match e {
        Event::LevelCompleted { level_id, score } => Some((*level_id, *score)),
        _ => None,
    })
}
