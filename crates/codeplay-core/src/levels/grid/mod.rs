//! Grid-navigation puzzle: command execution and collision model.
//!
//! Axis convention: `x` is the column, `y` the row, row 0 at the top.
//! `forward` moves toward row 0, `backward` away from it, `left`/`right`
//! change the column.
//!
//! [`execute`] is the whole algorithm as a pure function. [`GridEngine`]
//! replays its result at a fixed cadence for the player.

mod engine;

pub use engine::{GridEngine, RunPhase, PUZZLE_REWARD};

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PuzzleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell in the command's direction.
    pub fn step(self, command: MoveCommand) -> Self {
        let (dx, dy) = command.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveCommand {
    Forward,
    Backward,
    Left,
    Right,
}

impl MoveCommand {
    pub const ALL: [MoveCommand; 4] = [
        MoveCommand::Forward,
        MoveCommand::Backward,
        MoveCommand::Left,
        MoveCommand::Right,
    ];

    /// Unit displacement as `(dx, dy)`.
    pub fn delta(self) -> (i32, i32) {
        match self {
            MoveCommand::Forward => (0, -1),
            MoveCommand::Backward => (0, 1),
            MoveCommand::Left => (-1, 0),
            MoveCommand::Right => (1, 0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MoveCommand::Forward => "forward",
            MoveCommand::Backward => "backward",
            MoveCommand::Left => "left",
            MoveCommand::Right => "right",
        }
    }
}

impl fmt::Display for MoveCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoveCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" | "f" => Ok(MoveCommand::Forward),
            "backward" | "b" => Ok(MoveCommand::Backward),
            "left" | "l" => Ok(MoveCommand::Left),
            "right" | "r" => Ok(MoveCommand::Right),
            other => Err(format!(
                "unknown command '{other}' (expected forward, backward, left or right)"
            )),
        }
    }
}

/// Parse a comma or whitespace separated command list.
pub fn parse_commands(input: &str) -> Result<Vec<MoveCommand>, String> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

/// Static puzzle layout. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    id: u32,
    grid_size: i32,
    start: Cell,
    end: Cell,
    obstacles: BTreeSet<Cell>,
}

impl Puzzle {
    /// Build a validated puzzle.
    ///
    /// Every cell must lie on the grid, and neither start nor end may be an
    /// obstacle.
    pub fn new(
        id: u32,
        grid_size: i32,
        start: Cell,
        end: Cell,
        obstacles: impl IntoIterator<Item = Cell>,
    ) -> Result<Self, PuzzleError> {
        if grid_size <= 0 {
            return Err(PuzzleError::EmptyGrid);
        }
        let puzzle = Self {
            id,
            grid_size,
            start,
            end,
            obstacles: obstacles.into_iter().collect(),
        };

        let named = [("start", start), ("end", end)];
        let cells = named
            .into_iter()
            .chain(puzzle.obstacles.iter().map(|c| ("obstacle", *c)));
        for (what, cell) in cells {
            if !puzzle.in_bounds(cell) {
                return Err(PuzzleError::OutOfGrid {
                    what,
                    x: cell.x,
                    y: cell.y,
                    size: grid_size,
                });
            }
        }
        for (what, cell) in named {
            if puzzle.is_obstacle(cell) {
                return Err(PuzzleError::BlockedCell {
                    what,
                    x: cell.x,
                    y: cell.y,
                });
            }
        }
        Ok(puzzle)
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn grid_size(&self) -> i32 {
        self.grid_size
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn end(&self) -> Cell {
        self.end
    }

    pub fn obstacles(&self) -> impl Iterator<Item = Cell> + '_ {
        self.obstacles.iter().copied()
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        (0..self.grid_size).contains(&cell.x) && (0..self.grid_size).contains(&cell.y)
    }

    pub fn is_obstacle(&self, cell: Cell) -> bool {
        self.obstacles.contains(&cell)
    }

    /// Failure the character would suffer on `cell`, if any.
    pub fn blocked(&self, cell: Cell) -> Option<RunOutcome> {
        if !self.in_bounds(cell) {
            Some(RunOutcome::OutOfBounds)
        } else if self.is_obstacle(cell) {
            Some(RunOutcome::Collision)
        } else {
            None
        }
    }

    /// Text rendering, one row per line: `S` start, `E` end, `#` obstacle,
    /// `@` the character, `.` empty.
    pub fn render(&self, character: Cell) -> String {
        let mut out = String::new();
        for y in 0..self.grid_size {
            for x in 0..self.grid_size {
                let cell = Cell::new(x, y);
                let glyph = if cell == character {
                    '@'
                } else if self.is_obstacle(cell) {
                    '#'
                } else if cell == self.end {
                    'E'
                } else if cell == self.start {
                    'S'
                } else {
                    '.'
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Success,
    OutOfBounds,
    Collision,
    GoalMismatch,
}

impl RunOutcome {
    pub fn is_success(self) -> bool {
        self == RunOutcome::Success
    }

    /// Message shown to the player.
    pub fn message(self) -> &'static str {
        match self {
            RunOutcome::Success => "Success! You reached the goal!",
            RunOutcome::OutOfBounds | RunOutcome::Collision => {
                "Oops! You hit an obstacle or went off the grid. Try again!"
            }
            RunOutcome::GoalMismatch => "Not quite at the goal. Re-think your path and try again!",
        }
    }
}

/// Result of running a command sequence against a puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Last cell the character settled on. Never an invalid cell.
    pub position: Cell,
    /// Cells settled on after each executed command, in order.
    pub trail: Vec<Cell>,
    /// Index of the command that failed, for collisions and boundary hits.
    pub failed_step: Option<usize>,
    /// The invalid cell that command would have moved onto.
    pub attempted: Option<Cell>,
}

impl RunReport {
    pub fn steps_executed(&self) -> usize {
        self.trail.len()
    }
}

/// Run `commands` from the puzzle start.
///
/// Stops at the first command that leaves the grid or hits an obstacle; the
/// commands after it are never applied. If every command is applied the
/// final cell is compared with the end cell.
pub fn execute(puzzle: &Puzzle, commands: &[MoveCommand]) -> RunReport {
    let mut position = puzzle.start();
    let mut trail = Vec::with_capacity(commands.len());

    for (index, command) in commands.iter().enumerate() {
        let target = position.step(*command);
        if let Some(outcome) = puzzle.blocked(target) {
            return RunReport {
                outcome,
                position,
                trail,
                failed_step: Some(index),
                attempted: Some(target),
            };
        }
        position = target;
        trail.push(position);
    }

    let outcome = if position == puzzle.end() {
        RunOutcome::Success
    } else {
        RunOutcome::GoalMismatch
    };
    RunReport {
        outcome,
        position,
        trail,
        failed_step: None,
        attempted: None,
    }
}
