use std::io::{self, BufRead, Write};
use std::time::Duration;

use clap::Subcommand;
use codeplay_core::levels::blocks::BlockEngine;
use codeplay_core::levels::catalog::{BLOCKS_LEVEL, PUZZLE_LEVEL, QUIZ_LEVEL};
use codeplay_core::levels::grid::{parse_commands, GridEngine};
use codeplay_core::levels::quiz::QuizEngine;
use codeplay_core::levels::completion;
use codeplay_core::{Config, Event, KidAccount, LevelEngine, ScreenTimeGate};

use super::{open_session, Session};

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

#[derive(Subcommand)]
pub enum PlayAction {
    /// Coding Basics quiz: answer with an option number or its text
    Quiz,
    /// Block Builder: `add <block>`, `remove <n>`, `clear`, `run`, `quit`
    Blocks,
    /// Puzzle Quest: guide the character to the goal
    Puzzle {
        /// Commands such as "right,right,backward" (read from stdin if omitted)
        #[arg(long)]
        commands: Option<String>,
    },
}

pub fn run(action: PlayAction) -> CliResult {
    let level_id = match action {
        PlayAction::Quiz => QUIZ_LEVEL,
        PlayAction::Blocks => BLOCKS_LEVEL,
        PlayAction::Puzzle { .. } => PUZZLE_LEVEL,
    };
    let mut player = Player::start(level_id)?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    match action {
        PlayAction::Quiz => play_quiz(&mut player, &mut lines),
        PlayAction::Blocks => play_blocks(&mut player, &mut lines),
        PlayAction::Puzzle { commands } => play_puzzle(&mut player, commands, &mut lines),
    }
}

/// A kid's run through one level: session, screen-time gate and engine.
struct Player {
    session: Session,
    kid: KidAccount,
    gate: ScreenTimeGate,
    engine: LevelEngine,
}

impl Player {
    fn start(level_id: u32) -> CliResult<Self> {
        let config = Config::load()?;
        let session = open_session(&config)?;
        let kid = session.current_kid()?.clone();
        let gate = session.screen_time_gate()?;
        if gate.is_locked() {
            return Err("Time's up for today! Ask a parent if you need more time.".into());
        }
        let engine = LevelEngine::builtin(level_id, &config.timing)?;
        Ok(Self {
            session,
            kid,
            gate,
            engine,
        })
    }

    fn now(&self) -> u64 {
        self.session.now_ms()
    }

    /// Stop play once the screen-time limit is reached.
    fn check_time(&mut self) -> CliResult {
        let now = self.now();
        self.gate.tick(now);
        if self.gate.is_locked() {
            self.engine.teardown();
            return Err("Time's up for today! Ask a parent if you need more time.".into());
        }
        Ok(())
    }

    /// Wait out pending transitions, reporting each one.
    fn settle(&mut self) -> CliResult {
        let mut finished = None;
        while let Some(due) = self.engine.next_due() {
            let now = self.now();
            if due > now {
                std::thread::sleep(Duration::from_millis(due - now));
            }
            self.check_time()?;
            let events = self.engine.tick(self.now());
            for event in &events {
                describe(event);
            }
            finished = completion(&events).or(finished);
        }
        if let Some((level_id, score)) = finished {
            let kid = self.session.record_completion(&self.kid, level_id, score)?;
            println!(
                "Level complete! Score: {score} (best: {})",
                kid.best_score(level_id)
            );
            self.kid = kid;
        }
        Ok(())
    }

    fn quit(&mut self) -> CliResult {
        self.engine.teardown();
        println!("Bye!");
        Ok(())
    }
}

fn describe(event: &Event) {
    match event {
        Event::StepApplied {
            step,
            command,
            position,
        } => println!("  step {step}: {command} -> {position}"),
        Event::RunFinished { message, .. } => println!("{message}"),
        Event::RunReset { .. } => println!("Back to the start. Try again!"),
        _ => {}
    }
}

fn prompt(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    text: &str,
) -> CliResult<Option<String>> {
    print!("{text}");
    io::stdout().flush()?;
    Ok(lines.next().transpose()?.map(|l| l.trim().to_string()))
}

fn quiz_of(engine: &mut LevelEngine) -> CliResult<&mut QuizEngine> {
    match engine {
        LevelEngine::Quiz(q) => Ok(q),
        _ => Err("level is not a quiz".into()),
    }
}

fn blocks_of(engine: &mut LevelEngine) -> CliResult<&mut BlockEngine> {
    match engine {
        LevelEngine::Blocks(b) => Ok(b),
        _ => Err("level is not a block level".into()),
    }
}

fn grid_of(engine: &mut LevelEngine) -> CliResult<&mut GridEngine> {
    match engine {
        LevelEngine::Grid(g) => Ok(g),
        _ => Err("level is not a puzzle".into()),
    }
}

// ── Quiz ─────────────────────────────────────────────────────────────

fn play_quiz(
    player: &mut Player,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> CliResult {
    loop {
        player.check_time()?;
        let quiz = quiz_of(&mut player.engine)?;
        if quiz.is_completed() {
            return Ok(());
        }

        let question = quiz.current().clone();
        println!(
            "\nQuestion {}/{}: {}",
            quiz.index() + 1,
            quiz.len(),
            question.question
        );
        for (i, option) in question.options.iter().enumerate() {
            println!("  {}. {option}", i + 1);
        }
        let Some(answer) = prompt(lines, "> ")? else {
            return player.quit();
        };

        let result = match answer.parse::<usize>() {
            Ok(n) if n >= 1 => quiz.answer_index(n - 1, player.session.now_ms()),
            _ => quiz.answer(&answer, player.session.now_ms()),
        };
        match result {
            Ok(Event::QuestionAnswered { correct: true, score, .. }) => {
                println!("Correct! Score: {score}");
            }
            Ok(_) => println!("Not quite. The answer was: {}", question.correct_answer),
            Err(e) => {
                println!("{e}");
                continue;
            }
        }
        player.settle()?;
    }
}

// ── Blocks ───────────────────────────────────────────────────────────

fn play_blocks(
    player: &mut Player,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> CliResult {
    let mut shown = None;
    loop {
        player.check_time()?;
        let blocks = blocks_of(&mut player.engine)?;
        if blocks.is_completed() {
            return Ok(());
        }

        let problem = blocks.problem();
        if shown != Some(problem.id) {
            shown = Some(problem.id);
            println!("\nGoal: {}", problem.goal);
            println!("Toolbox:");
            for block in &problem.toolbox {
                println!("  {:<12} {}", block.id, block.text);
            }
        }
        println!("Workspace: [{}]", blocks.workspace().join(", "));

        let Some(line) = prompt(lines, "> ")? else {
            return player.quit();
        };
        let mut words = line.split_whitespace();
        let result = match (words.next(), words.next()) {
            (Some("add"), Some(id)) => blocks.add_block(id).map(|_| None),
            (Some("remove"), Some(n)) => match n.parse::<usize>() {
                Ok(n) if n >= 1 => blocks.remove_block(n - 1).map(|_| None),
                _ => {
                    println!("usage: remove <position>");
                    continue;
                }
            },
            (Some("clear"), None) => blocks.clear().map(|_| None),
            (Some("run"), None) => blocks.run(player.session.now_ms()).map(Some),
            (Some("quit"), None) => return player.quit(),
            _ => {
                println!("commands: add <block>, remove <n>, clear, run, quit");
                continue;
            }
        };

        match result {
            Ok(Some(Event::BlocksEvaluated { output, .. })) => {
                for line in &output {
                    println!("  > {line}");
                }
                if let Some(message) = blocks.message() {
                    println!("{message}");
                }
                player.settle()?;
            }
            Ok(_) => {}
            Err(e) => println!("{e}"),
        }
    }
}

// ── Puzzle ───────────────────────────────────────────────────────────

fn play_puzzle(
    player: &mut Player,
    commands: Option<String>,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> CliResult {
    let mut scripted = commands;
    loop {
        player.check_time()?;
        let grid = grid_of(&mut player.engine)?;
        if grid.is_completed() {
            return Ok(());
        }
        print!("\n{}", grid.puzzle().render(grid.position()));

        let input = match scripted.take() {
            Some(input) => input,
            None => {
                let Some(line) = prompt(lines, "commands> ")? else {
                    return player.quit();
                };
                line
            }
        };
        let parsed = match parse_commands(&input) {
            Ok(parsed) => parsed,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        for command in parsed {
            grid.push_command(command)?;
        }
        grid.run(player.session.now_ms())?;
        player.settle()?;

        let grid = grid_of(&mut player.engine)?;
        if grid.is_completed() {
            print!("\n{}", grid.puzzle().render(grid.position()));
            return Ok(());
        }
    }
}
