//! Integration tests for the grid-navigation execution model.

use codeplay_core::levels::catalog::reference_puzzle;
use codeplay_core::levels::grid::{execute, Cell, GridEngine, MoveCommand, RunOutcome, RunPhase};
use codeplay_core::storage::TimingConfig;
use codeplay_core::Event;
use proptest::prelude::*;

use MoveCommand::*;

fn command() -> impl Strategy<Value = MoveCommand> {
    prop_oneof![Just(Forward), Just(Backward), Just(Left), Just(Right)]
}

/// Drive an engine to the end of a run, returning every event emitted.
fn play_out(commands: &[MoveCommand]) -> (GridEngine, Vec<Event>) {
    let mut engine = GridEngine::new(3, reference_puzzle().unwrap(), TimingConfig::default());
    for c in commands {
        engine.push_command(*c).unwrap();
    }
    let mut events = vec![engine.run(0).unwrap()];
    let mut now = 0;
    while let Some(due) = engine.next_due() {
        now = due;
        events.extend(engine.tick(now));
    }
    assert!(now >= 500);
    (engine, events)
}

#[test]
fn test_reference_route_completes_with_fifty() {
    let route = [Right, Right, Right, Right, Backward, Backward, Backward, Backward];
    let (engine, events) = play_out(&route);
    assert_eq!(engine.phase(), RunPhase::Completed);
    assert_eq!(engine.score(), Some(50));
    assert_eq!(engine.position(), Cell::new(4, 4));
    assert_eq!(
        events.last(),
        Some(&Event::LevelCompleted {
            level_id: 3,
            score: 50
        })
    );
}

#[test]
fn test_collision_never_runs_later_commands() {
    let route = [Backward, Backward, Right, Right, Right, Right, Backward, Backward];
    let (engine, events) = play_out(&route);

    let steps = events
        .iter()
        .filter(|e| matches!(e, Event::StepApplied { .. }))
        .count();
    assert_eq!(steps, 3);
    assert!(events.iter().any(|e| matches!(
        e,
        Event::RunFinished {
            outcome: RunOutcome::Collision,
            position,
            ..
        } if *position == Cell::new(1, 2)
    )));
    assert_eq!(engine.phase(), RunPhase::Planning);
    assert!(engine.commands().is_empty());
    assert_eq!(engine.position(), Cell::new(0, 0));
}

#[test]
fn test_engine_and_pure_model_agree_on_timing() {
    let route = [Right, Right, Backward];
    let report = execute(&reference_puzzle().unwrap(), &route);
    assert_eq!(report.outcome, RunOutcome::GoalMismatch);

    let mut engine = GridEngine::new(3, reference_puzzle().unwrap(), TimingConfig::default());
    for c in route {
        engine.push_command(c).unwrap();
    }
    engine.run(1_000).unwrap();
    assert_eq!(engine.next_due(), Some(1_500));
    engine.tick(2_000);
    assert_eq!(engine.position(), report.trail[1]);
    engine.tick(2_500);
    assert_eq!(engine.position(), report.position);
    // Goal check one interval after the last step, reset 2000 ms later.
    assert!(matches!(
        engine.tick(3_000).as_slice(),
        [Event::RunFinished {
            outcome: RunOutcome::GoalMismatch,
            ..
        }]
    ));
    assert_eq!(engine.next_due(), Some(5_000));
}

proptest! {
    #[test]
    fn execution_is_deterministic(commands in proptest::collection::vec(command(), 0..24)) {
        let puzzle = reference_puzzle().unwrap();
        prop_assert_eq!(execute(&puzzle, &commands), execute(&puzzle, &commands));
    }

    #[test]
    fn position_is_always_a_valid_cell(commands in proptest::collection::vec(command(), 0..24)) {
        let puzzle = reference_puzzle().unwrap();
        let report = execute(&puzzle, &commands);
        prop_assert!(puzzle.blocked(report.position).is_none());
        for cell in &report.trail {
            prop_assert!(puzzle.blocked(*cell).is_none());
        }
    }

    #[test]
    fn failure_stops_at_first_bad_command(commands in proptest::collection::vec(command(), 1..24)) {
        let puzzle = reference_puzzle().unwrap();
        let report = execute(&puzzle, &commands);
        if let Some(k) = report.failed_step {
            prop_assert_eq!(report.trail.len(), k);
            let expected = execute(&puzzle, &commands[..k]).position;
            prop_assert_eq!(report.position, expected);
            prop_assert!(report.attempted.is_some());
        } else {
            prop_assert_eq!(report.trail.len(), commands.len());
        }
    }

    #[test]
    fn engine_replays_the_pure_trail(commands in proptest::collection::vec(command(), 0..12)) {
        let report = execute(&reference_puzzle().unwrap(), &commands);
        let (_, events) = play_out(&commands);
        let replayed: Vec<Cell> = events
            .iter()
            .filter_map(|e| match e {
                Event::StepApplied { position, .. } => Some(*position),
                _ => None,
            })
            .collect();
        prop_assert_eq!(replayed, report.trail);
    }
}
