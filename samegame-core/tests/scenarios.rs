//! Recorded games replayed move by move.
//!
//! Each scenario in `fixtures/scenarios.json` lists the starting board, the
//! moves played and the expected board after every move.

use samegame_core::{Action, ActionHistory, Board, TranspositionTable};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    width: usize,
    height: usize,
    offset: i64,
    board: String,
    initial_actions: Vec<usize>,
    moves: Vec<Step>,
    remaining: usize,
}

#[derive(Debug, Deserialize)]
struct Step {
    action: usize,
    cleared: usize,
    score: f64,
    /// Row-major color values after the move.
    colors: String,
    actions: Vec<usize>,
}

fn load_scenarios() -> Vec<Scenario> {
    serde_json::from_str(include_str!("fixtures/scenarios.json")).expect("Failed to parse scenarios")
}

fn load_board(scenario: &Scenario) -> Board {
    let mut board = Board::new(scenario.width, scenario.height);
    board
        .load_with_offset(scenario.board.as_bytes(), scenario.offset)
        .unwrap_or_else(|e| panic!("{}: {}", scenario.name, e));
    board
}

fn actions(board: &Board) -> Vec<usize> {
    board.valid_actions().map(|a| a.index).collect()
}

fn values(board: &Board) -> String {
    let codes: Vec<String> = board.colors().iter().map(|c| c.value().to_string()).collect();
    codes.join(" ")
}

#[test]
fn test_scenarios_replay() {
    let scenarios = load_scenarios();
    assert!(!scenarios.is_empty());

    for scenario in &scenarios {
        let mut board = load_board(scenario);
        assert_eq!(actions(&board), scenario.initial_actions, "{}: initial", scenario.name);

        for (n, step) in scenario.moves.iter().enumerate() {
            let action = Action::new(step.action);
            assert_eq!(board.score(action), step.score, "{} move {}", scenario.name, n);
            assert_eq!(board.apply(action).unwrap(), step.cleared, "{} move {}", scenario.name, n);
            assert_eq!(values(&board), step.colors, "{} move {}", scenario.name, n);
            assert_eq!(actions(&board), step.actions, "{} move {}", scenario.name, n);
        }

        assert_eq!(board.remaining(), scenario.remaining, "{}: remaining", scenario.name);
        let ends_stuck = scenario.moves.last().map_or(true, |step| step.actions.is_empty());
        assert_eq!(board.has_moves(), !ends_stuck, "{}: has_moves", scenario.name);
    }
}

#[test]
fn test_scenarios_history_totals() {
    for scenario in &load_scenarios() {
        let mut board = load_board(scenario);
        let mut history = ActionHistory::new(Arc::new(TranspositionTable::new()), board.cell_count());

        let mut expected = 0.0;
        for step in &scenario.moves {
            history.add(&mut board, Action::new(step.action)).unwrap();
            expected += step.score;
            assert_eq!(history.score(), expected, "{}", scenario.name);
        }

        while history.remove().is_some() {}
        assert_eq!(history.hash(), 0, "{}", scenario.name);
        assert_eq!(history.score(), 0.0, "{}", scenario.name);
    }
}

#[test]
fn test_scenarios_roundtrip_text() {
    for scenario in &load_scenarios() {
        let board = load_board(scenario);
        let mut out = Vec::new();
        board.write_text(&mut out, scenario.offset).unwrap();

        let mut reloaded = Board::new(scenario.width, scenario.height);
        reloaded.load_with_offset(out.as_slice(), scenario.offset).unwrap();
        assert_eq!(reloaded.colors(), board.colors(), "{}", scenario.name);
    }
}
