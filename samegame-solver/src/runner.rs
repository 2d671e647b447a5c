//! Plays one policy to completion on one board.

use std::sync::Arc;

use log::debug;
use samegame_core::render::{render, render_highlighted};
use samegame_core::{Action, ActionHistory, Board, Policy, Result, TranspositionTable};

/// Result of one finished game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameOutcome {
    pub score: f64,
    pub moves: usize,
    /// Non-empty cells left when no move remained.
    pub remaining: usize,
    pub trace: Vec<Action>,
}

impl GameOutcome {
    pub fn is_cleared(&self) -> bool {
        self.remaining == 0
    }
}

/// Game settings shared by every game of a batch.
#[derive(Debug, Clone, Default)]
pub struct Runner {
    /// Record every visited state into this table.
    pub table: Option<Arc<TranspositionTable>>,
    /// Print the board before each move and at the end.
    pub viewer: bool,
}

impl Runner {
    /// Play `policy` on `board` until it has no valid move.
    ///
    /// A policy returning an invalid action aborts the game with
    /// `InvalidMove`.
    pub fn play(&self, board: &mut Board, policy: &mut dyn Policy) -> Result<GameOutcome> {
        let mut history = self
            .table
            .as_ref()
            .map(|table| ActionHistory::new(table.clone(), board.cell_count()));
        let mut score = 0.0;
        let mut trace = Vec::new();

        while let Some(action) = policy.choose(board) {
            if self.viewer {
                println!("{}", render_highlighted(board, action.index));
            }

            score += match history.as_mut() {
                Some(history) => history.add(board, action)?,
                None => {
                    let gained = board.score(action);
                    board.apply(action)?;
                    gained
                }
            };
            trace.push(action);
        }

        if self.viewer {
            println!("{}", render(board));
        }

        debug!(
            "{}: score={} moves={} remaining={}",
            policy.name(),
            score,
            trace.len(),
            board.remaining()
        );
        Ok(GameOutcome {
            score,
            moves: trace.len(),
            remaining: board.remaining(),
            trace,
        })
    }
}

/// Play `policy` on `board` without recording or printing.
pub fn play(board: &mut Board, policy: &mut dyn Policy) -> Result<GameOutcome> {
    Runner::default().play(board, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use samegame_core::{GreedyPolicy, PolicyKind, SameGameError};

    fn sample_board() -> Board {
        Board::parse(3, 3, "1 2 2\n1 1 2\n3 3 2\n").unwrap()
    }

    /// Always answers with the same index.
    struct Stubborn(usize);

    impl Policy for Stubborn {
        fn name(&self) -> &'static str {
            "stubborn"
        }

        fn choose(&mut self, _board: &Board) -> Option<Action> {
            Some(Action::new(self.0))
        }
    }

    #[test]
    fn test_greedy_clears_sample() {
        let mut board = sample_board();
        let outcome = play(&mut board, &mut GreedyPolicy).unwrap();
        // Green (4) -> 4 points, red (3) -> 1, yellow (2) -> 0.
        assert_eq!(outcome.score, 5.0);
        assert_eq!(outcome.trace, vec![Action::new(8), Action::new(3), Action::new(6)]);
        assert_eq!(outcome.moves, 3);
        assert!(outcome.is_cleared());
    }

    #[test]
    fn test_no_moves_gives_empty_outcome() {
        let mut board = Board::parse(2, 2, "1 2\n2 1\n").unwrap();
        let outcome = play(&mut board, &mut GreedyPolicy).unwrap();
        assert_eq!(outcome.score, 0.0);
        assert_eq!(outcome.moves, 0);
        assert_eq!(outcome.remaining, 4);
    }

    #[test]
    fn test_invalid_policy_move_is_an_error() {
        let mut board = sample_board();
        let err = play(&mut board, &mut Stubborn(1)).unwrap_err();
        assert!(matches!(err, SameGameError::InvalidMove { index: 1 }));
    }

    #[test]
    fn test_recording_fills_table() {
        let table = Arc::new(TranspositionTable::with_seed(1));
        let runner = Runner {
            table: Some(table.clone()),
            viewer: false,
        };

        let mut board = sample_board();
        let mut policy = PolicyKind::Greedy.build(0);
        let outcome = runner.play(&mut board, policy.as_mut()).unwrap();
        assert_eq!(table.len(), outcome.moves);

        // Replaying the same game only adds visits.
        let mut board = sample_board();
        runner.play(&mut board, policy.as_mut()).unwrap();
        assert_eq!(table.len(), outcome.moves);
        assert!(table.snapshot().iter().all(|(_, e)| e.visits == 2));
    }

    #[test]
    fn test_recorded_and_plain_scores_agree() {
        let table = Arc::new(TranspositionTable::with_seed(1));
        let recording = Runner {
            table: Some(table),
            viewer: false,
        };

        let mut a = sample_board();
        let mut b = sample_board();
        let plain = play(&mut a, &mut GreedyPolicy).unwrap();
        let recorded = recording.play(&mut b, &mut GreedyPolicy).unwrap();
        assert_eq!(plain, recorded);
    }
}
