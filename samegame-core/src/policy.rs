//! Move selection policies.
//!
//! A policy only reads the board; the caller applies the chosen action.

use log::trace;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::Action;

/// Chooses the next move, or `None` when the board has no valid move.
pub trait Policy {
    fn name(&self) -> &'static str;

    fn choose(&mut self, board: &Board) -> Option<Action>;
}

/// Uniformly random valid action.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: Xoshiro256PlusPlus,
    buffer: Vec<Action>,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> RandomPolicy {
        RandomPolicy {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            buffer: Vec::new(),
        }
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn choose(&mut self, board: &Board) -> Option<Action> {
        self.buffer.clear();
        self.buffer.extend(board.valid_actions());
        if self.buffer.is_empty() {
            return None;
        }
        let action = self.buffer[self.rng.random_range(0..self.buffer.len())];
        trace!("random: {} of {} moves", action.index, self.buffer.len());
        Some(action)
    }
}

/// Highest immediate score; ties go to the lowest index.
#[derive(Debug, Clone, Default)]
pub struct GreedyPolicy;

impl Policy for GreedyPolicy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn choose(&mut self, board: &Board) -> Option<Action> {
        let mut best: Option<(Action, f64)> = None;
        for action in board.valid_actions() {
            let score = board.score(action);
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((action, score)),
            }
        }
        best.map(|(action, _)| action)
    }
}

/// Clears the color with the fewest remaining cells first; ties go to the
/// lowest index.
#[derive(Debug, Clone, Default)]
pub struct LowColorCountPolicy;

impl Policy for LowColorCountPolicy {
    fn name(&self) -> &'static str {
        "low-color"
    }

    fn choose(&mut self, board: &Board) -> Option<Action> {
        board
            .valid_actions()
            .min_by_key(|&action| board.get_color_count(board.get_color(action.index)))
    }
}

/// Policy selector, as named on the command line.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    Random,
    Greedy,
    LowColor,
}

impl PolicyKind {
    pub fn all() -> impl Iterator<Item = PolicyKind> {
        [PolicyKind::Random, PolicyKind::Greedy, PolicyKind::LowColor].into_iter()
    }

    /// Build the policy. `seed` only matters for `Random`.
    pub fn build(self, seed: u64) -> Box<dyn Policy> {
        match self {
            PolicyKind::Random => Box::new(RandomPolicy::new(seed)),
            PolicyKind::Greedy => Box::new(GreedyPolicy),
            PolicyKind::LowColor => Box::new(LowColorCountPolicy),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::Random => "random",
            PolicyKind::Greedy => "greedy",
            PolicyKind::LowColor => "low-color",
        }
    }
}

impl std::str::FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(PolicyKind::Random),
            "greedy" => Ok(PolicyKind::Greedy),
            "low-color" | "lowcolor" => Ok(PolicyKind::LowColor),
            other => Err(format!("unknown policy: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_board() -> Board {
        // Red {0,3,4} rep 3, yellow {6,7} rep 6, green {1,2,5,8} rep 8.
        Board::parse(3, 3, "1 2 2\n1 1 2\n3 3 2\n").unwrap()
    }

    #[test]
    fn test_policies_return_none_without_moves() {
        let board = Board::parse(2, 2, "1 2\n2 1\n").unwrap();
        for kind in PolicyKind::all() {
            assert_eq!(kind.build(1).choose(&board), None, "{}", kind.name());
        }
    }

    #[test]
    fn test_greedy_picks_largest_cluster() {
        let board = sample_board();
        assert_eq!(GreedyPolicy.choose(&board), Some(Action::new(8)));
    }

    #[test]
    fn test_greedy_tie_keeps_first() {
        // Two pairs, both score zero under the classic rule.
        let board = Board::parse(2, 2, "1 2\n1 2\n").unwrap();
        assert_eq!(GreedyPolicy.choose(&board), Some(Action::new(2)));
    }

    #[test]
    fn test_low_color_picks_rarest_color() {
        let board = sample_board();
        // Yellow has 2 cells, red 3, green 4.
        assert_eq!(LowColorCountPolicy.choose(&board), Some(Action::new(6)));
    }

    #[test]
    fn test_random_is_seeded_and_valid() {
        let board = sample_board();
        let mut a = RandomPolicy::new(11);
        let mut b = RandomPolicy::new(11);
        for _ in 0..20 {
            let pick = a.choose(&board).unwrap();
            assert!(board.is_valid(pick));
            assert_eq!(Some(pick), b.choose(&board));
        }
    }

    #[test]
    fn test_policy_kind_parse() {
        for kind in PolicyKind::all() {
            assert_eq!(kind.name().parse::<PolicyKind>(), Ok(kind));
            assert_eq!(kind.build(0).name(), kind.name());
        }
        assert!("minimax".parse::<PolicyKind>().is_err());
    }
}
