//! Batch statistics tracking.

use std::time::Instant;

use crate::runner::GameOutcome;

/// Totals for one policy across a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyStats {
    pub name: &'static str,
    /// Score of each game, in play order.
    pub scores: Vec<f64>,
    pub total: f64,
    pub best: f64,
    pub worst: f64,
    pub moves: usize,
    /// Games that emptied the board.
    pub cleared: usize,
}

impl PolicyStats {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            best: f64::NEG_INFINITY,
            worst: f64::INFINITY,
            ..Default::default()
        }
    }

    fn record(&mut self, outcome: &GameOutcome) {
        self.scores.push(outcome.score);
        self.total += outcome.score;
        self.best = self.best.max(outcome.score);
        self.worst = self.worst.min(outcome.score);
        self.moves += outcome.moves;
        if outcome.is_cleared() {
            self.cleared += 1;
        }
    }

    pub fn games(&self) -> usize {
        self.scores.len()
    }

    /// Mean score, 0 when no game was played.
    pub fn mean(&self) -> f64 {
        if self.scores.is_empty() {
            0.0
        } else {
            self.total / self.scores.len() as f64
        }
    }
}

/// Scores of every game played on one board, in play order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardScores {
    pub label: String,
    pub scores: Vec<(&'static str, f64)>,
}

/// Statistics collected during a batch.
#[derive(Debug)]
pub struct BatchStats {
    /// Per-policy totals, in first-seen order.
    policies: Vec<PolicyStats>,
    /// One entry per `begin_board` call.
    boards: Vec<BoardScores>,
    start_time: Instant,
}

impl Default for BatchStats {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchStats {
    pub fn new() -> Self {
        Self {
            policies: Vec::new(),
            boards: Vec::new(),
            start_time: Instant::now(),
        }
    }

    /// Start a new board; following `record` calls are listed under it.
    pub fn begin_board(&mut self, label: &str) {
        self.boards.push(BoardScores {
            label: label.to_string(),
            scores: Vec::new(),
        });
    }

    /// Record the outcome of `policy` on the current board.
    pub fn record(&mut self, policy: &'static str, outcome: &GameOutcome) {
        if self.boards.is_empty() {
            self.begin_board("-");
        }
        if let Some(board) = self.boards.last_mut() {
            board.scores.push((policy, outcome.score));
        }

        let stats = match self.policies.iter().position(|p| p.name == policy) {
            Some(i) => &mut self.policies[i],
            None => {
                self.policies.push(PolicyStats::new(policy));
                let last = self.policies.len() - 1;
                &mut self.policies[last]
            }
        };
        stats.record(outcome);
    }

    pub fn boards(&self) -> &[BoardScores] {
        &self.boards
    }

    pub fn policy(&self, name: &str) -> Option<&PolicyStats> {
        self.policies.iter().find(|p| p.name == name)
    }

    pub fn policies(&self) -> &[PolicyStats] {
        &self.policies
    }

    pub fn games(&self) -> usize {
        self.policies.iter().map(PolicyStats::games).sum()
    }

    /// Per-board scores followed by the per-policy summary.
    pub fn report(&self) -> String {
        let mut out = String::new();

        for (t, board) in self.boards.iter().enumerate() {
            out.push_str(&format!("Test {} ({}):\n", t + 1, board.label));
            for (policy, score) in &board.scores {
                out.push_str(&format!("  {:<10} {:>8}\n", policy, score));
            }
        }

        out.push_str(&format!(
            "\n{:<10} {:>6} {:>10} {:>10} {:>8} {:>8} {:>8}\n",
            "policy", "games", "total", "mean", "best", "worst", "cleared"
        ));
        for p in &self.policies {
            if p.games() == 0 {
                continue;
            }
            out.push_str(&format!(
                "{:<10} {:>6} {:>10} {:>10.2} {:>8} {:>8} {:>8}\n",
                p.name,
                p.games(),
                p.total,
                p.mean(),
                p.best,
                p.worst,
                p.cleared
            ));
        }
        out
    }

    /// Print final summary
    pub fn print_summary(&self) {
        print!("{}", self.report());

        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            println!(
                "\n{} games in {:.2}s ({:.0} games/sec)",
                self.games(),
                elapsed,
                self.games() as f64 / elapsed
            );
        }
    }
}
