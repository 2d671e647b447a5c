//! Scoring functions for cleared clusters.

use serde::{Deserialize, Serialize};

/// Named scoring rule applied to the size of a cleared cluster.
///
/// Every rule is non-decreasing in the cluster size, so a larger cluster
/// never scores less than a smaller one.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scoring {
    /// Classic SameGame: `(n - 2)^2`.
    #[default]
    SameGame,
    /// PopStar: `5 * n^2`.
    PopStar,
    /// One point per cleared cell.
    Linear,
}

impl Scoring {
    /// All scoring rules.
    pub fn all() -> impl Iterator<Item = Scoring> {
        [Scoring::SameGame, Scoring::PopStar, Scoring::Linear].into_iter()
    }

    /// Score for clearing a cluster of `size` cells.
    #[inline]
    pub fn score(self, size: usize) -> f64 {
        let n = size as f64;
        match self {
            Scoring::SameGame => {
                let k = size.saturating_sub(2) as f64;
                k * k
            }
            Scoring::PopStar => 5.0 * n * n,
            Scoring::Linear => n,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scoring::SameGame => "samegame",
            Scoring::PopStar => "popstar",
            Scoring::Linear => "linear",
        }
    }
}

impl std::str::FromStr for Scoring {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "samegame" => Ok(Scoring::SameGame),
            "popstar" => Ok(Scoring::PopStar),
            "linear" => Ok(Scoring::Linear),
            other => Err(format!("unknown scoring rule: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samegame_values() {
        assert_eq!(Scoring::SameGame.score(0), 0.0);
        assert_eq!(Scoring::SameGame.score(2), 0.0);
        assert_eq!(Scoring::SameGame.score(3), 1.0);
        assert_eq!(Scoring::SameGame.score(9), 49.0);
    }

    #[test]
    fn test_popstar_values() {
        assert_eq!(Scoring::PopStar.score(2), 20.0);
        assert_eq!(Scoring::PopStar.score(10), 500.0);
    }

    #[test]
    fn test_all_rules_monotone() {
        for rule in Scoring::all() {
            let mut last = rule.score(0);
            for n in 1..=225 {
                let s = rule.score(n);
                assert!(s >= last, "{:?} decreased at {}", rule, n);
                last = s;
            }
        }
    }

    #[test]
    fn test_name_parse_roundtrip() {
        for rule in Scoring::all() {
            assert_eq!(rule.name().parse::<Scoring>(), Ok(rule));
        }
        assert!("nope".parse::<Scoring>().is_err());
    }
}
