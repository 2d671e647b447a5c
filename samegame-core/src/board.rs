//! Board engine: grid storage, cluster discovery, gravity and compaction.
//!
//! After `load` or a completed `apply` the forest describes exactly the
//! 4-connected same-color clusters of the grid. The intermediate steps of a
//! move (`empty_cluster`, `gravity`, `stack_columns`) are private and never
//! leave the board half-applied.
//!
//! `load` takes the grid as given: a loaded board is clustered but not
//! settled, so it may hold floating cells or empty columns until the first
//! `apply`. Only after a move do the gravity and packed-column invariants hold.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, BufRead, Write};

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SameGameError};
use crate::forest::ClusterForest;
use crate::scoring::Scoring;
use crate::{Action, Color, NB_COLORS};

/// Read-only view of one cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cluster<'a> {
    /// Representative index; the only index that addresses this cluster as a move.
    pub rep: usize,
    pub color: Color,
    /// Member indices in insertion order.
    pub members: &'a [usize],
}

impl Cluster<'_> {
    #[inline]
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// True if clearing this cluster is a legal move.
    #[inline]
    pub fn is_playable(&self) -> bool {
        !self.color.is_empty() && self.members.len() > 1
    }

    pub fn contains(&self, index: usize) -> bool {
        self.members.contains(&index)
    }

    pub fn to_info(&self) -> ClusterInfo {
        ClusterInfo {
            rep: self.rep,
            color: self.color,
            members: self.members.to_vec(),
        }
    }
}

/// Owned, serializable copy of a cluster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterInfo {
    pub rep: usize,
    pub color: Color,
    pub members: Vec<usize>,
}

/// SameGame board of `width * height` cells.
#[derive(Clone, Debug)]
pub struct Board {
    width: usize,
    height: usize,
    colors: Vec<Color>,
    forest: ClusterForest,
    /// Live cell count per color value; index 0 counts empty cells.
    counts: [usize; NB_COLORS + 1],
    scoring: Scoring,

    // Scratch buffers reused across moves.
    column_buffer: Vec<Color>,
    empty_columns: VecDeque<usize>,
    members_buffer: Vec<usize>,
}

impl Board {
    /// Create an all-empty board using the default scoring rule.
    ///
    /// Panics if either dimension is zero.
    pub fn new(width: usize, height: usize) -> Board {
        Board::with_scoring(width, height, Scoring::default())
    }

    /// Create an all-empty board with the given scoring rule.
    pub fn with_scoring(width: usize, height: usize, scoring: Scoring) -> Board {
        assert!(width > 0 && height > 0, "board dimensions must be non-zero");
        let len = width * height;
        let mut counts = [0; NB_COLORS + 1];
        counts[Color::Empty.value()] = len;

        Board {
            width,
            height,
            colors: vec![Color::Empty; len],
            forest: ClusterForest::new(len),
            counts,
            scoring,
            column_buffer: Vec::with_capacity(height),
            empty_columns: VecDeque::with_capacity(width),
            members_buffer: Vec::with_capacity(len),
        }
    }

    /// Build a board from row-major colors.
    pub fn from_colors(width: usize, height: usize, colors: &[Color]) -> Result<Board> {
        if colors.len() != width * height {
            return Err(SameGameError::DimensionMismatch {
                expected: width * height,
                actual: colors.len(),
            });
        }
        let mut board = Board::new(width, height);
        board.commit(colors);
        Ok(board)
    }

    /// Parse a board from text in the load format (offset 0).
    pub fn parse(width: usize, height: usize, text: &str) -> Result<Board> {
        let mut board = Board::new(width, height);
        board.load(text.as_bytes())?;
        Ok(board)
    }

    // ========== Loading ==========

    /// Load `height` rows of `width` color codes (0 = empty, 1..=5 colors).
    pub fn load<R: BufRead>(&mut self, reader: R) -> Result<()> {
        self.load_with_offset(reader, 0)
    }

    /// Load rows where a stored code `c` stands for color value `c + offset`.
    ///
    /// On error the board keeps its previous contents.
    pub fn load_with_offset<R: BufRead>(&mut self, reader: R, offset: i64) -> Result<()> {
        let colors = parse_grid(reader, self.width, self.height, offset)?;
        self.commit(&colors);
        debug!(
            "loaded {}x{} board: {} cells, {} playable clusters",
            self.width,
            self.height,
            self.remaining(),
            self.valid_actions().count()
        );
        Ok(())
    }

    fn commit(&mut self, colors: &[Color]) {
        self.colors.copy_from_slice(colors);
        self.counts = [0; NB_COLORS + 1];
        for color in &self.colors {
            self.counts[color.value()] += 1;
        }
        self.compute_clusters();
    }

    /// Write the board in the load format, subtracting `offset` from each value.
    pub fn write_text<W: Write>(&self, mut out: W, offset: i64) -> io::Result<()> {
        for row in self.colors.chunks(self.width) {
            let line: Vec<String> = row
                .iter()
                .map(|c| (c.value() as i64 - offset).to_string())
                .collect();
            writeln!(out, "{}", line.join(" "))?;
        }
        Ok(())
    }

    // ========== Moves ==========

    /// True if `action` addresses a playable cluster by its representative.
    pub fn is_valid(&self, action: Action) -> bool {
        let i = action.index;
        i < self.colors.len()
            && !self.colors[i].is_empty()
            && self.forest.is_rep(i)
            && self.forest.members(i).len() > 1
    }

    /// Every valid action, in index order.
    ///
    /// The iterator is lazy; call again to restart.
    pub fn valid_actions(&self) -> impl Iterator<Item = Action> + '_ {
        (0..self.colors.len())
            .map(Action::new)
            .filter(move |&action| self.is_valid(action))
    }

    #[inline]
    pub fn has_moves(&self) -> bool {
        self.valid_actions().next().is_some()
    }

    /// Score of clearing the cluster containing `action.index`, as it stands now.
    #[inline]
    pub fn score(&self, action: Action) -> f64 {
        self.scoring.score(self.forest.cluster_size(action.index))
    }

    /// Clear the cluster at `action` and let the board settle.
    ///
    /// Returns the number of cleared cells. An invalid action leaves the
    /// board untouched.
    pub fn apply(&mut self, action: Action) -> Result<usize> {
        if !self.is_valid(action) {
            return Err(SameGameError::InvalidMove {
                index: action.index,
            });
        }

        let cleared = self.empty_cluster(action.index);
        self.gravity();
        self.stack_columns();
        self.compute_clusters();

        trace!(
            "applied {} ({} cells), {} remaining",
            action.index,
            cleared,
            self.remaining()
        );
        Ok(cleared)
    }

    // ========== Settling ==========

    /// Rebuild the forest from the current colors.
    ///
    /// One raster pass from the bottom row up, left to right, uniting each
    /// cell with its right and upper neighbors. Cells below and to the left
    /// have already been linked when a cell is reached, so this finds every
    /// 4-connected component.
    fn compute_clusters(&mut self) {
        self.forest.reset();
        let w = self.width;

        for y in (0..self.height).rev() {
            for x in 0..w {
                let i = x + y * w;
                let color = self.colors[i];
                if color.is_empty() {
                    continue;
                }
                if x + 1 < w && self.colors[i + 1] == color {
                    self.forest.unite(i, i + 1);
                }
                if y > 0 && self.colors[i - w] == color {
                    self.forest.unite(i, i - w);
                }
            }
        }
    }

    /// Empty every cell of the cluster rooted at `rep`.
    fn empty_cluster(&mut self, rep: usize) -> usize {
        self.members_buffer.clear();
        self.members_buffer.extend_from_slice(self.forest.members(rep));

        for &i in &self.members_buffer {
            self.counts[self.colors[i].value()] -= 1;
            self.counts[Color::Empty.value()] += 1;
            self.colors[i] = Color::Empty;
            self.forest.isolate(i);
        }

        self.members_buffer.len()
    }

    /// Drop non-empty cells to the bottom of each column, keeping their order.
    fn gravity(&mut self) {
        let (w, h) = (self.width, self.height);

        for x in 0..w {
            self.column_buffer.clear();
            for y in 0..h {
                let color = self.colors[x + y * w];
                if !color.is_empty() {
                    self.column_buffer.push(color);
                }
            }

            let top = h - self.column_buffer.len();
            for y in 0..top {
                self.colors[x + y * w] = Color::Empty;
            }
            for (k, &color) in self.column_buffer.iter().enumerate() {
                self.colors[x + (top + k) * w] = color;
            }
        }
    }

    /// Pack non-empty columns to the left, keeping their order.
    ///
    /// Requires a board fresh out of `gravity`: a column is empty iff its
    /// bottom cell is.
    fn stack_columns(&mut self) {
        let (w, h) = (self.width, self.height);
        let bottom = (h - 1) * w;

        // Pending empty columns, ascending.
        self.empty_columns.clear();
        for x in 0..w {
            if self.colors[bottom + x].is_empty() {
                self.empty_columns.push_back(x);
            } else if let Some(target) = self.empty_columns.pop_front() {
                for y in 0..h {
                    self.colors.swap(target + y * w, x + y * w);
                }
                self.empty_columns.push_back(x);
            }
        }
    }

    // ========== Queries ==========

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        x + y * self.width
    }

    #[inline]
    pub fn get_color(&self, index: usize) -> Color {
        self.colors[index]
    }

    /// Live number of cells with `color`.
    #[inline]
    pub fn get_color_count(&self, color: Color) -> usize {
        self.counts[color.value()]
    }

    /// Live per-color counts, indexed by color value.
    #[inline]
    pub fn color_counts(&self) -> &[usize; NB_COLORS + 1] {
        &self.counts
    }

    /// Number of non-empty cells.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.colors.len() - self.counts[Color::Empty.value()]
    }

    #[inline]
    pub fn is_cleared(&self) -> bool {
        self.remaining() == 0
    }

    #[inline]
    pub fn scoring(&self) -> Scoring {
        self.scoring
    }

    pub fn set_scoring(&mut self, scoring: Scoring) {
        self.scoring = scoring;
    }

    /// The cluster containing `index`.
    pub fn get_cluster(&self, index: usize) -> Cluster<'_> {
        let rep = self.forest.find_rep(index);
        Cluster {
            rep,
            color: self.colors[rep],
            members: self.forest.members(rep),
        }
    }

    /// All non-empty clusters, ordered by representative index.
    pub fn clusters(&self) -> impl Iterator<Item = Cluster<'_>> + '_ {
        self.forest
            .reps()
            .filter(move |&rep| !self.colors[rep].is_empty())
            .map(move |rep| Cluster {
                rep,
                color: self.colors[rep],
                members: self.forest.members(rep),
            })
    }

    /// Row-major colors.
    #[inline]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.colors.chunks(self.width) {
            for (x, color) in row.iter().enumerate() {
                if x > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", color.value())?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

/// Parse `height` non-blank rows of `width` codes.
fn parse_grid<R: BufRead>(reader: R, width: usize, height: usize, offset: i64) -> Result<Vec<Color>> {
    let mut colors = Vec::with_capacity(width * height);
    let mut rows = 0;

    for (n, line) in reader.lines().enumerate() {
        if rows == height {
            break;
        }
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != width {
            return Err(SameGameError::RowLength {
                line: n + 1,
                expected: width,
                found: tokens.len(),
            });
        }

        for token in tokens {
            let code: i64 = token.parse().map_err(|_| SameGameError::InvalidToken {
                line: n + 1,
                token: token.to_string(),
            })?;
            let color = code
                .checked_add(offset)
                .and_then(Color::from_value)
                .ok_or(SameGameError::ColorOutOfRange { line: n + 1, code })?;
            colors.push(color);
        }
        rows += 1;
    }

    if rows < height {
        return Err(SameGameError::MissingRows {
            expected: height,
            found: rows,
        });
    }
    Ok(colors)
}
