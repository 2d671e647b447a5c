//! Text rendering of a board for terminals.
//!
//! ```text
//! 2  | ■ ▣ ◉
//! 1  | · ▣ ▣
//! 0  | · ◆ ◎
//! ___________
//!      0 1 2
//! ```
//!
//! Row labels count from the bottom. Cell glyphs:
//!
//! ```text
//! ·  empty          ■  singleton
//! ▣  cluster cell   ◉  cluster representative
//! ◆  highlighted    ◎  highlighted representative
//! ```

use std::fmt::Write;

use crate::board::Board;
use crate::Color;

const EMPTY: &str = "\u{00B7}";
const SINGLETON: &str = "\u{25A0}";
const MEMBER: &str = "\u{25A3}";
const REP: &str = "\u{25C9}";
const HIGHLIGHT: &str = "\u{25C6}";
const HIGHLIGHT_REP: &str = "\u{25CE}";

/// ANSI foreground code for a color (bright palette).
fn ansi_code(color: Color) -> u8 {
    90 + color.value() as u8
}

/// Renderer settings.
#[derive(Clone, Copy, Debug, Default)]
pub struct Viewer {
    /// Emit ANSI color escapes around each cell.
    pub ansi: bool,
}

impl Viewer {
    pub fn ansi() -> Viewer {
        Viewer { ansi: true }
    }

    pub fn plain() -> Viewer {
        Viewer { ansi: false }
    }

    /// Render the board, marking the cluster containing `highlight` if given.
    pub fn render(&self, board: &Board, highlight: Option<usize>) -> String {
        let (width, height) = (board.width(), board.height());
        let highlighted = highlight.map(|i| board.get_cluster(i).rep);
        let label_width = (height - 1).to_string().len().max(2);
        let mut out = String::new();

        for y in 0..height {
            let label = height - 1 - y;
            let _ = write!(out, "{:<w$} |", label, w = label_width);
            for x in 0..width {
                out.push(' ');
                self.cell(&mut out, board, board.index(x, y), highlighted);
            }
            out.push('\n');
        }

        let col_width = (width - 1).to_string().len();
        out.push_str(&"_".repeat(label_width + 2 + width * (col_width + 1)));
        out.push('\n');
        out.push_str(&" ".repeat(label_width + 2));
        for x in 0..width {
            let _ = write!(out, " {:<w$}", x, w = col_width);
        }
        out.push('\n');
        out
    }

    fn cell(&self, out: &mut String, board: &Board, index: usize, highlighted: Option<usize>) {
        let cluster = board.get_cluster(index);
        let is_rep = cluster.rep == index;
        let glyph = if cluster.color.is_empty() {
            EMPTY
        } else if highlighted == Some(cluster.rep) {
            if is_rep { HIGHLIGHT_REP } else { HIGHLIGHT }
        } else if cluster.size() > 1 {
            if is_rep { REP } else { MEMBER }
        } else {
            SINGLETON
        };

        if self.ansi && !cluster.color.is_empty() {
            let _ = write!(out, "\x1b[1;{}m{}\x1b[0m", ansi_code(cluster.color), glyph);
        } else {
            out.push_str(glyph);
        }
    }
}

/// Render with ANSI colors.
pub fn render(board: &Board) -> String {
    Viewer::ansi().render(board, None)
}

/// Render with ANSI colors, marking the cluster containing `index`.
pub fn render_highlighted(board: &Board, index: usize) -> String {
    Viewer::ansi().render(board, Some(index))
}
