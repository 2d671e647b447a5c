//! WASM bindings for samegame-core
//!
//! Provides a JavaScript-friendly API over `Board`.

use wasm_bindgen::prelude::*;

use crate::render::Viewer;
use crate::{Action, Board, Scoring};

/// WASM-friendly wrapper around Board
#[wasm_bindgen]
pub struct WasmBoard {
    inner: Board,
}

#[wasm_bindgen]
impl WasmBoard {
    /// Create an empty board
    #[wasm_bindgen(constructor)]
    pub fn new(width: usize, height: usize) -> WasmBoard {
        WasmBoard {
            inner: Board::new(width.max(1), height.max(1)),
        }
    }

    /// Load rows of color codes; `offset` is added to every code.
    /// On error the board is unchanged.
    pub fn load(&mut self, text: &str, offset: i32) -> Result<(), JsValue> {
        self.inner
            .load_with_offset(text.as_bytes(), offset as i64)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Select the scoring rule by name ("samegame", "popstar", "linear").
    #[wasm_bindgen(js_name = setScoring)]
    pub fn set_scoring(&mut self, name: &str) -> Result<(), JsValue> {
        let scoring: Scoring = name.parse().map_err(|e: String| JsValue::from_str(&e))?;
        self.inner.set_scoring(scoring);
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.inner.width()
    }

    pub fn height(&self) -> usize {
        self.inner.height()
    }

    /// Representative indices of every playable cluster
    #[wasm_bindgen(js_name = validActions)]
    pub fn valid_actions(&self) -> Vec<u32> {
        self.inner.valid_actions().map(|a| a.index as u32).collect()
    }

    #[wasm_bindgen(js_name = isValid)]
    pub fn is_valid(&self, index: usize) -> bool {
        self.inner.is_valid(Action::new(index))
    }

    /// Score of clearing the cluster containing `index`
    pub fn score(&self, index: usize) -> f64 {
        self.inner.score(Action::new(index))
    }

    /// Apply a move. Returns true if successful.
    pub fn apply(&mut self, index: usize) -> bool {
        self.inner.apply(Action::new(index)).is_ok()
    }

    /// Color value at `index` (0 = empty)
    pub fn color(&self, index: usize) -> u8 {
        self.inner.get_color(index) as u8
    }

    /// Row-major color values
    pub fn colors(&self) -> Vec<u8> {
        self.inner.colors().iter().map(|&c| c as u8).collect()
    }

    /// Cluster containing `index` as { rep, color, members }
    pub fn cluster(&self, index: usize) -> Result<JsValue, JsValue> {
        let info = self.inner.get_cluster(index).to_info();
        serde_wasm_bindgen::to_value(&info).map_err(JsValue::from)
    }

    pub fn remaining(&self) -> usize {
        self.inner.remaining()
    }

    #[wasm_bindgen(js_name = isGameOver)]
    pub fn is_game_over(&self) -> bool {
        !self.inner.has_moves()
    }

    /// Plain-text rendering, optionally highlighting the cluster at `highlight`
    pub fn render(&self, highlight: Option<usize>) -> String {
        Viewer::plain().render(&self.inner, highlight)
    }

    /// Board in the load format
    #[wasm_bindgen(js_name = toText)]
    pub fn to_text(&self) -> String {
        self.inner.to_string()
    }

    /// Clone the board
    #[wasm_bindgen(js_name = clone)]
    pub fn clone_board(&self) -> WasmBoard {
        WasmBoard {
            inner: self.inner.clone(),
        }
    }
}

impl Default for WasmBoard {
    fn default() -> Self {
        Self::new(crate::DEFAULT_WIDTH, crate::DEFAULT_HEIGHT)
    }
}
