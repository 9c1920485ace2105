//! Memory Pairs core crate.
//!
//! A browser memory-matching game: a grid of face-down cards, flip two at a
//! time, matched pairs stay up, the session ends when every pair is found.
//! All game rules live in [`engine`] as a headless state machine so they can
//! be exercised by native tests; the `dom` module wires the engine to the
//! page and is only meaningful in a browser. Shared emoji pools and the
//! difficulty tiers built from them live here.

use wasm_bindgen::prelude::*;

pub mod engine;

mod dom;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// -----------------------------------------------------------------------------
// Shared symbol pools
// Each entry is one pair symbol; a tier takes the first `pair_count` entries.
// -----------------------------------------------------------------------------

/// Fruit pool backing the small 4x4 board (8 pairs -> 16 cards).
pub const EMOJIS_SMALL: &[&str] = &["🍎", "🍌", "🍇", "🍓", "🍍", "🍑", "🥝", "🍒"];

/// Animal pool backing the large 6x6 board (18 pairs -> 36 cards).
pub const EMOJIS_LARGE: &[&str] = &[
    "🐶", "🐱", "🦊", "🐻", "🐼", "🐨", "🐯", "🦁", "🐮", "🐷", "🐸", "🐵", "🐔", "🐧", "🦄",
    "🐴", "🐝", "🐲",
];

// -----------------------------------------------------------------------------
// Difficulty tiers
// -----------------------------------------------------------------------------

/// Board sizes offered by the difficulty selector. Adding a tier only needs
/// a symbol pool with at least `pair_count` distinct entries; the engine is
/// untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Difficulty {
    /// 8 pairs on a 4-column grid.
    Small,
    /// 18 pairs on a 6-column grid.
    Large,
}

impl Difficulty {
    pub fn config(self) -> engine::GameConfig {
        match self {
            Difficulty::Small => engine::GameConfig {
                pair_count: 8,
                symbol_pool: EMOJIS_SMALL,
            },
            Difficulty::Large => engine::GameConfig {
                pair_count: 18,
                symbol_pool: EMOJIS_LARGE,
            },
        }
    }

    /// Grid column count used by the DOM layer.
    pub fn columns(self) -> usize {
        match self {
            Difficulty::Small => 4,
            Difficulty::Large => 6,
        }
    }

    /// Parse the difficulty `<select>` value; unknown values fall back to
    /// the small board.
    pub fn from_value(value: &str) -> Self {
        match value {
            "large" => Difficulty::Large,
            _ => Difficulty::Small,
        }
    }
}

// -----------------------------------------------------------------------------
// Unified entrypoint
// -----------------------------------------------------------------------------

/// Build the page chrome and start the first game.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    dom::mount()
}
