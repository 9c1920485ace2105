//! Headless pair-matching game engine.
//!
//! One [`Engine`] value is one game session: it owns the deck, the pending
//! selection, the move counter and the elapsed-time counter, and advances
//! only in response to discrete events (`select_card`, `tick_second`,
//! `resolve_mismatch`). Nothing here touches wasm or browser APIs, so the
//! whole state machine runs under native `cargo test`; the DOM layer in
//! `crate::dom` feeds taps in and paints the returned outcomes.

use rand::Rng;
use rand::seq::SliceRandom;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Stable card identity: the card's position index in the deck.
pub type CardId = usize;

/// How long a mismatched pair stays face-up before it is flipped back.
pub const MISMATCH_DELAY_MS: i32 = 800;

/// Period of the elapsed-time clock tick.
pub const CLOCK_TICK_MS: i32 = 1_000;

// --- Card model --------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum CardState {
    Hidden,
    Revealed,
    Matched,
}

// Serialize only: `symbol` borrows from the static pools, so snapshots
// flow out to the host page but never back in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Card {
    pub id: CardId,
    pub symbol: &'static str,
    pub state: CardState,
}

/// Board parameters for one session. The deck takes the first `pair_count`
/// entries of `symbol_pool` and lays each out twice.
#[derive(Clone, Copy, Debug)]
pub struct GameConfig {
    pub pair_count: usize,
    pub symbol_pool: &'static [&'static str],
}

/// Rejected `new_game` configurations. The engine refuses to build a
/// malformed deck instead of silently truncating or duplicating symbols.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    ZeroPairs,
    PoolTooSmall { pair_count: usize, pool_len: usize },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroPairs => write!(f, "pair count must be at least 1"),
            ConfigError::PoolTooSmall {
                pair_count,
                pool_len,
            } => write!(
                f,
                "symbol pool has {pool_len} entries but {pair_count} pairs were requested"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

// --- Selection outcomes ------------------------------------------------------

/// What a single `select_card` call did. `Mismatch` is only half a story:
/// the caller owes the engine a `resolve_mismatch` call after
/// [`MISMATCH_DELAY_MS`] to flip the pair back down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Tap dropped: board locked, game over, matched card, self-tap or
    /// unknown id. No state changed.
    Ignored,
    /// First card of a comparison turned face-up; no move counted yet.
    FirstReveal { id: CardId },
    /// Second card completed a matching pair; board stays unlocked.
    Matched { first: CardId, second: CardId },
    /// Second card did not match; both stay face-up and the board is locked
    /// until the delayed revert runs.
    Mismatch { first: CardId, second: CardId },
    /// That match was the last pair. Terminal for this session.
    Won {
        first: CardId,
        second: CardId,
        moves: u32,
        elapsed_seconds: u32,
    },
}

// --- Engine ------------------------------------------------------------------

/// Session state machine: `Idle -> Playing -> Won`, where `Playing` is
/// locked exactly while a mismatched pair awaits its revert.
pub struct Engine {
    cards: Vec<Card>,
    first: Option<CardId>,
    pending_mismatch: Option<(CardId, CardId)>,
    moves: u32,
    matched_pairs: usize,
    total_pairs: usize,
    elapsed_seconds: u32,
    clock_running: bool,
    won: bool,
    generation: u32,
}

impl Engine {
    /// An idle engine with no deck. Call [`Engine::new_game`] to start.
    pub fn new() -> Self {
        Self {
            cards: Vec::new(),
            first: None,
            pending_mismatch: None,
            moves: 0,
            matched_pairs: 0,
            total_pairs: 0,
            elapsed_seconds: 0,
            clock_running: false,
            won: false,
            generation: 0,
        }
    }

    /// Start a fresh session, replacing whatever was in flight. Bumps the
    /// generation so callbacks scheduled against the old session go stale.
    /// Returns the shuffled deck for rendering.
    pub fn new_game(&mut self, config: GameConfig) -> Result<&[Card], ConfigError> {
        self.new_game_with_rng(config, &mut rand::thread_rng())
    }

    /// Seedable variant of [`Engine::new_game`] used by the tests.
    pub fn new_game_with_rng<R: Rng + ?Sized>(
        &mut self,
        config: GameConfig,
        rng: &mut R,
    ) -> Result<&[Card], ConfigError> {
        if config.pair_count == 0 {
            return Err(ConfigError::ZeroPairs);
        }
        if config.symbol_pool.len() < config.pair_count {
            return Err(ConfigError::PoolTooSmall {
                pair_count: config.pair_count,
                pool_len: config.symbol_pool.len(),
            });
        }

        let mut symbols: Vec<&'static str> = Vec::with_capacity(config.pair_count * 2);
        for &symbol in &config.symbol_pool[..config.pair_count] {
            symbols.push(symbol);
            symbols.push(symbol);
        }
        // Fisher-Yates, uniform over all permutations.
        symbols.shuffle(rng);

        self.cards = symbols
            .into_iter()
            .enumerate()
            .map(|(id, symbol)| Card {
                id,
                symbol,
                state: CardState::Hidden,
            })
            .collect();
        self.first = None;
        self.pending_mismatch = None;
        self.moves = 0;
        self.matched_pairs = 0;
        self.total_pairs = config.pair_count;
        self.elapsed_seconds = 0;
        self.clock_running = false;
        self.won = false;
        self.generation = self.generation.wrapping_add(1);
        Ok(&self.cards)
    }

    /// Feed one card tap into the state machine.
    pub fn select_card(&mut self, id: CardId) -> SelectOutcome {
        if self.won || self.pending_mismatch.is_some() {
            return SelectOutcome::Ignored;
        }
        if self.first == Some(id) {
            return SelectOutcome::Ignored;
        }
        let Some(card) = self.cards.get(id) else {
            return SelectOutcome::Ignored;
        };
        if card.state == CardState::Matched {
            return SelectOutcome::Ignored;
        }

        // The clock starts on the first reveal of the session.
        self.clock_running = true;
        self.cards[id].state = CardState::Revealed;

        let Some(first) = self.first.take() else {
            self.first = Some(id);
            return SelectOutcome::FirstReveal { id };
        };

        // Second tap of a comparison: this is what counts as a move.
        self.moves += 1;
        if self.cards[first].symbol == self.cards[id].symbol {
            self.cards[first].state = CardState::Matched;
            self.cards[id].state = CardState::Matched;
            self.matched_pairs += 1;
            if self.matched_pairs == self.total_pairs {
                self.won = true;
                self.clock_running = false;
                return SelectOutcome::Won {
                    first,
                    second: id,
                    moves: self.moves,
                    elapsed_seconds: self.elapsed_seconds,
                };
            }
            SelectOutcome::Matched { first, second: id }
        } else {
            self.pending_mismatch = Some((first, id));
            SelectOutcome::Mismatch { first, second: id }
        }
    }

    /// Delayed second half of a mismatch: flip both cards back down and
    /// unlock. `generation` is the value of [`Engine::generation`] captured
    /// when the revert was scheduled; a stale value makes this a no-op so a
    /// timer outliving its session cannot touch the new one.
    pub fn resolve_mismatch(&mut self, generation: u32) -> Option<(CardId, CardId)> {
        if generation != self.generation {
            return None;
        }
        let (a, b) = self.pending_mismatch.take()?;
        self.cards[a].state = CardState::Hidden;
        self.cards[b].state = CardState::Hidden;
        Some((a, b))
    }

    /// 1 Hz clock tick. Returns the new elapsed total while the clock runs,
    /// `None` before the first reveal and after the win.
    pub fn tick_second(&mut self) -> Option<u32> {
        if !self.clock_running {
            return None;
        }
        self.elapsed_seconds += 1;
        Some(self.elapsed_seconds)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id)
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    pub fn total_pairs(&self) -> usize {
        self.total_pairs
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    /// Locked while a mismatched pair awaits its revert; taps are dropped.
    pub fn is_locked(&self) -> bool {
        self.pending_mismatch.is_some()
    }

    pub fn clock_running(&self) -> bool {
        self.clock_running
    }

    /// Session counter used to invalidate scheduled callbacks across
    /// `new_game` boundaries.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Clock display format: zero-padded `MM:SS`.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const POOL: &[&str] = &["A", "B", "C", "D"];

    fn engine_with(pair_count: usize, seed: u64) -> Engine {
        let mut engine = Engine::new();
        engine
            .new_game_with_rng(
                GameConfig {
                    pair_count,
                    symbol_pool: POOL,
                },
                &mut StdRng::seed_from_u64(seed),
            )
            .expect("valid config");
        engine
    }

    fn ids_of(engine: &Engine, symbol: &str) -> Vec<CardId> {
        engine
            .cards()
            .iter()
            .filter(|c| c.symbol == symbol)
            .map(|c| c.id)
            .collect()
    }

    #[test]
    fn deck_has_every_symbol_exactly_twice() {
        let engine = engine_with(4, 1);
        assert_eq!(engine.cards().len(), 8);
        for symbol in POOL {
            assert_eq!(ids_of(&engine, symbol).len(), 2, "symbol {symbol}");
        }
        for (i, card) in engine.cards().iter().enumerate() {
            assert_eq!(card.id, i);
            assert_eq!(card.state, CardState::Hidden);
        }
    }

    #[test]
    fn new_game_rejects_bad_configs() {
        let mut engine = Engine::new();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            engine.new_game_with_rng(
                GameConfig {
                    pair_count: 0,
                    symbol_pool: POOL
                },
                &mut rng
            ),
            Err(ConfigError::ZeroPairs)
        );
        assert_eq!(
            engine.new_game_with_rng(
                GameConfig {
                    pair_count: 5,
                    symbol_pool: POOL
                },
                &mut rng
            ),
            Err(ConfigError::PoolTooSmall {
                pair_count: 5,
                pool_len: 4
            })
        );
        // A rejected config must not leave a half-built session behind.
        assert!(engine.cards().is_empty());
    }

    #[test]
    fn first_reveal_counts_no_move_and_starts_clock() {
        let mut engine = engine_with(2, 3);
        assert!(!engine.clock_running());
        assert_eq!(engine.tick_second(), None);

        let id = ids_of(&engine, "A")[0];
        assert_eq!(engine.select_card(id), SelectOutcome::FirstReveal { id });
        assert_eq!(engine.moves(), 0);
        assert!(engine.clock_running());
        assert_eq!(engine.card(id).unwrap().state, CardState::Revealed);
        assert_eq!(engine.tick_second(), Some(1));
    }

    #[test]
    fn self_tap_is_a_no_op() {
        let mut engine = engine_with(2, 3);
        let id = ids_of(&engine, "A")[0];
        engine.select_card(id);
        assert_eq!(engine.select_card(id), SelectOutcome::Ignored);
        assert_eq!(engine.moves(), 0);
        assert_eq!(engine.card(id).unwrap().state, CardState::Revealed);
    }

    #[test]
    fn unknown_and_matched_ids_are_ignored() {
        let mut engine = engine_with(2, 3);
        assert_eq!(engine.select_card(999), SelectOutcome::Ignored);

        let a = ids_of(&engine, "A");
        engine.select_card(a[0]);
        engine.select_card(a[1]);
        assert_eq!(engine.card(a[0]).unwrap().state, CardState::Matched);
        assert_eq!(engine.select_card(a[0]), SelectOutcome::Ignored);
        assert_eq!(engine.moves(), 1);
    }

    #[test]
    fn matching_pair_stays_up_and_unlocks() {
        let mut engine = engine_with(2, 5);
        let a = ids_of(&engine, "A");
        engine.select_card(a[0]);
        assert_eq!(
            engine.select_card(a[1]),
            SelectOutcome::Matched {
                first: a[0],
                second: a[1]
            }
        );
        assert_eq!(engine.moves(), 1);
        assert_eq!(engine.matched_pairs(), 1);
        assert!(!engine.is_locked());
    }

    #[test]
    fn mismatch_locks_until_resolved() {
        let mut engine = engine_with(2, 5);
        let a = ids_of(&engine, "A")[0];
        let b = ids_of(&engine, "B")[0];
        engine.select_card(a);
        assert_eq!(
            engine.select_card(b),
            SelectOutcome::Mismatch {
                first: a,
                second: b
            }
        );
        assert_eq!(engine.moves(), 1);
        assert!(engine.is_locked());

        // Taps while locked change nothing at all.
        let other = ids_of(&engine, "B")[1];
        assert_eq!(engine.select_card(other), SelectOutcome::Ignored);
        assert_eq!(engine.card(other).unwrap().state, CardState::Hidden);
        assert_eq!(engine.moves(), 1);

        let generation = engine.generation();
        assert_eq!(engine.resolve_mismatch(generation), Some((a, b)));
        assert!(!engine.is_locked());
        assert_eq!(engine.card(a).unwrap().state, CardState::Hidden);
        assert_eq!(engine.card(b).unwrap().state, CardState::Hidden);

        // Resolving twice is harmless.
        assert_eq!(engine.resolve_mismatch(generation), None);
    }

    #[test]
    fn stale_generation_cannot_touch_a_new_session() {
        let mut engine = engine_with(2, 5);
        let a = ids_of(&engine, "A")[0];
        let b = ids_of(&engine, "B")[0];
        engine.select_card(a);
        engine.select_card(b);
        let stale = engine.generation();

        engine
            .new_game_with_rng(
                GameConfig {
                    pair_count: 2,
                    symbol_pool: POOL,
                },
                &mut StdRng::seed_from_u64(9),
            )
            .expect("valid config");

        assert_eq!(engine.resolve_mismatch(stale), None);
        assert!(engine.cards().iter().all(|c| c.state == CardState::Hidden));
        assert!(!engine.is_locked());
    }

    #[test]
    fn last_match_wins_exactly_once_and_stops_the_clock() {
        let mut engine = engine_with(2, 7);
        let a = ids_of(&engine, "A");
        let b = ids_of(&engine, "B");

        engine.select_card(a[0]);
        engine.tick_second();
        engine.tick_second();
        engine.select_card(a[1]);
        engine.select_card(b[0]);
        let outcome = engine.select_card(b[1]);
        assert_eq!(
            outcome,
            SelectOutcome::Won {
                first: b[0],
                second: b[1],
                moves: 2,
                elapsed_seconds: 2
            }
        );
        assert!(engine.is_won());
        assert_eq!(engine.matched_pairs(), engine.total_pairs());

        // Terminal: no further taps, no further ticks.
        assert_eq!(engine.select_card(a[0]), SelectOutcome::Ignored);
        assert_eq!(engine.tick_second(), None);
        assert_eq!(engine.elapsed_seconds(), 2);
    }

    #[test]
    fn format_clock_pads_and_rolls_minutes() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(9), "00:09");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(60), "01:00");
        assert_eq!(format_clock(119), "01:59");
        assert_eq!(format_clock(615), "10:15");
    }
}
