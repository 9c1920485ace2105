//! DOM presentation layer.
//!
//! Builds the page chrome (controls bar, card grid, win overlay), feeds
//! click events into the engine and paints whatever the engine reports
//! back. The session lives in a thread-local cell because listener and
//! timer closures need shared access to it; the engine itself never sees a
//! DOM type. Timer handles are kept on the session so a new game can cancel
//! the 1 Hz clock and any pending mismatch revert before they fire into a
//! superseded session.

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlSelectElement, window};

use crate::Difficulty;
use crate::engine::{self, Card, CardId, CardState, Engine, SelectOutcome};

/// Per-page session: the engine plus the scheduling handles that must be
/// cancelled when a new game supersedes the current one. The closures stay
/// alive here for as long as the browser may still invoke them.
struct App {
    engine: Engine,
    difficulty: Difficulty,
    timer_id: Option<i32>,
    timer_closure: Option<Closure<dyn FnMut()>>,
    mismatch_timer_id: Option<i32>,
    mismatch_closure: Option<Closure<dyn FnMut()>>,
}

thread_local! {
    static APP: RefCell<Option<App>> = RefCell::new(None);
}

/// Build (or reuse) the page and start the first game.
pub fn mount() -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    ensure_page(&doc)?;

    // A repeated mount replaces the session; silence the old one's timers
    // before it is dropped.
    APP.with(|cell| {
        if let Some(mut old) = cell.borrow_mut().take() {
            cancel_timers(&mut old);
        }
    });

    let mut app = App {
        engine: Engine::new(),
        difficulty: Difficulty::Small,
        timer_id: None,
        timer_closure: None,
        mismatch_timer_id: None,
        mismatch_closure: None,
    };
    start_new_game(&doc, &mut app)?;
    APP.with(|cell| cell.replace(Some(app)));
    Ok(())
}

// --- Page construction -------------------------------------------------------

const HUD_STYLE: &str = "display:flex; align-items:center; justify-content:center; gap:14px; margin:18px auto 0; font-family:'Fira Code', monospace; color:#ffd166;";
const BUTTON_STYLE: &str = "padding:6px 14px; font-family:inherit; font-size:14px; background:#2b3a67; color:#ffd166; border:1px solid #1d2847; border-radius:6px; cursor:pointer;";
const SELECT_STYLE: &str = "padding:5px 8px; font-family:inherit; font-size:14px; background:#181818; color:#ffd166; border:1px solid #333; border-radius:6px;";
const READOUT_STYLE: &str = "font-size:15px; padding:4px 8px; background:rgba(0,0,0,0.42); border:1px solid #333; border-radius:6px; letter-spacing:0.5px;";

fn ensure_page(doc: &Document) -> Result<(), JsValue> {
    let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;

    // Controls bar: new-game button, difficulty select, moves + clock readouts.
    if doc.get_element_by_id("mp-hud").is_none() {
        let hud = doc.create_element("div")?;
        hud.set_id("mp-hud");
        hud.set_attribute("style", HUD_STYLE).ok();

        let button = doc.create_element("button")?;
        button.set_id("mp-new");
        button.set_text_content(Some("New Game"));
        button.set_attribute("style", BUTTON_STYLE).ok();
        hud.append_child(&button)?;

        let select = doc.create_element("select")?;
        select.set_id("mp-difficulty");
        select.set_attribute("style", SELECT_STYLE).ok();
        for (value, label) in [("small", "4 x 4"), ("large", "6 x 6")] {
            let option = doc.create_element("option")?;
            option.set_attribute("value", value)?;
            option.set_text_content(Some(label));
            select.append_child(&option)?;
        }
        hud.append_child(&select)?;

        let moves = doc.create_element("span")?;
        moves.set_id("mp-moves");
        moves.set_attribute("style", READOUT_STYLE).ok();
        moves.set_text_content(Some("Moves: 0"));
        hud.append_child(&moves)?;

        let clock = doc.create_element("span")?;
        clock.set_id("mp-clock");
        clock.set_attribute("style", READOUT_STYLE).ok();
        clock.set_text_content(Some("00:00"));
        hud.append_child(&clock)?;

        body.append_child(&hud)?;

        {
            let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
                restart_from_controls();
            }) as Box<dyn FnMut(_)>);
            button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
                restart_from_controls();
            }) as Box<dyn FnMut(_)>);
            select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
    }

    // Card grid. A single delegated listener feeds taps to the engine, so
    // rebuilding the board never re-registers anything.
    if doc.get_element_by_id("mp-grid").is_none() {
        let grid = doc.create_element("div")?;
        grid.set_id("mp-grid");
        body.append_child(&grid)?;

        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            if let Some(id) = tapped_card_id(&evt) {
                on_card_tapped(id);
            }
        }) as Box<dyn FnMut(_)>);
        grid.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Win overlay, hidden until the terminal result.
    if doc.get_element_by_id("mp-congrats").is_none() {
        let overlay = doc.create_element("div")?;
        overlay.set_id("mp-congrats");
        overlay.set_attribute("style", &overlay_style(false)).ok();

        let heading = doc.create_element("div")?;
        heading.set_text_content(Some("🎉 You won!"));
        heading
            .set_attribute("style", "font-size:28px; margin-bottom:10px;")
            .ok();
        overlay.append_child(&heading)?;

        let stats = doc.create_element("div")?;
        stats.set_id("mp-final-stats");
        stats
            .set_attribute("style", "font-size:16px; margin-bottom:16px;")
            .ok();
        overlay.append_child(&stats)?;

        let again = doc.create_element("button")?;
        again.set_id("mp-play-again");
        again.set_text_content(Some("Play Again"));
        again.set_attribute("style", BUTTON_STYLE).ok();
        overlay.append_child(&again)?;

        body.append_child(&overlay)?;

        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            restart_from_controls();
        }) as Box<dyn FnMut(_)>);
        again.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    Ok(())
}

/// Map a click inside the grid to the card id it landed on, if any.
fn tapped_card_id(evt: &web_sys::MouseEvent) -> Option<CardId> {
    let target: Element = evt.target()?.dyn_into().ok()?;
    let tile = target.closest("[data-idx]").ok()??;
    tile.get_attribute("data-idx")?.parse().ok()
}

// --- Event handling ----------------------------------------------------------

fn on_card_tapped(id: CardId) {
    let Some(doc) = window().and_then(|w| w.document()) else {
        return;
    };
    APP.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let Some(app) = borrow.as_mut() else { return };
        match app.engine.select_card(id) {
            SelectOutcome::Ignored => {}
            SelectOutcome::FirstReveal { id } => {
                ensure_clock(app);
                render_card_by_id(&doc, &app.engine, id);
            }
            SelectOutcome::Matched { first, second } => {
                render_card_by_id(&doc, &app.engine, first);
                render_card_by_id(&doc, &app.engine, second);
                render_moves(&doc, app.engine.moves());
            }
            SelectOutcome::Mismatch { first, second } => {
                render_card_by_id(&doc, &app.engine, first);
                render_card_by_id(&doc, &app.engine, second);
                render_moves(&doc, app.engine.moves());
                schedule_mismatch_revert(app);
            }
            SelectOutcome::Won {
                first,
                second,
                moves,
                elapsed_seconds,
            } => {
                render_card_by_id(&doc, &app.engine, first);
                render_card_by_id(&doc, &app.engine, second);
                render_moves(&doc, moves);
                stop_clock(app);
                render_win(&doc, elapsed_seconds, moves);
            }
        }
    });
}

/// New-game button, difficulty change and play-again all funnel here.
fn restart_from_controls() {
    let Some(doc) = window().and_then(|w| w.document()) else {
        return;
    };
    let difficulty = doc
        .get_element_by_id("mp-difficulty")
        .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
        .map(|sel| Difficulty::from_value(&sel.value()))
        .unwrap_or(Difficulty::Small);
    APP.with(|cell| {
        if let Some(app) = cell.borrow_mut().as_mut() {
            app.difficulty = difficulty;
            let _ = start_new_game(&doc, app);
        }
    });
}

fn start_new_game(doc: &Document, app: &mut App) -> Result<(), JsValue> {
    // Pending timers belong to the session being discarded.
    cancel_timers(app);
    let difficulty = app.difficulty;
    let cards = app
        .engine
        .new_game(difficulty.config())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    render_board(doc, difficulty, cards)?;
    render_moves(doc, 0);
    render_clock(doc, 0);
    set_win_visible(doc, false);
    Ok(())
}

// --- Scheduling --------------------------------------------------------------

/// Start the 1 Hz clock interval. The engine decides whether a tick counts,
/// so an interval that outlives the win paints nothing.
fn ensure_clock(app: &mut App) {
    if app.timer_id.is_some() {
        return;
    }
    let Some(win) = window() else { return };
    let closure = Closure::wrap(Box::new(move || {
        let Some(doc) = window().and_then(|w| w.document()) else {
            return;
        };
        APP.with(|cell| {
            if let Some(app) = cell.borrow_mut().as_mut() {
                if let Some(seconds) = app.engine.tick_second() {
                    render_clock(&doc, seconds);
                }
            }
        });
    }) as Box<dyn FnMut()>);
    if let Ok(id) = win.set_interval_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        engine::CLOCK_TICK_MS,
    ) {
        app.timer_id = Some(id);
    }
    app.timer_closure = Some(closure);
}

fn stop_clock(app: &mut App) {
    if let Some(id) = app.timer_id.take() {
        if let Some(win) = window() {
            win.clear_interval_with_handle(id);
        }
    }
    app.timer_closure = None;
}

/// Queue the delayed flip-back of a mismatched pair. The timeout is cleared
/// by any new game; the generation token makes a callback that slips through
/// anyway a no-op inside the engine.
fn schedule_mismatch_revert(app: &mut App) {
    let Some(win) = window() else { return };
    let generation = app.engine.generation();
    let closure = Closure::wrap(Box::new(move || {
        let Some(doc) = window().and_then(|w| w.document()) else {
            return;
        };
        APP.with(|cell| {
            if let Some(app) = cell.borrow_mut().as_mut() {
                app.mismatch_timer_id = None;
                if let Some((a, b)) = app.engine.resolve_mismatch(generation) {
                    render_card_by_id(&doc, &app.engine, a);
                    render_card_by_id(&doc, &app.engine, b);
                }
            }
        });
    }) as Box<dyn FnMut()>);
    if let Ok(id) = win.set_timeout_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        engine::MISMATCH_DELAY_MS,
    ) {
        app.mismatch_timer_id = Some(id);
    }
    app.mismatch_closure = Some(closure);
}

fn cancel_timers(app: &mut App) {
    if let Some(win) = window() {
        if let Some(id) = app.timer_id.take() {
            win.clear_interval_with_handle(id);
        }
        if let Some(id) = app.mismatch_timer_id.take() {
            win.clear_timeout_with_handle(id);
        }
    }
    app.timer_closure = None;
    app.mismatch_closure = None;
}

// --- Rendering ---------------------------------------------------------------

const CARD_BACK_STYLE: &str = "display:flex; align-items:center; justify-content:center; aspect-ratio:1/1; font-size:26px; background:#2b3a67; color:#9fb4e8; border:1px solid #1d2847; border-radius:10px; cursor:pointer; user-select:none;";
const CARD_FACE_STYLE: &str = "display:flex; align-items:center; justify-content:center; aspect-ratio:1/1; font-size:30px; background:#f6f1e7; border:1px solid #c9bfa8; border-radius:10px; cursor:default; user-select:none;";
const CARD_MATCHED_STYLE: &str = "display:flex; align-items:center; justify-content:center; aspect-ratio:1/1; font-size:30px; background:#2f6d3a; border:1px solid #1d4a26; border-radius:10px; cursor:default; user-select:none; opacity:0.85;";

fn render_board(doc: &Document, difficulty: Difficulty, cards: &[Card]) -> Result<(), JsValue> {
    let grid = doc
        .get_element_by_id("mp-grid")
        .ok_or_else(|| JsValue::from_str("no grid"))?;
    grid.set_inner_html("");
    grid.set_attribute("style", &grid_style(difficulty)).ok();
    for card in cards {
        let tile = doc.create_element("div")?;
        tile.set_attribute("data-idx", &card.id.to_string())?;
        apply_card_visuals(&tile, card);
        grid.append_child(&tile)?;
    }
    Ok(())
}

fn grid_style(difficulty: Difficulty) -> String {
    // Keep large-board tiles tappable on very narrow phones.
    let narrow = window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|v| v.as_f64())
        .map(|w| w < 420.0)
        .unwrap_or(false);
    let columns = if difficulty == Difficulty::Large && narrow {
        3
    } else {
        difficulty.columns()
    };
    format!(
        "display:grid; grid-template-columns:repeat({columns}, 1fr); gap:10px; max-width:560px; margin:18px auto; padding:0 12px;"
    )
}

fn apply_card_visuals(tile: &Element, card: &Card) {
    let (class, face, style) = match card.state {
        CardState::Hidden => ("mp-card", "?", CARD_BACK_STYLE),
        CardState::Revealed => ("mp-card flipped", card.symbol, CARD_FACE_STYLE),
        CardState::Matched => ("mp-card flipped matched", card.symbol, CARD_MATCHED_STYLE),
    };
    tile.set_class_name(class);
    tile.set_text_content(Some(face));
    tile.set_attribute("style", style).ok();
}

fn render_card_by_id(doc: &Document, engine: &Engine, id: CardId) {
    let Some(card) = engine.card(id) else { return };
    let selector = format!("#mp-grid [data-idx='{id}']");
    if let Ok(Some(tile)) = doc.query_selector(&selector) {
        apply_card_visuals(&tile, card);
    }
}

fn render_moves(doc: &Document, moves: u32) {
    if let Some(el) = doc.get_element_by_id("mp-moves") {
        el.set_text_content(Some(&format!("Moves: {moves}")));
    }
}

fn render_clock(doc: &Document, seconds: u32) {
    if let Some(el) = doc.get_element_by_id("mp-clock") {
        el.set_text_content(Some(&engine::format_clock(seconds)));
    }
}

fn render_win(doc: &Document, elapsed_seconds: u32, moves: u32) {
    if let Some(stats) = doc.get_element_by_id("mp-final-stats") {
        stats.set_inner_html(&format!(
            "You finished in <strong>{}</strong> with <strong>{}</strong> moves.",
            engine::format_clock(elapsed_seconds),
            moves
        ));
    }
    set_win_visible(doc, true);
}

fn set_win_visible(doc: &Document, visible: bool) {
    if let Some(overlay) = doc.get_element_by_id("mp-congrats") {
        overlay.set_attribute("style", &overlay_style(visible)).ok();
    }
}

fn overlay_style(visible: bool) -> String {
    let display = if visible { "flex" } else { "none" };
    format!(
        "position:fixed; inset:0; display:{display}; flex-direction:column; align-items:center; justify-content:center; background:rgba(0,0,0,0.65); color:#ffd166; font-family:'Fira Code', monospace; z-index:50; text-align:center;"
    )
}
