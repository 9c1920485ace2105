#![cfg(target_arch = "wasm32")]

// Browser smoke test for the wasm surface. Run with
// `wasm-pack test --headless --firefox` (or --chrome).

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn start_game_builds_the_small_board() {
    memory_pairs::start_game().expect("mount succeeds");
    let doc = web_sys::window().unwrap().document().unwrap();

    assert!(doc.get_element_by_id("mp-grid").is_some());
    assert!(doc.get_element_by_id("mp-hud").is_some());
    assert!(doc.get_element_by_id("mp-congrats").is_some());

    // Default difficulty is the 16-card board: last tile index is 15.
    assert!(doc.query_selector("#mp-grid [data-idx='15']").unwrap().is_some());
    assert!(doc.query_selector("#mp-grid [data-idx='16']").unwrap().is_none());
}
