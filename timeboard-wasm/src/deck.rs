use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlCanvasElement, Window};

use timeboard_core::{Axis, Board, BoardConfig, Card, Deck, DeckFile, LanePolicy, TARGET_COLS};

use crate::state::{STATE, State};
use crate::utils::{asset_url, fetch_text_with_fallbacks, log};
use crate::{draw, update_status_dom};

/// Board configuration read off the canvas dataset attributes.
pub struct DomConfig {
    pub axis: Axis,
    pub lane_count: usize,
    pub ticks: Vec<i64>,
    pub placed: Vec<String>,
}

/// Everything `start()` needs before the first draw.
pub struct DomSetup {
    pub board: Board,
    pub deck: Deck,
    pub ticks: Vec<i64>,
    pub placed: Vec<String>,
}

pub fn read_config(canvas: &HtmlCanvasElement) -> DomConfig {
    let d = canvas.dataset();
    let axis = Axis {
        min: parse_year(d.get("axisMin")).unwrap_or(0),
        max: parse_year(d.get("axisMax")).unwrap_or(1),
    };
    let lane_count = parse_year(d.get("laneCount")).unwrap_or(1).max(1) as usize;
    let ticks = parse_year_list(&d.get("ticks").unwrap_or_default());
    let placed = parse_id_list(&d.get("placed").unwrap_or_default());
    DomConfig {
        axis,
        lane_count,
        ticks,
        placed,
    }
}

/// Card metadata from the hidden `#timeline-data` children. Each child
/// carries one card as `data-*` attributes.
pub fn read_cards(document: &Document) -> Vec<Card> {
    let Some(root) = document.get_element_by_id("timeline-data") else {
        return Vec::new();
    };
    let mut cards = Vec::new();
    if let Ok(items) = root.query_selector_all("[data-id]") {
        for i in 0..items.length() {
            let Some(node) = items.item(i) else { continue };
            let Ok(el) = node.dyn_into::<Element>() else {
                continue;
            };
            let Some(id) = el.get_attribute("data-id") else {
                continue;
            };
            cards.push(Card {
                id,
                title: el.get_attribute("data-title").unwrap_or_default(),
                start: attr_year(&el, "data-start").unwrap_or(0),
                end: attr_year(&el, "data-end").unwrap_or(1),
                guess_start: attr_year(&el, "data-guess-start").unwrap_or(0),
                guess_end: attr_year(&el, "data-guess-end").unwrap_or(1),
                lane: attr_year(&el, "data-lane").unwrap_or(0).max(0) as usize,
            });
        }
    }
    cards
}

/// Read the whole board setup from the host DOM. The grid derives from the
/// deck's true year extent so off-axis events still get columns.
pub fn read_dom_setup(document: &Document, canvas: &HtmlCanvasElement) -> Result<DomSetup, JsValue> {
    let config = read_config(canvas);
    let deck = Deck {
        cards: read_cards(document),
    };
    let (earliest, latest) = deck
        .year_extent()
        .unwrap_or((config.axis.min, config.axis.max));
    let board = Board::new(
        BoardConfig {
            axis: config.axis,
            lane_count: config.lane_count,
            lane_policy: LanePolicy::default(),
            target_cols: TARGET_COLS,
        },
        earliest,
        latest,
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let ticks = if config.ticks.is_empty() {
        config.axis.even_ticks(5)
    } else {
        config.ticks
    };
    Ok(DomSetup {
        board,
        deck,
        ticks,
        placed: config.placed,
    })
}

/// Re-read dataset and cards after a host-driven update. The grid stays as
/// derived at start-up so committed columns keep their meaning; placements
/// are re-seeded from the refreshed guess values.
pub fn refresh_state_from_dom(state: &mut State) {
    let config = read_config(&state.canvas);
    let cards = read_cards(&state.document);
    if !cards.is_empty() {
        state.deck = Deck { cards };
    }
    state.board.reset(config.lane_count);
    if !config.ticks.is_empty() {
        state.ticks = config.ticks;
    }
    state.placed = config.placed;
    seed_placements(state);
}

/// Record host-provided placements in the registry. These arrive as
/// committed state, not proposals, so they bypass the solver; under the
/// greedy policy the usual repack still runs.
pub fn seed_placements(state: &mut State) {
    let ids = state.placed.clone();
    for id in &ids {
        let Some(card) = state.deck.get(id) else {
            continue;
        };
        let lane = state.board.lanes().clamp_lane(card.lane as i64);
        let start = state.board.grid().year_to_col(card.guess_start);
        let span = state.board.grid().span_cols(card.guess_duration_years());
        let evicted = state.board.commit(id, lane, start, span);
        for out in evicted {
            state.placed.retain(|p| p != &out);
        }
    }
}

/// Fetch `decks/<name>.json` and swap the whole board for its contents.
pub async fn fetch_and_load_deck(window: Window, name: &str) -> Result<(), JsValue> {
    let text = fetch_text_with_fallbacks(
        &window,
        &[
            &asset_url(&format!("decks/{}.json", name)),
            &format!("/decks/{}.json", name),
            &format!("decks/{}.json", name),
        ],
    )
    .await
    .ok_or_else(|| JsValue::from_str("deck not found"))?;
    let file: DeckFile =
        serde_json::from_str(&text).map_err(|e| JsValue::from_str(&e.to_string()))?;
    load_deck_file(file)
}

fn load_deck_file(file: DeckFile) -> Result<(), JsValue> {
    let axis = Axis {
        min: file.axis_min,
        max: file.axis_max,
    };
    let deck = Deck { cards: file.cards };
    let (earliest, latest) = deck.year_extent().unwrap_or((axis.min, axis.max));
    let board = Board::new(
        BoardConfig {
            axis,
            lane_count: file.lane_count,
            lane_policy: LanePolicy::default(),
            target_cols: TARGET_COLS,
        },
        earliest,
        latest,
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))?;

    STATE.with(|st| {
        if let Some(st_rc) = st.borrow().as_ref() {
            let mut s = st_rc.borrow_mut();
            s.board = board;
            s.deck = deck;
            s.ticks = if file.ticks.is_empty() {
                axis.even_ticks(5)
            } else {
                file.ticks.clone()
            };
            s.placed = file.placed.clone();
            s.drag = None;
            s.selected = None;
            seed_placements(&mut s);
            update_status_dom(&s);
            draw(&mut s);
            log(&format!(
                "Loaded deck with {} cards, {} placed",
                s.deck.cards.len(),
                s.placed.len()
            ));
        }
    });
    Ok(())
}

fn parse_year(v: Option<String>) -> Option<i64> {
    v.as_deref().and_then(|s| s.trim().parse::<i64>().ok())
}

fn attr_year(el: &Element, name: &str) -> Option<i64> {
    el.get_attribute(name)
        .and_then(|s| s.trim().parse::<i64>().ok())
}

fn parse_year_list(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|t| t.trim().parse::<i64>().ok())
        .collect()
}

fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
