use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, CustomEvent, CustomEventInit, Document, DragEvent,
    HtmlCanvasElement, HtmlElement, KeyboardEvent, PointerEvent,
};

use timeboard_core::{DragSession, Intent, Track, format_year};

mod canvas;
mod constants;
mod deck;
mod state;
mod utils;

use crate::canvas::{rounded_rect, set_fill_style, set_stroke_style};
use crate::constants::{
    BAR_MIN_W, BLOCK_H, HEADER_H, LANE_GAP, LANE_H, PAD_TOP, WIDE_BAR_PX,
};
use crate::state::{BlockRect, STATE, State};
use crate::utils::{
    client_to_canvas, find_scroll_container, get_query_param, log, sync_canvas_size,
};

fn init_canvas(
    document: &Document,
) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
    let cv = document
        .get_element_by_id("board")
        .ok_or_else(|| JsValue::from_str("canvas #board not found"))?
        .dyn_into::<HtmlCanvasElement>()?;
    let ctx = cv
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2D context not available"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    Ok((cv, ctx))
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let (canvas, ctx) = init_canvas(&document)?;

    let setup = deck::read_dom_setup(&document, &canvas)?;

    // If URL param deck is set, we try to fetch decks/<name>.json;
    // otherwise the DOM-provided deck stays.
    if let Ok(search) = window.location().search()
        && let Some(name) = get_query_param(&search, "deck")
    {
        let win = window.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = deck::fetch_and_load_deck(win, &name).await {
                log(&format!("Failed to load deck '{}': {:?}", name, err));
            }
        });
    }

    let state = Rc::new(RefCell::new(State {
        window,
        document,
        canvas,
        ctx,
        board: setup.board,
        deck: setup.deck,
        placed: setup.placed,
        ticks: setup.ticks,
        drag: None,
        selected: None,
        rects: HashMap::new(),
        css_width: 1.0,
        css_height: 1.0,
        scroller: None,
        scroll_vx: 0.0,
    }));

    STATE.with(|st| st.replace(Some(state.clone())));
    {
        let mut s = state.borrow_mut();
        deck::seed_placements(&mut s);
        update_status_dom(&s);
    }
    attach_ui(state.clone())?;
    start_animation(state.clone());
    draw(&mut state.borrow_mut());
    Ok(())
}

/// Re-read the canvas dataset and the card metadata after a host-driven
/// update. The grid derived at start-up is kept so committed columns keep
/// their meaning.
#[wasm_bindgen]
pub fn refresh_from_dom() {
    STATE.with(|st| {
        if let Some(st_rc) = st.borrow().as_ref() {
            let mut s = st_rc.borrow_mut();
            deck::refresh_state_from_dom(&mut s);
            update_status_dom(&s);
            draw(&mut s);
        }
    });
}

fn attach_ui(state: Rc<RefCell<State>>) -> Result<(), JsValue> {
    let doc = state.borrow().document.clone();

    // Grabbing a placed block opens a drag session.
    {
        let st = state.clone();
        let pointerdown =
            Closure::<dyn FnMut(PointerEvent)>::wrap(Box::new(move |e: PointerEvent| {
                if e.button() != 0 && e.pointer_type() == "mouse" {
                    return;
                }
                let mut s = st.borrow_mut();
                let (x, y) = client_to_canvas(&e, &s.canvas);
                let Some(id) = hit_test(&s, x, y) else { return };
                e.prevent_default();
                let Some(card) = s.deck.get(&id) else { return };
                let span_cols = s.board.grid().span_cols(card.guess_duration_years());
                let grab = pointer_year(&s, x) - card.guess_start;
                let (origin_lane, origin_start) = match s.board.lanes().get(&id) {
                    Some(p) => (p.lane, p.span.start()),
                    None => (
                        s.board.lanes().clamp_lane(card.lane as i64),
                        s.board.grid().year_to_col(card.guess_start),
                    ),
                };
                s.drag = Some(DragSession::begin(
                    &id,
                    e.pointer_id(),
                    span_cols,
                    grab,
                    origin_lane,
                    origin_start,
                ));
                s.selected = Some(id);
            }));
        state.borrow().canvas.add_event_listener_with_callback(
            "pointerdown",
            pointerdown.as_ref().unchecked_ref(),
        )?;
        pointerdown.forget();
    }

    // Window-level move so the gesture survives leaving the canvas. A
    // rejected solve leaves both the registry and the card untouched.
    {
        let st = state.clone();
        let pointermove =
            Closure::<dyn FnMut(PointerEvent)>::wrap(Box::new(move |e: PointerEvent| {
                let mut s = st.borrow_mut();
                let Some(drag) = s.drag.clone() else { return };
                if !drag.is_active() || e.pointer_id() != drag.pointer_id {
                    return;
                }
                e.prevent_default();
                let (x, y) = client_to_canvas(&e, &s.canvas);
                let lane = lane_from_y(&s, y);
                let desired = drag.desired_start_col(s.board.grid(), pointer_year(&s, x));
                if let Some(start) = s.board.solve_move(&drag.card_id, lane, drag.span_cols, desired)
                {
                    let (guess_start, guess_end) =
                        commit_placement(&mut s, &drag.card_id, lane, start, drag.span_cols);
                    dispatch_intent(
                        &s,
                        &Intent::SetGuess {
                            id: drag.card_id.clone(),
                            guess_start,
                            guess_end,
                            lane,
                        },
                    );
                    draw(&mut s);
                }
                update_scroll_velocity(&mut s, e.client_x() as f64);
            }));
        state.borrow().window.add_event_listener_with_callback(
            "pointermove",
            pointermove.as_ref().unchecked_ref(),
        )?;
        pointermove.forget();
    }
    {
        let st = state.clone();
        let pointerup =
            Closure::<dyn FnMut(PointerEvent)>::wrap(Box::new(move |e: PointerEvent| {
                let mut s = st.borrow_mut();
                let Some(drag) = s.drag.as_mut() else { return };
                if e.pointer_id() != drag.pointer_id {
                    return;
                }
                e.prevent_default();
                drag.resolve();
                s.drag = None;
                s.scroll_vx = 0.0;
            }));
        state
            .borrow()
            .window
            .add_event_listener_with_callback("pointerup", pointerup.as_ref().unchecked_ref())?;
        pointerup.forget();
    }
    {
        let st = state.clone();
        let pointercancel =
            Closure::<dyn FnMut(PointerEvent)>::wrap(Box::new(move |e: PointerEvent| {
                let mut s = st.borrow_mut();
                let Some(drag) = s.drag.as_mut() else { return };
                if e.pointer_id() != drag.pointer_id {
                    return;
                }
                drag.revert();
                s.drag = None;
                s.scroll_vx = 0.0;
            }));
        state.borrow().window.add_event_listener_with_callback(
            "pointercancel",
            pointercancel.as_ref().unchecked_ref(),
        )?;
        pointercancel.forget();
    }

    // HTML5 drag-and-drop from the pool onto the canvas.
    {
        let cv = state.borrow().canvas.clone();
        let dragover = Closure::<dyn FnMut(DragEvent)>::wrap(Box::new(move |e: DragEvent| {
            let Some(dt) = e.data_transfer() else { return };
            if dt.types().includes(&JsValue::from_str("text/event-id"), 0) {
                e.prevent_default();
                dt.set_drop_effect("move");
                let _ = cv.class_list().add_1("drop-target");
            }
        }));
        state
            .borrow()
            .canvas
            .add_event_listener_with_callback("dragover", dragover.as_ref().unchecked_ref())?;
        dragover.forget();
    }
    {
        let cv = state.borrow().canvas.clone();
        let dragleave = Closure::<dyn FnMut(DragEvent)>::wrap(Box::new(move |_e: DragEvent| {
            let _ = cv.class_list().remove_1("drop-target");
        }));
        state
            .borrow()
            .canvas
            .add_event_listener_with_callback("dragleave", dragleave.as_ref().unchecked_ref())?;
        dragleave.forget();
    }
    {
        let st = state.clone();
        let drop = Closure::<dyn FnMut(DragEvent)>::wrap(Box::new(move |e: DragEvent| {
            e.prevent_default();
            let mut s = st.borrow_mut();
            let _ = s.canvas.class_list().remove_1("drop-target");
            let Some(dt) = e.data_transfer() else { return };
            let Ok(id) = dt.get_data("text/event-id") else {
                return;
            };
            if id.is_empty() {
                return;
            }
            let (x, y) = client_to_canvas(&e, &s.canvas);
            let lane = lane_from_y(&s, y);
            let drop_col = s.board.grid().year_to_col(pointer_year(&s, x));
            let Some(card) = s.deck.get(&id) else { return };
            let span = s.board.grid().span_cols(card.guess_duration_years());
            let Some(start) = s.board.solve_drop(&id, lane, span, drop_col) else {
                // No free space near the drop point; the card stays pooled.
                return;
            };
            commit_placement(&mut s, &id, lane, start, span);
            if !s.placed.iter().any(|p| p == &id) {
                s.placed.push(id.clone());
            }
            let drop_year = s.board.grid().col_to_year(start + span / 2);
            dispatch_intent(&s, &Intent::PlaceFromPool { id, drop_year, lane });
            update_status_dom(&s);
            draw(&mut s);
        }));
        state
            .borrow()
            .canvas
            .add_event_listener_with_callback("drop", drop.as_ref().unchecked_ref())?;
        drop.forget();
    }

    // Pool cards advertise their id for the native drag.
    if let Some(pool) = doc.get_element_by_id("pool") {
        let dragstart = Closure::<dyn FnMut(DragEvent)>::wrap(Box::new(move |e: DragEvent| {
            let Some(target) = e.target() else { return };
            let Ok(el) = target.dyn_into::<web_sys::Element>() else {
                return;
            };
            let Ok(Some(card)) = el.closest("[data-event-id]") else {
                return;
            };
            let Some(id) = card.get_attribute("data-event-id") else {
                return;
            };
            if let Some(dt) = e.data_transfer() {
                let _ = dt.set_data("text/event-id", &id);
                dt.set_effect_allowed("move");
            }
        }));
        pool.add_event_listener_with_callback("dragstart", dragstart.as_ref().unchecked_ref())?;
        dragstart.forget();
    }

    // Keyboard: Delete/Backspace sends the selected block back to the pool.
    {
        let st = state.clone();
        let keydown =
            Closure::<dyn FnMut(KeyboardEvent)>::wrap(Box::new(move |e: KeyboardEvent| {
                let key = e.key();
                if key != "Delete" && key != "Backspace" {
                    return;
                }
                let mut s = st.borrow_mut();
                if s.drag.is_some() {
                    return;
                }
                let Some(id) = s.selected.clone() else { return };
                if s.board.remove(&id) {
                    s.placed.retain(|p| p != &id);
                    s.selected = None;
                    dispatch_intent(&s, &Intent::RemoveCard { id });
                    update_status_dom(&s);
                    draw(&mut s);
                }
            }));
        state
            .borrow()
            .window
            .add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
        keydown.forget();
    }

    Ok(())
}

/// Write an accepted placement into the registry and mirror it onto the
/// card's guess fields. Returns the committed guess years.
fn commit_placement(
    s: &mut State,
    id: &str,
    lane: usize,
    start_col: i64,
    span_cols: i64,
) -> (i64, i64) {
    let evicted = s.board.commit(id, lane, start_col, span_cols);
    for out in evicted {
        s.placed.retain(|p| p != &out);
        dispatch_intent(s, &Intent::RemoveCard { id: out });
    }
    let start_year = s.board.grid().col_to_year(start_col);
    let end_year = s.board.grid().col_to_year(start_col + span_cols.max(1));
    if let Some(card) = s.deck.get_mut(id) {
        card.guess_start = start_year;
        card.guess_end = end_year;
        card.lane = lane;
    }
    (start_year, end_year)
}

fn pointer_year(state: &State, x: f64) -> i64 {
    state.board.axis().x_to_year(x, state.track())
}

fn lane_center_y(lane: usize) -> f64 {
    PAD_TOP + HEADER_H + lane as f64 * (LANE_H + LANE_GAP) + LANE_H / 2.0
}

fn lane_from_y(state: &State, y: f64) -> usize {
    let y0 = PAD_TOP + HEADER_H;
    let idx = ((y - y0 + LANE_GAP / 2.0) / (LANE_H + LANE_GAP)).floor() as i64;
    state.board.lanes().clamp_lane(idx)
}

/// Topmost block under the pointer; placed order is draw order.
fn hit_test(state: &State, x: f64, y: f64) -> Option<String> {
    for id in state.placed.iter().rev() {
        if let Some(r) = state.rects.get(id)
            && r.contains(x, y)
        {
            return Some(id.clone());
        }
    }
    None
}

fn draw(state: &mut State) {
    sync_canvas_size(state);
    let ctx = state.ctx.clone();
    ctx.clear_rect(0.0, 0.0, state.css_width, state.css_height);

    let track = state.track();
    let axis = state.board.axis();
    let grid = *state.board.grid();
    let lane_count = state.board.lanes().lane_count();
    let axis_y = PAD_TOP + HEADER_H / 2.0;
    let y_top = PAD_TOP + HEADER_H;
    let y_bottom = y_top + lane_count as f64 * (LANE_H + LANE_GAP) - LANE_GAP;

    // Axis header line
    set_stroke_style(&ctx, "#666");
    ctx.set_line_width(3.0);
    ctx.begin_path();
    ctx.move_to(track.left, axis_y);
    ctx.line_to(track.left + track.width, axis_y);
    ctx.stroke();

    // Vertical grid lines, one per column across the lane area
    set_stroke_style(&ctx, "rgba(0, 0, 0, 0.15)");
    ctx.set_line_width(1.25);
    for col in grid.year_to_col(axis.min)..=grid.year_to_col(axis.max) {
        let x = axis.year_to_x(grid.col_to_year(col), track);
        ctx.begin_path();
        ctx.move_to(x, y_top);
        ctx.line_to(x, y_bottom);
        ctx.stroke();
    }
    // Lane area boundaries
    for y in [y_top, y_bottom] {
        ctx.begin_path();
        ctx.move_to(track.left, y);
        ctx.line_to(track.left + track.width, y);
        ctx.stroke();
    }

    draw_ticks(state, &ctx, track, axis_y);
    draw_blocks(state, &ctx, track);
}

fn draw_ticks(state: &State, ctx: &CanvasRenderingContext2d, track: Track, axis_y: f64) {
    if state.ticks.is_empty() {
        return;
    }
    ctx.set_font("600 12px system-ui, sans-serif");
    ctx.set_text_baseline("top");
    let step = if state.ticks.len() > 1 {
        track.width / (state.ticks.len() - 1) as f64
    } else {
        0.0
    };
    for (i, tick) in state.ticks.iter().enumerate() {
        let x = track.left + step * i as f64;

        set_stroke_style(ctx, "#666");
        ctx.set_global_alpha(0.7);
        ctx.set_line_width(1.5);
        ctx.begin_path();
        ctx.move_to(x, axis_y - 7.0);
        ctx.line_to(x, axis_y + 7.0);
        ctx.stroke();
        ctx.set_global_alpha(1.0);

        let text = format_year(*tick);
        set_fill_style(ctx, "#666");
        let tw = text_width(ctx, &text);
        let _ = ctx.fill_text(&text, x - tw / 2.0, axis_y + 10.0);
    }
}

fn draw_blocks(state: &mut State, ctx: &CanvasRenderingContext2d, track: Track) {
    let axis = state.board.axis();
    let grid = *state.board.grid();
    state.rects.clear();

    let placed = state.placed.clone();
    for id in &placed {
        let Some(card) = state.deck.get(id) else { continue };
        let lane = match state.board.lanes().get(id) {
            Some(p) => p.lane,
            None => state.board.lanes().clamp_lane(card.lane as i64),
        };
        let y = lane_center_y(lane);
        // Blocks render snapped to their columns, so a bar always covers
        // whole grid cells.
        let start_col = grid.year_to_col(card.guess_start);
        let end_col = (start_col + 1).max(grid.year_to_col(card.guess_end));
        let gx = axis.year_to_x(grid.col_to_year(start_col), track);
        let gw = (axis.year_to_x(grid.col_to_year(end_col), track) - gx).max(BAR_MIN_W);

        set_fill_style(ctx, "rgba(37, 99, 235, 0.85)");
        set_stroke_style(ctx, "rgba(37, 99, 235, 0.95)");
        ctx.set_line_width(1.5);
        rounded_rect(ctx, gx, y - BLOCK_H / 2.0, gw, BLOCK_H, 6.0);
        ctx.fill();
        ctx.stroke();

        draw_block_label(ctx, track, &card.title, gx, y, gw);

        state.rects.insert(
            id.clone(),
            BlockRect {
                x: gx,
                y: y - BLOCK_H / 2.0,
                w: gw,
                h: BLOCK_H,
                lane,
            },
        );
    }
}

fn draw_block_label(
    ctx: &CanvasRenderingContext2d,
    track: Track,
    title: &str,
    gx: f64,
    y: f64,
    gw: f64,
) {
    ctx.set_font("12px system-ui, sans-serif");
    if gw >= WIDE_BAR_PX {
        // Wide bar: label inside, clipped to the bar interior.
        ctx.save();
        ctx.begin_path();
        ctx.rect(
            gx + 8.0,
            y - BLOCK_H / 2.0 + 2.0,
            (gw - 14.0).max(0.0),
            BLOCK_H - 4.0,
        );
        ctx.clip();
        set_fill_style(ctx, "#fff");
        let _ = ctx.fill_text(title, gx + 8.0, y - 6.0);
        ctx.restore();
        return;
    }

    // Narrow bar: bubble above it, flipped below when the header is in the
    // way, clamped into the track.
    let tw = text_width(ctx, title);
    let pad_h = 6.0;
    let pad_v: f64 = 4.0;
    let bubble_w = tw + pad_h * 2.0;
    let bubble_h = (12.0 + pad_v * 2.0).ceil();
    let gap = 6.0;
    let mut bubble_top = (y - BLOCK_H / 2.0 - gap - bubble_h).round();
    if bubble_top < PAD_TOP + 2.0 {
        bubble_top = (y + BLOCK_H / 2.0 + gap).round();
    }
    let min_x = track.left + 2.0;
    let max_x = track.left + track.width - 2.0;
    let mut box_left = (gx + gw / 2.0 - bubble_w / 2.0).round();
    if box_left < min_x {
        box_left = min_x;
    } else if box_left + bubble_w > max_x {
        box_left = max_x - bubble_w;
    }

    set_fill_style(ctx, "rgba(255, 255, 255, 0.85)");
    rounded_rect(ctx, box_left, bubble_top, bubble_w, bubble_h, 4.0);
    ctx.fill();

    set_fill_style(ctx, "#333");
    ctx.set_text_baseline("middle");
    let _ = ctx.fill_text(
        title,
        (box_left + pad_h).round(),
        (bubble_top + bubble_h / 2.0).round(),
    );
    ctx.set_text_baseline("top");
}

fn text_width(ctx: &CanvasRenderingContext2d, text: &str) -> f64 {
    ctx.measure_text(text).map(|m| m.width()).unwrap_or(0.0)
}

fn update_status_dom(state: &State) {
    if let Some(el) = state.document.get_element_by_id("status")
        && let Ok(el) = el.dyn_into::<HtmlElement>()
    {
        el.set_inner_text(&format!(
            "Placed: {} / {}",
            state.placed.len(),
            state.deck.cards.len()
        ));
    }
}

/// Accepted placements ride out as a custom event; the host page forwards
/// them to wherever placements live. Dispatch is queued as a microtask so
/// the event fires only after the calling handler has released its borrow
/// of the state; listeners are free to call straight back into this
/// module, e.g. `refresh_from_dom`.
fn dispatch_intent(state: &State, intent: &Intent) {
    let Ok(detail) = serde_json::to_string(intent) else {
        return;
    };
    let canvas = state.canvas.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let init = CustomEventInit::new();
        init.set_detail(&JsValue::from_str(&detail));
        init.set_bubbles(true);
        if let Ok(event) = CustomEvent::new_with_event_init_dict("timeboard:intent", &init) {
            let _ = canvas.dispatch_event(&event);
        }
    });
}

fn update_scroll_velocity(s: &mut State, client_x: f64) {
    if s.scroller.is_none() {
        s.scroller = find_scroll_container(&s.document);
    }
    let Some(sc) = s.scroller.as_ref() else { return };
    let rect = sc.get_bounding_client_rect();
    let mut vx = timeboard_core::scroll::edge_velocity(client_x, rect.left(), rect.right());
    if vx < 0.0 && sc.scroll_left() <= 0 {
        vx = 0.0;
    }
    if vx > 0.0 && sc.scroll_left() >= sc.scroll_width() - sc.client_width() {
        vx = 0.0;
    }
    s.scroll_vx = vx;
}

fn start_animation(state: Rc<RefCell<State>>) {
    type RafClosure = Closure<dyn FnMut(f64)>;
    let f: Rc<RefCell<Option<RafClosure>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
        {
            let s = state.borrow();
            let vx = s.scroll_vx;
            if vx != 0.0
                && let Some(sc) = s.scroller.as_ref()
            {
                sc.set_scroll_left(sc.scroll_left() + vx as i32);
            }
        }
        let _ = web_sys::window()
            .unwrap()
            .request_animation_frame(f.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }) as Box<dyn FnMut(f64)>));
    let _ = web_sys::window()
        .unwrap()
        .request_animation_frame(g.borrow().as_ref().unwrap().as_ref().unchecked_ref());
}
