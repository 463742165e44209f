use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, Window};

use timeboard_core::{Board, Deck, DragSession, Track};

use crate::constants::{PAD_LEFT, PAD_RIGHT};

/// Screen rectangle of a drawn block, cached at draw time for hit testing.
/// Coordinates are CSS pixels relative to the canvas origin.
#[derive(Clone, Copy, Debug)]
pub struct BlockRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub lane: usize,
}

impl BlockRect {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.w && y >= self.y && y <= self.y + self.h
    }
}

/// Global application state stored behind an `Rc<RefCell<_>>` so it can be
/// shared across the WASM callbacks.
pub struct State {
    pub window: Window,
    pub document: Document,
    pub canvas: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
    pub board: Board,
    pub deck: Deck,
    /// Ids currently on the board, in draw order (last is topmost).
    pub placed: Vec<String>,
    pub ticks: Vec<i64>,
    pub drag: Option<DragSession>,
    /// Last block grabbed; keyboard removal targets it.
    pub selected: Option<String>,
    pub rects: HashMap<String, BlockRect>,
    pub css_width: f64,
    pub css_height: f64,
    /// Nearest horizontal scroll container, found lazily on first drag.
    pub scroller: Option<Element>,
    pub scroll_vx: f64,
}

impl State {
    /// Horizontal pixel band the axis occupies at the current canvas width.
    pub fn track(&self) -> Track {
        Track {
            left: PAD_LEFT,
            width: (self.css_width - PAD_LEFT - PAD_RIGHT).max(1.0),
        }
    }
}

/// Thread local storage for the single runtime state instance.
thread_local! {
    pub static STATE: RefCell<Option<Rc<RefCell<State>>>> = const { RefCell::new(None) };
}
