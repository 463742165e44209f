use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlCanvasElement, MouseEvent, Window};

use crate::constants::{HEADER_H, LANE_GAP, LANE_H, PAD_BOTTOM, PAD_TOP};
use crate::state::State;

/// Log a message to the browser console.
pub fn log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

/// Ensure the canvas backing store matches the CSS size and device pixel
/// ratio. The width follows the element; the height is derived from the
/// lane count so the board grows with its lanes. Drawing happens in CSS
/// pixels; the transform absorbs the ratio.
pub fn sync_canvas_size(state: &mut State) {
    let dpr = state.window.device_pixel_ratio();
    let rect = state.canvas.get_bounding_client_rect();
    let lanes = state.board.lanes().lane_count() as f64;
    let css_h = PAD_TOP + HEADER_H + lanes * (LANE_H + LANE_GAP) - LANE_GAP + PAD_BOTTOM;

    state.css_width = rect.width().floor().max(1.0);
    state.css_height = css_h.floor().max(1.0);
    let target_w = (state.css_width * dpr).floor().clamp(1.0, 10000.0) as u32;
    let target_h = (state.css_height * dpr).floor().clamp(1.0, 10000.0) as u32;
    if state.canvas.width() != target_w {
        state.canvas.set_width(target_w);
    }
    if state.canvas.height() != target_h {
        state.canvas.set_height(target_h);
    }
    let _ = state.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);

    let style = state.canvas.style();
    let _ = style.set_property("width", "100%");
    let _ = style.set_property("height", &format!("{}px", state.css_height));
}

/// Pointer position in CSS pixels relative to the canvas origin.
pub fn client_to_canvas(e: &MouseEvent, canvas: &HtmlCanvasElement) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    (
        e.client_x() as f64 - rect.left(),
        e.client_y() as f64 - rect.top(),
    )
}

/// Nearest horizontal scroll container for drag auto-scroll. An explicit
/// data attribute wins over the common overflow class.
pub fn find_scroll_container(document: &Document) -> Option<Element> {
    document
        .query_selector("[data-scroll-container='true']")
        .ok()
        .flatten()
        .or_else(|| document.query_selector(".overflow-x-auto").ok().flatten())
}

/// Build an absolute URL for an asset, taking into account the optional
/// `window.__BASE_URL` which is set by the host page.
pub fn asset_url(path: &str) -> String {
    let p = path.trim();
    if p.starts_with("http://") || p.starts_with("https://") || p.starts_with("data:") {
        return p.to_string();
    }
    let base = web_sys::window()
        .and_then(|w| {
            let v = js_sys::Reflect::get(&w, &JsValue::from_str("__BASE_URL")).ok()?;
            v.as_string()
        })
        .unwrap_or_else(|| "/".to_string());
    let base = if base.ends_with('/') {
        base
    } else {
        format!("{}/", base)
    };
    let p = p.trim_start_matches('/');
    format!("{}{}", base, p)
}

/// Fetch a text resource trying a list of fallback URLs in order.
pub async fn fetch_text_with_fallbacks(window: &Window, urls: &[&str]) -> Option<String> {
    for url in urls {
        let resp_value =
            match wasm_bindgen_futures::JsFuture::from(window.fetch_with_str(url)).await {
                Ok(v) => v,
                Err(_) => continue,
            };
        let resp: web_sys::Response = match resp_value.dyn_into() {
            Ok(r) => r,
            Err(_) => continue,
        };
        if !resp.ok() {
            continue;
        }
        if let Ok(text_promise) = resp.text()
            && let Ok(text_js) = wasm_bindgen_futures::JsFuture::from(text_promise).await
            && let Some(s) = text_js.as_string()
        {
            return Some(s);
        }
    }
    None
}

/// Simple query string parser used at start-up.
pub fn get_query_param(search: &str, key: &str) -> Option<String> {
    let s = search.trim_start_matches('?');
    for pair in s.split('&') {
        let mut it = pair.splitn(2, '=');
        let k = it.next()?;
        let v = it.next().unwrap_or("");
        if k == key {
            return Some(url_decode(v));
        }
    }
    None
}

fn url_decode(s: &str) -> String {
    let s = s.replace('+', " ");
    percent_encoding::percent_decode_str(&s)
        .decode_utf8_lossy()
        .to_string()
}
