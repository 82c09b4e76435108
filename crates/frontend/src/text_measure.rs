use std::cell::RefCell;
use std::collections::HashMap;

use recipe_map_shared::placement::{ApproxTextMeasure, Font, TextMeasure};
use wasm_bindgen::JsCast;
use web_sys::CanvasRenderingContext2d;

const CACHE_MAX_ENTRIES: usize = 512;

/// Measures text with an offscreen 2D canvas, so popup sizing matches the
/// fonts the browser actually renders.
pub struct CanvasTextMeasure {
    ctx: Option<CanvasRenderingContext2d>,
    cache: RefCell<HashMap<(String, String), f64>>,
}

impl CanvasTextMeasure {
    pub fn new() -> Self {
        let ctx = offscreen_context();
        if ctx.is_none() {
            tracing::warn!("No 2D canvas context, falling back to estimated text widths");
        }
        CanvasTextMeasure {
            ctx,
            cache: RefCell::new(HashMap::new()),
        }
    }
}

impl Default for CanvasTextMeasure {
    fn default() -> Self {
        CanvasTextMeasure::new()
    }
}

fn offscreen_context() -> Option<CanvasRenderingContext2d> {
    let document = web_sys::window()?.document()?;
    let canvas = document
        .create_element("canvas")
        .ok()?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .ok()?;
    canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
}

impl TextMeasure for CanvasTextMeasure {
    fn measure_text(&self, text: &str, font: &Font) -> f64 {
        let Some(ctx) = &self.ctx else {
            return ApproxTextMeasure.measure_text(text, font);
        };
        let css = font.css();
        let key = (text.to_string(), css);
        if let Some(&w) = self.cache.borrow().get(&key) {
            return w;
        }
        ctx.set_font(&key.1);
        let w = ctx
            .measure_text(text)
            .map(|m| m.width())
            .unwrap_or_else(|_| ApproxTextMeasure.measure_text(text, font));
        let mut cache = self.cache.borrow_mut();
        if cache.len() >= CACHE_MAX_ENTRIES {
            cache.clear();
        }
        cache.insert(key, w);
        w
    }
}
