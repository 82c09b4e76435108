use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// A window event listener that is removed again when dropped.
pub struct WindowListener {
    window: web_sys::Window,
    event: &'static str,
    handler: Closure<dyn Fn()>,
}

impl WindowListener {
    pub fn new(event: &'static str, callback: impl Fn() + 'static) -> Option<Self> {
        let window = web_sys::window()?;
        let handler = Closure::<dyn Fn()>::new(callback);
        window
            .add_event_listener_with_callback(event, handler.as_ref().unchecked_ref())
            .ok()?;
        Some(WindowListener {
            window,
            event,
            handler,
        })
    }
}

impl Drop for WindowListener {
    fn drop(&mut self) {
        self.window
            .remove_event_listener_with_callback(self.event, self.handler.as_ref().unchecked_ref())
            .ok();
        tracing::debug!(event = self.event, "Window listener removed");
    }
}

/// Current inner window size in CSS pixels.
pub fn window_size() -> Option<(f64, f64)> {
    let window = web_sys::window()?;
    let width = window.inner_width().ok()?.as_f64()?;
    let height = window.inner_height().ok()?.as_f64()?;
    Some((width, height))
}
