use std::rc::Rc;

use dioxus::html::geometry::WheelDelta;
use dioxus::html::input_data::MouseButton;
use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use recipe_map_shared::canvas::SvgCanvas;
use recipe_map_shared::session::MapSession;
use recipe_map_shared::viewport::point_distance;

use crate::components::zoom_controls::ZoomControls;
use crate::coords;
use crate::data::Bundle;
use crate::listener::{window_size, WindowListener};
use crate::text_measure::CanvasTextMeasure;

pub type Session = MapSession<SvgCanvas<CanvasTextMeasure>>;

const MAP_CONTAINER_ID: &str = "recipe-map-container";

/// Mouse movement below this many pixels is treated as a click.
const DRAG_THRESHOLD: f64 = 3.0;

/// Touch drag threshold, larger than the mouse one since touch is less precise.
const TOUCH_DRAG_THRESHOLD: f64 = 8.0;

/// How long a tapped region stays highlighted on touch devices.
const TAP_FLASH_MS: u32 = 200;

const FALLBACK_WINDOW: (f64, f64) = (1280.0, 800.0);

/// Convert a wheel delta (pixels / lines / pages) to a uniform pixel-like value.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

/// Client coordinates to map-surface coordinates for the current session.
fn to_surface(session: &Signal<Session>, client: (f64, f64)) -> Option<(f64, f64)> {
    let surface_w = session.peek().viewport().area().width;
    coords::client_to_map(client.0, client.1, MAP_CONTAINER_ID, surface_w)
}

fn open_link(url: &str) {
    let opened = web_sys::window().and_then(|w| w.open_with_url_and_target(url, "_blank").ok());
    if opened.is_none() {
        tracing::warn!(url, "Could not open recipe link");
    }
}

#[component]
pub fn MapView() -> Element {
    let bundle = use_context::<Bundle>();

    let mut session = use_signal(move || {
        let (w, h) = window_size().unwrap_or(FALLBACK_WINDOW);
        Session::new(
            (*bundle.registry).clone(),
            (*bundle.features).clone(),
            SvgCanvas::new(CanvasTextMeasure::new()),
            w,
            h,
        )
    });

    // Re-project on window resize; the listener is removed with the component.
    use_hook(move || {
        Rc::new(WindowListener::new("resize", move || {
            let Some((w, h)) = window_size() else { return };
            let mut session = session;
            let outcome = session.write().resize(w, h);
            if outcome.class_changed {
                tracing::info!(width = w, class = ?session.peek().device_class(), "Device class changed");
            }
        }))
    });

    // Drag state (mouse)
    let mut is_dragging = use_signal(|| false);
    let mut did_drag = use_signal(|| false);
    let mut drag_start = use_signal(|| (0.0_f64, 0.0_f64));

    // Touch state
    let mut touch_start_pos = use_signal(|| None::<(f64, f64)>);
    let mut touch_did_pan = use_signal(|| false);
    let mut is_pinching = use_signal(|| false);

    let svg_html = use_memo(move || session.read().render_svg());

    let (area_height, gestures, gesturing) = {
        let s = session.read();
        (
            s.viewport().area().height,
            s.viewport().gestures_enabled(),
            s.is_gesturing(),
        )
    };
    let dragging = *is_dragging.read() && *did_drag.read();
    let container_class = if dragging || gesturing {
        "map-container dragging"
    } else if gestures {
        "map-container touch"
    } else {
        "map-container"
    };

    rsx! {
        div {
            class: "map-wrapper",

            div {
                id: MAP_CONTAINER_ID,
                class: "{container_class}",
                style: "min-height: {area_height}px;",
                dangerous_inner_html: "{svg_html}",

                onwheel: move |evt: Event<WheelData>| {
                    if !session.peek().viewport().gestures_enabled() {
                        return;
                    }
                    evt.prevent_default();
                    let delta_y = wheel_delta_y(evt.data().delta());
                    let client = evt.data().client_coordinates();
                    if let Some(point) = to_surface(&session, (client.x, client.y)) {
                        session.write().wheel_zoom(point, delta_y);
                    }
                },

                onmousedown: move |evt: Event<MouseData>| {
                    // Only track drag/click for left mouse button
                    if evt.trigger_button() != Some(MouseButton::Primary) {
                        return;
                    }
                    let client = evt.client_coordinates();
                    is_dragging.set(true);
                    did_drag.set(false);
                    drag_start.set((client.x, client.y));
                    if let Some(point) = to_surface(&session, (client.x, client.y)) {
                        session.write().begin_pan(point);
                    }
                },

                onmousemove: move |evt: Event<MouseData>| {
                    let client = evt.client_coordinates();
                    let Some(point) = to_surface(&session, (client.x, client.y)) else { return };

                    if !*is_dragging.read() {
                        let changed = {
                            let s = session.peek();
                            s.region_at(point) != s.hovered()
                        };
                        if changed {
                            session.write().hover_at(point);
                        }
                        return;
                    }

                    let start = *drag_start.read();
                    let dx = client.x - start.0;
                    let dy = client.y - start.1;
                    if !*did_drag.read() && (dx.abs() > DRAG_THRESHOLD || dy.abs() > DRAG_THRESHOLD) {
                        did_drag.set(true);
                    }
                    if *did_drag.read() {
                        session.write().update_pan(point);
                    }
                },

                onmouseup: move |evt: Event<MouseData>| {
                    let was_dragging = *is_dragging.read();
                    let was_drag = *did_drag.read();
                    is_dragging.set(false);
                    session.write().end_gesture();

                    // A mouseup without drag movement = a click
                    if was_dragging && !was_drag {
                        let client = evt.client_coordinates();
                        if let Some(point) = to_surface(&session, (client.x, client.y)) {
                            session.write().click_at(point);
                        }
                    }
                },

                onmouseleave: move |_| {
                    is_dragging.set(false);
                    let mut s = session.write();
                    s.end_gesture();
                    s.pointer_leave();
                },

                // --- Touch event handlers ---

                ontouchstart: move |evt: Event<TouchData>| {
                    evt.prevent_default();
                    let touches = evt.data().touches();
                    if touches.len() == 1 {
                        // Single finger: record start position for tap detection and panning
                        let t = &touches[0];
                        let client = (t.client_coordinates().x, t.client_coordinates().y);
                        touch_start_pos.set(Some(client));
                        touch_did_pan.set(false);
                        if let Some(point) = to_surface(&session, client) {
                            session.write().begin_pan(point);
                        }
                    } else if touches.len() >= 2 {
                        // Two fingers: start pinch-to-zoom
                        let t0 = &touches[0];
                        let t1 = &touches[1];
                        let c0 = (t0.client_coordinates().x, t0.client_coordinates().y);
                        let c1 = (t1.client_coordinates().x, t1.client_coordinates().y);
                        if let (Some(p0), Some(p1)) = (to_surface(&session, c0), to_surface(&session, c1)) {
                            session.write().begin_pinch(p0, p1);
                        }
                        is_pinching.set(true);
                        // Cancel any tap tracking
                        touch_start_pos.set(None);
                        touch_did_pan.set(true);
                    }
                },

                ontouchmove: move |evt: Event<TouchData>| {
                    evt.prevent_default();
                    let touches = evt.data().touches();

                    if *is_pinching.read() && touches.len() >= 2 {
                        let t0 = &touches[0];
                        let t1 = &touches[1];
                        let c0 = (t0.client_coordinates().x, t0.client_coordinates().y);
                        let c1 = (t1.client_coordinates().x, t1.client_coordinates().y);
                        if let (Some(p0), Some(p1)) = (to_surface(&session, c0), to_surface(&session, c1)) {
                            session.write().update_pinch(p0, p1);
                        }
                    } else if touches.len() == 1 && !*is_pinching.read() {
                        let t = &touches[0];
                        let cur = (t.client_coordinates().x, t.client_coordinates().y);
                        if let Some(start) = *touch_start_pos.read() {
                            if !*touch_did_pan.read() && point_distance(start, cur) > TOUCH_DRAG_THRESHOLD {
                                touch_did_pan.set(true);
                            }
                        }
                        if *touch_did_pan.read() {
                            if let Some(point) = to_surface(&session, cur) {
                                session.write().update_pan(point);
                            }
                        }
                    }
                },

                ontouchend: move |evt: Event<TouchData>| {
                    evt.prevent_default();
                    let remaining = evt.data().touches().len();

                    if *is_pinching.read() {
                        // Wait for all fingers to lift before resetting pinch state
                        if remaining == 0 {
                            is_pinching.set(false);
                            touch_start_pos.set(None);
                            session.write().end_gesture();
                        }
                        return;
                    }

                    if remaining > 0 {
                        return;
                    }
                    session.write().end_gesture();

                    // Single-finger tap: no pan occurred and all fingers are up
                    let tap = if *touch_did_pan.read() { None } else { *touch_start_pos.read() };
                    touch_start_pos.set(None);
                    let Some(point) = tap.and_then(|start| to_surface(&session, start)) else { return };

                    // preventDefault above swallows the synthetic click, so links open here
                    let link = session.peek().link_at(point);
                    if let Some(url) = link {
                        open_link(&url);
                        return;
                    }

                    let flashed = session.write().tap_at(point);
                    if flashed.is_some() {
                        spawn(async move {
                            TimeoutFuture::new(TAP_FLASH_MS).await;
                            session.write().clear_flash();
                        });
                    }
                },

                ontouchcancel: move |_evt: Event<TouchData>| {
                    // Reset all touch state
                    touch_start_pos.set(None);
                    touch_did_pan.set(false);
                    is_pinching.set(false);
                    session.write().end_gesture();
                },
            }

            if gestures {
                ZoomControls { session }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_delta_pixels_pass_through() {
        let d = wheel_delta_y(WheelDelta::pixels(0.0, 12.5, 0.0));
        assert!((d - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_wheel_delta_lines_scaled() {
        let d = wheel_delta_y(WheelDelta::lines(0.0, -2.0, 0.0));
        assert!((d + 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_wheel_delta_pages_scaled() {
        let d = wheel_delta_y(WheelDelta::pages(0.0, 1.0, 0.0));
        assert!((d - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_wheel_delta_ignores_horizontal_scroll() {
        let d = wheel_delta_y(WheelDelta::pixels(30.0, 0.0, 0.0));
        assert!(d.abs() < 1e-9);
    }
}
