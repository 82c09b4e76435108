use dioxus::prelude::*;

use crate::components::map_view::Session;

/// On-screen zoom buttons, shown while touch gestures are enabled.
#[component]
pub fn ZoomControls(session: Signal<Session>) -> Element {
    let (can_in, can_out, zoomed) = {
        let s = session.read();
        let vp = s.viewport();
        (vp.can_zoom_in(), vp.can_zoom_out(), !vp.transform().is_identity())
    };

    rsx! {
        div { class: "zoom-controls",
            button {
                class: "zoom-btn",
                aria_label: "Увеличить карту",
                disabled: !can_in,
                onclick: move |_| {
                    session.write().zoom_in();
                },
                "+"
            }
            button {
                class: "zoom-btn",
                aria_label: "Уменьшить карту",
                disabled: !can_out,
                onclick: move |_| {
                    session.write().zoom_out();
                },
                "−"
            }
            button {
                class: "zoom-btn zoom-reset",
                aria_label: "Сбросить масштаб",
                disabled: !zoomed,
                onclick: move |_| {
                    session.write().reset_zoom();
                },
                "Сброс"
            }
        }
    }
}
