use dioxus::prelude::*;
use recipe_map_shared::interaction::ListExpansion;
use recipe_map_shared::placement::PLACEHOLDER_TEXT;

use crate::data::Bundle;

const SEARCH_PLACEHOLDER: &str = "Поиск региона...";
const NO_RESULTS: &str = "Регионы не найдены";

/// Searchable list of every region with its full recipe list.
#[component]
pub fn RegionList() -> Element {
    let bundle = use_context::<Bundle>();
    let mut query = use_signal(String::new);
    let mut expansion = use_signal(ListExpansion::default);

    let rows = bundle.registry.search(&query.read());
    let expansion_state = expansion.read().clone();

    rsx! {
        section { class: "region-list",
            input {
                class: "region-search",
                r#type: "search",
                placeholder: SEARCH_PLACEHOLDER,
                value: "{query}",
                oninput: move |evt: Event<FormData>| {
                    query.set(evt.value().to_string());
                },
            }

            if rows.is_empty() {
                p { class: "region-list-empty", "{NO_RESULTS}" }
            }

            ul {
                for row in rows {
                    {
                        let name = row.name.to_string();
                        let open = expansion_state.is_open(&name);
                        let count = row.items.len();
                        let (row_class, chevron) = if open {
                            ("region-row open", "▲")
                        } else {
                            ("region-row", "▼")
                        };
                        let toggle_name = name.clone();
                        rsx! {
                            li {
                                key: "{name}",
                                class: "{row_class}",
                                button {
                                    class: "region-header",
                                    aria_expanded: "{open}",
                                    onclick: move |_| expansion.write().toggle(&toggle_name),
                                    span { class: "region-name", "{name}" }
                                    span { class: "region-count", "{count}" }
                                    span { class: "chevron", "{chevron}" }
                                }
                                if open {
                                    if row.items.is_empty() {
                                        p { class: "region-placeholder", "{PLACEHOLDER_TEXT}" }
                                    } else {
                                        ul { class: "region-items",
                                            for item in row.items.iter() {
                                                li { key: "{item.id}",
                                                    a {
                                                        href: "{item.url}",
                                                        target: "_blank",
                                                        rel: "noopener noreferrer",
                                                        "{item.title}"
                                                    }
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
