use dioxus::prelude::*;

use crate::data::Bundle;

const TOP_RECIPES_TITLE: &str = "Топ 10 рецептов в мае";

#[component]
pub fn TopRecipes() -> Element {
    let bundle = use_context::<Bundle>();
    if bundle.top_recipes.is_empty() {
        return rsx! {};
    }

    rsx! {
        section { class: "top-recipes",
            h2 { "{TOP_RECIPES_TITLE}" }
            ol {
                for recipe in bundle.top_recipes.iter() {
                    li { key: "{recipe.url}",
                        a {
                            href: "{recipe.url}",
                            target: "_blank",
                            rel: "noopener noreferrer",
                            "{recipe.name}"
                        }
                    }
                }
            }
        }
    }
}
