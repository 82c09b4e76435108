use dioxus::prelude::*;

use crate::components::map_view::MapView;
use crate::components::region_list::RegionList;
use crate::components::top_recipes::TopRecipes;

#[component]
pub fn Home() -> Element {
    rsx! {
        main { class: "page",
            header { class: "page-header",
                h1 { "Карта рецептов России" }
                p { class: "page-subtitle",
                    "Нажмите на регион, чтобы увидеть его рецепты"
                }
            }
            TopRecipes {}
            MapView {}
            RegionList {}
        }
    }
}
