mod components;
mod coords;
mod data;
mod listener;
mod pages;
mod text_measure;

use dioxus::prelude::*;

const CSS: Asset = asset!("/assets/main.css");
const FAVICON: Asset = asset!("/assets/favicon.svg");

#[allow(non_snake_case)]
fn App() -> Element {
    use_context_provider(data::Bundle::load);

    rsx! {
        document::Link { rel: "icon", r#type: "image/svg+xml", href: FAVICON }
        document::Stylesheet { href: CSS }
        pages::home::Home {}
    }
}

fn main() {
    dioxus::logger::init(tracing::Level::INFO).ok();
    launch(App);
}
