use std::rc::Rc;

use recipe_map_shared::geo::{dataset_bounds, parse_feature_collection, RegionFeature};
use recipe_map_shared::models::{ContentDataset, TranslationTable};
use recipe_map_shared::registry::RegionRegistry;
use serde::Deserialize;

const REGIONS_GEOJSON: &str = include_str!("../assets/data/regions.geojson");
const REGION_NAMES_JSON: &str = include_str!("../assets/data/region_names.json");
const RECIPES_JSON: &str = include_str!("../assets/data/recipes.json");
const TOP_RECIPES_JSON: &str = include_str!("../assets/data/top_recipes.json");

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopRecipe {
    pub name: String,
    pub url: String,
}

/// Static datasets shared through context.
#[derive(Clone)]
pub struct Bundle {
    pub features: Rc<Vec<RegionFeature>>,
    pub registry: Rc<RegionRegistry>,
    pub top_recipes: Rc<Vec<TopRecipe>>,
}

impl Bundle {
    /// Parse the bundled data. A broken file degrades to an empty dataset.
    pub fn load() -> Self {
        let features = or_empty("region geometry", parse_feature_collection(REGIONS_GEOJSON));
        let translations = or_empty("region names", TranslationTable::from_json(REGION_NAMES_JSON));
        let content = or_empty("recipes", ContentDataset::from_json(RECIPES_JSON));
        let top_recipes = or_empty("top recipes", parse_top_recipes(TOP_RECIPES_JSON));

        tracing::info!(
            features = features.len(),
            translations = translations.len(),
            recipes = content.item_count(),
            bounds = ?dataset_bounds(&features),
            "Loaded bundled data"
        );

        Bundle {
            features: Rc::new(features),
            registry: Rc::new(RegionRegistry::new(translations, content)),
            top_recipes: Rc::new(top_recipes),
        }
    }
}

pub fn parse_top_recipes(json: &str) -> Result<Vec<TopRecipe>, String> {
    serde_json::from_str(json).map_err(|e| format!("Failed to parse top recipes: {}", e))
}

fn or_empty<T: Default>(what: &str, result: Result<T, String>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(dataset = what, error = %e, "Using empty dataset");
            T::default()
        }
    }
}
