use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// A single linked recipe shown for a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    #[serde(rename = "name")]
    pub title: String,
    pub url: String,
}

impl ContentItem {
    /// Build an item whose id is derived from its title.
    pub fn new(title: &str, url: &str) -> Self {
        ContentItem {
            id: item_id(title),
            title: title.to_string(),
            url: url.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionItems {
    pub recipes: Vec<ContentItem>,
}

/// On-disk content dataset, keyed by localized region name.
///
/// Written by the data-preparation tool and bundled into the frontend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentDataset {
    pub regions: BTreeMap<String, RegionItems>,
}

impl ContentDataset {
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse content dataset: {}", e))
    }

    /// Append an item to a region's list, creating the region on first use.
    pub fn push(&mut self, region: &str, item: ContentItem) {
        self.regions
            .entry(region.to_string())
            .or_default()
            .recipes
            .push(item);
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn item_count(&self) -> usize {
        self.regions.values().map(|r| r.recipes.len()).sum()
    }
}

/// Flat geometry-id → localized-name table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct TranslationTable(pub HashMap<String, String>);

impl TranslationTable {
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse region translations: {}", e))
    }

    pub fn get(&self, geometry_id: &str) -> Option<&str> {
        self.0.get(geometry_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for TranslationTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        TranslationTable(iter.into_iter().collect())
    }
}

/// Stable, URL-safe id derived from an item title.
pub fn item_id(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_latin() {
        assert_eq!(item_id("Hello, World!"), "hello-world");
    }

    #[test]
    fn test_item_id_cyrillic_with_quotes() {
        assert_eq!(
            item_id("Салат «Лаззат» с хрустящими баклажанами"),
            "салат-лаззат-с-хрустящими-баклажанами"
        );
    }

    #[test]
    fn test_item_id_collapses_and_trims() {
        assert_eq!(item_id("  --Кекс   в кружке!! "), "кекс-в-кружке");
        assert_eq!(item_id("!!!"), "");
    }

    #[test]
    fn test_item_id_deterministic() {
        let a = item_id("Творожная запеканка (как в детском саду)");
        let b = item_id("Творожная запеканка (как в детском саду)");
        assert_eq!(a, b);
        assert_eq!(a, "творожная-запеканка-как-в-детском-саду");
    }

    #[test]
    fn test_content_dataset_json_shape() {
        let json = r#"{"regions":{"Адыгея":{"recipes":[{"id":"a","name":"Плов","url":"https://x/a"}]}}}"#;
        let ds = ContentDataset::from_json(json).unwrap();
        let items = &ds.regions["Адыгея"].recipes;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Плов");
        assert_eq!(items[0].url, "https://x/a");

        let out = serde_json::to_string(&ds).unwrap();
        assert!(out.contains(r#""name":"Плов""#));
    }

    #[test]
    fn test_content_dataset_push_preserves_order() {
        let mut ds = ContentDataset::default();
        ds.push("Тыва", ContentItem::new("Второе", "https://x/2"));
        ds.push("Тыва", ContentItem::new("Первое", "https://x/1"));
        ds.push("Коми", ContentItem::new("Шаньги", "https://x/3"));
        let titles: Vec<&str> = ds.regions["Тыва"]
            .recipes
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Второе", "Первое"]);
        assert_eq!(ds.region_count(), 2);
        assert_eq!(ds.item_count(), 3);
    }

    #[test]
    fn test_content_dataset_rejects_garbage() {
        assert!(ContentDataset::from_json("not json").is_err());
    }

    #[test]
    fn test_translation_table_lookup() {
        let t = TranslationTable::from_json(r#"{"Adygey":"Адыгея"}"#).unwrap();
        assert_eq!(t.get("Adygey"), Some("Адыгея"));
        assert_eq!(t.get("Nowhere"), None);
        assert_eq!(t.len(), 1);
    }
}
