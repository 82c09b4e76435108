use std::cmp::Ordering;

use crate::interaction::SearchQuery;
use crate::models::{ContentDataset, ContentItem, TranslationTable};

/// Label used when a geometry id has no translation.
pub const UNKNOWN_REGION: &str = "Неизвестный регион";

/// A region resolved through the registry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionEntry<'a> {
    pub geometry_id: &'a str,
    pub name: &'a str,
    pub items: &'a [ContentItem],
}

/// One row of the companion list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionListing<'a> {
    pub name: &'a str,
    pub items: &'a [ContentItem],
}

#[derive(Debug, Clone, Default)]
pub struct RegionRegistry {
    translations: TranslationTable,
    content: ContentDataset,
    /// Distinct localized names in list order.
    names: Vec<String>,
}

impl RegionRegistry {
    pub fn new(translations: TranslationTable, content: ContentDataset) -> Self {
        let mut names: Vec<String> = translations.0.values().cloned().collect();
        names.sort_by(|a, b| compare_names(a, b));
        names.dedup();

        let orphaned = content
            .regions
            .keys()
            .filter(|name| !names.contains(name))
            .count();
        if orphaned > 0 {
            tracing::warn!(orphaned, "Content regions without a matching translation");
        }
        tracing::info!(
            regions = names.len(),
            translations = translations.len(),
            items = content.item_count(),
            "Region registry built"
        );

        RegionRegistry {
            translations,
            content,
            names,
        }
    }

    pub fn display_name<'a>(&'a self, geometry_id: &str) -> &'a str {
        match self.translations.get(geometry_id) {
            Some(name) => name,
            None => {
                tracing::debug!(geometry_id, "No translation for region");
                UNKNOWN_REGION
            }
        }
    }

    /// Items for a localized name, empty when the region has no content.
    pub fn items_for_name(&self, name: &str) -> &[ContentItem] {
        self.content
            .regions
            .get(name)
            .map(|r| r.recipes.as_slice())
            .unwrap_or(&[])
    }

    pub fn resolve<'a>(&'a self, geometry_id: &'a str) -> RegionEntry<'a> {
        let name = self.display_name(geometry_id);
        RegionEntry {
            geometry_id,
            name,
            items: self.items_for_name(name),
        }
    }

    /// Every region, sorted by localized name.
    pub fn listings(&self) -> Vec<RegionListing<'_>> {
        self.names
            .iter()
            .map(|name| RegionListing {
                name,
                items: self.items_for_name(name),
            })
            .collect()
    }

    /// Regions whose name contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<RegionListing<'_>> {
        let query = SearchQuery::new(query);
        self.listings()
            .into_iter()
            .filter(|l| query.matches(l.name))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Alphabetical order for Russian names: case-insensitive first, and `ё`
/// sorted right after `е` rather than before `а`.
fn compare_names(a: &str, b: &str) -> Ordering {
    fn key(s: &str) -> Vec<(char, u8)> {
        s.chars()
            .flat_map(char::to_lowercase)
            .map(|c| if c == 'ё' { ('е', 1) } else { (c, 0) })
            .collect()
    }
    key(a).cmp(&key(b)).then_with(|| a.cmp(b))
}
