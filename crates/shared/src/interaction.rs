/// The region whose annotation is open, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationState {
    selected: Option<String>,
}

impl AnnotationState {
    /// Select a region, replacing any previous selection.
    /// Returns the replaced geometry id.
    pub fn select(&mut self, geometry_id: &str) -> Option<String> {
        self.selected.replace(geometry_id.to_string())
    }

    /// Returns whether an annotation was open.
    pub fn clear(&mut self) -> bool {
        self.selected.take().is_some()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }
}

/// Which companion-list row is expanded, keyed by localized name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListExpansion {
    open: Option<String>,
}

impl ListExpansion {
    /// Collapse `name` if it is open, otherwise open it and close the rest.
    pub fn toggle(&mut self, name: &str) {
        if self.is_open(name) {
            self.open = None;
        } else {
            self.open = Some(name.to_string());
        }
    }

    pub fn is_open(&self, name: &str) -> bool {
        self.open.as_deref() == Some(name)
    }

    pub fn open(&self) -> Option<&str> {
        self.open.as_deref()
    }
}

/// Search box contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn new(text: &str) -> Self {
        SearchQuery(text.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive substring match; the query is used verbatim.
    pub fn matches(&self, name: &str) -> bool {
        self.is_empty() || name.to_lowercase().contains(&self.0.to_lowercase())
    }
}
