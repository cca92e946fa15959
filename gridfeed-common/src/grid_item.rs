/// Display data for one tile in a grid view.
///
/// Plain value type: a card compares its bound model against a new one to decide
/// whether it needs re-binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridItem {
    pub name: String,
    pub id: String,
    pub cover_art_id: String,
    /// Secondary labels (e.g. artist names), in display order
    pub secondary: Vec<String>,
    /// IDs matching `secondary` one-to-one
    pub secondary_ids: Vec<String>,
}

impl GridItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_cover_art(mut self, cover_art_id: impl Into<String>) -> Self {
        self.cover_art_id = cover_art_id.into();
        self
    }

    /// Append a secondary label and its ID.
    pub fn with_secondary(mut self, label: impl Into<String>, id: impl Into<String>) -> Self {
        self.secondary.push(label.into());
        self.secondary_ids.push(id.into());
        self
    }

    /// Secondary labels paired with their IDs. Extra labels without an ID are skipped.
    pub fn secondary_links(&self) -> impl Iterator<Item = (&str, &str)> {
        self.secondary
            .iter()
            .zip(self.secondary_ids.iter())
            .map(|(label, id)| (label.as_str(), id.as_str()))
    }
}
