use serde::{Deserialize, Serialize};
use ustr::Ustr;

/// Catalog entry the plugin page pre-loads for client-side search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct IndicatorSummary {
    #[serde(default)]
    pub name: String,
    pub slug: Ustr,
    #[serde(default, alias = "sourceType")]
    pub source_type: Option<String>,
}

impl IndicatorSummary {
    pub fn new(name: impl Into<String>, slug: &str) -> Self {
        Self {
            name: name.into(),
            slug: ustr::ustr(slug),
            source_type: None,
        }
    }

    pub fn with_source_type(mut self, source_type: impl Into<String>) -> Self {
        self.source_type = Some(source_type.into());
        self
    }

    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.slug.as_str().to_lowercase().contains(needle)
            || self
                .source_type
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(needle))
    }

    /// Name for result lists, falling back to the slug.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.slug.as_str()
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct IndicatorCatalog {
    entries: Vec<IndicatorSummary>,
}

impl IndicatorCatalog {
    pub fn new(entries: Vec<IndicatorSummary>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[IndicatorSummary] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive substring match on name, slug and source type, in
    /// catalog order. Queries shorter than `min_len` characters match nothing.
    pub fn search(&self, query: &str, limit: usize, min_len: usize) -> Vec<&IndicatorSummary> {
        let needle = query.trim().to_lowercase();
        if needle.chars().count() < min_len {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|entry| entry.matches(&needle))
            .take(limit)
            .collect()
    }

    /// Load order for the initial indicator: the preferred slug first, then
    /// every catalog slug once.
    pub fn candidates(&self, preferred: Option<Ustr>) -> Vec<Ustr> {
        let mut slugs: Vec<Ustr> = preferred.into_iter().collect();
        for entry in &self.entries {
            if !slugs.contains(&entry.slug) {
                slugs.push(entry.slug);
            }
        }
        slugs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> IndicatorCatalog {
        IndicatorCatalog::new(vec![
            IndicatorSummary::new("US Gross Domestic Product", "us-gdp").with_source_type("FRED"),
            IndicatorSummary::new("Consumer Price Index", "cpi").with_source_type("fred"),
            IndicatorSummary::new("Unemployment Rate", "unrate").with_source_type("BLS"),
            IndicatorSummary::new("", "gdp-eu"),
        ])
    }

    #[test]
    fn test_search_fields_case_insensitive() {
        let catalog = catalog();
        let slugs: Vec<&str> = catalog
            .search("GDP", 20, 2)
            .iter()
            .map(|e| e.slug.as_str())
            .collect();
        assert_eq!(slugs, vec!["us-gdp", "gdp-eu"]);

        let by_source = catalog.search("fred", 20, 2);
        assert_eq!(by_source.len(), 2);
    }

    #[test]
    fn test_search_limit_and_min_len() {
        let catalog = catalog();
        assert!(catalog.search("u", 20, 2).is_empty());
        assert_eq!(catalog.search("un", 1, 2).len(), 1);
    }

    #[test]
    fn test_candidates_dedup() {
        let catalog = catalog();
        let candidates = catalog.candidates(Some(ustr::ustr("cpi")));
        let slugs: Vec<&str> = candidates.iter().map(|s| s.as_str()).collect();
        assert_eq!(slugs, vec!["cpi", "us-gdp", "unrate", "gdp-eu"]);
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(IndicatorSummary::new("", "gdp-eu").display_name(), "gdp-eu");
    }
}
