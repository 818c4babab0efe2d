use crate::catalog::store::Catalog;
use crate::core::attribute::Attribute;
use crate::core::dataset::Dataset;

/// An entity that can be found by free-text search
pub trait Searchable {
    /// Text fields searched, in order; absent fields are skipped
    fn search_fields(&self) -> Vec<&str>;

    /// Topics for facet filtering
    fn topics(&self) -> &[String] {
        &[]
    }

    /// Lowercased, space-joined search text
    fn search_text(&self) -> String {
        self.search_fields()
            .into_iter()
            .filter(|field| !field.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

impl Searchable for Dataset {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = Vec::with_capacity(3 + self.topics.len() + self.keywords.len());
        fields.extend(self.id_str());
        fields.extend(self.title.as_deref());
        fields.extend(self.description.as_deref());
        fields.extend(self.topics.iter().map(String::as_str));
        fields.extend(self.keywords.iter().map(String::as_str));
        fields
    }

    fn topics(&self) -> &[String] {
        &self.topics
    }
}

impl Searchable for Attribute {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = Vec::with_capacity(3);
        fields.extend(self.key_str());
        fields.extend(self.label.as_deref());
        fields.extend(self.description.as_deref());
        fields
    }
}

/// Free-text query with an optional topic facet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Substring to look for; blank matches everything
    pub text: String,

    /// Exact topic the entity must carry
    pub topic: Option<String>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            topic: None,
        }
    }

    /// Restrict to a topic; an empty topic means no facet
    #[must_use]
    pub fn with_topic(mut self, topic: Option<impl Into<String>>) -> Self {
        self.topic = topic.map(Into::into).filter(|t: &String| !t.is_empty());
        self
    }

    /// The normalized needle: trimmed and lowercased
    fn needle(&self) -> String {
        self.text.trim().to_lowercase()
    }

    /// True if the query constrains nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.topic.is_none()
    }

    #[must_use]
    pub fn matches<T: Searchable + ?Sized>(&self, entity: &T) -> bool {
        self.matches_with_needle(entity, &self.needle())
    }

    fn matches_with_needle<T: Searchable + ?Sized>(&self, entity: &T, needle: &str) -> bool {
        if let Some(topic) = &self.topic {
            if !entity.topics().iter().any(|t| t == topic) {
                return false;
            }
        }
        needle.is_empty() || entity.search_text().contains(needle)
    }

    /// Matching entities in their original order
    #[must_use]
    pub fn filter<'a, T: Searchable>(&self, entities: &'a [T]) -> Vec<&'a T> {
        let needle = self.needle();
        entities
            .iter()
            .filter(|entity| self.matches_with_needle(*entity, &needle))
            .collect()
    }
}

/// Runs searches against a loaded catalog
pub struct QueryEngine<'a> {
    catalog: &'a Catalog,
}

impl<'a> QueryEngine<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    #[must_use]
    pub fn datasets(&self, query: &SearchQuery) -> Vec<&'a Dataset> {
        let results = query.filter(self.catalog.datasets());
        tracing::debug!(
            "Dataset query {:?} (topic {:?}): {} of {}",
            query.text,
            query.topic,
            results.len(),
            self.catalog.dataset_count()
        );
        results
    }

    #[must_use]
    pub fn attributes(&self, query: &SearchQuery) -> Vec<&'a Attribute> {
        let results = query.filter(self.catalog.attributes());
        tracing::debug!(
            "Attribute query {:?}: {} of {}",
            query.text,
            results.len(),
            self.catalog.attribute_count()
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AttributeType;

    fn datasets() -> Vec<Dataset> {
        vec![
            Dataset::new("fire_zones")
                .with_title("Wildfire Risk Zones")
                .with_topics(&["Fire", "Hazards"]),
            Dataset::new("roads")
                .with_title("Roads")
                .with_description("Road centerlines")
                .with_topics(&["Transportation"])
                .with_keywords(&["routes"]),
            Dataset::new("sites")
                .with_title("Recreation Sites")
                .with_topics(&["Recreation"])
                .with_keywords(&["campgrounds", "fire rings"]),
        ]
    }

    fn ids<'a>(results: &[&'a Dataset]) -> Vec<&'a str> {
        results.iter().filter_map(|d| d.id_str()).collect()
    }

    #[test]
    fn test_empty_query_returns_everything_in_order() {
        let all = datasets();
        for text in ["", "   ", "\t"] {
            let results = SearchQuery::new(text).filter(&all);
            assert_eq!(ids(&results), vec!["fire_zones", "roads", "sites"]);
        }
    }

    #[test]
    fn test_case_insensitive_substring() {
        let all = datasets();
        for query in ["wild", "WILD", "risk zones", "  Risk Zones "] {
            let results = SearchQuery::new(query).filter(&all);
            assert_eq!(ids(&results), vec!["fire_zones"], "query {query:?}");
        }
        assert!(SearchQuery::new("wildz").filter(&all).is_empty());
    }

    #[test]
    fn test_matches_keywords_topics_and_id() {
        let all = datasets();
        assert_eq!(ids(&SearchQuery::new("routes").filter(&all)), vec!["roads"]);
        assert_eq!(
            ids(&SearchQuery::new("recreation").filter(&all)),
            vec!["sites"]
        );
        assert_eq!(ids(&SearchQuery::new("fire_z").filter(&all)), vec!["fire_zones"]);
    }

    #[test]
    fn test_fields_are_joined_with_single_space() {
        let all = datasets();
        // "Road centerlines" followed by topic "Transportation"
        assert_eq!(
            ids(&SearchQuery::new("centerlines transportation").filter(&all)),
            vec!["roads"]
        );
    }

    #[test]
    fn test_filter_is_stable() {
        let all = datasets();
        // "fire" hits the first dataset's title/topic and the last one's keyword
        let results = SearchQuery::new("fire").filter(&all);
        assert_eq!(ids(&results), vec!["fire_zones", "sites"]);
    }

    #[test]
    fn test_topic_facet_and_text() {
        let all = datasets();
        let query = SearchQuery::new("").with_topic(Some("Recreation"));
        assert_eq!(ids(&query.filter(&all)), vec!["sites"]);

        let query = SearchQuery::new("fire").with_topic(Some("Recreation"));
        assert_eq!(ids(&query.filter(&all)), vec!["sites"]);

        let query = SearchQuery::new("roads").with_topic(Some("Recreation"));
        assert!(query.filter(&all).is_empty());

        // Facet is exact, not substring
        let query = SearchQuery::new("").with_topic(Some("Recreat"));
        assert!(query.filter(&all).is_empty());
    }

    #[test]
    fn test_empty_topic_is_no_facet() {
        let query = SearchQuery::new("").with_topic(Some(""));
        assert!(query.topic.is_none());
        assert!(query.is_empty());
        let query = SearchQuery::new("x").with_topic(None::<String>);
        assert!(!query.is_empty());
    }

    #[test]
    fn test_attribute_search() {
        let attributes = vec![
            Attribute::new("road_width", AttributeType::Float).with_label("Road Width"),
            Attribute::new("admin_unit", AttributeType::String)
                .with_description("Administering field office"),
        ];
        let results = SearchQuery::new("FIELD office").filter(&attributes);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key_str(), Some("admin_unit"));

        // Attributes carry no topics
        let results = SearchQuery::new("").with_topic(Some("Fire")).filter(&attributes);
        assert!(results.is_empty());
    }

    #[test]
    fn test_engine_over_catalog() {
        let catalog = Catalog::load_embedded().unwrap();
        let engine = QueryEngine::new(&catalog);
        let results = engine.datasets(&SearchQuery::new("wildfire"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id_str(), Some("wildfire_risk_zones"));

        let all = engine.attributes(&SearchQuery::default());
        assert_eq!(all.len(), catalog.attribute_count());
    }
}
