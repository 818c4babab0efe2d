use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::catalog::document::{CatalogDocument, CatalogEntities};
use crate::catalog::index::CatalogIndex;
use crate::catalog::source::{CatalogFetch, CatalogSource, EMBEDDED_CATALOG};
use crate::core::attribute::Attribute;
use crate::core::dataset::Dataset;
use crate::core::types::{AttributeKey, CatalogShape, DatasetId};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to load catalog: server answered with status {status}")]
    Load { status: u16 },

    #[error("Failed to fetch catalog: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to read catalog: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unexpected catalog format: {0}")]
    Format(String),
}

/// A loaded, indexed catalog. Immutable once built.
#[derive(Debug)]
pub struct Catalog {
    shape: CatalogShape,

    /// All datasets, in document order
    datasets: Vec<Dataset>,

    /// All attributes, in document order (first-seen order when merged)
    attributes: Vec<Attribute>,

    index: CatalogIndex,
}

impl Catalog {
    /// Index canonical records
    #[must_use]
    pub fn from_entities(entities: CatalogEntities) -> Self {
        let index = CatalogIndex::build(&entities.datasets, &entities.attributes);
        Self {
            shape: entities.shape,
            datasets: entities.datasets,
            attributes: entities.attributes,
            index,
        }
    }

    #[must_use]
    pub fn from_document(document: CatalogDocument) -> Self {
        let shape = document.shape();
        tracing::debug!("Catalog document shape: {shape}");
        Self::from_entities(document.into_entities())
    }

    /// Parse, shape-check and index a catalog document
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or its top-level shape is
    /// not a recognized catalog layout. No partial catalog is built.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(Self::from_document(CatalogDocument::from_json(json)?))
    }

    /// Load the embedded sample catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded catalog cannot be parsed.
    pub fn load_embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    #[must_use]
    pub fn shape(&self) -> CatalogShape {
        self.shape
    }

    #[must_use]
    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Get a dataset by ID
    #[must_use]
    pub fn dataset(&self, id: &str) -> Option<&Dataset> {
        self.index
            .dataset_position(&DatasetId::new(id))
            .map(|idx| &self.datasets[idx])
    }

    /// Get an attribute by key (`id` or, for embedded catalogs, `name`)
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.index
            .attribute_position(&AttributeKey::new(key))
            .map(|idx| &self.attributes[idx])
    }

    /// Name-based lookup for catalogs that embed attributes per dataset
    #[must_use]
    pub fn attribute_by_name(&self, name: &str) -> Option<&Attribute> {
        self.attribute(name)
    }

    /// Attributes referenced by a dataset, in reference order.
    /// References to undefined attributes are dropped.
    #[must_use]
    pub fn attributes_for_dataset(&self, dataset: &Dataset) -> Vec<&Attribute> {
        dataset
            .attribute_keys
            .iter()
            .filter_map(|key| self.index.attribute_position(key))
            .map(|idx| &self.attributes[idx])
            .collect()
    }

    /// Datasets referencing an attribute, in dataset order
    #[must_use]
    pub fn datasets_for_attribute(&self, key: &str) -> Vec<&Dataset> {
        self.index
            .datasets_referencing(&AttributeKey::new(key))
            .iter()
            .map(|&idx| &self.datasets[idx])
            .collect()
    }

    /// Distinct topics across all datasets, in first-seen order
    #[must_use]
    pub fn topics(&self) -> Vec<&str> {
        let mut topics: Vec<&str> = Vec::new();
        for topic in self.datasets.iter().flat_map(|d| d.topics.iter()) {
            if !topics.contains(&topic.as_str()) {
                topics.push(topic.as_str());
            }
        }
        topics
    }

    /// Export in the normalized `{datasets, attributes}` layout
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_normalized_json(&self) -> Result<String, CatalogError> {
        #[derive(Serialize)]
        struct NormalizedExport<'a> {
            exported_at: String,
            source_shape: CatalogShape,
            datasets: &'a [Dataset],
            attributes: &'a [Attribute],
        }

        let export = NormalizedExport {
            exported_at: chrono::Utc::now().to_rfc3339(),
            source_shape: self.shape,
            datasets: &self.datasets,
            attributes: &self.attributes,
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    #[must_use]
    pub fn dataset_count(&self) -> usize {
        self.datasets.len()
    }

    #[must_use]
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }
}

/// Owns the catalog for the life of the application.
///
/// The document is fetched on the first successful `load` and cached; the
/// index is built as part of that load and never rebuilt. A failed load is
/// not cached, so the next call fetches again.
pub struct CatalogStore<F = CatalogSource> {
    fetcher: F,
    catalog: OnceCell<Arc<Catalog>>,
}

impl<F: CatalogFetch> CatalogStore<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            catalog: OnceCell::new(),
        }
    }

    /// Fetch, parse and index the catalog once; later calls return the cache
    ///
    /// # Errors
    ///
    /// Returns the fetch, parse or format error of this attempt.
    pub async fn load(&self) -> Result<Arc<Catalog>, CatalogError> {
        let catalog = self
            .catalog
            .get_or_try_init(|| async {
                tracing::info!("Loading catalog from {}", self.fetcher.describe());
                let text = self.fetcher.fetch().await?;
                let catalog = Catalog::from_json(&text)?;
                tracing::info!(
                    "Loaded {} catalog: {} datasets, {} attributes",
                    catalog.shape(),
                    catalog.dataset_count(),
                    catalog.attribute_count()
                );
                Ok::<_, CatalogError>(Arc::new(catalog))
            })
            .await?;
        Ok(Arc::clone(catalog))
    }

    /// The cached catalog, if a load has succeeded
    #[must_use]
    pub fn get(&self) -> Option<Arc<Catalog>> {
        self.catalog.get().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ROADS: &str = r#"{
        "datasets": [{"id": "A", "title": "Roads", "attribute_ids": ["w"]}],
        "attributes": [{"id": "w", "label": "Width", "type": "float"}]
    }"#;

    /// Serves a fixed document and counts fetches
    struct CountingFetcher {
        body: Result<&'static str, u16>,
        fetches: Arc<AtomicUsize>,
    }

    impl CatalogFetch for CountingFetcher {
        fn fetch(&self) -> impl Future<Output = Result<String, CatalogError>> + Send {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let body = self.body;
            async move {
                tokio::task::yield_now().await;
                body.map(str::to_string)
                    .map_err(|status| CatalogError::Load { status })
            }
        }

        fn describe(&self) -> String {
            "test fixture".to_string()
        }
    }

    fn counting(body: Result<&'static str, u16>) -> (CatalogStore<CountingFetcher>, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        let store = CatalogStore::new(CountingFetcher {
            body,
            fetches: Arc::clone(&fetches),
        });
        (store, fetches)
    }

    #[test]
    fn test_load_embedded_catalog() {
        let catalog = Catalog::load_embedded().unwrap();
        assert_eq!(catalog.shape(), CatalogShape::Normalized);
        assert!(catalog.dataset_count() > 0);
        assert!(catalog.attribute_count() > 0);
    }

    #[test]
    fn test_every_dataset_is_found_by_its_id() {
        let catalog = Catalog::load_embedded().unwrap();
        for dataset in catalog.datasets() {
            let id = dataset.id_str().unwrap();
            let found = catalog.dataset(id).unwrap();
            assert!(std::ptr::eq(found, dataset));
        }
    }

    #[test]
    fn test_references_are_bidirectional() {
        let catalog = Catalog::load_embedded().unwrap();
        for dataset in catalog.datasets() {
            for attribute in catalog.attributes_for_dataset(dataset) {
                let key = attribute.key_str().unwrap();
                let users = catalog.datasets_for_attribute(key);
                assert!(users.iter().any(|d| std::ptr::eq(*d, dataset)));
                for user in users {
                    assert!(user.references(attribute.key.as_ref().unwrap()));
                }
            }
        }
    }

    #[test]
    fn test_roads_scenario() {
        let catalog = Catalog::from_json(ROADS).unwrap();
        let dataset = catalog.dataset("A").unwrap();

        let attrs = catalog.attributes_for_dataset(dataset);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].key_str(), Some("w"));
        assert_eq!(attrs[0].label.as_deref(), Some("Width"));
        assert_eq!(attrs[0].attribute_type.as_str(), "float");

        let users = catalog.datasets_for_attribute("w");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id_str(), Some("A"));
    }

    #[test]
    fn test_unknown_ids_are_not_found() {
        let catalog = Catalog::from_json(ROADS).unwrap();
        assert!(catalog.dataset("missing").is_none());
        assert!(catalog.attribute("missing").is_none());
        assert!(catalog.datasets_for_attribute("missing").is_empty());
    }

    #[test]
    fn test_dangling_reference_is_dropped() {
        let catalog = Catalog::from_json(
            r#"{"datasets": [{"id": "A", "attribute_ids": ["w", "ghost"]}],
                "attributes": [{"id": "w"}]}"#,
        )
        .unwrap();
        let dataset = catalog.dataset("A").unwrap();
        assert_eq!(catalog.attributes_for_dataset(dataset).len(), 1);
        assert_eq!(catalog.datasets_for_attribute("ghost").len(), 1);
    }

    #[test]
    fn test_embedded_merge_scenario() {
        let catalog = Catalog::from_json(
            r#"[
                {"id": "d1", "title": "North", "attributes": [
                    {"name": "fuel_type", "type": "string", "example": "grass"}]},
                {"id": "d2", "title": "South", "attributes": [
                    {"name": "fuel_type", "type": "string", "example": "timber"}]}
            ]"#,
        )
        .unwrap();

        assert_eq!(catalog.shape(), CatalogShape::Embedded);
        assert_eq!(catalog.attribute_count(), 1);

        let fuel = catalog.attribute_by_name("fuel_type").unwrap();
        assert_eq!(fuel.examples.len(), 2);

        let ids: Vec<_> = catalog
            .datasets_for_attribute("fuel_type")
            .iter()
            .filter_map(|d| d.id_str())
            .collect();
        assert_eq!(ids, vec!["d1", "d2"]);
    }

    #[test]
    fn test_topics_first_seen_order() {
        let catalog = Catalog::from_json(
            r#"[{"id": "a", "topics": ["Fire", "Hazards"]},
                {"id": "b", "topics": ["Recreation", "Fire"]}]"#,
        )
        .unwrap();
        assert_eq!(catalog.topics(), vec!["Fire", "Hazards", "Recreation"]);
    }

    #[test]
    fn test_normalized_export_reloads() {
        let catalog = Catalog::from_json(
            r#"[{"id": "d1", "public_web_service": "https://example.org/s",
                 "attributes": [{"name": "x", "type": "enumerated",
                                 "values": [{"code": 1, "label": "One"}]}]}]"#,
        )
        .unwrap();
        let json = catalog.to_normalized_json().unwrap();
        assert!(json.contains("\"exported_at\""));

        let reloaded = Catalog::from_json(&json).unwrap();
        assert_eq!(reloaded.shape(), CatalogShape::Normalized);
        let dataset = reloaded.dataset("d1").unwrap();
        assert_eq!(dataset.services.len(), 1);
        let attrs = reloaded.attributes_for_dataset(dataset);
        assert_eq!(attrs[0].coded_values().len(), 1);
    }

    #[tokio::test]
    async fn test_load_fetches_once() {
        let (store, fetches) = counting(Ok(ROADS));
        assert!(store.get().is_none());

        let first = store.load().await.unwrap();
        let second = store.load().await.unwrap();

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(store.get().is_some());
    }

    #[tokio::test]
    async fn test_load_error_status() {
        let (store, fetches) = counting(Err(404));
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, CatalogError::Load { status: 404 }));
        assert!(store.get().is_none());

        // Failures are not cached
        let _ = store.load().await;
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_load_format_error_builds_nothing() {
        let (store, _) = counting(Ok(r#"{"layers": []}"#));
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, CatalogError::Format(_)));
        assert!(store.get().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_first_loads_share_one_fetch() {
        let (store, fetches) = counting(Ok(ROADS));

        let (first, second) = tokio::join!(store.load(), store.load());
        let (first, second) = (first.unwrap(), second.unwrap());

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_load_from_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, ROADS).unwrap();

        let store = CatalogStore::new(CatalogSource::File(path));
        let catalog = store.load().await.unwrap();
        assert!(catalog.dataset("A").is_some());
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::new(CatalogSource::File(dir.path().join("absent.json")));
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, CatalogError::Read(_)));
    }
}
