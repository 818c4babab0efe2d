use std::collections::HashMap;

use crate::core::attribute::Attribute;
use crate::core::dataset::Dataset;
use crate::core::types::{AttributeKey, DatasetId};

/// Lookup tables derived from a catalog's canonical records.
///
/// Entries hold positions into the catalog's dataset and attribute vectors.
/// Position lists are filled in dataset order, so iteration over them is
/// deterministic even though the outer maps are hashed.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    /// Dataset ID -> index in datasets vec
    dataset_by_id: HashMap<DatasetId, usize>,

    /// Attribute key -> index in attributes vec
    attribute_by_key: HashMap<AttributeKey, usize>,

    /// Attribute key -> indices of datasets referencing it
    datasets_by_attribute: HashMap<AttributeKey, Vec<usize>>,
}

impl CatalogIndex {
    /// Build all lookup tables in one pass over the records
    #[must_use]
    pub fn build(datasets: &[Dataset], attributes: &[Attribute]) -> Self {
        let mut index = Self::default();

        for (idx, attribute) in attributes.iter().enumerate() {
            let Some(key) = &attribute.key else {
                tracing::debug!("Attribute at index {idx} has no key; not indexed");
                continue;
            };
            if index.attribute_by_key.insert(key.clone(), idx).is_some() {
                tracing::warn!("Duplicate attribute key '{key}'; the later definition wins");
            }
        }

        for (idx, dataset) in datasets.iter().enumerate() {
            match &dataset.id {
                Some(id) => {
                    if index.dataset_by_id.insert(id.clone(), idx).is_some() {
                        tracing::warn!("Duplicate dataset id '{id}'; the later dataset wins");
                    }
                }
                None => tracing::debug!("Dataset at index {idx} has no id; not indexed"),
            }

            for key in &dataset.attribute_keys {
                index
                    .datasets_by_attribute
                    .entry(key.clone())
                    .or_default()
                    .push(idx);
            }
        }

        tracing::debug!(
            "Built catalog index: {} datasets, {} attributes, {} referenced keys",
            index.dataset_by_id.len(),
            index.attribute_by_key.len(),
            index.datasets_by_attribute.len()
        );

        index
    }

    #[must_use]
    pub fn dataset_position(&self, id: &DatasetId) -> Option<usize> {
        self.dataset_by_id.get(id).copied()
    }

    #[must_use]
    pub fn attribute_position(&self, key: &AttributeKey) -> Option<usize> {
        self.attribute_by_key.get(key).copied()
    }

    /// Positions of datasets referencing `key`, in dataset order
    #[must_use]
    pub fn datasets_referencing(&self, key: &AttributeKey) -> &[usize] {
        self.datasets_by_attribute
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
