use serde::Serialize;

use crate::core::types::{AttributeKey, DatasetId, GeometryType};

/// A labelled service or reference URL attached to a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceLink {
    /// What the link points at (e.g. "Public Web Service", "REST")
    pub label: String,

    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl ServiceLink {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            format: None,
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// A described geospatial layer or table in the catalog
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    /// Stable identifier; datasets without one are listed but not indexed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<DatasetId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Object (feature class) name in the source geodatabase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objname: Option<String>,

    /// Owning office
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,

    #[serde(skip_serializing_if = "GeometryType::is_unknown")]
    pub geometry_type: GeometryType,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_frequency: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    /// Free-text projection, e.g. "NAD83 / EPSG:4269"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_standard: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ServiceLink>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Referenced attributes, in declaration order
    #[serde(rename = "attribute_ids")]
    pub attribute_keys: Vec<AttributeKey>,

    /// The record as it appeared in the source document
    #[serde(skip)]
    pub raw: serde_json::Value,
}

impl Dataset {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(DatasetId::new(id)),
            title: None,
            description: None,
            objname: None,
            owner: None,
            contact_email: None,
            geometry_type: GeometryType::Unknown,
            topics: Vec::new(),
            keywords: Vec::new(),
            status: None,
            access_level: None,
            update_frequency: None,
            last_updated: None,
            projection: None,
            metadata_standard: None,
            services: Vec::new(),
            notes: None,
            attribute_keys: Vec::new(),
            raw: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_topics(mut self, topics: &[&str]) -> Self {
        self.topics = topics.iter().map(|t| (*t).to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|k| (*k).to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_attribute_keys(mut self, keys: &[&str]) -> Self {
        self.attribute_keys = keys.iter().map(|k| AttributeKey::new(*k)).collect();
        self
    }

    /// Identifier as a plain string, if present
    #[must_use]
    pub fn id_str(&self) -> Option<&str> {
        self.id.as_ref().map(DatasetId::as_str)
    }

    /// Title, falling back to the identifier
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.id_str())
            .unwrap_or("(untitled dataset)")
    }

    /// True if the dataset references the given attribute
    #[must_use]
    pub fn references(&self, key: &AttributeKey) -> bool {
        self.attribute_keys.contains(key)
    }

    /// The record to quote in change requests: the source JSON when known
    #[must_use]
    pub fn source_json(&self) -> serde_json::Value {
        if self.raw.is_null() {
            serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
        } else {
            self.raw.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_id() {
        let dataset = Dataset::new("roads");
        assert_eq!(dataset.display_name(), "roads");

        let dataset = dataset.with_title("Roads");
        assert_eq!(dataset.display_name(), "Roads");

        let mut untitled = Dataset::new("x");
        untitled.id = None;
        assert_eq!(untitled.display_name(), "(untitled dataset)");
    }

    #[test]
    fn test_serialize_uses_attribute_ids() {
        let dataset = Dataset::new("A")
            .with_title("Roads")
            .with_attribute_keys(&["w"]);
        let json = serde_json::to_value(&dataset).unwrap();
        assert_eq!(json["id"], "A");
        assert_eq!(json["attribute_ids"][0], "w");
        assert!(json.get("geometry_type").is_none());
    }

    #[test]
    fn test_source_json_prefers_raw() {
        let mut dataset = Dataset::new("A");
        assert_eq!(dataset.source_json()["id"], "A");

        dataset.raw = serde_json::json!({"id": "A", "custom": 1});
        assert_eq!(dataset.source_json()["custom"], 1);
    }
}
