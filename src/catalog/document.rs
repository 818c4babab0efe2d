//! Raw catalog documents and the adapter to canonical records.
//!
//! The top-level shape is checked once, here. Everything downstream sees the
//! same [`CatalogEntities`] whichever layout was loaded.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::catalog::store::CatalogError;
use crate::core::attribute::{Attribute, CodedValue};
use crate::core::dataset::{Dataset, ServiceLink};
use crate::core::types::{AttributeKey, AttributeType, CatalogShape, DatasetId, GeometryType};

/// A catalog document whose top-level structure has been validated
#[derive(Debug, Clone)]
pub enum CatalogDocument {
    /// `{ "datasets": [...], "attributes": [...] }`
    Normalized {
        datasets: Vec<Value>,
        attributes: Vec<Value>,
    },
    /// `[...]` or `{ "datasets": [...] }`, attributes embedded per dataset
    Embedded { datasets: Vec<Value> },
}

/// Canonical records produced from either document shape
#[derive(Debug, Clone)]
pub struct CatalogEntities {
    pub shape: CatalogShape,
    pub datasets: Vec<Dataset>,
    pub attributes: Vec<Attribute>,
}

impl CatalogDocument {
    /// Parse and shape-check a JSON document
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for invalid JSON and `CatalogError::Format`
    /// when the top-level structure matches neither layout.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Shape-check an already parsed document
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Format` when the top-level structure matches
    /// neither layout.
    pub fn from_value(value: Value) -> Result<Self, CatalogError> {
        match value {
            Value::Array(datasets) => Ok(Self::Embedded { datasets }),
            Value::Object(mut map) => {
                let datasets = match map.remove("datasets") {
                    Some(Value::Array(datasets)) => datasets,
                    Some(other) => {
                        return Err(CatalogError::Format(format!(
                            "'datasets' must be an array, found {}",
                            json_kind(&other)
                        )))
                    }
                    None => {
                        return Err(CatalogError::Format(
                            "expected a top-level array or an object with a 'datasets' array"
                                .to_string(),
                        ))
                    }
                };

                match map.remove("attributes") {
                    Some(Value::Array(attributes)) => Ok(Self::Normalized {
                        datasets,
                        attributes,
                    }),
                    Some(other) => Err(CatalogError::Format(format!(
                        "'attributes' must be an array, found {}",
                        json_kind(&other)
                    ))),
                    None => Ok(Self::Embedded { datasets }),
                }
            }
            other => Err(CatalogError::Format(format!(
                "expected a top-level array or object, found {}",
                json_kind(&other)
            ))),
        }
    }

    #[must_use]
    pub fn shape(&self) -> CatalogShape {
        match self {
            Self::Normalized { .. } => CatalogShape::Normalized,
            Self::Embedded { .. } => CatalogShape::Embedded,
        }
    }

    /// Convert raw records into canonical datasets and attributes
    ///
    /// Records that are not objects or have wrongly-typed fields are skipped
    /// with a warning; the conversion itself never fails.
    #[must_use]
    pub fn into_entities(self) -> CatalogEntities {
        match self {
            Self::Normalized {
                datasets,
                attributes,
            } => {
                let attributes = attributes
                    .into_iter()
                    .enumerate()
                    .filter_map(|(i, value)| {
                        parse_record::<RawAttribute>(value, "attribute", i)
                            .map(|(raw, source)| raw.into_attribute(source, CatalogShape::Normalized))
                    })
                    .collect();

                let datasets = datasets
                    .into_iter()
                    .enumerate()
                    .filter_map(|(i, value)| {
                        parse_record::<RawDataset>(value, "dataset", i).map(|(mut raw, source)| {
                            let keys = raw
                                .attribute_ids
                                .take()
                                .unwrap_or_default()
                                .into_iter()
                                .map(AttributeKey::new)
                                .collect();
                            raw.into_dataset(source, keys)
                        })
                    })
                    .collect();

                CatalogEntities {
                    shape: CatalogShape::Normalized,
                    datasets,
                    attributes,
                }
            }
            Self::Embedded { datasets } => merge_embedded(datasets),
        }
    }
}

/// Build canonical records from datasets that embed their attributes.
///
/// Attributes sharing a name collapse into one record. The first definition
/// supplies the descriptive fields; examples accumulate across datasets.
fn merge_embedded(raw_datasets: Vec<Value>) -> CatalogEntities {
    let mut attributes: Vec<Attribute> = Vec::new();
    let mut position: std::collections::HashMap<AttributeKey, usize> =
        std::collections::HashMap::new();
    let mut datasets = Vec::with_capacity(raw_datasets.len());

    for (i, value) in raw_datasets.into_iter().enumerate() {
        let Some((mut raw, source)) = parse_record::<RawDataset>(value, "dataset", i) else {
            continue;
        };

        let mut keys: Vec<AttributeKey> = Vec::new();
        for (j, attr_value) in raw.attributes.take().unwrap_or_default().into_iter().enumerate() {
            let Some((raw_attr, attr_source)) =
                parse_record::<RawAttribute>(attr_value, "embedded attribute", j)
            else {
                continue;
            };

            let incoming = raw_attr.into_attribute(attr_source, CatalogShape::Embedded);
            let Some(key) = incoming.key.clone() else {
                tracing::warn!(
                    "Skipping embedded attribute {j} of dataset {i}: missing 'name'"
                );
                continue;
            };

            match position.get(&key) {
                Some(&idx) => {
                    for example in incoming.examples {
                        attributes[idx].add_example(example);
                    }
                }
                None => {
                    position.insert(key.clone(), attributes.len());
                    attributes.push(incoming);
                }
            }

            // One reverse-index entry per dataset, however often it repeats a name
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        datasets.push(raw.into_dataset(source, keys));
    }

    tracing::debug!(
        "Merged embedded attributes: {} distinct across {} datasets",
        attributes.len(),
        datasets.len()
    );

    CatalogEntities {
        shape: CatalogShape::Embedded,
        datasets,
        attributes,
    }
}

fn parse_record<T: for<'de> Deserialize<'de>>(
    value: Value,
    kind: &str,
    index: usize,
) -> Option<(T, Value)> {
    if !value.is_object() {
        tracing::warn!(
            "Skipping {kind} at index {index}: expected an object, found {}",
            json_kind(&value)
        );
        return None;
    }
    match T::deserialize(&value) {
        Ok(raw) => Some((raw, value)),
        Err(e) => {
            tracing::warn!("Skipping {kind} at index {index}: {e}");
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Field deserializer that ignores a mistyped value instead of failing the record
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match T::deserialize(&value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            tracing::warn!("Ignoring field value {value}: {e}");
            Ok(None)
        }
    }
}

/// List deserializer that keeps the usable items.
///
/// A bare item where a list is expected counts as a one-item list.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let items = match value {
        Value::Null => return Ok(None),
        Value::Array(items) => items,
        single => vec![single],
    };
    let kept = items
        .into_iter()
        .filter_map(|item| match T::deserialize(&item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Ignoring list item {item}: {e}");
                None
            }
        })
        .collect();
    Ok(Some(kept))
}

#[derive(Debug, Deserialize)]
struct RawDistribution {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    format: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawServiceLink {
    label: String,
    url: String,
    #[serde(default, deserialize_with = "lenient")]
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    #[serde(default, deserialize_with = "lenient")]
    standard: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    xml_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDataset {
    #[serde(default, deserialize_with = "lenient")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    objname: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    owner: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    office_owner: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    contact_email: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    geometry_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    topics: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list")]
    keywords: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    access_level: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    update_frequency: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    last_updated: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    projection: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    public_web_service: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    internal_web_service: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    data_standard: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    distribution: Option<Vec<RawDistribution>>,
    #[serde(default, deserialize_with = "lenient")]
    metadata: Option<RawMetadata>,
    #[serde(default, deserialize_with = "lenient")]
    metadata_standard: Option<String>,
    /// Already-collected links, as written by the normalized export
    #[serde(default, deserialize_with = "lenient_list")]
    services: Option<Vec<RawServiceLink>>,
    #[serde(default, deserialize_with = "lenient")]
    notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    attribute_ids: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list")]
    attributes: Option<Vec<Value>>,
}

impl RawDataset {
    fn into_dataset(self, raw: Value, attribute_keys: Vec<AttributeKey>) -> Dataset {
        let mut services = Vec::new();
        let labelled = [
            ("Public Web Service", self.public_web_service),
            ("Internal Web Service", self.internal_web_service),
            ("Data Standard", self.data_standard),
        ];
        for (label, url) in labelled {
            if let Some(url) = url.filter(|u| !u.is_empty()) {
                services.push(ServiceLink::new(label, url));
            }
        }
        for dist in self.distribution.unwrap_or_default() {
            if let Some(url) = dist.url.filter(|u| !u.is_empty()) {
                let label = dist.kind.unwrap_or_else(|| "Download".to_string());
                let mut link = ServiceLink::new(label, url);
                if let Some(format) = dist.format {
                    link = link.with_format(format);
                }
                services.push(link);
            }
        }

        let (metadata_standard, metadata_url) = match self.metadata {
            Some(meta) => (meta.standard, meta.xml_url),
            None => (None, None),
        };
        if let Some(url) = metadata_url.filter(|u| !u.is_empty()) {
            services.push(ServiceLink::new("Metadata XML", url).with_format("XML"));
        }
        for link in self.services.unwrap_or_default() {
            services.push(ServiceLink {
                label: link.label,
                url: link.url,
                format: link.format,
            });
        }

        Dataset {
            id: self.id.filter(|id| !id.is_empty()).map(DatasetId::new),
            title: self.title,
            description: self.description,
            objname: self.objname,
            owner: self.owner.or(self.office_owner),
            contact_email: self.contact_email,
            geometry_type: self
                .geometry_type
                .as_deref()
                .map_or(GeometryType::Unknown, GeometryType::parse),
            topics: self.topics.unwrap_or_default(),
            keywords: self.keywords.unwrap_or_default(),
            status: self.status,
            access_level: self.access_level,
            update_frequency: self.update_frequency,
            last_updated: self.last_updated,
            projection: self.projection,
            metadata_standard: metadata_standard.or(self.metadata_standard),
            services,
            notes: self.notes,
            attribute_keys,
            raw,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCodedValue {
    code: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    label: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAttribute {
    #[serde(default, deserialize_with = "lenient")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    label: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    nullable: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    description: Option<String>,
    example: Option<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    examples: Option<Vec<Value>>,
    values: Option<Value>,
}

impl RawAttribute {
    fn into_attribute(self, raw: Value, shape: CatalogShape) -> Attribute {
        let key = match shape {
            CatalogShape::Normalized => self.id.or(self.name),
            CatalogShape::Embedded => self.name.or(self.id),
        }
        .filter(|k| !k.is_empty())
        .map(AttributeKey::new);

        let attribute_type = self
            .kind
            .as_deref()
            .map_or(AttributeType::Unknown, AttributeType::parse);

        let values = if attribute_type == AttributeType::Enumerated {
            coded_values(self.values)
        } else {
            Vec::new()
        };

        let mut attribute = Attribute {
            key,
            label: self.label,
            attribute_type,
            nullable: self.nullable.unwrap_or(false),
            description: self.description,
            examples: Vec::new(),
            values,
            raw,
        };
        if let Some(example) = self.example {
            attribute.add_example(example);
        }
        for example in self.examples.unwrap_or_default() {
            attribute.add_example(example);
        }
        attribute
    }
}

/// Coded values from a `values` field; anything but an array yields none
fn coded_values(values: Option<Value>) -> Vec<CodedValue> {
    let Some(Value::Array(items)) = values else {
        return Vec::new();
    };
    items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match RawCodedValue::deserialize(&item) {
            Ok(raw) => Some(raw),
            Err(e) => {
                tracing::warn!("Skipping coded value at index {i}: {e}");
                None
            }
        })
        .map(|raw| CodedValue {
            code: raw.code.filter(|c| !c.is_null()),
            label: raw.label,
            description: raw.description,
        })
        .collect()
}
