use serde::Serialize;

use crate::core::types::{AttributeKey, AttributeType};

/// One allowed value of an enumerated attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodedValue {
    /// Codes are usually integers but some catalogs use strings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CodedValue {
    pub fn new(code: impl Into<serde_json::Value>, label: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            label: Some(label.into()),
            description: None,
        }
    }

    /// Code rendered as text; strings are not quoted
    #[must_use]
    pub fn code_text(&self) -> String {
        self.code.as_ref().map(value_text).unwrap_or_default()
    }

    #[must_use]
    pub fn label_text(&self) -> &str {
        self.label.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

/// A field definition, shared by key across datasets
#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    #[serde(rename = "id", skip_serializing_if = "Option::is_none")]
    pub key: Option<AttributeKey>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(rename = "type")]
    pub attribute_type: AttributeType,

    pub nullable: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Distinct example values, in first-seen order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<serde_json::Value>,

    /// Coded values; only populated for enumerated attributes
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<CodedValue>,

    #[serde(skip)]
    pub raw: serde_json::Value,
}

impl Attribute {
    pub fn new(key: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            key: Some(AttributeKey::new(key)),
            label: None,
            attribute_type,
            nullable: false,
            description: None,
            examples: Vec::new(),
            values: Vec::new(),
            raw: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_values(mut self, values: Vec<CodedValue>) -> Self {
        self.values = values;
        self
    }

    #[must_use]
    pub fn key_str(&self) -> Option<&str> {
        self.key.as_ref().map(AttributeKey::as_str)
    }

    /// `key – label`, as shown in attribute lists
    #[must_use]
    pub fn display_name(&self) -> String {
        let key = self.key_str().unwrap_or("(unnamed attribute)");
        match self.label.as_deref() {
            Some(label) if !label.is_empty() => format!("{key} – {label}"),
            _ => key.to_string(),
        }
    }

    /// Coded values, empty unless the attribute is enumerated
    #[must_use]
    pub fn coded_values(&self) -> &[CodedValue] {
        if self.attribute_type == AttributeType::Enumerated {
            &self.values
        } else {
            &[]
        }
    }

    /// First example value as text
    #[must_use]
    pub fn example_text(&self) -> Option<String> {
        self.examples.first().map(value_text)
    }

    /// Record an example value unless an equal one was already seen
    pub fn add_example(&mut self, example: serde_json::Value) {
        if !example.is_null() && !self.examples.contains(&example) {
            self.examples.push(example);
        }
    }

    #[must_use]
    pub fn source_json(&self) -> serde_json::Value {
        if self.raw.is_null() {
            serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
        } else {
            self.raw.clone()
        }
    }
}

/// Render a JSON scalar the way it reads in the catalog
pub(crate) fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coded_values_only_for_enumerated() {
        let values = vec![CodedValue::new(1, "Open"), CodedValue::new(2, "Closed")];
        let enumerated =
            Attribute::new("status", AttributeType::Enumerated).with_values(values.clone());
        assert_eq!(enumerated.coded_values().len(), 2);
        assert_eq!(enumerated.coded_values()[0].label_text(), "Open");
        assert_eq!(enumerated.coded_values()[1].code_text(), "2");

        let plain = Attribute::new("status", AttributeType::String).with_values(values);
        assert!(plain.coded_values().is_empty());
    }

    #[test]
    fn test_add_example_deduplicates() {
        let mut attribute = Attribute::new("fuel_type", AttributeType::String);
        attribute.add_example(json!("grass"));
        attribute.add_example(json!("timber"));
        attribute.add_example(json!("grass"));
        attribute.add_example(serde_json::Value::Null);
        assert_eq!(attribute.examples, vec![json!("grass"), json!("timber")]);
        assert_eq!(attribute.example_text().as_deref(), Some("grass"));
    }

    #[test]
    fn test_display_name() {
        let attribute = Attribute::new("w", AttributeType::Float).with_label("Width");
        assert_eq!(attribute.display_name(), "w – Width");
        assert_eq!(
            Attribute::new("w", AttributeType::Float).display_name(),
            "w"
        );
    }

    #[test]
    fn test_string_codes_are_unquoted() {
        let value = CodedValue::new("A", "Active");
        assert_eq!(value.code_text(), "A");
    }
}
