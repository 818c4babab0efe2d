use crate::core::attribute::Attribute;
use crate::core::dataset::Dataset;

/// Default new-issue page for catalog change requests
pub const DEFAULT_ISSUE_BASE: &str =
    "https://github.com/AmateurProjects/Public-Lands-Data-Catalog/issues/new";

/// Builds prefilled "new issue" links asking for a change to one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueLinkBuilder {
    base: String,
}

impl Default for IssueLinkBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ISSUE_BASE)
    }
}

impl IssueLinkBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Change-request link for a dataset, carrying its source record
    #[must_use]
    pub fn for_dataset(&self, dataset: &Dataset) -> String {
        self.link(
            "Dataset",
            dataset.id_str().unwrap_or_default(),
            dataset.title.as_deref().unwrap_or_default(),
            &dataset.source_json(),
        )
    }

    /// Change-request link for an attribute, carrying its source record
    #[must_use]
    pub fn for_attribute(&self, attribute: &Attribute) -> String {
        self.link(
            "Attribute",
            attribute.key_str().unwrap_or_default(),
            attribute.label.as_deref().unwrap_or_default(),
            &attribute.source_json(),
        )
    }

    fn link(&self, kind: &str, id: &str, name: &str, record: &serde_json::Value) -> String {
        let title = format!("{kind} change request: {id}");
        let record = serde_json::to_string_pretty(record).unwrap_or_else(|_| record.to_string());
        let body = [
            format!(
                "Please describe the requested change for {} `{id}` (`{name}`).",
                kind.to_lowercase()
            ),
            String::new(),
            "---".into(),
            String::new(),
            format!("Current {} JSON:", kind.to_lowercase()),
            "```json".into(),
            record,
            "```".into(),
        ]
        .join("\n");

        format!(
            "{}?title={}&body={}",
            self.base,
            urlencoding::encode(&title),
            urlencoding::encode(&body)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AttributeType;

    fn query_param(link: &str, name: &str) -> String {
        let (_, query) = link.split_once('?').unwrap();
        let value = query
            .split('&')
            .find_map(|pair| pair.strip_prefix(&format!("{name}=")))
            .unwrap();
        urlencoding::decode(value).unwrap().into_owned()
    }

    #[test]
    fn test_dataset_link() {
        let dataset = Dataset::new("blm_roads").with_title("BLM Roads");
        let link = IssueLinkBuilder::default().for_dataset(&dataset);

        assert!(link.starts_with(DEFAULT_ISSUE_BASE));
        assert!(link.contains("?title=Dataset%20change%20request%3A%20blm_roads&body="));

        let body = query_param(&link, "body");
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(
            lines[0],
            "Please describe the requested change for dataset `blm_roads` (`BLM Roads`)."
        );
        assert_eq!(&lines[1..5], &["", "---", "", "Current dataset JSON:"]);
        assert_eq!(lines[5], "```json");
        assert_eq!(lines.last(), Some(&"```"));
        assert!(body.contains("  \"id\": \"blm_roads\""));
    }

    #[test]
    fn test_body_embeds_source_record() {
        let mut dataset = Dataset::new("x");
        dataset.raw = serde_json::json!({"id": "x", "custom_field": "kept & escaped"});
        let link = IssueLinkBuilder::new("https://example.org/new").for_dataset(&dataset);

        assert!(link.starts_with("https://example.org/new?title="));
        assert!(!link.contains(' '));
        assert!(!link[link.find("&body=").unwrap() + 6..].contains('&'));
        let body = query_param(&link, "body");
        assert!(body.contains("\"custom_field\": \"kept & escaped\""));
        // Untitled datasets leave the name empty
        assert!(body.starts_with("Please describe the requested change for dataset `x` (``)."));
    }

    #[test]
    fn test_attribute_link() {
        let attribute =
            Attribute::new("admin_unit", AttributeType::String).with_label("Administrative Unit");
        let link = IssueLinkBuilder::default().for_attribute(&attribute);

        assert_eq!(
            query_param(&link, "title"),
            "Attribute change request: admin_unit"
        );
        let body = query_param(&link, "body");
        assert!(body.starts_with(
            "Please describe the requested change for attribute `admin_unit` (`Administrative Unit`)."
        ));
        assert!(body.contains("Current attribute JSON:\n```json\n{"));
    }
}
