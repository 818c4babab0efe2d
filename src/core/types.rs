use serde::{Deserialize, Serialize, Serializer};

/// Unique identifier for a dataset in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(pub String);

impl DatasetId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DatasetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of an attribute: its `id` in normalized catalogs, its `name` in
/// catalogs that embed attributes per dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeKey(pub String);

impl AttributeKey {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geometry of a dataset layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeometryType {
    Point,
    Multipoint,
    /// Also written as `LINE` in some catalogs
    Polyline,
    Polygon,
    Table,
    #[default]
    Unknown,
}

impl GeometryType {
    /// Parse a catalog geometry string, case-insensitively
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "POINT" => Self::Point,
            "MULTIPOINT" => Self::Multipoint,
            "POLYLINE" | "LINE" => Self::Polyline,
            "POLYGON" => Self::Polygon,
            "TABLE" => Self::Table,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Point => "POINT",
            Self::Multipoint => "MULTIPOINT",
            Self::Polyline => "POLYLINE",
            Self::Polygon => "POLYGON",
            Self::Table => "TABLE",
            Self::Unknown => "UNKNOWN",
        }
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        *self == Self::Unknown
    }

    /// Short glyph shown beside the geometry in list and detail views
    #[must_use]
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Point | Self::Multipoint => "•",
            Self::Polyline => "〰",
            Self::Polygon => "▰",
            Self::Table => "▦",
            Self::Unknown => " ",
        }
    }
}

impl std::fmt::Display for GeometryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for GeometryType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Declared type of an attribute
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AttributeType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Enumerated,
    /// Any other declared type, kept verbatim
    Other(String),
    #[default]
    Unknown,
}

impl AttributeType {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "string" => Self::String,
            "integer" => Self::Integer,
            "float" => Self::Float,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "enumerated" => Self::Enumerated,
            "" => Self::Unknown,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Enumerated => "enumerated",
            Self::Other(name) => name,
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for AttributeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Which of the two catalog document layouts was loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogShape {
    /// `{ datasets: [...], attributes: [...] }`, linked by `attribute_ids`
    Normalized,
    /// Datasets carry their own attribute records, merged by name
    Embedded,
}

impl std::fmt::Display for CatalogShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normalized => write!(f, "normalized"),
            Self::Embedded => write!(f, "embedded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_parse_is_case_insensitive() {
        assert_eq!(GeometryType::parse("polygon"), GeometryType::Polygon);
        assert_eq!(GeometryType::parse(" Point "), GeometryType::Point);
        assert_eq!(GeometryType::parse("LINE"), GeometryType::Polyline);
        assert_eq!(GeometryType::parse("raster"), GeometryType::Unknown);
        assert_eq!(GeometryType::parse(""), GeometryType::Unknown);
    }

    #[test]
    fn test_attribute_type_parse() {
        assert_eq!(AttributeType::parse("Enumerated"), AttributeType::Enumerated);
        assert_eq!(AttributeType::parse("float"), AttributeType::Float);
        assert_eq!(AttributeType::parse(""), AttributeType::Unknown);
        assert_eq!(
            AttributeType::parse("GUID"),
            AttributeType::Other("GUID".to_string())
        );
        assert_eq!(AttributeType::parse("GUID").as_str(), "GUID");
    }

    #[test]
    fn test_types_serialize_as_strings() {
        let json = serde_json::to_string(&GeometryType::Polyline).unwrap();
        assert_eq!(json, "\"POLYLINE\"");
        let json = serde_json::to_string(&AttributeType::Date).unwrap();
        assert_eq!(json, "\"date\"");
        let json = serde_json::to_string(&DatasetId::new("roads")).unwrap();
        assert_eq!(json, "\"roads\"");
    }
}
