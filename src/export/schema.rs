use crate::core::attribute::Attribute;
use crate::core::dataset::Dataset;
use crate::core::types::{AttributeType, GeometryType};
use crate::utils::validation::{validate_filename, ValidationError};

/// Geodatabase field type an attribute maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field_type: &'static str,
    pub length: Option<u32>,
}

impl FieldSpec {
    const TEXT_LENGTH: u32 = 255;

    const fn text() -> Self {
        Self {
            field_type: "TEXT",
            length: Some(Self::TEXT_LENGTH),
        }
    }

    const fn of(field_type: &'static str) -> Self {
        Self {
            field_type,
            length: None,
        }
    }

    /// Map an attribute type to its field type. Enumerations become LONG so
    /// a coded value domain can be attached later; anything unrecognized
    /// falls back to TEXT.
    #[must_use]
    pub fn for_type(attribute_type: &AttributeType) -> Self {
        match attribute_type {
            AttributeType::String => Self::text(),
            AttributeType::Integer | AttributeType::Enumerated => Self::of("LONG"),
            AttributeType::Float => Self::of("DOUBLE"),
            AttributeType::Boolean => Self::of("SHORT"),
            AttributeType::Date => Self::of("DATE"),
            AttributeType::Other(_) | AttributeType::Unknown => Self::text(),
        }
    }

    fn length_literal(&self) -> String {
        self.length
            .map_or_else(|| "None".to_string(), |length| length.to_string())
    }
}

/// EPSG code from a projection string such as `"NAD83 / EPSG:4269"`
#[must_use]
pub fn epsg_code(projection: &str) -> Option<&str> {
    let lower = projection.to_ascii_lowercase();
    lower.match_indices("epsg:").find_map(|(start, marker)| {
        let digits_start = start + marker.len();
        let digits_len = projection[digits_start..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        (digits_len > 0).then(|| &projection[digits_start..digits_start + digits_len])
    })
}

/// Name of the downloaded script, e.g. `blm_roads_schema_arcpy.py`
///
/// # Errors
///
/// Returns a `ValidationError` when the dataset id cannot form a safe name.
pub fn schema_filename(dataset: &Dataset) -> Result<String, ValidationError> {
    validate_filename(&format!(
        "{}_schema_arcpy.py",
        dataset.id_str().unwrap_or_default()
    ))
}

/// Build an ArcGIS Python (arcpy) script that creates a feature class with
/// one field per attribute, in the order given.
#[must_use]
pub fn build_schema_script(dataset: &Dataset, attributes: &[&Attribute]) -> String {
    let id = dataset.id_str().unwrap_or_default();
    let fc_name = dataset.objname.as_deref().unwrap_or(id);

    let mut lines: Vec<String> = vec![
        "# -*- coding: utf-8 -*-".into(),
        "# Auto-generated ArcGIS schema script from Public Lands Data Catalog".into(),
        format!("# Dataset ID: {id}"),
    ];
    if let Some(title) = &dataset.title {
        lines.push(format!("# Title: {title}"));
    }
    if let Some(description) = &dataset.description {
        lines.push(format!("# Description: {}", single_line(description)));
    }

    let geometry = if dataset.geometry_type.is_unknown() {
        GeometryType::Polygon
    } else {
        dataset.geometry_type
    };

    lines.extend([
        String::new(),
        "import arcpy".into(),
        String::new(),
        "# TODO: Update these paths and settings before running".into(),
        r#"gdb = r"C:\path\to\your.gdb""#.into(),
        format!("fc_name = \"{}\"", python_string(fc_name)),
        format!(
            "geometry_type = \"{}\"  # e.g. \"POINT\", \"POLYLINE\", \"POLYGON\"",
            geometry.as_str()
        ),
    ]);

    let projection = dataset.projection.as_deref().unwrap_or_default();
    match epsg_code(projection) {
        Some(code) => lines.push(format!(
            "spatial_reference = arcpy.SpatialReference({code})  # from {}",
            single_line(projection)
        )),
        None => lines.push(
            "spatial_reference = None  # TODO: set a spatial reference if desired".into(),
        ),
    }

    lines.extend(
        [
            "",
            "# Create the feature class",
            "out_fc = arcpy.management.CreateFeatureclass(",
            "    gdb,",
            "    fc_name,",
            "    geometry_type,",
            "    spatial_reference=spatial_reference",
            ")[0]",
            "",
            "# Define fields: (name, type, alias, length, domain)",
            "fields = [",
        ]
        .map(String::from),
    );

    let mut domain_blocks = Vec::new();
    for attribute in attributes {
        let name = attribute.key_str().unwrap_or_default();
        let alias = attribute.label.as_deref().unwrap_or_default();
        let field = FieldSpec::for_type(&attribute.attribute_type);

        lines.push(format!(
            "    (\"{}\", \"{}\", \"{}\", {}, None),",
            python_string(name),
            field.field_type,
            alias.replace('"', "\"\""),
            field.length_literal()
        ));

        let coded_values = attribute.coded_values();
        if !coded_values.is_empty() {
            let mut block = vec![format!("# Domain suggestion for {name} ({alias}):")];
            block.extend(coded_values.iter().map(|value| {
                format!(
                    "#   {} = {}  -  {}",
                    value.code_text(),
                    value.label_text(),
                    single_line(value.description_text())
                )
            }));
            domain_blocks.push(block.join("\n"));
        }
    }

    lines.extend(
        [
            "]",
            "",
            "# Add fields to the feature class",
            "for name, ftype, alias, length, domain in fields:",
            "    kwargs = {\"field_alias\": alias}",
            "    if length is not None and ftype == \"TEXT\":",
            "        kwargs[\"field_length\"] = length",
            "    if domain is not None and domain != \"None\":",
            "        kwargs[\"field_domain\"] = domain",
            "    arcpy.management.AddField(out_fc, name, ftype, **kwargs)",
            "",
        ]
        .map(String::from),
    );

    if !domain_blocks.is_empty() {
        let rule = "# ---------------------------------------------------------------------------";
        lines.push(rule.into());
        lines.push("# Suggested coded value domains for enumerated fields".into());
        lines.push("# You can use these comments to create geodatabase domains manually:".into());
        lines.push(rule.into());
        for block in domain_blocks {
            lines.push(block);
            lines.push(String::new());
        }
    }

    lines.join("\n")
}

/// Keep free text inside a comment line
fn single_line(text: &str) -> String {
    text.lines().map(str::trim).collect::<Vec<_>>().join(" ")
}

/// Escape a value placed inside a double-quoted Python string
fn python_string(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attribute::CodedValue;

    fn roads() -> Dataset {
        let mut dataset = Dataset::new("blm_roads")
            .with_title("BLM Roads")
            .with_description("Road centerlines");
        dataset.objname = Some("BLM_ROADS_LN".into());
        dataset.geometry_type = GeometryType::Polyline;
        dataset.projection = Some("NAD83 / EPSG:4269".into());
        dataset
    }

    #[test]
    fn test_field_mapping() {
        let cases = [
            (AttributeType::String, "TEXT", Some(255)),
            (AttributeType::Integer, "LONG", None),
            (AttributeType::Float, "DOUBLE", None),
            (AttributeType::Boolean, "SHORT", None),
            (AttributeType::Date, "DATE", None),
            (AttributeType::Enumerated, "LONG", None),
            (AttributeType::Other("geometry".into()), "TEXT", Some(255)),
            (AttributeType::Unknown, "TEXT", Some(255)),
        ];
        for (attribute_type, field_type, length) in cases {
            let field = FieldSpec::for_type(&attribute_type);
            assert_eq!(field.field_type, field_type, "{attribute_type}");
            assert_eq!(field.length, length, "{attribute_type}");
        }
    }

    #[test]
    fn test_epsg_code() {
        assert_eq!(epsg_code("NAD83 / EPSG:4269"), Some("4269"));
        assert_eq!(epsg_code("Web Mercator (epsg:3857)"), Some("3857"));
        assert_eq!(epsg_code("EPSG: 4326"), None);
        assert_eq!(epsg_code("EPSG:x EPSG:26912"), Some("26912"));
        assert_eq!(epsg_code("NAD83"), None);
        assert_eq!(epsg_code(""), None);
    }

    #[test]
    fn test_script_header_and_geometry() {
        let script = build_schema_script(&roads(), &[]);
        let lines: Vec<&str> = script.lines().collect();
        assert_eq!(lines[0], "# -*- coding: utf-8 -*-");
        assert_eq!(lines[2], "# Dataset ID: blm_roads");
        assert_eq!(lines[3], "# Title: BLM Roads");
        assert_eq!(lines[4], "# Description: Road centerlines");
        assert!(script.contains("fc_name = \"BLM_ROADS_LN\""));
        assert!(script.contains("geometry_type = \"POLYLINE\""));
        assert!(script.contains(
            "spatial_reference = arcpy.SpatialReference(4269)  # from NAD83 / EPSG:4269"
        ));
        assert!(script.contains(r#"gdb = r"C:\path\to\your.gdb""#));
        assert!(!script.contains("Suggested coded value domains"));
    }

    #[test]
    fn test_script_defaults() {
        let dataset = Dataset::new("bare");
        let script = build_schema_script(&dataset, &[]);
        assert!(script.contains("fc_name = \"bare\""));
        assert!(script.contains("geometry_type = \"POLYGON\""));
        assert!(script.contains("spatial_reference = None"));
        assert!(!script.contains("# Title:"));
    }

    #[test]
    fn test_script_fields_in_order() {
        let width = Attribute::new("road_width", AttributeType::Float).with_label("Width (ft)");
        let name = Attribute::new("route_id", AttributeType::String).with_label("Route \"ID\"");
        let script = build_schema_script(&roads(), &[&name, &width]);

        let name_line = "    (\"route_id\", \"TEXT\", \"Route \"\"ID\"\"\", 255, None),";
        let width_line = "    (\"road_width\", \"DOUBLE\", \"Width (ft)\", None, None),";
        let name_at = script.find(name_line).unwrap();
        let width_at = script.find(width_line).unwrap();
        assert!(name_at < width_at);
    }

    #[test]
    fn test_script_domain_comments() {
        let surface = Attribute::new("surface_type", AttributeType::Enumerated)
            .with_label("Surface")
            .with_values(vec![
                CodedValue::new(1, "Paved"),
                CodedValue {
                    description: Some("Crushed rock".into()),
                    ..CodedValue::new(2, "Gravel")
                },
            ]);
        let script = build_schema_script(&roads(), &[&surface]);

        assert!(script.contains("    (\"surface_type\", \"LONG\", \"Surface\", None, None),"));
        assert!(script.contains("# Suggested coded value domains for enumerated fields"));
        assert!(script.contains(
            "# Domain suggestion for surface_type (Surface):\n#   1 = Paved  -  \n#   2 = Gravel  -  Crushed rock"
        ));
    }

    #[test]
    fn test_schema_filename() {
        assert_eq!(
            schema_filename(&roads()).unwrap(),
            "blm_roads_schema_arcpy.py"
        );
        assert_eq!(
            schema_filename(&Dataset::new("fire zones!")).unwrap(),
            "fire zones_schema_arcpy.py"
        );
        assert!(schema_filename(&Dataset::new("../x")).is_err());
    }
}
