use std::path::Path;

const EMBEDDED_CATALOG: &str = "catalogs/sample_catalog.json";

fn main() {
    let catalog_path = Path::new(EMBEDDED_CATALOG);
    validate_catalog_file(catalog_path);
    set_build_dependencies();
}

fn validate_catalog_file(catalog_path: &Path) {
    assert!(
        catalog_path.exists(),
        "\n\nCATALOG BUILD ERROR: File not found\n\
         Path: {}\n\
         The embedded sample catalog must exist before building.\n",
        catalog_path.display()
    );

    let catalog_contents = std::fs::read_to_string(catalog_path).unwrap_or_else(|e| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            catalog_path.display()
        );
    });

    let catalog: serde_json::Value = serde_json::from_str(&catalog_contents).unwrap_or_else(|e| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Invalid JSON\n\
             Path: {}\n\
             Error: {e}\n\
             Hint: Check for missing commas, brackets, or invalid syntax.\n",
            catalog_path.display()
        );
    });

    validate_catalog_structure(&catalog);
}

fn validate_catalog_structure(catalog: &serde_json::Value) {
    assert!(
        catalog.is_object(),
        "\n\nCATALOG BUILD ERROR: Root must be a JSON object\n\
         The embedded catalog uses the normalized {{datasets, attributes}} layout.\n"
    );

    let datasets = catalog
        .get("datasets")
        .and_then(serde_json::Value::as_array)
        .unwrap_or_else(|| {
            panic!(
                "\n\nCATALOG BUILD ERROR: Missing or non-array 'datasets' field\n\
                 The catalog must have a top-level 'datasets' array.\n"
            );
        });

    let attributes = catalog
        .get("attributes")
        .and_then(serde_json::Value::as_array)
        .unwrap_or_else(|| {
            panic!(
                "\n\nCATALOG BUILD ERROR: Missing or non-array 'attributes' field\n\
                 The catalog must have a top-level 'attributes' array.\n"
            );
        });

    let attribute_ids = validate_attributes(attributes);
    validate_datasets(datasets, &attribute_ids);

    println!(
        "cargo:warning=Validated catalog: {} datasets, {} attributes",
        datasets.len(),
        attributes.len()
    );
}

fn validate_attributes(attributes: &[serde_json::Value]) -> Vec<&str> {
    let mut ids = Vec::with_capacity(attributes.len());

    for (i, attribute) in attributes.iter().enumerate() {
        let id = attribute
            .get("id")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_else(|| {
                panic!("\n\nCATALOG BUILD ERROR: Attribute at index {i} missing 'id' field\n")
            });

        assert!(
            !ids.contains(&id),
            "\n\nCATALOG BUILD ERROR: Duplicate attribute id '{id}' (index {i})\n"
        );

        if attribute.get("type").and_then(serde_json::Value::as_str) == Some("enumerated") {
            assert!(
                attribute.get("values").is_some_and(serde_json::Value::is_array),
                "\n\nCATALOG BUILD ERROR: Enumerated attribute '{id}' must have a 'values' array\n"
            );
        }

        ids.push(id);
    }

    ids
}

fn validate_datasets(datasets: &[serde_json::Value], attribute_ids: &[&str]) {
    let mut seen: Vec<&str> = Vec::with_capacity(datasets.len());

    for (i, dataset) in datasets.iter().enumerate() {
        let id = dataset
            .get("id")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_else(|| {
                panic!("\n\nCATALOG BUILD ERROR: Dataset at index {i} missing 'id' field\n")
            });

        assert!(
            !seen.contains(&id),
            "\n\nCATALOG BUILD ERROR: Duplicate dataset id '{id}' (index {i})\n"
        );
        seen.push(id);

        assert!(
            dataset.get("title").is_some(),
            "\n\nCATALOG BUILD ERROR: Dataset '{id}' (index {i}) missing 'title' field\n"
        );

        let refs = dataset
            .get("attribute_ids")
            .and_then(serde_json::Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for attr_ref in refs {
            let attr_id = attr_ref.as_str().unwrap_or("<non-string>");
            assert!(
                attribute_ids.contains(&attr_id),
                "\n\nCATALOG BUILD ERROR: Dataset '{id}' references unknown attribute '{attr_id}'\n"
            );
        }
    }
}

fn set_build_dependencies() {
    // Tell cargo to rerun if catalog changes
    println!("cargo:rerun-if-changed={EMBEDDED_CATALOG}");

    // Tell cargo to rerun if build.rs changes
    println!("cargo:rerun-if-changed=build.rs");
}
