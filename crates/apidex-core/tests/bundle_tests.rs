use std::path::PathBuf;

use apidex_core::error::BundleError;
use apidex_core::{DocumentLoader, ParserOptions, bundle, parse, parse_api_doc, parse_api_doc_with};
use serde_json::{Value, json};

/// Reads fixture files from disk.
struct FileLoader;

impl DocumentLoader for FileLoader {
    async fn load(&self, location: &str) -> Result<Value, BundleError> {
        let content = tokio::fs::read_to_string(location)
            .await
            .map_err(|e| BundleError::Load {
                location: location.to_string(),
                message: e.to_string(),
            })?;
        parse::value_from_str(&content).map_err(|e| BundleError::Load {
            location: location.to_string(),
            message: e.to_string(),
        })
    }
}

fn root_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/split/root.yaml")
}

fn root() -> Value {
    let content = std::fs::read_to_string(root_path()).unwrap();
    parse::value_from_str(&content).unwrap()
}

fn product() -> Value {
    json!({"sku": "SKU-1", "price": {"amount": 0.5, "currency": "EUR"}, "related": [{}]})
}

#[tokio::test]
async fn bundles_relative_file_references() {
    let base = root_path();
    let bundled = bundle(&root(), &FileLoader, base.to_str()).await.unwrap();

    let items = &bundled["paths"]["/products"]["get"]["responses"]["200"]["content"]["application/json"]
        ["schema"]["items"];
    assert_eq!(items["required"], json!(["sku"]));
    assert_eq!(items["properties"]["price"]["properties"]["currency"]["default"], json!("EUR"));
    // recursion through the external document is cut
    assert_eq!(items["properties"]["related"]["items"], json!({}));

    // internal references of the root stay for the resolver
    assert_eq!(
        bundled["components"]["schemas"]["Local"],
        json!({"$ref": "#/components/schemas/Other"})
    );
}

#[tokio::test]
async fn parses_bundled_split_document() {
    let base = root_path();
    let result = parse_api_doc_with(&root(), ParserOptions::default(), &FileLoader, base.to_str()).await;

    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(result.api_list.len(), 2);
    assert_eq!(result.api_list[0].res_example, Some(json!([product()])));
    assert_eq!(result.api_list[1].res_example, Some(product()));
}

#[tokio::test]
async fn unbundled_external_refs_degrade() {
    let result = parse_api_doc(&root(), ParserOptions::default()).await;

    assert_eq!(result.api_list.len(), 2);
    for record in &result.api_list {
        assert_eq!(record.res_example, Some(json!({})));
    }
    assert_eq!(result.diagnostics.len(), 3);
    assert!(result.diagnostics[0].message.starts_with("bundling failed"));
    assert!(result.diagnostics[0].path.is_none());
}

#[tokio::test]
async fn missing_external_file_is_a_diagnostic() {
    let doc = json!({
        "swagger": "2.0",
        "paths": {
            "/a": {"get": {"responses": {"200": {"description": "ok", "schema": {"$ref": "gone.json#/Thing"}}}}},
            "/b": {"get": {"responses": {"200": {"description": "ok", "schema": {"type": "integer"}}}}}
        }
    });
    let base = root_path();
    let result = parse_api_doc_with(&doc, ParserOptions::default(), &FileLoader, base.to_str()).await;

    assert_eq!(result.api_list.len(), 2);
    assert_eq!(result.api_list[1].res_example, Some(json!(0)));
    assert!(result.diagnostics[0].message.contains("gone.json"));
}
