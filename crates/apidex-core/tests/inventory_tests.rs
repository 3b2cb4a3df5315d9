use apidex_core::adapter::{Direction, RequestType};
use apidex_core::{ApiRecord, ParseResult, ParserOptions, parse_api_doc, parse_bundled};
use serde_json::{Value, json};

const PETSTORE: &str = include_str!("fixtures/petstore-swagger2.json");
const USERS: &str = include_str!("fixtures/users-openapi3.yaml");
const CYCLIC: &str = include_str!("fixtures/cyclic.json");

fn petstore() -> Value {
    serde_json::from_str(PETSTORE).unwrap()
}

fn users() -> Value {
    serde_yaml_ng::from_str(USERS).unwrap()
}

fn record<'a>(result: &'a ParseResult, path: &str, method: &str) -> &'a ApiRecord {
    result
        .api_list
        .iter()
        .find(|r| r.path == path && r.method == method)
        .unwrap_or_else(|| panic!("no record for {method} {path}"))
}

fn no_read_write_only() -> ParserOptions {
    ParserOptions {
        include_read_only: false,
        include_write_only: false,
        ..ParserOptions::default()
    }
}

#[tokio::test]
async fn swagger2_inventory() {
    let result = parse_api_doc(&petstore(), ParserOptions::default()).await;

    assert_eq!(result.api_info.title.as_deref(), Some("Swagger Petstore"));
    assert_eq!(result.api_info.version.as_deref(), Some("1.0.7"));

    let endpoints: Vec<(&str, &str)> = result
        .api_list
        .iter()
        .map(|r| (r.path.as_str(), r.method.as_str()))
        .collect();
    assert_eq!(
        endpoints,
        vec![
            ("/pets", "get"),
            ("/pets", "post"),
            ("/pets/findByStatus", "get"),
            ("/pets/{petId}/uploadImage", "post"),
            ("/store/inventory", "get"),
            ("/store/order/{orderId}", "get"),
        ]
    );

    let list = record(&result, "/pets", "get");
    assert_eq!(list.summary.as_deref(), Some("List pet names"));
    assert_eq!(list.req_type, None);
    assert_eq!(list.req_example, None);
    assert_eq!(list.res_example, Some(json!(["string"])));
}

#[tokio::test]
async fn swagger2_request_kinds() {
    let result = parse_api_doc(&petstore(), ParserOptions::default()).await;

    let add = record(&result, "/pets", "post");
    assert_eq!(add.summary.as_deref(), Some("Add a new pet to the store"));
    assert_eq!(add.req_type, Some(RequestType::Body));
    assert_eq!(
        add.req_example,
        Some(json!({
            "id": 0,
            "category": {"id": 0, "name": "string"},
            "name": "doggie",
            "photoUrls": ["http://example.com"],
            "tags": [{"id": 0, "name": "string"}],
            "status": "available"
        }))
    );

    let find = record(&result, "/pets/findByStatus", "get");
    assert_eq!(find.req_type, Some(RequestType::Query));
    assert_eq!(find.req_example, Some(json!({"status": ["available"]})));

    let upload = record(&result, "/pets/{petId}/uploadImage", "post");
    assert_eq!(upload.req_type, Some(RequestType::Form));
    assert_eq!(
        upload.req_example,
        Some(json!({"additionalMetadata": "string", "file": ""}))
    );
    assert_eq!(
        upload.res_example,
        Some(json!({"code": 0, "type": "string", "message": "string"}))
    );

    // path-level parameter, the operation declares none
    let inventory = record(&result, "/store/inventory", "get");
    assert_eq!(inventory.req_type, Some(RequestType::Header));
    assert_eq!(inventory.req_example, Some(json!({"api_key": "string"})));
    assert_eq!(inventory.res_example, Some(json!({"available": 0})));

    // path parameters alone produce no request example
    let order = record(&result, "/store/order/{orderId}", "get");
    assert_eq!(order.req_type, None);
    let order_example = order.res_example.as_ref().unwrap();
    assert_eq!(order_example["quantity"], json!(1));
    assert_eq!(order_example["complete"], json!(false));
    assert!(order_example["shipDate"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn missing_status_code_degrades() {
    let result = parse_api_doc(&petstore(), ParserOptions::default()).await;

    let add = record(&result, "/pets", "post");
    assert_eq!(add.res_example, Some(json!({})));

    assert_eq!(result.diagnostics.len(), 1);
    let diagnostic = &result.diagnostics[0];
    assert_eq!(diagnostic.path.as_deref(), Some("/pets"));
    assert_eq!(diagnostic.method.as_deref(), Some("post"));
    assert_eq!(diagnostic.direction, Some(Direction::Response));
    assert!(diagnostic.message.contains("200"));
}

#[tokio::test]
async fn required_only_swagger_body() {
    let options = ParserOptions {
        required_only: true,
        ..ParserOptions::default()
    };
    let result = parse_api_doc(&petstore(), options).await;
    assert_eq!(
        record(&result, "/pets", "post").req_example,
        Some(json!({"name": "doggie", "photoUrls": ["http://example.com"]}))
    );
}

#[tokio::test]
async fn openapi3_inventory() {
    let result = parse_api_doc(&users(), no_read_write_only()).await;

    assert_eq!(result.api_info.title.as_deref(), Some("User Directory"));
    assert_eq!(result.api_list.len(), 5);

    let list = record(&result, "/users", "get");
    assert_eq!(list.req_type, Some(RequestType::Query));
    assert_eq!(list.req_example, Some(json!({"page": 1, "pageSize": 20})));
    assert_eq!(
        list.res_example,
        Some(json!([{"id": 0, "email": "user@example.com", "role": "admin"}]))
    );

    let one = record(&result, "/users/{userId}", "get");
    assert_eq!(one.req_type, None);
    assert_eq!(
        one.res_example,
        Some(json!({"id": 0, "email": "user@example.com", "role": "admin"}))
    );

    let delete = record(&result, "/users/{userId}", "delete");
    assert_eq!(delete.summary.as_deref(), Some("Remove a user"));
    assert_eq!(delete.req_type, Some(RequestType::Header));
    assert_eq!(delete.req_example, Some(json!({"X-Confirm": true})));
    assert_eq!(delete.res_example, Some(json!({})));

    let team = record(&result, "/teams/{teamId}", "get");
    assert_eq!(
        team.res_example,
        Some(json!({
            "name": "platform",
            "members": [{"id": 0, "email": "user@example.com", "role": "admin"}],
            "parent": {}
        }))
    );

    let degraded: Vec<(&str, &str)> = result
        .diagnostics
        .iter()
        .map(|d| (d.path.as_deref().unwrap(), d.method.as_deref().unwrap()))
        .collect();
    assert_eq!(degraded, vec![("/users", "post"), ("/users/{userId}", "delete")]);
}

#[tokio::test]
async fn openapi3_required_only_body() {
    let options = ParserOptions {
        required_only: true,
        ..ParserOptions::default()
    };
    let result = parse_api_doc(&users(), options).await;
    let create = record(&result, "/users", "post");
    assert_eq!(create.req_type, Some(RequestType::Body));
    assert_eq!(create.req_example, Some(json!({"id": 0})));
}

#[test]
fn self_referential_definitions_terminate() {
    let doc: Value = serde_json::from_str(CYCLIC).unwrap();
    let result = parse_bundled(&doc, ParserOptions::default());

    assert_eq!(
        record(&result, "/employees/{id}", "get").res_example,
        Some(json!({
            "id": 0,
            "name": "string",
            "manager": {},
            "reports": [{}],
            "department": {"title": "string", "head": {}}
        }))
    );

    let list = record(&result, "/employees", "get");
    assert_eq!(list.summary, None);
    assert_eq!(list.res_example, Some(json!({})));
}

#[tokio::test]
async fn unsupported_documents_give_empty_result() {
    let empty = json!({"apiList": [], "apiInfo": {}});

    let no_paths = parse_api_doc(&json!({"swagger": "2.0", "info": {"title": "x"}}), ParserOptions::default()).await;
    assert_eq!(serde_json::to_value(&no_paths).unwrap(), empty);

    let not_object = parse_api_doc(&json!("swagger"), ParserOptions::default()).await;
    assert_eq!(serde_json::to_value(&not_object).unwrap(), empty);

    let swagger_12 = parse_api_doc(
        &json!({"swagger": "1.2", "paths": {"/a": {"get": {}}}}),
        ParserOptions::default(),
    )
    .await;
    assert!(swagger_12.api_list.is_empty());
    assert_eq!(swagger_12.diagnostics.len(), 1);
}

#[test]
fn result_json_shape() {
    let doc = json!({
        "openapi": "3.0.0",
        "info": {"title": "Tiny", "version": "1"},
        "paths": {
            "/ping": {
                "get": {
                    "summary": "Ping",
                    "responses": {"200": {"description": "ok", "content": {"application/json": {"schema": {"type": "object", "properties": {"ok": {"type": "boolean"}}}}}}}
                }
            }
        }
    });
    let result = parse_bundled(&doc, ParserOptions::default());
    insta::assert_json_snapshot!(result, @r#"
    {
      "apiList": [
        {
          "path": "/ping",
          "method": "get",
          "summary": "Ping",
          "resExample": {
            "ok": true
          }
        }
      ],
      "apiInfo": {
        "title": "Tiny",
        "version": "1"
      }
    }
    "#);
}

#[test]
fn sloppy_swagger_metadata_and_schemas_degrade_locally() {
    let doc = json!({
        "swagger": "2.0",
        "info": {"title": "Sloppy", "version": 1.0},
        "tags": [{"description": "no name"}],
        "paths": {
            "/pets": {
                "get": {
                    "summary": "List pets",
                    "parameters": [
                        {"in": "query", "type": "string"},
                        {"name": "limit", "in": "query", "type": "integer", "required": "yes", "minimum": "1"}
                    ],
                    "responses": {
                        "200": {
                            "description": "ok",
                            "schema": {
                                "type": "object",
                                "properties": {
                                    "name": {"type": "string", "required": true},
                                    "tags": {"type": "array", "minItems": 2.0, "items": {"type": "string"}}
                                }
                            }
                        },
                        "500": {"description": "oops", "schema": {"type": "array", "minItems": 1.0}}
                    }
                }
            }
        }
    });
    let result = parse_bundled(&doc, ParserOptions::default());

    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(result.api_info.version.as_deref(), Some("1.0"));
    let pets = record(&result, "/pets", "get");
    assert_eq!(pets.req_type, Some(RequestType::Query));
    assert_eq!(pets.req_example, Some(json!({"limit": 0})));
    assert_eq!(
        pets.res_example,
        Some(json!({"name": "string", "tags": ["string", "string"]}))
    );
}

#[test]
fn sloppy_openapi3_metadata_and_schemas_degrade_locally() {
    let doc = json!({
        "openapi": "3.0.0",
        "info": {"title": "Sloppy", "version": 2},
        "tags": [{"description": "no name"}],
        "servers": [{"description": "no url"}, "bad"],
        "paths": {
            "/users": {
                "post": {
                    "requestBody": {
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "object",
                                    "required": "id",
                                    "properties": {"id": {"type": "integer", "maxLength": "x"}}
                                }
                            }
                        }
                    },
                    "responses": {
                        "200": {
                            "description": "ok",
                            "content": {"application/json": {"schema": {"type": "array", "minItems": 1.0, "items": {"type": "boolean"}}}}
                        },
                        "400": "bad request"
                    }
                }
            }
        }
    });
    let result = parse_bundled(&doc, ParserOptions::default());

    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(result.api_info.version.as_deref(), Some("2"));
    let create = record(&result, "/users", "post");
    assert_eq!(create.req_type, Some(RequestType::Body));
    assert_eq!(create.req_example, Some(json!({"id": 0})));
    assert_eq!(create.res_example, Some(json!([true])));
}

/// `D0..D{levels-1}` each point at the next definition through two
/// properties, so the full expansion of `D0` has `2^levels` leaves.
fn diamond_document(levels: usize) -> Value {
    let mut definitions = serde_json::Map::new();
    for i in 0..levels {
        let next = json!({"$ref": format!("#/definitions/D{}", i + 1)});
        definitions.insert(
            format!("D{i}"),
            json!({"type": "object", "properties": {"a": next, "b": next}}),
        );
    }
    definitions.insert(format!("D{levels}"), json!({"type": "string"}));
    json!({
        "swagger": "2.0",
        "info": {"title": "Diamond", "version": "1"},
        "paths": {
            "/tree": {
                "get": {
                    "responses": {"200": {"description": "ok", "schema": {"$ref": "#/definitions/D0"}}}
                }
            }
        },
        "definitions": definitions
    })
}

/// Objects nested past depth three collapse to `{}`.
fn truncated_tree(depth: usize) -> Value {
    if depth > 3 {
        json!({})
    } else {
        json!({"a": truncated_tree(depth + 1), "b": truncated_tree(depth + 1)})
    }
}

#[test]
fn wide_acyclic_reference_graph_stays_bounded() {
    let doc = diamond_document(64);

    let result = parse_bundled(&doc, ParserOptions::default());
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(
        record(&result, "/tree", "get").res_example,
        Some(truncated_tree(0))
    );

    let simplified = apidex_core::simplify(&doc);
    assert_eq!(simplified.api_list[0].responses.data, truncated_tree(0));
}
