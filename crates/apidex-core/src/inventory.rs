use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::adapter::{
    DEFAULT_STATUS_CODE, DialectAdapter, Direction, OpenApi3Adapter, RequestType,
    Swagger2Adapter,
};
use crate::bundle::{DocumentLoader, LocalOnly, bundle};
use crate::example::ParserOptions;
use crate::parse::spec::{Document, Info};

/// One endpoint of the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRecord {
    pub path: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub req_type: Option<RequestType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub req_example: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub res_example: Option<Value>,
}

/// A per-item failure that was degraded instead of aborting the parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    pub message: String,
}

impl Diagnostic {
    /// A failure affecting the whole document.
    pub fn document(message: impl Into<String>) -> Self {
        Self {
            path: None,
            method: None,
            direction: None,
            message: message.into(),
        }
    }
}

/// The flattened inventory of a document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub api_list: Vec<ApiRecord>,
    pub api_info: Info,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    fn degrade(&mut self, path: &str, method: &str, direction: Direction, message: String) {
        log::warn!("{} {path}: {direction} example unavailable: {message}", method.to_uppercase());
        self.diagnostics.push(Diagnostic {
            path: Some(path.to_string()),
            method: Some(method.to_string()),
            direction: Some(direction),
            message,
        });
    }
}

/// Parse a document whose references are all internal.
///
/// External references make bundling fail; the failure is recorded and the
/// document is parsed as is.
pub async fn parse_api_doc(doc: &Value, options: ParserOptions) -> ParseResult {
    parse_api_doc_with(doc, options, &LocalOnly, None).await
}

/// Bundle `doc` through `loader`, then parse it.
pub async fn parse_api_doc_with<L: DocumentLoader>(
    doc: &Value,
    options: ParserOptions,
    loader: &L,
    base: Option<&str>,
) -> ParseResult {
    if !has_paths(doc) {
        return ParseResult::default();
    }
    match bundle(doc, loader, base).await {
        Ok(bundled) => parse_bundled(&bundled, options),
        Err(err) => {
            log::warn!("bundling failed, continuing with unbundled document: {err}");
            let mut result = parse_bundled(doc, options);
            result
                .diagnostics
                .insert(0, Diagnostic::document(format!("bundling failed: {err}")));
            result
        }
    }
}

/// Build the inventory of an already bundled document.
pub fn parse_bundled(doc: &Value, options: ParserOptions) -> ParseResult {
    let mut result = ParseResult::default();
    if !has_paths(doc) {
        return result;
    }

    let document = match Document::from_value(doc) {
        Ok(document) => document,
        Err(err) => {
            log::warn!("error parsing API documentation: {err}");
            result.diagnostics.push(Diagnostic::document(err.to_string()));
            return result;
        }
    };
    log::debug!(
        "parsing {} document with {} paths",
        document.dialect(),
        document.paths().len()
    );

    match document {
        Document::Swagger2(_) => {
            collect(&Swagger2Adapter::new(doc, options), &document, &mut result)
        }
        Document::OpenApi3(_) => {
            collect(&OpenApi3Adapter::new(doc, options), &document, &mut result)
        }
    }
    result.api_info = document.info().cloned().unwrap_or_default();
    result
}

fn has_paths(doc: &Value) -> bool {
    doc.as_object().is_some_and(|root| root.contains_key("paths"))
}

fn collect<A: DialectAdapter>(adapter: &A, document: &Document, result: &mut ParseResult) {
    for (path, method, operation) in document.operations() {
        let mut record = ApiRecord {
            path: path.to_string(),
            method: method.to_string(),
            summary: summary_of(operation),
            req_type: None,
            req_example: None,
            res_example: None,
        };

        match adapter.exchange(path, method, Direction::Request, DEFAULT_STATUS_CODE) {
            Ok(exchange) => {
                record.req_type = exchange.req_type;
                record.req_example = exchange.data;
            }
            Err(err) => result.degrade(path, method, Direction::Request, err.to_string()),
        }

        let res_example = match adapter.exchange(path, method, Direction::Response, DEFAULT_STATUS_CODE) {
            Ok(exchange) => exchange.data,
            Err(err) => {
                result.degrade(path, method, Direction::Response, err.to_string());
                None
            }
        };
        record.res_example = Some(res_example.unwrap_or_else(|| Value::Object(Map::new())));

        result.api_list.push(record);
    }
}

/// The operation's `summary`, falling back to its `description`.
fn summary_of(operation: &Value) -> Option<String> {
    let text = |key: &str| {
        operation
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    };
    text("summary").or_else(|| text("description")).map(str::to_string)
}
