use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "unsupported document format ({0}); only Swagger 2.0 and OpenAPI 3.0 are supported"
    )]
    UnsupportedDocumentFormat(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unsupported reference format: {0}")]
    UnsupportedReferenceFormat(String),

    #[error("unable to resolve reference {reference}, segment: {segment}")]
    UnresolvedReference { segment: String, reference: String },

    #[error("reference {reference} does not point to a valid definition: {source}")]
    InvalidTarget {
        reference: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("path not found: \"{0}\"")]
    PathNotFound(String),

    #[error("method \"{method}\" not found for path \"{path}\"")]
    MethodNotFound { path: String, method: String },

    #[error("status code not found: \"{0}\"")]
    StatusCodeNotFound(String),

    #[error("malformed operation {method} {path}: {source}")]
    InvalidOperation {
        path: String,
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),
}

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("failed to load {location}: {message}")]
    Load { location: String, message: String },

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),
}
