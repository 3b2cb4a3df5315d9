use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::example::ParserOptions;

/// Document location used when nothing else is configured.
pub const DEFAULT_INPUT: &str = "http://localhost:3000/api-docs";

/// Environment variable consulted for the document location.
pub const DOC_URL_ENV: &str = "DOC_URL";

/// Project configuration loaded from `.apidex.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApidexConfig {
    /// File path or `http(s)` URL of the API description.
    pub input: String,
    pub format: OutputFormat,
    pub options: ParserOptions,
    pub fetch: FetchConfig,
}

impl Default for ApidexConfig {
    fn default() -> Self {
        Self {
            input: DEFAULT_INPUT.to_string(),
            format: OutputFormat::Json,
            options: ParserOptions::default(),
            fetch: FetchConfig::default(),
        }
    }
}

/// How `parse` prints its result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Markdown,
}

/// Remote document retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout_secs: 15 }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".apidex.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<ApidexConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: ApidexConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# apidex configuration
input: http://localhost:3000/api-docs   # file path or http(s) URL; -i and DOC_URL take precedence
format: json          # json | yaml | markdown

options:
  include_read_only: true
  include_write_only: true
  required_only: false
  default_min_items: 1

fetch:
  timeout_secs: 15
"#
}
