//! Markdown reference pages for an API inventory.

use apidex_core::{ApiRecord, Diagnostic, ParseResult};
use heck::ToKebabCase;
use minijinja::{Environment, context};
use serde_json::Value;
use thiserror::Error;

const TEMPLATE_NAME: &str = "reference.md.j2";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("failed to format example: {0}")]
    Json(#[from] serde_json::Error),
}

/// Render `result` as a single Markdown document: a table of contents, one
/// section per endpoint with its examples, and any diagnostics.
pub fn render_markdown(result: &ParseResult) -> Result<String, RenderError> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.add_template(TEMPLATE_NAME, include_str!("../templates/reference.md.j2"))?;
    let tmpl = env.get_template(TEMPLATE_NAME)?;

    let endpoints = result
        .api_list
        .iter()
        .map(endpoint_to_ctx)
        .collect::<Result<Vec<_>, _>>()?;
    let diagnostics: Vec<_> = result.diagnostics.iter().map(diagnostic_to_ctx).collect();
    log::debug!(
        "rendering {} endpoints and {} diagnostics",
        endpoints.len(),
        diagnostics.len()
    );

    let info = &result.api_info;
    let rendered = tmpl.render(context! {
        title => info.title.as_deref().unwrap_or("API Reference"),
        version => info.version,
        description => info.description,
        endpoints => endpoints,
        diagnostics => diagnostics,
    })?;
    Ok(rendered)
}

/// Anchor id for an endpoint heading.
pub fn anchor(method: &str, path: &str) -> String {
    format!("{method} {path}").to_kebab_case()
}

fn endpoint_to_ctx(record: &ApiRecord) -> Result<minijinja::Value, RenderError> {
    let req_type = record
        .req_type
        .map(|rt| serde_json::to_value(rt).map(|v| v.as_str().unwrap_or_default().to_string()))
        .transpose()?;
    Ok(context! {
        method => record.method.to_uppercase(),
        path => record.path,
        anchor => anchor(&record.method, &record.path),
        summary => record.summary,
        req_type => req_type,
        request => pretty(record.req_example.as_ref())?,
        response => pretty(record.res_example.as_ref())?,
    })
}

fn pretty(example: Option<&Value>) -> Result<Option<String>, RenderError> {
    Ok(example.map(serde_json::to_string_pretty).transpose()?)
}

fn diagnostic_to_ctx(diagnostic: &Diagnostic) -> minijinja::Value {
    let location = match (&diagnostic.method, &diagnostic.path) {
        (Some(method), Some(path)) => Some(match diagnostic.direction {
            Some(direction) => format!("{} {path} ({direction})", method.to_uppercase()),
            None => format!("{} {path}", method.to_uppercase()),
        }),
        _ => None,
    };
    context! {
        location => location,
        message => diagnostic.message,
    }
}
