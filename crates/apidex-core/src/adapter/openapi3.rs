use serde_json::{Map, Value};

use super::{
    DialectAdapter, Exchange, RequestType, locate, override_parameters, parameter_object,
    shared_parameters,
};
use crate::error::AdapterError;
use crate::example::{ExampleGenerator, ParserOptions};
use crate::parse::openapi3::{
    Operation, Parameter, ParameterLocation, ParameterOrRef, RequestBody, RequestBodyOrRef,
    Response, ResponseOrRef, first_media_schema,
};
use crate::parse::schema::SchemaOrRef;

/// OpenAPI 3.0 adapter. Requests use header parameters, then query
/// parameters, then the request body.
#[derive(Debug, Clone, Copy)]
pub struct OpenApi3Adapter<'a> {
    document: &'a Value,
    generator: ExampleGenerator<'a>,
}

impl<'a> OpenApi3Adapter<'a> {
    pub fn new(document: &'a Value, options: ParserOptions) -> Self {
        Self {
            document,
            generator: ExampleGenerator::new(document, options),
        }
    }

    fn resolve_parameters(&self, raw: Vec<ParameterOrRef>) -> Result<Vec<Parameter>, AdapterError> {
        let resolver = self.generator.resolver();
        raw.into_iter()
            .map(|param| -> Result<Parameter, AdapterError> {
                match param {
                    ParameterOrRef::Ref { ref_path } => Ok(resolver.resolve_as(&ref_path)?),
                    ParameterOrRef::Parameter(param) => Ok(param),
                }
            })
            .collect()
    }

    fn group_example(&self, group: &[&Parameter]) -> Result<Value, AdapterError> {
        let schema = parameter_object(
            group
                .iter()
                .map(|p| (p.name.clone(), p.value_schema().cloned(), p.required)),
        );
        Ok(self.generator.generate(&SchemaOrRef::inline(schema))?)
    }
}

impl DialectAdapter for OpenApi3Adapter<'_> {
    fn request(&self, path: &str, method: &str) -> Result<Exchange, AdapterError> {
        let (operation, item) = locate::<Operation>(self.document, path, method)?;
        let shared = self.resolve_parameters(shared_parameters(item, path)?)?;
        let own = self.resolve_parameters(operation.parameters)?;
        let parameters = override_parameters(shared, own, |p| (p.name.clone(), p.location));

        for (location, req_type) in [
            (ParameterLocation::Header, RequestType::Header),
            (ParameterLocation::Query, RequestType::Query),
        ] {
            let group: Vec<&Parameter> =
                parameters.iter().filter(|p| p.location == location).collect();
            if !group.is_empty() {
                return Ok(Exchange::request(self.group_example(&group)?, req_type));
            }
        }

        let body = match operation.request_body {
            Some(RequestBodyOrRef::Ref { ref_path }) => Some(
                self.generator
                    .resolver()
                    .resolve_as::<RequestBody>(&ref_path)?,
            ),
            Some(RequestBodyOrRef::RequestBody(body)) => Some(body),
            None => None,
        };
        if let Some(schema) = body.as_ref().and_then(|b| first_media_schema(&b.content)) {
            return Ok(Exchange::request(self.generator.generate(schema)?, RequestType::Body));
        }

        Ok(Exchange::default())
    }

    fn response(
        &self,
        path: &str,
        method: &str,
        status_code: &str,
    ) -> Result<Exchange, AdapterError> {
        let (operation, _) = locate::<Operation>(self.document, path, method)?;
        let response = match operation.responses.get(status_code) {
            Some(ResponseOrRef::Ref { ref_path }) => {
                self.generator.resolver().resolve_as::<Response>(ref_path)?
            }
            Some(ResponseOrRef::Response(response)) => response.clone(),
            None => return Err(AdapterError::StatusCodeNotFound(status_code.to_string())),
        };

        let data = match first_media_schema(&response.content) {
            Some(schema) => self.generator.generate(schema)?,
            None => Value::Object(Map::new()),
        };
        Ok(Exchange::response(data))
    }
}
