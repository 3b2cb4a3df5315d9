use serde_json::{Map, Value};

use super::{
    DialectAdapter, Exchange, RequestType, locate, override_parameters, parameter_object,
    shared_parameters,
};
use crate::error::AdapterError;
use crate::example::{ExampleGenerator, ParserOptions};
use crate::parse::schema::SchemaOrRef;
use crate::parse::swagger2::{
    Operation, Parameter, ParameterLocation, ParameterOrRef, Response, ResponseOrRef,
};

/// Swagger 2.0 adapter.
///
/// Request precedence: header parameters, then query parameters, then the
/// first body parameter with a schema, then form parameters.
#[derive(Debug, Clone, Copy)]
pub struct Swagger2Adapter<'a> {
    document: &'a Value,
    generator: ExampleGenerator<'a>,
}

impl<'a> Swagger2Adapter<'a> {
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
                .map(|p| (p.name.clone(), Some(p.to_schema()), p.required)),
        );
        Ok(self.generator.generate(&SchemaOrRef::inline(schema))?)
    }
}

impl DialectAdapter for Swagger2Adapter<'_> {
    fn request(&self, path: &str, method: &str) -> Result<Exchange, AdapterError> {
        let (operation, item) = locate::<Operation>(self.document, path, method)?;
        let shared = self.resolve_parameters(shared_parameters(item, path)?)?;
        let own = self.resolve_parameters(operation.parameters)?;
        let parameters = override_parameters(shared, own, |p| (p.name.clone(), p.location));

        let in_location = |location: ParameterLocation| {
            parameters
                .iter()
                .filter(|p| p.location == location)
                .collect::<Vec<_>>()
        };

        let headers = in_location(ParameterLocation::Header);
        if !headers.is_empty() {
            return Ok(Exchange::request(self.group_example(&headers)?, RequestType::Header));
        }

        let query = in_location(ParameterLocation::Query);
        if !query.is_empty() {
            return Ok(Exchange::request(self.group_example(&query)?, RequestType::Query));
        }

        let body = parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Body)
            .find_map(|p| p.schema.as_ref());
        if let Some(schema) = body {
            return Ok(Exchange::request(self.generator.generate(schema)?, RequestType::Body));
        }

        let form = in_location(ParameterLocation::FormData);
        if !form.is_empty() {
            return Ok(Exchange::request(self.group_example(&form)?, RequestType::Form));
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

        let data = match response.schema {
            Some(ref schema) => self.generator.generate(schema)?,
            None => Value::Object(Map::new()),
        };
        Ok(Exchange::response(data))
    }
}
