pub mod adapter;
pub mod bundle;
pub mod config;
pub mod error;
pub mod example;
pub mod inventory;
pub mod parse;
pub mod simplify;

pub use bundle::{DocumentLoader, LocalOnly, bundle};
pub use example::{ExampleGenerator, ParserOptions, generate_example, merge_schemas};
pub use inventory::{
    ApiRecord, Diagnostic, ParseResult, parse_api_doc, parse_api_doc_with, parse_bundled,
};
pub use parse::spec::{Dialect, Document, Info};
pub use simplify::{SimplifiedDoc, simplify};
