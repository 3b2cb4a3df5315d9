use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde_json::{Value, json};

use apidex_core::config::{self, ApidexConfig, CONFIG_FILE_NAME, DOC_URL_ENV, OutputFormat};
use apidex_core::parse::schema::SchemaOrRef;
use apidex_core::{Document, ExampleGenerator, ParserOptions, bundle, parse_api_doc_with, simplify};
use apidex_fetch::{DefaultLoader, FetchOptions, load_document};

#[derive(Parser)]
#[command(
    name = "apidex",
    about = "Request/response examples and inventories for Swagger 2.0 and OpenAPI 3.0 documents",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every endpoint with synthesized request and response examples
    Parse {
        #[command(flatten)]
        input: InputArgs,

        /// Output format (defaults to the config `format`)
        #[arg(long)]
        format: Option<FormatArg>,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Synthesize an example for a single schema
    Example {
        #[command(flatten)]
        input: InputArgs,

        /// Reference to the schema, e.g. `#/definitions/Pet`
        #[arg(long)]
        pointer: String,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Print the simplified inventory as JSON
    Simplify {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Summarize a document, or print one raw path item
    Inspect {
        #[command(flatten)]
        input: InputArgs,

        /// Path template to print, e.g. `/pets/{petId}`
        #[arg(long)]
        path: Option<String>,
    },

    /// Render a Markdown API reference
    Docs {
        #[command(flatten)]
        input: InputArgs,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Initialize a new apidex configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Args)]
struct InputArgs {
    /// File path or http(s) URL of the API description
    #[arg(short, long, env = DOC_URL_ENV)]
    input: Option<String>,
}

#[derive(Args)]
struct OptionArgs {
    /// Only emit required properties
    #[arg(long)]
    required_only: bool,

    /// Leave out properties marked readOnly
    #[arg(long)]
    exclude_read_only: bool,

    /// Leave out properties marked writeOnly
    #[arg(long)]
    exclude_write_only: bool,

    /// Minimum number of items in synthesized arrays
    #[arg(long)]
    min_items: Option<u64>,
}

impl OptionArgs {
    fn apply(&self, mut options: ParserOptions) -> ParserOptions {
        if self.required_only {
            options.required_only = true;
        }
        if self.exclude_read_only {
            options.include_read_only = false;
        }
        if self.exclude_write_only {
            options.include_write_only = false;
        }
        if let Some(min_items) = self.min_items {
            options.default_min_items = min_items;
        }
        options
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Yaml,
    Markdown,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Yaml => OutputFormat::Yaml,
            FormatArg::Markdown => OutputFormat::Markdown,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            input,
            format,
            options,
        } => cmd_parse(input, format, options).await,

        Commands::Example {
            input,
            pointer,
            options,
        } => cmd_example(input, &pointer, options).await,

        Commands::Simplify { input } => cmd_simplify(input).await,

        Commands::Inspect { input, path } => cmd_inspect(input, path).await,

        Commands::Docs {
            input,
            output,
            options,
        } => cmd_docs(input, output, options).await,

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "apidex", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// A loaded document together with the settings used to obtain it.
struct Session {
    cfg: ApidexConfig,
    location: String,
    fetch: FetchOptions,
    doc: Value,
}

impl Session {
    async fn open(input: InputArgs) -> Result<Self> {
        let cfg = try_load_config()?.unwrap_or_default();
        let location = input.input.unwrap_or_else(|| cfg.input.clone());
        let fetch = FetchOptions::from(cfg.fetch);
        let doc = load_document(&location, &fetch)
            .await
            .with_context(|| format!("failed to load {location}"))?;
        Ok(Self {
            cfg,
            location,
            fetch,
            doc,
        })
    }

    fn loader(&self) -> DefaultLoader {
        DefaultLoader::new(self.fetch)
    }

    async fn bundled(&self) -> Result<Value> {
        bundle(&self.doc, &self.loader(), Some(&self.location))
            .await
            .with_context(|| format!("failed to bundle {}", self.location))
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<ApidexConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

fn report_diagnostics(count: usize) {
    if count > 0 {
        eprintln!("  {count} item(s) degraded; run with RUST_LOG=warn for details");
    }
}

async fn cmd_parse(input: InputArgs, format: Option<FormatArg>, args: OptionArgs) -> Result<()> {
    let session = Session::open(input).await?;
    let options = args.apply(session.cfg.options);
    let result = parse_api_doc_with(
        &session.doc,
        options,
        &session.loader(),
        Some(&session.location),
    )
    .await;

    let format = format.map(OutputFormat::from).unwrap_or(session.cfg.format);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Yaml => print!("{}", serde_yaml_ng::to_string(&result)?),
        OutputFormat::Markdown => print!("{}", apidex_docs::render_markdown(&result)?),
    }

    eprintln!("Parsed {} endpoints from {}", result.api_list.len(), session.location);
    report_diagnostics(result.diagnostics.len());
    Ok(())
}

async fn cmd_example(input: InputArgs, pointer: &str, args: OptionArgs) -> Result<()> {
    let session = Session::open(input).await?;
    let doc = session.bundled().await?;
    let options = args.apply(session.cfg.options);

    let generator = ExampleGenerator::new(&doc, options);
    let example = generator
        .generate(&SchemaOrRef::Ref {
            ref_path: pointer.to_string(),
        })
        .with_context(|| format!("failed to synthesize {pointer}"))?;
    println!("{}", serde_json::to_string_pretty(&example)?);
    Ok(())
}

async fn cmd_simplify(input: InputArgs) -> Result<()> {
    let session = Session::open(input).await?;
    let doc = session.bundled().await?;
    let simplified = simplify(&doc);
    println!("{}", serde_json::to_string_pretty(&simplified)?);
    eprintln!("Simplified {} endpoints", simplified.api_list.len());
    Ok(())
}

async fn cmd_inspect(input: InputArgs, path: Option<String>) -> Result<()> {
    let session = Session::open(input).await?;
    let doc = Document::from_value(&session.doc)
        .with_context(|| format!("failed to read {}", session.location))?;

    let summary = match path {
        Some(path) => {
            let item = doc
                .path_item(&path)
                .with_context(|| format!("path {path} not found"))?;
            serde_json::to_value(item)?
        }
        None => build_inspect_summary(&doc),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn build_inspect_summary(doc: &Document) -> Value {
    let operations: Vec<Value> = doc
        .operations()
        .map(|(path, method, _)| json!({"method": method, "path": path}))
        .collect();

    json!({
        "dialect": doc.dialect().as_str(),
        "version": doc.version(),
        "info": doc.info(),
        "paths": doc.paths().len(),
        "schemas": doc.schema_names(),
        "operations": operations,
    })
}

async fn cmd_docs(input: InputArgs, output: Option<PathBuf>, args: OptionArgs) -> Result<()> {
    let session = Session::open(input).await?;
    let options = args.apply(session.cfg.options);
    let result = parse_api_doc_with(
        &session.doc,
        options,
        &session.loader(),
        Some(&session.location),
    )
    .await;
    let markdown = apidex_docs::render_markdown(&result)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create directory {}", parent.display()))?;
            }
            fs::write(&path, markdown)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("  wrote {}", path.display());
        }
        None => print!("{markdown}"),
    }
    report_diagnostics(result.diagnostics.len());
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
