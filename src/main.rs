//! translator CLI: federated queries over Translator knowledge providers.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use translator_sdk::client::TranslatorClient;
use translator_sdk::config::SdkConfig;
use translator_sdk::federation::AllFailedPolicy;
use translator_sdk::query::{QueryBuilder, QueryGraph};
use translator_sdk::services::{AnnotateOptions, LookupOptions, NormalizeOptions, TranslatorNode};

#[derive(Parser)]
#[command(name = "translator", version, about = "Query the Biomedical Data Translator")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/translator-sdk/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover knowledge providers and list them.
    Providers,

    /// Run a one-hop query across knowledge providers.
    Query {
        /// Subject CURIEs (comma-separated).
        #[arg(long, value_delimiter = ',')]
        subject: Vec<String>,

        /// Object categories, e.g. biolink:Gene.
        #[arg(long, value_delimiter = ',')]
        category: Vec<String>,

        /// Predicates, e.g. biolink:interacts_with.
        #[arg(long, value_delimiter = ',')]
        predicate: Vec<String>,

        /// Constrain the object to these CURIEs.
        #[arg(long, value_delimiter = ',')]
        object: Vec<String>,

        /// Subject categories; also used to pick providers from the meta-KG.
        #[arg(long, value_delimiter = ',')]
        subject_category: Vec<String>,

        /// Read a TRAPI query document instead of the flags above.
        #[arg(
            long,
            conflicts_with_all = ["subject", "category", "predicate", "object", "subject_category"]
        )]
        file: Option<PathBuf>,

        /// Only query these providers.
        #[arg(long, value_delimiter = ',')]
        providers: Vec<String>,

        /// Provider calls in flight at once.
        #[arg(long)]
        concurrency: Option<usize>,

        /// Give up on outstanding providers after this many seconds.
        #[arg(long)]
        timeout: Option<u64>,

        /// Fail when every provider fails instead of returning nothing.
        #[arg(long)]
        strict: bool,
    },

    /// Normalize CURIEs to their preferred identifiers.
    Normalize {
        curies: Vec<String>,

        /// Turn off gene/protein conflation.
        #[arg(long)]
        no_conflate: bool,

        #[arg(long)]
        drug_chemical_conflate: bool,
    },

    /// Resolve a name to concepts.
    Lookup {
        text: String,

        #[arg(long, default_value = "10")]
        limit: u32,

        /// Only return concepts of this Biolink type (repeatable).
        #[arg(long = "type")]
        biolink_type: Vec<String>,

        /// Only return CURIEs with these prefixes (comma-separated).
        #[arg(long, value_delimiter = ',')]
        prefixes: Vec<String>,

        #[arg(long)]
        autocomplete: bool,
    },

    /// Fetch annotations for CURIEs.
    Annotate {
        curies: Vec<String>,

        /// Annotation fields to return (comma-separated).
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// Report the status of the collaborator services.
    Status,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = SdkConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Providers => {
            let client = TranslatorClient::new(config);
            let registry = client.discover_providers()?;
            if cli.json {
                let descriptors: Vec<_> = registry.descriptors().collect();
                print_json(&descriptors)?;
            } else {
                println!("Providers ({}):", registry.len());
                for d in registry.descriptors() {
                    println!("  {} [{} predicates]", d.name, d.predicates.len());
                    println!("    {}", d.url);
                }
                println!("Meta-KG rows: {}", registry.meta_kg().len());
            }
        }

        Commands::Query {
            subject,
            category,
            predicate,
            object,
            subject_category,
            file,
            providers,
            concurrency,
            timeout,
            strict,
        } => {
            let query = match file {
                Some(path) => {
                    let text = std::fs::read_to_string(&path).into_diagnostic()?;
                    QueryGraph::from_json(&text)?
                }
                None => QueryBuilder::new()
                    .subject_ids(subject)
                    .subject_categories(subject_category)
                    .object_ids(object)
                    .object_categories(category)
                    .predicates(predicate)
                    .build()?,
            };

            if let Some(concurrency) = concurrency {
                config.federation.concurrency = concurrency;
            }
            if timeout.is_some() {
                config.federation.batch_timeout_secs = timeout;
            }
            if strict {
                config.federation.on_all_failed = AllFailedPolicy::Error;
            }

            let client = TranslatorClient::new(config);
            let registry = Arc::new(client.discover_providers()?);
            let selected = if !providers.is_empty() {
                providers
            } else if let Some(subject_categories) = query.subject_categories() {
                registry.select_providers(
                    subject_categories,
                    query.object_categories(),
                    query.predicates(),
                )
            } else {
                registry.names()
            };
            if selected.is_empty() {
                miette::bail!("no provider in the meta-KG can answer this query");
            }

            let response = client.federated_query(registry, &query, &selected)?;
            let rows = response.knowledge_graph.edge_rows();
            if cli.json {
                print_json(&response.knowledge_graph)?;
            } else {
                for row in &rows {
                    println!(
                        "{}  {} -[{}]-> {}  ({})",
                        row.edge_id,
                        row.subject,
                        row.predicate,
                        row.object,
                        row.primary_source.as_deref().unwrap_or("unknown source")
                    );
                }
                println!(
                    "\n{} edges from {} providers ({} empty, {} failed, {} cancelled) in {:.1}s",
                    rows.len(),
                    response.succeeded.len(),
                    response.empty.len(),
                    response.failed.len(),
                    response.cancelled.len(),
                    response.elapsed.as_secs_f64()
                );
                for (provider, error) in &response.failed {
                    println!("  {provider}: {error}");
                }
            }
        }

        Commands::Normalize {
            curies,
            no_conflate,
            drug_chemical_conflate,
        } => {
            let options = NormalizeOptions {
                conflate: !no_conflate,
                drug_chemical_conflate,
                ..Default::default()
            };
            let client = TranslatorClient::new(config);
            let result = client.node_normalizer().normalize(&curies, &options)?;
            if cli.json {
                print_json(&result)?;
            } else {
                for (curie, node) in &result {
                    match node {
                        Some(node) => println!("{curie} -> {}", describe(node)),
                        None => println!("{curie} -> (not normalized)"),
                    }
                }
            }
        }

        Commands::Lookup {
            text,
            limit,
            biolink_type,
            prefixes,
            autocomplete,
        } => {
            let options = LookupOptions {
                limit,
                autocomplete,
                biolink_types: biolink_type,
                only_prefixes: prefixes,
            };
            let client = TranslatorClient::new(config);
            let nodes = client.name_resolver().lookup(&text, &options)?;
            if cli.json {
                print_json(&nodes)?;
            } else {
                for (i, node) in nodes.iter().enumerate() {
                    let score = node.score.map(|s| format!(" (score: {s:.2})")).unwrap_or_default();
                    println!("  {}. {}{score}", i + 1, describe(node));
                }
            }
        }

        Commands::Annotate { curies, fields } => {
            let options = AnnotateOptions {
                fields,
                ..Default::default()
            };
            let client = TranslatorClient::new(config);
            let annotations = client.node_annotator().lookup_curies(&curies, &options)?;
            print_json(&annotations)?;
        }

        Commands::Status => {
            let client = TranslatorClient::new(config);
            let services = [
                ("name resolver", client.name_resolver().status()),
                ("node normalizer", client.node_normalizer().status()),
                ("node annotator", client.node_annotator().status()),
            ];
            for (name, status) in services {
                match status {
                    Ok(body) => println!("{name}: ok {body}"),
                    Err(e) => println!("{name}: unavailable ({e})"),
                }
            }
        }
    }

    Ok(())
}

fn describe(node: &TranslatorNode) -> String {
    let label = node.label.as_deref().unwrap_or("?");
    match node.types.first() {
        Some(t) => format!("{} \"{label}\" [{t}]", node.curie),
        None => format!("{} \"{label}\"", node.curie),
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{text}");
    Ok(())
}
