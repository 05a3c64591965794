use anyhow::{bail, Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use netinsight_search::{build_prompt, SearchService, DEFAULT_CONTEXT_K, DEFAULT_SEARCH_K};
use netinsight_vector_store::{DocumentStore, RankedResult, VectorStoreError};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

pub mod config;
pub mod embedder;
pub mod http_api;
pub mod runbooks;

use config::{StoreConfig, StoreOverrides};

#[derive(Parser)]
#[command(name = "netinsight")]
#[command(about = "Semantic search over cluster runbooks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Embedding dimension (overrides NETINSIGHT_DIMENSION, default 384)
    #[arg(long, global = true)]
    dimension: Option<usize>,

    /// Vector index artifact (overrides NETINSIGHT_INDEX_PATH)
    #[arg(long, global = true)]
    index_path: Option<PathBuf>,

    /// Documents artifact (overrides NETINSIGHT_DOCS_PATH)
    #[arg(long, global = true)]
    docs_path: Option<PathBuf>,

    /// Embedding backend (overrides NETINSIGHT_EMBEDDING_MODE)
    #[arg(long, global = true, value_enum)]
    embed_mode: Option<EmbedMode>,

    /// Embedding service endpoint for `--embed-mode http`
    #[arg(long, global = true)]
    embed_url: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum EmbedMode {
    Stub,
    Http,
}

impl EmbedMode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Stub => "stub",
            Self::Http => "http",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Split runbooks into sections, embed them and save the index
    Index(IndexArgs),

    /// Search the index and print ranked sections
    Search(SearchArgs),

    /// Print the context block (or full prompt) for a question
    Context(ContextArgs),

    /// Serve the search API over HTTP (GET /, POST /search)
    ServeHttp(ServeArgs),
}

#[derive(Args)]
struct IndexArgs {
    /// Glob selecting runbook files
    #[arg(long, default_value = runbooks::DEFAULT_RUNBOOK_PATTERN)]
    pattern: String,

    /// Add to the existing index instead of replacing it
    #[arg(long)]
    append: bool,

    /// Output summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// Search query
    query: String,

    /// Number of results
    #[arg(short, long, default_value_t = DEFAULT_SEARCH_K)]
    k: usize,

    /// Output results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ContextArgs {
    /// Question to gather context for
    query: String,

    /// Number of sections in the context
    #[arg(short, long, default_value_t = DEFAULT_CONTEXT_K)]
    k: usize,

    /// Wrap the context in the answer prompt
    #[arg(long)]
    prompt: bool,
}

#[derive(Args)]
struct ServeArgs {
    /// Bind address, e.g. 127.0.0.1:8000
    #[arg(long, default_value = "127.0.0.1:8000")]
    bind: String,
}

#[derive(Serialize)]
struct IndexSummary {
    added: usize,
    total: usize,
    index_path: String,
    docs_path: String,
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    let json_output = match &cli.command {
        Commands::Index(args) => args.json,
        Commands::Search(args) => args.json,
        _ => false,
    };
    if json_output {
        cli.quiet = true;
    }
    init_logging(cli.verbose, cli.quiet);

    let config = StoreConfig::resolve(StoreOverrides {
        dimension: cli.dimension,
        index_path: cli.index_path.clone(),
        docs_path: cli.docs_path.clone(),
        embed_mode: cli.embed_mode.map(|m| m.as_str().to_string()),
        embed_url: cli.embed_url.clone(),
    })?;

    match cli.command {
        Commands::Index(args) => run_index(args, &config).await,
        Commands::Search(args) => run_search(args, &config).await,
        Commands::Context(args) => run_context(args, &config).await,
        Commands::ServeHttp(args) => serve_http(args, &config).await,
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // reqwest/hyper are noisy at debug
    if !verbose {
        builder.filter_module("hyper", log::LevelFilter::Warn);
        builder.filter_module("reqwest", log::LevelFilter::Warn);
    }
    builder.target(env_logger::Target::Stderr).init();
}

async fn run_index(args: IndexArgs, config: &StoreConfig) -> Result<()> {
    let sections = runbooks::collect_sections(&args.pattern)?;
    if sections.is_empty() {
        bail!("No runbook sections matched '{}'", args.pattern);
    }

    let mut store = if args.append {
        match DocumentStore::open(
            config.dimension,
            config.embedder(),
            &config.index_path,
            &config.docs_path,
        )
        .await
        {
            Ok(store) => store,
            Err(VectorStoreError::NotFound(what)) => {
                let index_exists = tokio::fs::try_exists(&config.index_path).await?;
                let docs_exists = tokio::fs::try_exists(&config.docs_path).await?;
                if index_exists || docs_exists {
                    bail!(
                        "Cannot append: {what} is missing but its counterpart exists; \
                         rebuild without --append to replace {} and {}",
                        config.index_path.display(),
                        config.docs_path.display()
                    );
                }
                log::info!("No existing index ({what}); starting fresh");
                config.empty_store()?
            }
            Err(err) => return Err(err).context("Failed to load existing index"),
        }
    } else {
        config.empty_store()?
    };

    let added = sections.len();
    store
        .add_documents(sections)
        .await
        .context("Failed to embed runbook sections")?;
    store
        .save(&config.index_path, &config.docs_path)
        .await
        .context("Failed to save index")?;

    let summary = IndexSummary {
        added,
        total: store.len(),
        index_path: config.index_path.display().to_string(),
        docs_path: config.docs_path.display().to_string(),
    };
    if args.json {
        print_stdout(&serde_json::to_string_pretty(&summary)?)?;
    } else {
        print_stdout(&format!(
            "Indexed {} sections ({} total) into {} and {}",
            summary.added, summary.total, summary.index_path, summary.docs_path
        ))?;
    }
    Ok(())
}

async fn run_search(args: SearchArgs, config: &StoreConfig) -> Result<()> {
    let service = SearchService::new(config.open_store().await?);
    let ranked = service.optimize_query(&args.query, args.k).await?;

    if args.json {
        print_stdout(&serde_json::to_string_pretty(&ranked)?)?;
        return Ok(());
    }

    let mut out = format!("Query: '{}'\n", args.query);
    for (i, result) in ranked.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} (distance: {:.2}, normalized: {:.2})\n",
            i + 1,
            preview(result),
            result.distance,
            result.normalized_distance
        ));
    }
    print_stdout(out.trim_end())
}

async fn run_context(args: ContextArgs, config: &StoreConfig) -> Result<()> {
    let service = SearchService::new(config.open_store().await?);
    let context = service.get_context(&args.query, args.k).await?;
    if args.prompt {
        print_stdout(&build_prompt(&context, &args.query))
    } else {
        print_stdout(&context)
    }
}

async fn serve_http(args: ServeArgs, config: &StoreConfig) -> Result<()> {
    let service = SearchService::new(config.open_store().await?);
    let app = http_api::router(service);

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    log::info!("Serving search API on http://{}", args.bind);
    axum::serve(listener, app).await?;
    Ok(())
}

const PREVIEW_CHARS: usize = 100;

fn preview(result: &RankedResult) -> String {
    let flat = result.document.replace('\n', " ");
    if flat.chars().count() > PREVIEW_CHARS {
        let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        flat
    }
}

fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{text}")?;
    stdout.flush()?;
    Ok(())
}
