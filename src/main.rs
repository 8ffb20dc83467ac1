//! # wikiatlas CLI
//!
//! Command-line front end for the crawler and the place index.
//!
//! ## Subcommands
//!
//! - `crawl`: connect to the index, crawl Wikipedia from the seed titles and
//!   optionally run a few demonstration searches
//! - `search`: filtered similarity search, as text or JSON
//! - `stats`: number of points in the collection
//!
//! Every connection setting can come from a flag, the environment or a
//! `.env` file. Fatal conditions exit with a non-zero status.

mod telemetry;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tracing::{info, instrument};

use wikiatlas::classifier::{AttractionCategory, LocationType};
use wikiatlas::crawler::{
    CrawlEvent, CrawlSummary, Crawler, CrawlerConfig, EntryOutcome, PageFetcher, START_TITLES,
};
use wikiatlas::index::{LibsqlStore, QdrantConfig, QdrantStore, RecordKind, VectorStore};
use wikiatlas::model::{
    DEFAULT_OLLAMA_DIMENSIONS, DEFAULT_OLLAMA_MODEL, Embedder, HashingEmbedder,
    RateLimitedEmbedder,
};
use wikiatlas::retry::RetryPolicy;
use wikiatlas::search::{DEFAULT_LIMIT, SearchFilter, SearchSystem, render_hit};

#[derive(Parser)]
#[command(author, version, about = "Crawl, classify and index Wikipedia places for semantic search", long_about = None)]
struct Cli {
    #[command(flatten)]
    backend: BackendArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Crawl Wikipedia from the seed titles into the index
    Crawl(CrawlArgs),

    /// Search the index
    Search(SearchArgs),

    /// Show collection statistics
    Stats,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StoreBackend {
    Qdrant,
    Libsql,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EmbeddingBackend {
    Ollama,
    Gemini,
    Hashing,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug)]
struct BackendArgs {
    /// Vector index backend
    #[arg(long, env = "STORE_BACKEND", value_enum, default_value_t = StoreBackend::Qdrant, global = true)]
    store: StoreBackend,

    #[arg(long, env = "QDRANT_HOST", default_value = "localhost", global = true)]
    qdrant_host: String,

    #[arg(long, env = "QDRANT_PORT", default_value_t = 6333, global = true)]
    qdrant_port: u16,

    #[arg(long, env = "QDRANT_API_KEY", hide_env_values = true, global = true)]
    qdrant_api_key: Option<String>,

    /// Collection (Qdrant) or logical table partition (libsql)
    #[arg(long, env = "COLLECTION_NAME", default_value = "ireland_places", global = true)]
    collection: String,

    /// Database path for the libsql backend
    #[arg(long, env = "WIKIATLAS_DATABASE", default_value = "wikiatlas.db", global = true)]
    database: PathBuf,

    /// Embedding provider
    #[arg(long, env = "EMBEDDING_BACKEND", value_enum, default_value_t = EmbeddingBackend::Ollama, global = true)]
    embedding: EmbeddingBackend,

    #[arg(long, env = "OLLAMA_URL", default_value = "http://localhost:11434", global = true)]
    ollama_url: String,

    #[arg(long, env = "EMBEDDING_MODEL", default_value = DEFAULT_OLLAMA_MODEL, global = true)]
    embedding_model: String,

    /// Vector dimension for the Ollama and hashing providers
    #[arg(long, env = "EMBEDDING_DIMENSIONS", default_value_t = DEFAULT_OLLAMA_DIMENSIONS, global = true)]
    dimensions: usize,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    gemini_api_key: Option<String>,
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Deepest level fetched; seeds are level 1
    #[arg(short = 'd', long, default_value_t = 2)]
    max_depth: u32,

    /// Seed title, repeatable; defaults to the built-in Ireland list
    #[arg(short, long = "seed")]
    seeds: Vec<String>,

    /// Minimum delay between page fetches in milliseconds
    #[arg(long, default_value_t = 1000)]
    fetch_delay: u64,

    /// Delay after each frontier entry in milliseconds
    #[arg(long, default_value_t = 2000)]
    pop_delay: u64,

    /// Also fetch pages first recorded as link candidates
    #[arg(long)]
    expand_candidates: bool,

    #[arg(long, env = "WIKIPEDIA_BASE_URL", default_value = "https://en.wikipedia.org")]
    base_url: String,

    /// Run example searches after the crawl
    #[arg(long)]
    demo_searches: bool,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Search query
    #[arg(required = true)]
    query: String,

    /// Limit results
    #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
    limit: usize,

    /// Record type (origin|place|attraction)
    #[arg(long = "type")]
    kind: Option<RecordKind>,

    #[arg(long)]
    location_type: Option<LocationType>,

    #[arg(long)]
    attraction_category: Option<AttractionCategory>,

    #[arg(long)]
    county: Option<String>,

    #[arg(long)]
    region: Option<String>,

    /// Required feature tag, repeatable
    #[arg(long = "feature")]
    features: Vec<String>,

    #[arg(long)]
    tourism_related: Option<bool>,

    #[arg(long)]
    price_range: Option<String>,

    /// Only records with known opening hours
    #[arg(long)]
    has_opening_hours: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl SearchArgs {
    fn filter(&self) -> SearchFilter {
        let mut filter = SearchFilter::new();
        if let Some(kind) = self.kind {
            filter = filter.kind(kind);
        }
        if let Some(location_type) = self.location_type {
            filter = filter.location_type(location_type);
        }
        if let Some(category) = self.attraction_category {
            filter = filter.attraction_category(category);
        }
        if let Some(county) = &self.county {
            filter = filter.county(county);
        }
        if let Some(region) = &self.region {
            filter = filter.region(region);
        }
        for feature in &self.features {
            filter = filter.feature(feature);
        }
        if let Some(tourism_related) = self.tourism_related {
            filter = filter.tourism_related(tourism_related);
        }
        if let Some(price_range) = &self.price_range {
            filter = filter.price_range(price_range);
        }
        if self.has_opening_hours {
            filter = filter.with_opening_hours();
        }
        filter
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // a missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _otel = telemetry::init_tracing_subscriber()?;

    let backend = &cli.backend;
    match backend.embedding {
        EmbeddingBackend::Ollama => {
            let embedder = RateLimitedEmbedder::ollama(
                &backend.ollama_url,
                &backend.embedding_model,
                backend.dimensions,
            );
            with_store(&cli, embedder).await
        }
        EmbeddingBackend::Gemini => {
            let api_key = backend
                .gemini_api_key
                .as_deref()
                .context("GEMINI_API_KEY must be set for the gemini embedding backend")?;
            with_store(&cli, RateLimitedEmbedder::gemini(api_key)).await
        }
        EmbeddingBackend::Hashing => {
            with_store(&cli, HashingEmbedder::new(backend.dimensions)).await
        }
    }
}

/// Open the configured store, sized for `embedder`, and run the command
async fn with_store<E: Embedder>(cli: &Cli, embedder: E) -> anyhow::Result<()> {
    let backend = &cli.backend;
    match backend.store {
        StoreBackend::Qdrant => {
            let store = QdrantStore::new(QdrantConfig {
                host: backend.qdrant_host.clone(),
                port: backend.qdrant_port,
                collection: backend.collection.clone(),
                vector_size: embedder.ndims(),
                api_key: backend.qdrant_api_key.clone(),
                ..QdrantConfig::default()
            })?;
            run(&cli.command, embedder, store).await
        }
        StoreBackend::Libsql => {
            let path = backend.database.to_string_lossy();
            let store = LibsqlStore::new_from_path(&path, &backend.collection, embedder.ndims())
                .await
                .with_context(|| format!("Failed to open {}", path))?;
            run(&cli.command, embedder, store).await
        }
    }
}

async fn run<E: Embedder, S: VectorStore>(
    command: &Commands,
    embedder: E,
    store: S,
) -> anyhow::Result<()> {
    connect(&store).await?;

    match command {
        Commands::Crawl(args) => {
            probe_embedder(&embedder).await?;
            store
                .ensure_collection()
                .await
                .context("Failed to prepare collection")?;
            crawl_command(args, &embedder, &store).await
        }
        Commands::Search(args) => {
            probe_embedder(&embedder).await?;
            search_command(args, &embedder, &store).await
        }
        Commands::Stats => stats_command(&store).await,
    }
}

/// Wait for the index to answer, giving up after the startup policy
async fn connect<S: VectorStore>(store: &S) -> anyhow::Result<()> {
    RetryPolicy::startup()
        .run("connect to vector store", || store.ping())
        .await
        .context("Vector store is unreachable")?;
    info!("Connected to vector store");
    Ok(())
}

async fn probe_embedder<E: Embedder>(embedder: &E) -> anyhow::Result<()> {
    let vector = embedder
        .embed("Cliffs of Moher")
        .await
        .context("Embedding model is unavailable")?;
    info!("Embedding model ready ({} dimensions)", vector.len());
    Ok(())
}

#[instrument(skip(embedder, store))]
async fn crawl_command<E: Embedder, S: VectorStore>(
    args: &CrawlArgs,
    embedder: &E,
    store: &S,
) -> anyhow::Result<()> {
    let config = CrawlerConfig::builder()
        .max_depth(args.max_depth)
        .fetch_delay(Duration::from_millis(args.fetch_delay))
        .pop_delay(Duration::from_millis(args.pop_delay))
        .expand_candidates(args.expand_candidates)
        .base_url(args.base_url.clone())
        .build();
    let fetcher = PageFetcher::new(&config)?;

    let seeds: Vec<String> = if args.seeds.is_empty() {
        START_TITLES.iter().map(|title| title.to_string()).collect()
    } else {
        args.seeds.clone()
    };

    // Create a channel for progress updates
    let (progress_sender, mut progress_receiver) = mpsc::channel(100);

    let progress_bar = ProgressBar::new(seeds.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let progress_handle = tokio::spawn({
        let progress_bar = progress_bar.clone();
        async move {
            while let Some(event) = progress_receiver.recv().await {
                match event {
                    CrawlEvent::Started { seeds } => {
                        progress_bar.set_message(format!("{} seeds", seeds))
                    }
                    CrawlEvent::EntryFinished {
                        title,
                        depth,
                        outcome,
                        frontier,
                        visited,
                        ..
                    } => {
                        progress_bar.set_length((visited + frontier) as u64);
                        progress_bar.set_position(visited as u64);
                        progress_bar.set_message(format!(
                            "depth {} {} ({})",
                            depth,
                            title,
                            describe(outcome)
                        ));
                    }
                    CrawlEvent::Finished(_) => progress_bar.finish_with_message("Crawl completed"),
                }
            }
        }
    });

    let start_time = std::time::Instant::now();
    let crawler = Crawler::new(config, fetcher, embedder, store).with_events(progress_sender);
    let result = crawler.crawl(seeds).await;

    // Drop the sender so the progress task ends
    drop(crawler);
    let _ = progress_handle.await;

    let summary = result?;
    print_summary(&summary, start_time.elapsed());

    if args.demo_searches {
        demo_searches(&SearchSystem::new(embedder, store)).await?;
    }

    Ok(())
}

fn describe(outcome: EntryOutcome) -> String {
    match outcome {
        EntryOutcome::Stored { candidates } => format!("stored, {} new links", candidates),
        EntryOutcome::SkippedDuplicate => "already stored".to_string(),
        EntryOutcome::SkippedDepth => "too deep".to_string(),
        EntryOutcome::SkippedFetchFailed => "fetch failed".to_string(),
        EntryOutcome::SkippedError => "error".to_string(),
    }
}

fn print_summary(summary: &CrawlSummary, elapsed: Duration) {
    println!("Crawl completed in {:.2?}", elapsed);
    println!("Visited {} frontier entries", summary.visited);
    println!(
        "Stored {} pages and {} link candidates",
        summary.stored_origins, summary.stored_candidates
    );
    println!(
        "Skipped {} already stored, {} too deep, {} failed fetches, {} errors",
        summary.skipped_duplicate,
        summary.skipped_depth,
        summary.skipped_fetch_failed,
        summary.skipped_error
    );
}

async fn demo_searches<E: Embedder, S: VectorStore>(
    search: &SearchSystem<E, S>,
) -> anyhow::Result<()> {
    let demos = [
        (
            "Searching for castles in Ireland",
            "castles",
            SearchFilter::new().feature("historical"),
        ),
        (
            "Searching for attractions in Dublin",
            "tourist attractions",
            SearchFilter::new().county("Dublin"),
        ),
        (
            "Searching for natural attractions",
            "scenic natural attractions",
            SearchFilter::new().location_type(LocationType::Natural),
        ),
    ];

    for (heading, query, filter) in demos {
        println!("\n{}:", heading);
        let hits = search.search(query, DEFAULT_LIMIT, &filter).await?;
        if hits.is_empty() {
            println!("  no results");
        }
        for hit in &hits {
            println!("{}", render_hit(hit));
        }
    }

    Ok(())
}

#[instrument(skip(embedder, store))]
async fn search_command<E: Embedder, S: VectorStore>(
    args: &SearchArgs,
    embedder: &E,
    store: &S,
) -> anyhow::Result<()> {
    let search = SearchSystem::new(embedder, store);
    let hits = search.search(&args.query, args.limit, &args.filter()).await?;

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        OutputFormat::Text => {
            println!("Found {} results for {:?}", hits.len(), args.query);
            for hit in &hits {
                println!("{}", render_hit(hit));
            }
        }
    }

    Ok(())
}

async fn stats_command<S: VectorStore>(store: &S) -> anyhow::Result<()> {
    let count = store.count().await.context("Failed to count points")?;
    println!("{} points", count);
    Ok(())
}
