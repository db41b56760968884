use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lexicon_db::{Document, IngestStats, Lexicon, LoadMode, MergeKey, Pipeline, PipelineConfig};
use lexicon_parser::{LineParser, ParserConfig};
use lexicon_phonetic::{Normalizer, SubstitutionTable};
use lexicon_service::{AppState, ExportFormat, export_to_path, router};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const MAX_PAGE_SIZE: usize = 500;

#[derive(Debug, Parser)]
#[command(
    name = "lexicon",
    version,
    about = "Extract a phonetic lexicon from OCR'd bilingual dictionaries"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the lexicon and write it to a file.
    Extract {
        #[command(flatten)]
        source: SourceArgs,
        /// Output file, overwritten if present.
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, value_enum, default_value_t = ExportFormat::Records)]
        format: ExportFormat,
    },
    /// Build the lexicon and serve lookups over HTTP.
    Serve {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
        host: String,
        #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
        #[arg(long, default_value_t = MAX_PAGE_SIZE)]
        max_page_size: usize,
    },
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Extracted dictionary text files, merged in the order given.
    #[arg(required = true, env = "LEXICON_SOURCE", value_delimiter = ',')]
    sources: Vec<PathBuf>,
    /// `mmap` or `owned`.
    #[arg(long, env = "LEXICON_LOAD_MODE", default_value = "mmap", value_parser = parse_load_mode)]
    load_mode: LoadMode,
    /// JSON parser settings: markers, rejection markers, length bounds, delimiter.
    #[arg(long)]
    parser_config: Option<PathBuf>,
    /// JSON list of `[pattern, replacement]` pairs replacing the built-in table.
    #[arg(long)]
    substitutions: Option<PathBuf>,
    #[arg(long, default_value_t = PipelineConfig::default().min_phonetic_len)]
    min_phonetic_len: usize,
    /// Keep one entry per headword and category instead of one per headword.
    #[arg(long)]
    per_category: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Extract {
            source,
            output,
            format,
        } => {
            let pipeline = build_pipeline(&source)?;
            let lexicon = build_lexicon(&pipeline, &source)?;
            let written = export_to_path(lexicon.iter(), format, &output)
                .with_context(|| format!("exporting lexicon to {}", output.display()))?;
            info!(
                "wrote {} records to {} ({:?})",
                written,
                output.display(),
                format
            );
            Ok(())
        }
        Command::Serve {
            source,
            host,
            port,
            max_page_size,
        } => {
            let pipeline = build_pipeline(&source)?;
            let lexicon = build_lexicon(&pipeline, &source)?;
            let state = AppState {
                lexicon: Arc::new(lexicon),
                normalizer: Arc::new(pipeline.normalizer().clone()),
                max_page_size: max_page_size.max(1),
            };

            let app = router(state).layer(TraceLayer::new_for_http());
            let addr: SocketAddr = format!("{host}:{port}")
                .parse()
                .with_context(|| format!("invalid listen address {host}:{port}"))?;
            info!("binding to {addr}");
            let listener = TcpListener::bind(addr).await?;

            axum::serve(listener, app).await?;
            Ok(())
        }
    }
}

fn build_pipeline(args: &SourceArgs) -> anyhow::Result<Pipeline> {
    let parser_config = match &args.parser_config {
        Some(path) => read_json::<ParserConfig>(path)?,
        None => ParserConfig::default(),
    };
    let parser = LineParser::new(parser_config).context("invalid parser configuration")?;
    let config = PipelineConfig {
        min_phonetic_len: args.min_phonetic_len,
        merge_key: if args.per_category {
            MergeKey::HeadwordAndCategory
        } else {
            MergeKey::Headword
        },
    };
    let normalizer = match &args.substitutions {
        Some(path) => Normalizer::new(read_json::<SubstitutionTable>(path)?),
        None => Normalizer::default(),
    };
    Ok(Pipeline::new(parser, normalizer, config))
}

fn build_lexicon(pipeline: &Pipeline, args: &SourceArgs) -> anyhow::Result<Lexicon> {
    let start = Instant::now();
    let mut lexicon = pipeline.new_lexicon();
    let mut total = IngestStats::default();
    for path in &args.sources {
        info!("loading {} (mode: {:?})", path.display(), args.load_mode);
        let doc = Document::load_with_mode(path, args.load_mode)
            .with_context(|| format!("loading dictionary text {}", path.display()))?;
        let stats = pipeline.ingest_document(&doc, &mut lexicon);
        total.absorb(&stats);
    }
    info!(
        "lexicon built in {} ms: {} entries from {} lines across {} source(s)",
        start.elapsed().as_millis(),
        lexicon.len(),
        total.lines_seen,
        args.sources.len()
    );
    Ok(lexicon)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn parse_load_mode(raw: &str) -> Result<LoadMode, String> {
    LoadMode::parse(raw)
        .ok_or_else(|| format!("unknown load mode '{raw}' (expected mmap or owned)"))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .init();
}
