use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime};
use tracing::info;

use maskmatch::discovery::{self, DiscoveryConfig};
use maskmatch::reader::ReaderConfig;
use maskmatch::{scan_files_concurrent, DocumentBuilder, RunStats, ScanJob};

#[derive(Parser, Debug)]
#[command(name = "maskmatch")]
#[command(about = "Find disguised keywords and phrases in text files")]
#[command(version)]
struct Args {
    /// Root directory to scan recursively
    root_dir: PathBuf,

    /// Query to look for (repeatable)
    #[arg(short = 'q', long = "query")]
    queries: Vec<String>,

    /// File with one query per line
    #[arg(long)]
    queries_file: Option<PathBuf>,

    /// Only scan files whose name ends with this suffix
    #[arg(long, default_value = ".txt")]
    suffix: String,

    /// Minimum percentage of matching positions per query word
    #[arg(long, default_value_t = 100)]
    min_score: u32,

    /// Lowercase text and queries
    #[arg(long)]
    lower: bool,

    /// Strip accents from text and queries
    #[arg(long)]
    fold_diacritics: bool,

    /// Collapse repeated characters in text and queries (digits excepted)
    #[arg(long)]
    collapse_repeats: bool,

    /// Treat files as HTML and scan only their text
    #[arg(long)]
    html: bool,

    /// Replace matches of this regex with a space before scanning
    #[arg(long)]
    replace: Option<String>,

    /// Split scanned text into words on this regex instead of single spaces
    #[arg(long)]
    split_regex: Option<String>,

    /// Abort on first error
    #[arg(long)]
    fail_fast: bool,

    /// Use memory-mapped I/O instead of async buffered
    #[arg(long)]
    use_mmap: bool,

    /// Suppress console progress bars
    #[arg(long)]
    no_progress: bool,

    /// Stats output file path
    #[arg(long, default_value = "scan_stats.json")]
    stats_out: PathBuf,
}

async fn load_queries(args: &Args) -> Result<Vec<String>> {
    let mut queries = args.queries.clone();
    if let Some(ref path) = args.queries_file {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read queries file {}", path.display()))?;
        queries.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
    }
    Ok(queries)
}

/// Text preparation shared by scanned files and queries
fn common_steps(mut builder: DocumentBuilder, args: &Args) -> DocumentBuilder {
    if args.lower {
        builder = builder.lowercase();
    }
    if args.fold_diacritics {
        builder = builder.fold_diacritics();
    }
    if args.collapse_repeats {
        builder = builder.collapse_repeats();
    }
    builder
}

fn build_recipes(args: &Args) -> Result<(DocumentBuilder, DocumentBuilder)> {
    let mut recipe = DocumentBuilder::new();
    if args.html {
        recipe = recipe.parse_html();
    }
    if let Some(ref pattern) = args.replace {
        recipe = recipe.replace(pattern, " ")?;
    }
    recipe = common_steps(recipe, args);
    if let Some(ref pattern) = args.split_regex {
        recipe = recipe.split_regex(pattern)?;
    }

    let query_recipe = common_steps(DocumentBuilder::new(), args).min_score(args.min_score);
    Ok((recipe, query_recipe))
}

fn validate_root(root_dir: &Path) -> Result<()> {
    if !root_dir.exists() {
        anyhow::bail!("Root directory does not exist: {}", root_dir.display());
    }
    if !root_dir.is_dir() {
        anyhow::bail!("Root path is not a directory: {}", root_dir.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the match reports, logs go to stderr
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();
    let run_start = SystemTime::now();
    let start = Instant::now();

    info!("Starting maskmatch");
    info!(?args, "Parsed CLI arguments");

    validate_root(&args.root_dir)?;

    let queries = load_queries(&args).await?;
    if queries.is_empty() {
        anyhow::bail!("No queries given, use --query or --queries-file");
    }
    if args.min_score > 100 {
        anyhow::bail!("--min-score must be between 0 and 100, got {}", args.min_score);
    }

    let (recipe, query_recipe) = build_recipes(&args)?;
    let reader_config = ReaderConfig {
        fail_fast: args.fail_fast,
        ..ReaderConfig::default()
    };
    let job = Arc::new(
        ScanJob::new(recipe, &query_recipe, queries.clone())
            .with_reader_config(reader_config)
            .with_mmap(args.use_mmap),
    );
    info!("Prepared {} queries", job.queries().len());

    let discovery_config = DiscoveryConfig {
        fail_fast: args.fail_fast,
        suffix: args.suffix.clone(),
    };
    info!("Starting file discovery in: {}", args.root_dir.display());
    let discovered = discovery::collect_discovered_files_parallel(&args.root_dir, discovery_config).await?;
    let mut paths: Vec<PathBuf> = discovered
        .into_iter()
        .filter(|f| f.error.is_none())
        .map(|f| f.path)
        .collect();
    paths.sort();
    info!("Found {} files ending with {}", paths.len(), args.suffix);

    let progress = if args.no_progress {
        None
    } else {
        let pb = ProgressBar::new(paths.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} files")?,
        );
        Some(pb)
    };

    let results = scan_files_concurrent(Arc::clone(&job), paths, progress.clone()).await?;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let mut file_stats = Vec::with_capacity(results.len());
    for (report, stats) in results {
        if !report.matches.is_empty() {
            println!("{}", serde_json::to_string(&report)?);
        }
        file_stats.push(stats);
    }

    let run_stats = RunStats::new(run_start, start.elapsed().as_millis() as u64, queries, file_stats);
    run_stats.write(&args.stats_out).await?;

    info!(
        "Scan complete: {} files processed, {} with matches, {} failed, {} matches total",
        run_stats.files_processed,
        run_stats.files_matched,
        run_stats.files_failed,
        run_stats.total_matches_found
    );
    info!("Run statistics written to {}", args.stats_out.display());

    Ok(())
}
