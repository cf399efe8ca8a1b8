// WHY: Batch scanning of discovered files with per-file and per-run statistics
// File reads stay async while the CPU-bound matching runs on the blocking pool

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

use crate::matcher::{Document, DocumentBuilder, Matches};
use crate::reader::{read_document_mmap, AsyncFileReader, ReaderConfig};

/// Prepared candidate queries plus the recipe applied to every scanned file
#[derive(Debug, Clone)]
pub struct ScanJob {
    recipe: DocumentBuilder,
    queries: Vec<String>,
    candidates: Vec<Document>,
    reader_config: ReaderConfig,
    use_mmap: bool,
}

impl ScanJob {
    /// `recipe` prepares scanned files, `query_recipe` prepares each query
    pub fn new(recipe: DocumentBuilder, query_recipe: &DocumentBuilder, queries: Vec<String>) -> Self {
        let candidates = queries.iter().map(|q| query_recipe.build(q)).collect();
        Self {
            recipe,
            queries,
            candidates,
            reader_config: ReaderConfig::default(),
            use_mmap: false,
        }
    }

    pub fn with_reader_config(mut self, reader_config: ReaderConfig) -> Self {
        self.reader_config = reader_config;
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    pub fn candidates(&self) -> &[Document] {
        &self.candidates
    }

    pub fn fail_fast(&self) -> bool {
        self.reader_config.fail_fast
    }

    /// Prepare `text` and run every candidate against it
    pub fn scan_text(&self, text: &str) -> (Document, Matches) {
        let document = self.recipe.build(text);
        let matches = document.scan(&self.candidates);
        (document, matches)
    }

    async fn read_text(&self, path: &Path) -> Result<String> {
        if self.use_mmap {
            let owned = path.to_path_buf();
            return tokio::task::spawn_blocking(move || read_document_mmap(owned))
                .await
                .context("Memory-mapped read task failed")?;
        }
        let reader = AsyncFileReader::new(self.reader_config.clone());
        let (text, stats) = reader.read_document(path).await?;
        match stats.read_error {
            Some(error) => Err(anyhow::anyhow!(error)),
            None => Ok(text),
        }
    }
}

/// One matched query inside a file
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct QueryMatch {
    /// Position of the query in the query list
    pub index: usize,
    pub query: String,
    /// Matched text as it appears in the file
    pub span: String,
}

/// Matches found in one file, printed as one JSON line
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: String,
    pub matches: Vec<QueryMatch>,
}

impl FileReport {
    fn from_matches(path: &Path, queries: &[String], matches: Matches) -> Self {
        let matches = matches
            .into_iter()
            .map(|(index, span)| QueryMatch {
                index,
                query: queries.get(index).cloned().unwrap_or_default(),
                span,
            })
            .collect();
        Self {
            path: path.display().to_string(),
            matches,
        }
    }
}

/// Per-file processing statistics
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileStats {
    /// File path as discovered
    pub path: String,
    /// Number of characters of prepared text
    pub chars_processed: u64,
    /// Number of words the prepared text was split into
    pub words_scanned: u64,
    /// Number of queries that matched
    pub matches_found: u64,
    /// Read + prepare + scan time in milliseconds
    pub processing_time_ms: u64,
    /// Prepare + scan time in milliseconds (subset of processing_time_ms)
    pub scan_time_ms: u64,
    /// Throughput in characters per second
    pub chars_per_sec: f64,
    /// Processing status (success, failed)
    pub status: String,
    /// Error message if processing failed
    pub error: Option<String>,
}

impl FileStats {
    fn failed(path: &Path, processing_time_ms: u64, error: String) -> Self {
        Self {
            path: path.display().to_string(),
            chars_processed: 0,
            words_scanned: 0,
            matches_found: 0,
            processing_time_ms,
            scan_time_ms: 0,
            chars_per_sec: 0.0,
            status: "failed".to_string(),
            error: Some(error),
        }
    }
}

/// Read, prepare and scan one file.
/// Read failures become failed stats unless the job is fail_fast.
pub async fn scan_file(job: Arc<ScanJob>, path: PathBuf) -> Result<(FileReport, FileStats)> {
    let start = Instant::now();
    debug!("Scanning file: {}", path.display());

    let text = match job.read_text(&path).await {
        Ok(text) => text,
        Err(e) => {
            if job.fail_fast() {
                return Err(e.context(format!("Failed to scan {}", path.display())));
            }
            warn!("Skipping {}: {}", path.display(), e);
            let report = FileReport::from_matches(&path, job.queries(), Matches::new());
            let stats = FileStats::failed(&path, start.elapsed().as_millis() as u64, e.to_string());
            return Ok((report, stats));
        }
    };

    let scan_start = Instant::now();
    let scan_job = Arc::clone(&job);
    let (chars, words, matches) = tokio::task::spawn_blocking(move || {
        let (document, matches) = scan_job.scan_text(&text);
        (document.text().chars().count(), document.words().len(), matches)
    })
    .await
    .context("Scan task failed")?;
    let scan_time = scan_start.elapsed();
    let elapsed = start.elapsed();

    let chars_per_sec = if elapsed.as_secs_f64() > 0.0 {
        chars as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    let stats = FileStats {
        path: path.display().to_string(),
        chars_processed: chars as u64,
        words_scanned: words as u64,
        matches_found: matches.len() as u64,
        processing_time_ms: elapsed.as_millis() as u64,
        scan_time_ms: scan_time.as_millis() as u64,
        chars_per_sec,
        status: "success".to_string(),
        error: None,
    };
    debug!(
        "Scanned {}: {} words, {} matches in {}ms",
        stats.path, stats.words_scanned, stats.matches_found, stats.processing_time_ms
    );

    Ok((FileReport::from_matches(&path, job.queries(), matches), stats))
}

/// Scan files concurrently, at most one in flight per CPU.
/// Results come back in input order.
pub async fn scan_files_concurrent(
    job: Arc<ScanJob>,
    paths: Vec<PathBuf>,
    progress: Option<ProgressBar>,
) -> Result<Vec<(FileReport, FileStats)>> {
    let concurrency = num_cpus::get().max(1);
    info!("Scanning {} files with concurrency {}", paths.len(), concurrency);

    let mut results: Vec<(usize, Result<(FileReport, FileStats)>)> =
        stream::iter(paths.into_iter().enumerate().map(|(idx, path)| {
            let job = Arc::clone(&job);
            let progress = progress.clone();
            async move {
                let result = scan_file(job, path).await;
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                (idx, result)
            }
        }))
        .buffer_unordered(concurrency)
        .collect()
        .await;

    results.sort_by_key(|(idx, _)| *idx);
    results.into_iter().map(|(_, result)| result).collect()
}

/// Aggregate statistics for a whole run, written as pretty JSON
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunStats {
    /// Seconds since the Unix epoch when the run started
    pub run_start: u64,
    pub total_processing_time_ms: u64,
    pub total_chars_processed: u64,
    pub total_words_scanned: u64,
    pub total_matches_found: u64,
    pub overall_chars_per_sec: f64,
    pub queries: Vec<String>,
    pub files_processed: u64,
    pub files_matched: u64,
    pub files_failed: u64,
    pub file_stats: Vec<FileStats>,
}

impl RunStats {
    pub fn new(run_start: SystemTime, total_processing_time_ms: u64, queries: Vec<String>, file_stats: Vec<FileStats>) -> Self {
        let run_start = run_start
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let succeeded = file_stats.iter().filter(|s| s.status == "success");
        let total_chars_processed: u64 = succeeded.clone().map(|s| s.chars_processed).sum();
        let total_words_scanned: u64 = succeeded.clone().map(|s| s.words_scanned).sum();
        let total_matches_found: u64 = succeeded.clone().map(|s| s.matches_found).sum();
        let files_processed = succeeded.clone().count() as u64;
        let files_matched = succeeded.filter(|s| s.matches_found > 0).count() as u64;
        let files_failed = file_stats.len() as u64 - files_processed;

        let overall_chars_per_sec = if total_processing_time_ms > 0 {
            total_chars_processed as f64 / (total_processing_time_ms as f64 / 1000.0)
        } else {
            0.0
        };

        Self {
            run_start,
            total_processing_time_ms,
            total_chars_processed,
            total_words_scanned,
            total_matches_found,
            overall_chars_per_sec,
            queries,
            files_processed,
            files_matched,
            files_failed,
            file_stats,
        }
    }

    pub async fn write(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write stats to {}", path.display()))?;
        Ok(())
    }
}
