use anyhow::{Context, Result};
use memmap2::Mmap;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// Configuration for file reading behavior
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Whether to fail fast on first error or continue processing
    pub fail_fast: bool,
    /// Buffer size for async reading (default: 8KB)
    pub buffer_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            buffer_size: 8192,
        }
    }
}

/// Statistics for file reading operations
#[derive(Debug, Clone)]
pub struct ReadStats {
    pub file_path: String,
    pub lines_read: u64,
    pub bytes_read: u64,
    pub duration_ms: u64,
    pub read_error: Option<String>,
}

impl ReadStats {
    fn failed(path: &Path, lines_read: u64, bytes_read: u64, duration_ms: u64, error: String) -> Self {
        Self {
            file_path: path.display().to_string(),
            lines_read,
            bytes_read,
            duration_ms,
            read_error: Some(error),
        }
    }
}

/// Async file reader that streams file contents line-by-line
pub struct AsyncFileReader {
    config: ReaderConfig,
}

impl AsyncFileReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read file contents line-by-line with async buffered I/O.
    /// Without fail_fast, errors come back inside the stats with whatever lines were read.
    pub async fn read_file_lines<P: AsRef<Path>>(
        &self,
        file_path: P,
    ) -> Result<(Vec<String>, ReadStats)> {
        let path = file_path.as_ref();
        let start_time = std::time::Instant::now();

        debug!("Starting async read of file: {}", path.display());

        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) => {
                let error_msg = format!("Failed to open file {}: {}", path.display(), e);
                warn!("{}", error_msg);
                if self.config.fail_fast {
                    return Err(anyhow::anyhow!(error_msg));
                }
                let elapsed = start_time.elapsed().as_millis() as u64;
                return Ok((Vec::new(), ReadStats::failed(path, 0, 0, elapsed, error_msg)));
            }
        };

        let reader = BufReader::with_capacity(self.config.buffer_size, file);
        let mut lines = reader.lines();
        let mut result_lines = Vec::new();
        let mut line_count = 0u64;
        let mut byte_count = 0u64;

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    byte_count += line.len() as u64 + 1;
                    line_count += 1;
                    result_lines.push(line);
                }
                Ok(None) => break,
                Err(e) => {
                    let error_msg = format!(
                        "UTF-8 decoding error in {} at line {}: {}",
                        path.display(),
                        line_count + 1,
                        e
                    );
                    warn!("{}", error_msg);
                    if self.config.fail_fast {
                        return Err(anyhow::anyhow!(error_msg));
                    }
                    let elapsed = start_time.elapsed().as_millis() as u64;
                    let stats = ReadStats::failed(path, line_count, byte_count, elapsed, error_msg);
                    return Ok((result_lines, stats));
                }
            }
        }

        let stats = ReadStats {
            file_path: path.display().to_string(),
            lines_read: line_count,
            bytes_read: byte_count,
            duration_ms: start_time.elapsed().as_millis() as u64,
            read_error: None,
        };

        debug!(
            "Read {}: {} lines, {} bytes in {}ms",
            path.display(),
            line_count,
            byte_count,
            stats.duration_ms
        );
        Ok((result_lines, stats))
    }

    /// Whole document text with line breaks turned into word separators
    pub async fn read_document<P: AsRef<Path>>(&self, file_path: P) -> Result<(String, ReadStats)> {
        let (lines, stats) = self.read_file_lines(file_path).await?;
        Ok((lines.join(" "), stats))
    }
}

/// Convenience function for reading a single file with default configuration
pub async fn read_file_async<P: AsRef<Path>>(file_path: P) -> Result<String> {
    let reader = AsyncFileReader::new(ReaderConfig::default());
    let (lines, stats) = reader.read_file_lines(file_path).await?;
    if let Some(error) = stats.read_error {
        anyhow::bail!(error);
    }
    Ok(lines.join("\n"))
}

/// Memory-mapped read of a whole document, line breaks turned into word separators.
/// Blocking; call from a blocking context.
pub fn read_document_mmap<P: AsRef<Path>>(file_path: P) -> Result<String> {
    let path = file_path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open file {}", path.display()))?;
    if file.metadata()?.len() == 0 {
        return Ok(String::new());
    }
    // SAFETY: the mapping is read-only and dropped before returning
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to map file {}", path.display()))?;
    let content = std::str::from_utf8(&mmap)
        .with_context(|| format!("UTF-8 decoding error in {}", path.display()))?;
    Ok(content.lines().collect::<Vec<_>>().join(" "))
}
