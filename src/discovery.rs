use anyhow::Result;
use futures::stream::{self, Stream, StreamExt};
use glob::{glob, Pattern};
use ignore::{WalkBuilder, WalkState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Configuration for document discovery
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Whether to fail fast on the first inaccessible file or keep going
    pub fail_fast: bool,
    /// File name suffix a document must end with
    pub suffix: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            suffix: ".txt".to_string(),
        }
    }
}

/// Result of file discovery validation
#[derive(Debug, Clone)]
pub struct FileValidation {
    pub path: PathBuf,
    pub error: Option<String>,
}

/// Discovers every file under `root_dir` whose name ends with the configured suffix.
/// Returns an async stream of validated file paths.
///
/// # Arguments
/// * `root_dir` - Root directory to search recursively
/// * `config` - Discovery configuration (suffix, fail_fast behavior)
pub fn discover_files(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> impl Stream<Item = Result<FileValidation>> {
    let root_path = root_dir.as_ref().to_path_buf();

    stream::unfold(
        DiscoveryState::new(root_path, config),
        |mut state| async move {
            state.next_file().await.map(|result| (result, state))
        },
    )
}

/// Parallel directory traversal streaming files as they are found
/// WHY: glob walks sequentially; the ignore walker spreads directories over threads
pub fn discover_files_parallel(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> impl Stream<Item = Result<FileValidation>> {
    let root_path = root_dir.as_ref().to_path_buf();
    let config = Arc::new(config);
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        info!("Starting directory traversal in: {}", root_path.display());
        let traversal_start = std::time::Instant::now();

        let walker = WalkBuilder::new(&root_path)
            .threads((num_cpus::get() / 2).max(1))
            .follow_links(false)
            .hidden(false)
            .ignore(false)
            .git_ignore(false)
            .build_parallel();

        let (found_tx, found_rx) = std::sync::mpsc::channel();
        let suffix = config.suffix.clone();

        // The walker blocks, keep it off the runtime
        std::thread::spawn(move || {
            walker.run(|| {
                let found_tx = found_tx.clone();
                let suffix = suffix.clone();
                Box::new(move |result| {
                    if let Ok(entry) = result {
                        let is_file = entry.file_type().is_some_and(|ft| ft.is_file());
                        let matches = entry
                            .file_name()
                            .to_str()
                            .is_some_and(|name| name.ends_with(suffix.as_str()));
                        if is_file && matches {
                            debug!("Found matching file: {}", entry.path().display());
                            if found_tx.send(entry.path().to_path_buf()).is_err() {
                                return WalkState::Quit;
                            }
                        }
                    }
                    WalkState::Continue
                })
            });
        });

        let mut file_count = 0;
        while let Ok(path) = found_rx.recv() {
            file_count += 1;
            match validate_path(path, &config).await {
                Ok(validation) => {
                    if tx.send(Ok(validation)).is_err() {
                        debug!("Receiver dropped, stopping discovery");
                        break;
                    }
                }
                Err(e) => {
                    if tx.send(Err(e)).is_err() {
                        debug!("Receiver dropped, stopping discovery");
                    }
                    break;
                }
            }
        }

        info!(
            "Discovery completed in {:.2}ms, streamed {} files",
            traversal_start.elapsed().as_millis(),
            file_count
        );
    });

    stream::unfold(rx, |mut receiver| async move {
        receiver.recv().await.map(|result| (result, receiver))
    })
}

/// Check that a discovered path is a readable file.
/// Inaccessible paths are an error only under fail_fast.
async fn validate_path(path: PathBuf, config: &DiscoveryConfig) -> Result<FileValidation> {
    debug!("Validating file: {}", path.display());

    let error = match fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => None,
        Ok(_) => Some(format!("Path is not a file: {}", path.display())),
        Err(e) => {
            let error = format!("Cannot access file {}: {}", path.display(), e);
            if config.fail_fast {
                return Err(anyhow::anyhow!(error));
            }
            Some(error)
        }
    };

    if let Some(ref error) = error {
        warn!("{}", error);
    }
    Ok(FileValidation { path, error })
}

/// Internal state for sequential discovery
struct DiscoveryState {
    root_dir: PathBuf,
    config: DiscoveryConfig,
    glob_iter: Option<glob::Paths>,
}

impl DiscoveryState {
    fn new(root_dir: PathBuf, config: DiscoveryConfig) -> Self {
        Self {
            root_dir,
            config,
            glob_iter: None,
        }
    }

    fn pattern(&self) -> String {
        format!(
            "{}/**/*{}",
            Pattern::escape(&self.root_dir.to_string_lossy()),
            Pattern::escape(&self.config.suffix)
        )
    }

    async fn next_file(&mut self) -> Option<Result<FileValidation>> {
        if self.glob_iter.is_none() {
            let pattern = self.pattern();
            debug!("Starting file discovery with pattern: {}", pattern);

            match glob(&pattern) {
                Ok(paths) => {
                    self.glob_iter = Some(paths);
                    info!("File discovery initialized for root: {}", self.root_dir.display());
                }
                Err(e) => {
                    return Some(Err(anyhow::anyhow!("Failed to create glob pattern: {}", e)));
                }
            }
        }

        loop {
            let next = self.glob_iter.as_mut()?.next();
            match next {
                Some(Ok(path)) => {
                    debug!("Found file: {}", path.display());
                    return Some(validate_path(path, &self.config).await);
                }
                Some(Err(e)) => {
                    let error_msg = format!("Glob iteration error: {e}");
                    warn!("{}", error_msg);
                    if self.config.fail_fast {
                        return Some(Err(anyhow::anyhow!(error_msg)));
                    }
                }
                None => {
                    info!("File discovery completed");
                    return None;
                }
            }
        }
    }
}

async fn collect_stream(
    stream: impl Stream<Item = Result<FileValidation>>,
) -> Result<Vec<FileValidation>> {
    let mut stream = Box::pin(stream);
    let mut files = Vec::new();
    while let Some(result) = stream.next().await {
        files.push(result?);
    }

    let valid_count = files.iter().filter(|f| f.error.is_none()).count();
    let invalid_count = files.len() - valid_count;
    if invalid_count > 0 {
        warn!("Found {} files with validation issues", invalid_count);
    }
    info!("File discovery summary: {} valid, {} invalid", valid_count, invalid_count);

    Ok(files)
}

/// Collect all discovered files into a Vec for easier processing
pub async fn collect_discovered_files(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> Result<Vec<FileValidation>> {
    collect_stream(discover_files(root_dir, config)).await
}

/// Collect all discovered files using parallel directory traversal
pub async fn collect_discovered_files_parallel(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> Result<Vec<FileValidation>> {
    collect_stream(discover_files_parallel(root_dir, config)).await
}

/// Paths of every valid document under `root_dir`, sorted
pub async fn find_documents<P: AsRef<Path>>(root_dir: P, suffix: &str) -> Result<Vec<PathBuf>> {
    let config = DiscoveryConfig {
        suffix: suffix.to_string(),
        ..DiscoveryConfig::default()
    };
    let mut paths: Vec<PathBuf> = collect_discovered_files_parallel(root_dir, config)
        .await?
        .into_iter()
        .filter(|v| v.error.is_none())
        .map(|v| v.path)
        .collect();
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
        let file_path = dir.join(name);
        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&file_path, content).await?;
        Ok(file_path)
    }

    fn file_names(files: &[FileValidation]) -> Vec<String> {
        let mut names: Vec<String> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_discover_files_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let files = collect_discovered_files(temp_dir.path(), DiscoveryConfig::default())
            .await
            .unwrap();
        assert_eq!(files.len(), 0);
    }

    #[tokio::test]
    async fn test_discover_files_by_suffix() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "post.txt", "compre cocaina").await.unwrap();
        create_test_file(temp_dir.path(), "nested/comment.txt", "nada aqui").await.unwrap();
        create_test_file(temp_dir.path(), "page.html", "<p>ignored</p>").await.unwrap();
        create_test_file(temp_dir.path(), "notes.txt.bak", "ignored").await.unwrap();

        let files = collect_discovered_files(temp_dir.path(), DiscoveryConfig::default())
            .await
            .unwrap();
        assert_eq!(file_names(&files), vec!["comment.txt", "post.txt"]);
        assert!(files.iter().all(|f| f.error.is_none()));
    }

    #[tokio::test]
    async fn test_custom_suffix() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "page.html", "<p>cocaina</p>").await.unwrap();
        create_test_file(temp_dir.path(), "post.txt", "cocaina").await.unwrap();

        let config = DiscoveryConfig {
            suffix: ".html".to_string(),
            ..DiscoveryConfig::default()
        };
        let files = collect_discovered_files(temp_dir.path(), config.clone()).await.unwrap();
        assert_eq!(file_names(&files), vec!["page.html"]);

        let files = collect_discovered_files_parallel(temp_dir.path(), config).await.unwrap();
        assert_eq!(file_names(&files), vec!["page.html"]);
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_still_discovered() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "valid.txt", "Olá, mundo!").await.unwrap();
        std::fs::write(temp_dir.path().join("invalid.txt"), [0xFF, 0xFE, 0xFD]).unwrap();

        let files = collect_discovered_files(temp_dir.path(), DiscoveryConfig::default())
            .await
            .unwrap();
        assert_eq!(files.len(), 2, "UTF-8 problems surface while reading, not discovering");
    }

    #[tokio::test]
    async fn test_fail_fast_with_accessible_files() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "valid.txt", "content").await.unwrap();

        let config = DiscoveryConfig {
            fail_fast: true,
            ..DiscoveryConfig::default()
        };
        let files = collect_discovered_files(temp_dir.path(), config).await.unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].error.is_none());
    }

    #[tokio::test]
    async fn test_parallel_vs_serial_discovery() {
        let temp_dir = TempDir::new().unwrap();
        for i in 0..5 {
            create_test_file(temp_dir.path(), &format!("dir{i}/doc{i}.txt"), "text")
                .await
                .unwrap();
        }

        let config = DiscoveryConfig::default();
        let serial = collect_discovered_files(temp_dir.path(), config.clone()).await.unwrap();
        let parallel = collect_discovered_files_parallel(temp_dir.path(), config).await.unwrap();

        assert_eq!(serial.len(), 5);
        assert_eq!(file_names(&serial), file_names(&parallel));
    }

    #[tokio::test]
    async fn test_find_documents_sorted() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "b.txt", "b").await.unwrap();
        create_test_file(temp_dir.path(), "a.txt", "a").await.unwrap();

        let paths = find_documents(temp_dir.path(), ".txt").await.unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0] < paths[1]);
    }
}
