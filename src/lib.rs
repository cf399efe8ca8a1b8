pub mod discovery;
pub mod matcher;
pub mod reader;
pub mod scan_report;

// Re-export main types for convenient access
pub use matcher::{
    Document, DocumentBuilder, Matches, ScorePolicy, Tokenizer, Tokens
};

// Re-export batch scanning types and functions for the binary and benchmarks
pub use scan_report::{
    FileReport, FileStats, QueryMatch, RunStats, ScanJob,
    scan_file, scan_files_concurrent
};
