use crate::config::Settings;
use crate::error::{ProcessingError, Result};
use crate::processors::AggregateStore;
use crate::readers::{FileReport, RecordParser, TdvReader};
use crate::utils::ProgressReporter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Whether an input file that cannot be opened ends the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnreadableFilePolicy {
    /// Stop at the first file that cannot be opened
    #[default]
    Abort,
    /// Warn and carry on; fail only when no file could be read
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnreadableFile {
    pub path: PathBuf,
    pub error: String,
}

/// Everything learned about the input while building the store
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    pub files: Vec<FileReport>,
    pub unreadable: Vec<UnreadableFile>,
}

impl IngestReport {
    pub fn total_lines(&self) -> usize {
        self.files.iter().map(|f| f.lines_read).sum()
    }

    pub fn total_records(&self) -> usize {
        self.files.iter().map(|f| f.records_ingested).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.files.iter().map(|f| f.skipped_count()).sum()
    }

    pub fn total_substitutions(&self) -> usize {
        self.files.iter().map(|f| f.numeric_substitutions).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.unreadable.is_empty() && self.total_skipped() == 0
    }

    /// Human-readable integrity summary listing up to `max_errors` skipped lines per file
    pub fn generate_summary(&self, max_errors: usize) -> String {
        let mut summary = String::new();

        summary.push_str("=== Ingestion Report ===\n");
        summary.push_str(&format!("Files Read: {}\n", self.files.len()));
        summary.push_str(&format!("Lines Read: {}\n", self.total_lines()));
        summary.push_str(&format!("Records Ingested: {}\n", self.total_records()));
        summary.push_str(&format!("Malformed Lines Skipped: {}\n", self.total_skipped()));
        summary.push_str(&format!(
            "Numeric Fields Defaulted to 0: {}\n",
            self.total_substitutions()
        ));

        for file in &self.files {
            summary.push_str(&format!(
                "\n{}: {} lines, {} records, {} blank, {} skipped\n",
                file.path.display(),
                file.lines_read,
                file.records_ingested,
                file.blank_lines,
                file.skipped_count()
            ));

            let listed = file.skipped_lines.len().min(max_errors);
            for error in &file.skipped_lines[..listed] {
                summary.push_str(&format!(
                    "  line {}: {}\n",
                    error.line_number, error.reason
                ));
            }

            if file.skipped_count() > listed {
                summary.push_str(&format!(
                    "  ... and {} more\n",
                    file.skipped_count() - listed
                ));
            }
        }

        if !self.unreadable.is_empty() {
            summary.push_str(&format!("\nUnreadable Files: {}\n", self.unreadable.len()));
            for file in &self.unreadable {
                summary.push_str(&format!("  {}: {}\n", file.path.display(), file.error));
            }
        }

        summary
    }
}

/// Drives a run: reads each file in argument order into one shared store.
pub struct ClimateAnalyzer {
    reader: TdvReader,
    unreadable_policy: UnreadableFilePolicy,
    announce_files: bool,
    show_progress: bool,
}

impl ClimateAnalyzer {
    pub fn new(reader: TdvReader) -> Self {
        Self {
            reader,
            unreadable_policy: UnreadableFilePolicy::Abort,
            announce_files: false,
            show_progress: false,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let parser = RecordParser::new()
            .with_numeric_policy(settings.numeric_policy)
            .with_max_code_len(settings.max_code_len);
        let reader = TdvReader::new(parser)
            .with_mmap(settings.use_mmap)
            .with_buffer_size(settings.buffer_size)
            .with_max_reported_errors(settings.max_reported_errors);

        Self::new(reader).with_unreadable_policy(settings.unreadable_file_policy)
    }

    pub fn with_unreadable_policy(mut self, policy: UnreadableFilePolicy) -> Self {
        self.unreadable_policy = policy;
        self
    }

    /// Print `Opening file: <path>` on stdout before each file is read
    pub fn with_announce_files(mut self, announce_files: bool) -> Self {
        self.announce_files = announce_files;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Ingest every file, in order, into a single store
    pub fn analyze_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
    ) -> Result<(AggregateStore, IngestReport)> {
        let mut store = AggregateStore::new();
        let mut report = IngestReport::default();

        for path in paths {
            let path = path.as_ref();

            let progress = ProgressReporter::new_spinner(
                &format!("Reading {}", path.display()),
                !self.show_progress,
            );

            if self.announce_files {
                progress.println(&format!("Opening file: {}", path.display()));
            }

            match self.reader.read_into(path, &mut store, &progress) {
                Ok(file_report) => {
                    progress.finish_with_message(&format!(
                        "{}: {} records",
                        path.display(),
                        file_report.records_ingested
                    ));
                    report.files.push(file_report);
                }
                Err(e @ ProcessingError::FileOpen { .. })
                    if self.unreadable_policy == UnreadableFilePolicy::Skip =>
                {
                    warn!("Skipping unreadable file: {}", e);
                    progress.finish_with_message(&format!("{}: skipped", path.display()));
                    report.unreadable.push(UnreadableFile {
                        path: path.to_path_buf(),
                        error: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        if report.files.is_empty() && !paths.is_empty() {
            return Err(ProcessingError::NoReadableInput {
                attempted: paths.len(),
            });
        }

        info!(
            "Ingested {} records for {} states from {} files",
            report.total_records(),
            store.len(),
            report.files.len()
        );

        Ok((store, report))
    }
}

impl Default for ClimateAnalyzer {
    fn default() -> Self {
        Self::new(TdvReader::default())
    }
}
