use crate::error::{ProcessingError, Result};
use crate::processors::AggregateStore;
use crate::readers::RecordParser;
use crate::utils::constants::{
    DEFAULT_BUFFER_SIZE, DEFAULT_MAX_REPORTED_ERRORS, PROGRESS_UPDATE_INTERVAL,
};
use crate::utils::ProgressReporter;
use memmap2::Mmap;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A line that was skipped because it could not be turned into an observation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineError {
    pub line_number: usize,
    pub reason: String,
}

/// Counts gathered while streaming one file into the store
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub lines_read: usize,
    pub records_ingested: usize,
    pub blank_lines: usize,
    pub numeric_substitutions: usize,
    pub skipped: usize,
    /// The first skipped lines, up to the reader's reporting cap
    pub skipped_lines: Vec<LineError>,
}

impl FileReport {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            ..Self::default()
        }
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped
    }
}

/// Streams TDV files line by line through a [`RecordParser`] into an [`AggregateStore`].
pub struct TdvReader {
    parser: RecordParser,
    use_mmap: bool,
    buffer_size: usize,
    max_reported_errors: usize,
}

impl TdvReader {
    pub fn new(parser: RecordParser) -> Self {
        Self {
            parser,
            use_mmap: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_reported_errors: DEFAULT_MAX_REPORTED_ERRORS,
        }
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Number of skipped lines kept with their reasons; the rest are only counted
    pub fn with_max_reported_errors(mut self, max_reported_errors: usize) -> Self {
        self.max_reported_errors = max_reported_errors;
        self
    }

    /// Open a file and ingest every well-formed line into `store`.
    ///
    /// Malformed lines are recorded in the returned report and skipped.
    /// Only failing to open or read the file is an error.
    pub fn read_into(
        &self,
        path: &Path,
        store: &mut AggregateStore,
        progress: &ProgressReporter,
    ) -> Result<FileReport> {
        let file = File::open(path).map_err(|source| ProcessingError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;

        let report = if self.use_mmap {
            self.read_mmap(file, path, store, progress)?
        } else {
            self.read_buffered(file, path, store, progress)?
        };

        info!(
            "{}: {} lines, {} records ingested, {} skipped",
            path.display(),
            report.lines_read,
            report.records_ingested,
            report.skipped_count()
        );

        Ok(report)
    }

    /// Read using buffered I/O; invalid UTF-8 is replaced rather than rejected
    fn read_buffered(
        &self,
        file: File,
        path: &Path,
        store: &mut AggregateStore,
        progress: &ProgressReporter,
    ) -> Result<FileReport> {
        let mut reader = BufReader::with_capacity(self.buffer_size, file);
        let mut report = FileReport::new(path);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }

            let line = String::from_utf8_lossy(&buf);
            self.ingest_line(&line, store, &mut report)?;
            Self::tick(&report, progress);
        }

        progress.increment((report.lines_read as u64) % PROGRESS_UPDATE_INTERVAL);
        Ok(report)
    }

    /// Read using memory-mapped I/O for large files
    fn read_mmap(
        &self,
        file: File,
        path: &Path,
        store: &mut AggregateStore,
        progress: &ProgressReporter,
    ) -> Result<FileReport> {
        let mut report = FileReport::new(path);

        // Zero-length files cannot be mapped on every platform
        if file.metadata()?.len() == 0 {
            return Ok(report);
        }

        let mmap = unsafe { Mmap::map(&file)? };

        for raw in mmap.split_inclusive(|&b| b == b'\n') {
            let line = String::from_utf8_lossy(raw);
            self.ingest_line(&line, store, &mut report)?;
            Self::tick(&report, progress);
        }

        progress.increment((report.lines_read as u64) % PROGRESS_UPDATE_INTERVAL);
        Ok(report)
    }

    fn ingest_line(
        &self,
        line: &str,
        store: &mut AggregateStore,
        report: &mut FileReport,
    ) -> Result<()> {
        report.lines_read += 1;

        if line.trim().is_empty() {
            report.blank_lines += 1;
            return Ok(());
        }

        match self.parser.parse_record(line) {
            Ok(parsed) => {
                store.ingest(&parsed.observation);
                report.records_ingested += 1;
                report.numeric_substitutions += parsed.substitutions;
            }
            Err(e) if e.is_line_recoverable() => {
                debug!(
                    "Skipping {} line {}: {}",
                    report.path.display(),
                    report.lines_read,
                    e
                );
                report.skipped += 1;
                if report.skipped_lines.len() < self.max_reported_errors {
                    report.skipped_lines.push(LineError {
                        line_number: report.lines_read,
                        reason: e.to_string(),
                    });
                }
            }
            Err(e) => return Err(e),
        }

        Ok(())
    }

    fn tick(report: &FileReport, progress: &ProgressReporter) {
        if report.lines_read as u64 % PROGRESS_UPDATE_INTERVAL == 0 {
            progress.increment(PROGRESS_UPDATE_INTERVAL);
        }
    }
}

impl Default for TdvReader {
    fn default() -> Self {
        Self::new(RecordParser::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_lines(lines: &[&str]) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        for line in lines {
            writeln!(file, "{}", line)?;
        }
        Ok(file)
    }

    #[test]
    fn test_short_line_skipped_and_reading_continues() -> Result<()> {
        let file = write_lines(&[
            "CA\t0\tgeo\t50\t0",
            "CA\t1000\tgeo\t60\t1\t20\t1\t1000\t290",
        ])?;

        let mut store = AggregateStore::new();
        let report = TdvReader::default().read_into(
            file.path(),
            &mut store,
            &ProgressReporter::silent(),
        )?;

        assert_eq!(report.lines_read, 2);
        assert_eq!(report.records_ingested, 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.skipped_lines.len(), 1);
        assert_eq!(report.skipped_lines[0].line_number, 1);

        let ca = store.get("CA").unwrap();
        assert_eq!(ca.record_count(), 1);
        assert_eq!(ca.average_humidity(), 60.0);

        Ok(())
    }

    #[test]
    fn test_blank_lines_not_counted_as_malformed() -> Result<()> {
        let file = write_lines(&["", "TN\t0\tgeo\t50\t0\t10\t0\t1000\t280", "   "])?;

        let mut store = AggregateStore::new();
        let report = TdvReader::default().read_into(
            file.path(),
            &mut store,
            &ProgressReporter::silent(),
        )?;

        assert_eq!(report.blank_lines, 2);
        assert_eq!(report.skipped_count(), 0);
        assert!(report.skipped_lines.is_empty());
        assert_eq!(report.records_ingested, 1);

        Ok(())
    }

    #[test]
    fn test_skipped_lines_capped_but_fully_counted() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        for _ in 0..5_000 {
            writeln!(file, "CA\t0\tgeo")?;
        }
        writeln!(file, "CA\t1000\tgeo\t60\t1\t20\t1\t1000\t290")?;

        for use_mmap in [false, true] {
            let mut store = AggregateStore::new();
            let report = TdvReader::default()
                .with_mmap(use_mmap)
                .with_max_reported_errors(3)
                .read_into(file.path(), &mut store, &ProgressReporter::silent())?;

            assert_eq!(report.skipped_count(), 5_000);
            assert_eq!(report.skipped_lines.len(), 3);
            assert_eq!(
                report
                    .skipped_lines
                    .iter()
                    .map(|e| e.line_number)
                    .collect::<Vec<_>>(),
                vec![1, 2, 3]
            );
            assert_eq!(report.records_ingested, 1);
            assert_eq!(store.get("CA").unwrap().record_count(), 1);
        }

        Ok(())
    }

    #[test]
    fn test_mmap_matches_buffered() -> Result<()> {
        let file = write_lines(&[
            "TN\t1428300000000\tgeo\t50\t0\t10\t0\t1000\t280",
            "WA\t1428300000000\tgeo\t70\t1\t90\t1\t1000\t260",
            "bad line",
            "TN\t1428303600000\tgeo\t40\t0\t30\t1\t1000\t300",
        ])?;

        let mut buffered = AggregateStore::new();
        let buffered_report = TdvReader::default().read_into(
            file.path(),
            &mut buffered,
            &ProgressReporter::silent(),
        )?;

        let mut mapped = AggregateStore::new();
        let mapped_report = TdvReader::default().with_mmap(true).read_into(
            file.path(),
            &mut mapped,
            &ProgressReporter::silent(),
        )?;

        assert_eq!(buffered_report, mapped_report);
        assert_eq!(buffered.list_states(), mapped.list_states());

        Ok(())
    }

    #[test]
    fn test_last_line_without_newline() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(file, "TN\t0\tgeo\t50\t0\t10\t0\t1000\t280")?;

        let mut store = AggregateStore::new();
        TdvReader::default().with_mmap(true).read_into(
            file.path(),
            &mut store,
            &ProgressReporter::silent(),
        )?;

        assert_eq!(store.get("TN").unwrap().record_count(), 1);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let mut store = AggregateStore::new();
        let result = TdvReader::default().read_into(
            Path::new("does/not/exist.tdv"),
            &mut store,
            &ProgressReporter::silent(),
        );

        assert!(matches!(result, Err(ProcessingError::FileOpen { .. })));
        assert!(store.is_empty());
    }
}
