use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::writers::ReportFormat;

#[derive(Parser, Debug)]
#[command(name = "climate-summary")]
#[command(about = "Per-state climate summaries from NOAA tab-delimited (TDV) files")]
#[command(version)]
pub struct Cli {
    /// TDV files to analyze, processed in the order given
    #[arg(required = true, value_name = "TDV_FILE")]
    pub files: Vec<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    #[arg(short, long, help = "Write the report to a file instead of stdout")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Configuration file (TOML, JSON or YAML)")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Warn about files that cannot be opened instead of aborting")]
    pub skip_unreadable: bool,

    #[arg(long, help = "Reject lines with unparseable numbers instead of reading them as 0")]
    pub strict_numeric: bool,

    #[arg(long, help = "Read input files through a memory map")]
    pub mmap: bool,

    #[arg(long, help = "Show timestamps in local time instead of UTC")]
    pub local_time: bool,

    #[arg(long, default_value = "false", help = "Only check the input and print an ingestion report")]
    pub validate_only: bool,

    #[arg(short, long, action = ArgAction::Count, help = "Increase logging verbosity (-v, -vv, -vvv)")]
    pub verbose: u8,

    #[arg(short, long, help = "Suppress progress output and non-error logging")]
    pub quiet: bool,
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}
