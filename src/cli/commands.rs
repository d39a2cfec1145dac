use crate::cli::args::Cli;
use crate::config::Settings;
use crate::error::Result;
use crate::processors::{ClimateAnalyzer, UnreadableFilePolicy};
use crate::readers::NumericPolicy;
use crate::writers::{ReportFormat, ReportWriter};
use std::fs::File;
use std::io::BufWriter;
use tracing::debug;

pub fn run(cli: Cli) -> Result<()> {
    setup_logging(&cli);

    let settings = resolve_settings(&cli)?;

    // JSON/CSV on stdout must not be interleaved with status lines
    let stdout_is_report = cli.output.is_none() && cli.format != ReportFormat::Text;
    let analyzer = ClimateAnalyzer::from_settings(&settings)
        .with_announce_files(cli.validate_only || !stdout_is_report)
        .with_progress(cli.show_progress());

    let (store, ingest_report) = analyzer.analyze_files(&cli.files)?;

    if cli.validate_only {
        println!("\n{}", ingest_report.generate_summary(settings.max_reported_errors));

        if ingest_report.is_clean() {
            println!("✅ All lines parsed");
        } else {
            println!(
                "⚠️  Skipped {} malformed lines, {} unreadable files",
                ingest_report.total_skipped(),
                ingest_report.unreadable.len()
            );
        }
        return Ok(());
    }

    let writer = ReportWriter::new()
        .with_format(cli.format)
        .with_local_time(settings.local_time);

    match &cli.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            writer.write_report(&store, BufWriter::new(File::create(path)?))?;
            println!("Report for {} states written to {}", store.len(), path.display());
        }
        None => {
            let stdout = std::io::stdout();
            writer.write_report(&store, stdout.lock())?;
        }
    }

    Ok(())
}

/// Config file and environment first, then command-line flags on top
pub fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;

    if cli.skip_unreadable {
        settings.unreadable_file_policy = UnreadableFilePolicy::Skip;
    }
    if cli.strict_numeric {
        settings.numeric_policy = NumericPolicy::Strict;
    }
    if cli.mmap {
        settings.use_mmap = true;
    }
    if cli.local_time {
        settings.local_time = true;
    }

    debug!("Effective settings: {:?}", settings);
    Ok(settings)
}

/// Set up structured logging on stderr; `RUST_LOG` overrides the flag-derived level
fn setup_logging(cli: &Cli) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let log_level = cli.log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("climate_summary={}", log_level)));

    // A subscriber may already be installed when run() is called more than once
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init();

    debug!("Logging initialized at level: {}", log_level);
}
