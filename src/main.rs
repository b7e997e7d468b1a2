use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ynab_splitter::{run, Config, RunOptions, SplitterError, DEFAULT_CONFIG_FILE};

#[derive(Parser)]
#[command(
    name = "ynab-splitter",
    about = "Split every transaction of one YNAB category into two sub-transactions",
    version
)]
struct Cli {
    /// Log level: debug, info, warning, error
    #[arg(short, long, default_value = "info")]
    log: String,

    /// Don't make any changes
    #[arg(long)]
    dryrun: bool,

    /// Location of the config file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let directive = log_directive(&cli.log)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_file(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    let report = run(&config, RunOptions { dry_run: cli.dryrun })?;

    match &report.change_log_path {
        Some(path) => info!(
            "split {} transactions as device {}, final version {}, change-log {}",
            report.split_count,
            report.device.short_device_id,
            report.final_version,
            path.display()
        ),
        None => info!(
            "no transactions split as device {}, version stays {}",
            report.device.short_device_id, report.final_version
        ),
    }

    if let Some(ledger) = report.ledger_output {
        if cli.dryrun {
            info!("dry run: skipping ledger output copy to clipboard");
        } else {
            publish_ledger(&ledger);
        }
    }

    Ok(())
}

/// Map a `--log` level onto a tracing filter directive.
fn log_directive(level: &str) -> std::result::Result<&'static str, SplitterError> {
    match level.to_lowercase().as_str() {
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warning" | "warn" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(SplitterError::Config(format!("invalid log level {:?}", other))),
    }
}

#[cfg(feature = "clipboard")]
fn publish_ledger(ledger: &str) {
    let copied = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(ledger.to_string()));
    match copied {
        Ok(()) => info!("copied ledger output to clipboard"),
        Err(e) => {
            warn!("clipboard unavailable ({}), printing ledger output instead", e);
            println!("{}", ledger);
        }
    }
}

#[cfg(not(feature = "clipboard"))]
fn publish_ledger(ledger: &str) {
    warn!("built without clipboard support, printing ledger output");
    println!("{}", ledger);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_levels() {
        assert_eq!(log_directive("DEBUG").unwrap(), "debug");
        assert_eq!(log_directive("warning").unwrap(), "warn");
        assert_eq!(log_directive("error").unwrap(), "error");
    }

    #[test]
    fn test_unknown_log_level_is_config_error() {
        let err = log_directive("loud").unwrap_err();
        assert!(matches!(err, SplitterError::Config(_)));
        assert_eq!(err.to_string(), "config error: invalid log level \"loud\"");
    }
}
