use std::io::{self, BufRead};
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::{StreamExt, stream};
use mailrisk_lib::lists;
use mailrisk_lib::{
    ApiKeyPool, ClassificationVerdict, Classifier, DnsEvidenceResolver, ErrorLog, ReputationClient,
};
use tracing::debug;

mod args;
mod logger;
mod output;

use args::{Cli, Commands};
use output::StatusReport;

/// Addresses classified at the same time in batch mode.
const BATCH_CONCURRENCY: usize = 8;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose, cli.log_json);

    let settings = cli.settings()?;
    let emails: Vec<String> = if cli.stdin {
        let mut emails = Vec::new();
        for line in io::stdin().lock().lines() {
            let line = line.context("read stdin")?;
            let line = line.trim();
            if !line.is_empty() {
                emails.push(line.to_string());
            }
        }
        emails
    } else {
        match &cli.cmd {
            Some(Commands::Check { emails }) => emails.clone(),
            Some(Commands::Status) => Vec::new(),
            None => {
                Cli::clap_command().print_help()?;
                println!();
                return Ok(());
            }
        }
    };

    let loaded = lists::load(&settings.data_dir)
        .await
        .with_context(|| format!("load data from {}", settings.data_dir.display()))?;
    let store = Arc::new(loaded.store);

    if !cli.stdin && matches!(cli.cmd, Some(Commands::Status)) {
        let report = StatusReport {
            data_dir: settings.data_dir.display().to_string(),
            files: store.file_status(),
            counts: store.counts(),
        };
        return output::write_status(&report, &cli);
    }

    let log = ErrorLog::new(store.files().error_log());
    let evidence = DnsEvidenceResolver::from_settings(&settings.dns, log.clone());
    let reputation = ReputationClient::new(
        &settings.reputation,
        ApiKeyPool::new(loaded.api_keys),
        log.clone(),
    )
    .context("build reputation client")?;
    let classifier = Classifier::new(store, evidence, reputation, log);

    debug!(count = emails.len(), "classifying addresses");
    let rows: Vec<ClassificationVerdict> = stream::iter(&emails)
        .map(|email| classifier.classify(email))
        .buffered(BATCH_CONCURRENCY)
        .collect()
        .await;

    output::write_reports(&rows, &cli)?;

    // exit codes: 0 OK, 2 disposable found, 1 fatal
    if output::any_disposable(&rows) {
        std::process::exit(2);
    }
    Ok(())
}
