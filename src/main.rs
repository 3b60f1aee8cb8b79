// src/main.rs

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use notion_site_sync::admin::{self, AdminState};
use notion_site_sync::{
    Action, AssetResolver, CloudflareImages, CommandLineInput, DatasetSpec, NotionHttpClient,
    NotionRepository, SyncConfig, SyncService,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_file_path = std::env::temp_dir().join("notion_site_sync.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stdout")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::debug!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Builds the service shared by every command.
fn build_service(config: &SyncConfig) -> anyhow::Result<SyncService> {
    let client = NotionHttpClient::new(&config.api_key, config.http_timeout)
        .context("could not build the Notion client")?;
    let repository: Arc<dyn NotionRepository> = Arc::new(client);

    let resolver = match &config.cloudflare {
        Some(credentials) => {
            let host = CloudflareImages::new(
                credentials.clone(),
                config.cloudflare_account_hash.clone(),
            )
            .context("could not build the Cloudflare Images client")?;
            log::info!("Expiring images will be re-hosted on Cloudflare Images");
            AssetResolver::new(Arc::new(host))
        }
        None => {
            log::warn!("Cloudflare Images is not configured; Notion image URLs are kept as-is and will expire");
            AssetResolver::passthrough()
        }
    };

    let service = SyncService::new(repository, resolver);
    Ok(match &config.data_root {
        Some(root) => service.with_data_root(root.clone()),
        None => service,
    })
}

async fn run_pull(
    service: &SyncService,
    datasets: &[&'static DatasetSpec],
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut failures = 0;
    for spec in datasets {
        match service.pull(spec, output.as_deref()).await {
            Ok(report) => {
                if report.database_created {
                    println!("+ Created database '{}'", spec.database_title);
                }
                println!(
                    "✓ [{}] {} records → {} ({} bytes)",
                    report.dataset,
                    report.records,
                    report.path.display(),
                    report.bytes_written
                );
                if report.failed_bodies > 0 {
                    eprintln!(
                        "⚠️  [{}] {} page bodies could not be fetched and kept their previous content",
                        report.dataset, report.failed_bodies
                    );
                }
            }
            Err(e) => {
                failures += 1;
                log::error!("Pull failed for {}: {}", spec.key, e);
            }
        }
    }
    log::info!("{} image(s) re-hosted", service.resolver().resolved_count());
    finish(failures, datasets.len(), "pull")
}

async fn run_push(
    service: &SyncService,
    datasets: &[&'static DatasetSpec],
    input: Option<PathBuf>,
    reset: bool,
) -> anyhow::Result<()> {
    let mut failures = 0;
    for spec in datasets {
        match service.push(spec, input.as_deref(), reset).await {
            Ok(report) => {
                if report.database_created {
                    println!("+ Created database '{}'", spec.database_title);
                }
                println!(
                    "✓ [{}] {} created, {} updated, {} archived, {} skipped",
                    report.dataset, report.created, report.updated, report.archived, report.skipped
                );
            }
            Err(e) => {
                failures += 1;
                log::error!("Push failed for {}: {}", spec.key, e);
            }
        }
    }
    finish(failures, datasets.len(), "push")
}

async fn run_rehost(
    service: &SyncService,
    datasets: &[&'static DatasetSpec],
    input: Option<PathBuf>,
) -> anyhow::Result<()> {
    if service.resolver().is_passthrough() {
        anyhow::bail!("rehost needs CLOUDFLARE_IMAGES_ACCOUNT_ID and CLOUDFLARE_IMAGES_API_TOKEN");
    }
    let mut failures = 0;
    for spec in datasets {
        match service.rehost(spec, input.as_deref()).await {
            Ok(report) => println!(
                "✓ [{}] {} of {} records updated in {}",
                report.dataset,
                report.updated,
                report.records,
                report.path.display()
            ),
            Err(e) => {
                failures += 1;
                log::error!("Rehost failed for {}: {}", spec.key, e);
            }
        }
    }
    log::info!("{} image(s) re-hosted", service.resolver().resolved_count());
    finish(failures, datasets.len(), "rehost")
}

async fn run_status(service: &SyncService, datasets: &[&'static DatasetSpec]) -> anyhow::Result<()> {
    let mut failures = 0;
    for spec in datasets {
        match service.status(spec).await {
            Ok(status) => println!(
                "{:<10} {:<24} notion={:<5} local={:<5} {}",
                status.key, status.database_id, status.notion_count, status.local_count, status.export_path
            ),
            Err(e) => {
                failures += 1;
                println!("{:<10} error: {}", spec.key, e);
            }
        }
    }
    finish(failures, datasets.len(), "status")
}

fn finish(failures: usize, total: usize, command: &str) -> anyhow::Result<()> {
    if failures > 0 {
        anyhow::bail!("{} of {} datasets failed during {}", failures, total, command);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose)?;

    let config = SyncConfig::resolve(cli)?;
    let mut service = build_service(&config)?;

    match config.action {
        Action::Pull {
            datasets,
            output,
            concurrency,
        } => {
            if let Some(n) = concurrency {
                service = service.with_concurrency(n);
            }
            run_pull(&service, &datasets, output).await
        }
        Action::Push {
            datasets,
            input,
            reset,
        } => run_push(&service, &datasets, input, reset).await,
        Action::Rehost { datasets, input } => run_rehost(&service, &datasets, input).await,
        Action::Status { datasets } => run_status(&service, &datasets).await,
        Action::Admin { host, port } => {
            let state = Arc::new(AdminState::new(service)?);
            admin::serve(state, &host, port).await?;
            Ok(())
        }
    }
}
