// src/config.rs
use crate::constants::{ADMIN_DEFAULT_HOST, ADMIN_DEFAULT_PORT, NOTION_HTTP_TIMEOUT_SECS};
use crate::datasets::{select_datasets, DatasetSpec, ALL_DATASETS};
use crate::error::AppError;
use crate::types::{ApiKey, CloudflareCredentials, ValidationError};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

const MAX_CONCURRENCY: usize = 32;

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Directory the datasets' export paths are relative to
    #[arg(long, global = true)]
    pub data_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Export Notion databases to the site's JSON files
    Pull {
        /// Dataset key (sns, writing, note, dev, ec, affiling) or "all"
        #[arg(long, default_value = ALL_DATASETS)]
        dataset: String,

        /// Write to this file instead of the dataset's export path
        #[arg(long)]
        output: Option<PathBuf>,

        /// Number of page bodies rendered concurrently (default: auto)
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Upsert local JSON records into Notion by title
    Push {
        /// Dataset key or "all"
        #[arg(long, default_value = ALL_DATASETS)]
        dataset: String,

        /// Read from this file instead of the dataset's export path
        #[arg(long)]
        input: Option<PathBuf>,

        /// Archive every existing page before pushing
        #[arg(long, default_value_t = false)]
        reset: bool,
    },

    /// Re-host expiring image URLs inside existing JSON files
    Rehost {
        /// Dataset key or "all"
        #[arg(long, default_value = ALL_DATASETS)]
        dataset: String,

        /// Rewrite this file instead of the dataset's export path
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Show database ids and record counts
    Status {
        /// Dataset key or "all"
        #[arg(long, default_value = ALL_DATASETS)]
        dataset: String,
    },

    /// Serve the admin dashboard
    Admin {
        #[arg(long, default_value = ADMIN_DEFAULT_HOST)]
        host: String,

        #[arg(long, default_value_t = ADMIN_DEFAULT_PORT)]
        port: u16,
    },
}

/// A validated command, ready to run.
#[derive(Debug, Clone)]
pub enum Action {
    Pull {
        datasets: Vec<&'static DatasetSpec>,
        output: Option<PathBuf>,
        concurrency: Option<usize>,
    },
    Push {
        datasets: Vec<&'static DatasetSpec>,
        input: Option<PathBuf>,
        reset: bool,
    },
    Rehost {
        datasets: Vec<&'static DatasetSpec>,
        input: Option<PathBuf>,
    },
    Status {
        datasets: Vec<&'static DatasetSpec>,
    },
    Admin {
        host: String,
        port: u16,
    },
}

/// Resolved configuration: credentials, timeouts and the action to run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub api_key: ApiKey,
    /// Without credentials, image URLs are left as they are.
    pub cloudflare: Option<CloudflareCredentials>,
    pub cloudflare_account_hash: Option<String>,
    pub http_timeout: Duration,
    pub data_root: Option<PathBuf>,
    pub verbose: bool,
    pub action: Action,
}

impl SyncConfig {
    /// Resolves a complete configuration from CLI input and the process environment.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        Self::resolve_with(cli, |name| std::env::var(name).ok())
    }

    /// Like [`SyncConfig::resolve`], reading variables through `env`.
    pub fn resolve_with(
        cli: CommandLineInput,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let read = |name: &str| env(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let token = read("NOTION_API_TOKEN")
            .or_else(|| read("NOTION_API_KEY"))
            .ok_or_else(|| {
                AppError::MissingConfiguration(
                    "NOTION_API_TOKEN environment variable not set".to_string(),
                )
            })?;
        let api_key = ApiKey::new(token)?;

        let cloudflare = match (
            read("CLOUDFLARE_IMAGES_ACCOUNT_ID"),
            read("CLOUDFLARE_IMAGES_API_TOKEN"),
        ) {
            (Some(account), Some(token)) => Some(CloudflareCredentials::new(account, token)?),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ValidationError::EmptyField("CLOUDFLARE_IMAGES_API_TOKEN").into())
            }
            (None, Some(_)) => {
                return Err(ValidationError::EmptyField("CLOUDFLARE_IMAGES_ACCOUNT_ID").into())
            }
        };

        let http_timeout = match read("NOTION_SYNC_HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ValidationError::InvalidSetting {
                        name: "NOTION_SYNC_HTTP_TIMEOUT_SECS",
                        value: raw,
                    }
                    .into())
                }
            },
            None => Duration::from_secs(NOTION_HTTP_TIMEOUT_SECS),
        };

        Ok(SyncConfig {
            api_key,
            cloudflare,
            cloudflare_account_hash: read("CLOUDFLARE_IMAGES_ACCOUNT_HASH"),
            http_timeout,
            data_root: cli.data_root,
            verbose: cli.verbose,
            action: resolve_action(cli.command)?,
        })
    }
}

fn resolve_action(command: Command) -> Result<Action, ValidationError> {
    Ok(match command {
        Command::Pull {
            dataset,
            output,
            concurrency,
        } => {
            let datasets = select_datasets(&dataset)?;
            if output.is_some() && datasets.len() > 1 {
                return Err(ValidationError::ConflictingOptions(
                    "--output needs a single --dataset".to_string(),
                ));
            }
            if let Some(n) = concurrency {
                if n == 0 || n > MAX_CONCURRENCY {
                    return Err(ValidationError::OutOfBounds {
                        value: n as u64,
                        min: 1,
                        max: MAX_CONCURRENCY as u64,
                    });
                }
            }
            Action::Pull {
                datasets,
                output,
                concurrency,
            }
        }
        Command::Push {
            dataset,
            input,
            reset,
        } => {
            let datasets = select_datasets(&dataset)?;
            if input.is_some() && datasets.len() > 1 {
                return Err(ValidationError::ConflictingOptions(
                    "--input needs a single --dataset".to_string(),
                ));
            }
            Action::Push {
                datasets,
                input,
                reset,
            }
        }
        Command::Rehost { dataset, input } => {
            let datasets = select_datasets(&dataset)?;
            if input.is_some() && datasets.len() > 1 {
                return Err(ValidationError::ConflictingOptions(
                    "--input needs a single --dataset".to_string(),
                ));
            }
            Action::Rehost { datasets, input }
        }
        Command::Status { dataset } => Action::Status {
            datasets: select_datasets(&dataset)?,
        },
        Command::Admin { host, port } => Action::Admin { host, port },
    })
}
