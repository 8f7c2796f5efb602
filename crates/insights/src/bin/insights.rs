//! Insights CLI - publish Code Insights reports to Bitbucket Server.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing::info;
use tracing_subscriber::EnvFilter;

use insights::{
    CreateAnnotationsRequest, CreateReportRequest, InsightsClient, InsightsError,
    ServerConnection, CODE_INSIGHTS_VERSION,
};

/// Insights CLI - Bitbucket Server Code Insights publisher.
#[derive(Parser)]
#[command(name = "insights")]
#[command(about = "Publish analysis reports and annotations to Bitbucket Server")]
struct Cli {
    /// Bitbucket Server base URL. Read from `BITBUCKET_URL` together with
    /// the token when neither flag is given.
    #[arg(long, requires = "token")]
    url: Option<String>,

    /// Personal access token. Read from `BITBUCKET_TOKEN` together with the
    /// URL when neither flag is given.
    #[arg(long, requires = "url")]
    token: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Commit coordinates shared by the report and annotation commands.
#[derive(Args)]
struct CommitArgs {
    /// Project key.
    #[arg(long)]
    project: String,

    /// Repository slug.
    #[arg(long)]
    repo: String,

    /// Commit hash.
    #[arg(long)]
    commit: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the server's application properties.
    Properties,

    /// Check whether the server supports Code Insights.
    Check,

    /// Create or replace the report on a commit.
    Report {
        #[command(flatten)]
        target: CommitArgs,

        /// JSON file containing the report.
        #[arg(long)]
        file: PathBuf,
    },

    /// Add annotations to the report on a commit.
    Annotate {
        #[command(flatten)]
        target: CommitArgs,

        /// JSON file containing `{"annotations": [...]}`.
        #[arg(long)]
        file: PathBuf,
    },

    /// Delete all annotations from the report on a commit.
    DeleteAnnotations {
        #[command(flatten)]
        target: CommitArgs,
    },
}

/// Explicit flags win; otherwise fall back to the environment.
fn resolve_connection(cli: &Cli) -> Result<ServerConnection, InsightsError> {
    match (&cli.url, &cli.token) {
        (Some(url), Some(token)) => ServerConnection::new(url, token),
        _ => ServerConnection::from_env(),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let connection = resolve_connection(&cli).context("Invalid Bitbucket connection")?;
    let client = InsightsClient::new(connection).context("Failed to create Bitbucket client")?;

    match cli.command {
        Commands::Properties => {
            let props = client
                .get_server_properties()
                .await
                .context("Failed to fetch application properties")?;
            println!("{}", serde_json::to_string_pretty(&props)?);
        }

        Commands::Check => {
            if client.supports_code_insights().await {
                println!("Code Insights supported");
            } else {
                bail!("Code Insights not available (requires Bitbucket Server {CODE_INSIGHTS_VERSION} or later)");
            }
        }

        Commands::Report { target, file } => {
            let report: CreateReportRequest = read_json(&file)?;
            client
                .create_report(&target.project, &target.repo, &target.commit, &report)
                .await
                .context("Failed to publish report")?;
        }

        Commands::Annotate { target, file } => {
            let annotations: CreateAnnotationsRequest = read_json(&file)?;
            info!(count = annotations.len(), "Publishing annotations");
            client
                .create_annotations(&target.project, &target.repo, &target.commit, &annotations)
                .await
                .context("Failed to publish annotations")?;
        }

        Commands::DeleteAnnotations { target } => {
            client
                .delete_annotations(&target.project, &target.repo, &target.commit)
                .await
                .context("Failed to delete annotations")?;
        }
    }

    Ok(())
}
