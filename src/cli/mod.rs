use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::api::create_router;
use crate::application::BankService;
use crate::config::AppConfig;
use crate::io::StatementExporter;
use crate::storage::{Repository, database_url};

/// Minibank - a small bank account service
#[derive(Parser)]
#[command(name = "minibank")]
#[command(about = "Bank accounts with deposits, withdrawals and daily withdrawal limits")]
#[command(version)]
pub struct Cli {
    /// Database file path (overrides DATABASE_PATH)
    #[arg(short, long)]
    pub database: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Run the HTTP API
    Serve {
        /// Address to bind (overrides APP_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Export an account's transaction history
    Statement {
        /// Account number
        account_number: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = StatementFormat::Csv)]
        format: StatementFormat,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatementFormat {
    Csv,
    Json,
}

impl Cli {
    /// Resolve configuration: `.env`, then the environment, then flags.
    fn config(&self) -> Result<AppConfig> {
        dotenvy::dotenv().ok();
        let mut config = AppConfig::from_env().context("Invalid configuration")?;
        if let Some(database) = &self.database {
            config.database_path = database.clone();
        }
        Ok(config)
    }

    pub async fn run(self) -> Result<()> {
        let mut config = self.config()?;

        match self.command {
            Commands::Init => {
                Repository::init(&database_url(&config.database_path)).await?;
                println!("Database initialized: {}", config.database_path);
            }

            Commands::Serve { host, port } => {
                if let Some(host) = host {
                    config.host = host;
                }
                if let Some(port) = port {
                    config.port = port;
                }
                run_serve_command(&config).await?;
            }

            Commands::Statement {
                account_number,
                format,
                output,
            } => {
                let repo = Repository::connect(&database_url(&config.database_path)).await?;
                run_statement_command(&repo, &account_number, format, output.as_deref()).await?;
            }
        }

        Ok(())
    }
}

async fn run_serve_command(config: &AppConfig) -> Result<()> {
    tracing::info!(config = %config.summary(), "starting minibank");

    let service = BankService::from_config(config).await?;
    let app = create_router(Arc::new(service));

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(%address, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}

async fn run_statement_command(
    repo: &Repository,
    account_number: &str,
    format: StatementFormat,
    output: Option<&str>,
) -> Result<()> {
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = StatementExporter::new(repo);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let count = match format {
        StatementFormat::Csv => exporter.export_csv(account_number, writer).await?,
        StatementFormat::Json => exporter.export_json(account_number, writer).await?.lines.len(),
    };

    if output.is_some() {
        eprintln!("Exported {} transactions for account {}", count, account_number);
    }

    Ok(())
}
