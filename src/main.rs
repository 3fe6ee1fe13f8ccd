use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use vulnquery::{
    client::OsvClient,
    config::Config,
    logging,
    tool::{query_vulnerabilities, QueryVulnerabilitiesArgs},
    ToolServer,
};

#[derive(Parser)]
#[command(name = "vulnquery")]
#[command(
    author,
    version,
    about = "Query OSV.dev for package vulnerabilities over a stdio tool protocol"
)]
struct Cli {
    /// Path to a config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the OSV query endpoint
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Override the request timeout, in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the query_vulnerabilities tool over stdin/stdout (default)
    Serve,

    /// Run a single query and print the report
    Query {
        /// Package name
        package_name: String,

        /// Package ecosystem (PyPI, npm, crates.io, ...)
        #[arg(short, long)]
        ecosystem: String,

        /// Specific version to check
        #[arg(short = 'v', long)]
        version: Option<String>,
    },

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);

    let mut config = Config::load_from(&config_path)?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }

    logging::init(&config.log_level);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let source = Arc::new(OsvClient::from_config(&config));
            ToolServer::new(source).serve_stdio().await
        }
        Commands::Query {
            package_name,
            ecosystem,
            version,
        } => {
            let source = OsvClient::from_config(&config);
            let args = QueryVulnerabilitiesArgs {
                package_name,
                ecosystem,
                version,
            };
            println!("{}", query_vulnerabilities(&source, args).await);
            Ok(())
        }
        Commands::Config { init, path } => handle_config(&config_path, &config, init, path),
    }
}

fn handle_config(config_path: &Path, effective: &Config, init: bool, show_path: bool) -> Result<()> {
    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            anyhow::bail!("config file already exists at {}", config_path.display());
        }

        Config::default().save_to(config_path)?;
        println!("Wrote default config to {}", config_path.display());
        return Ok(());
    }

    let source = if config_path.exists() {
        config_path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", config_path.display())
    };
    println!("Config file: {}", source);
    println!();
    println!("Effective query settings:");
    println!("{}", effective.query_settings());

    Ok(())
}
