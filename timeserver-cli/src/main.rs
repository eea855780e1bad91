//! Timeserver CLI
//!
//! Runs the server, or manages the API key store directly on disk.

use anyhow::Context;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use timeserver_auth::{FileKeyRegistry, KeyInfo, KeyRegistry, Role};
use timeserver_core::{init_logging, ServerConfig, DEFAULT_STORE};
use timeserver_web::TimeServerBuilder;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "timeserver")]
#[command(about = "Time zone configuration server with role-based access")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    serve: ServeArgs,
}

/// Options for running the server
#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Address to serve on
    #[arg(long)]
    addr: Option<String>,

    /// API key store directory
    #[arg(long)]
    store: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage API keys
    ApiKey {
        #[command(subcommand)]
        command: ApiKeyCommand,
    },

    /// Print the version
    Version,

    /// Generate a shell completion script
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum ApiKeyCommand {
    /// Add or replace an API key
    Add {
        /// The API key
        key: String,

        /// User the key belongs to
        #[arg(long)]
        user: String,

        /// Role granted to the key
        #[arg(long, default_value = "config:reader")]
        role: String,

        /// API key store directory
        #[arg(long, default_value = DEFAULT_STORE)]
        store: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        None => serve(cli.serve).await,
        Some(Commands::ApiKey {
            command:
                ApiKeyCommand::Add {
                    key,
                    user,
                    role,
                    store,
                },
        }) => {
            let message = add_api_key(&store, &key, &user, &role).await?;
            println!("{}", message);
            Ok(())
        }
        Some(Commands::Version) => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Commands::Completion { shell }) => write_completion(shell, &mut std::io::stdout()),
    }
}

fn write_completion<W: Write>(shell: Shell, out: &mut W) -> anyhow::Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, out);
    out.flush()?;
    Ok(())
}

/// Merge file, environment and flags, in increasing precedence
fn load_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    }
    .with_env();

    if let Some(addr) = &args.addr {
        config.addr = addr.clone();
    }
    if let Some(store) = &args.store {
        config.store = store.clone();
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }

    config.validate()?;
    Ok(config)
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    let log_level = init_logging(&config.logging).context("failed to initialize logging")?;

    info!("Starting timeserver v{}", env!("CARGO_PKG_VERSION"));

    let server = TimeServerBuilder::from_config(config)
        .log_level(log_level)
        .build()
        .await?;
    server.start().await?;
    Ok(())
}

async fn add_api_key(store: &Path, key: &str, user: &str, role: &str) -> anyhow::Result<String> {
    let role: Role = role.parse()?;
    let info = KeyInfo::new(key, user, role);
    info.validate()?;

    let registry = FileKeyRegistry::open(store)
        .await
        .with_context(|| format!("cannot open API key store at {}", store.display()))?;
    registry.add(key, &info).await?;

    Ok(format!("Added API key: user={:?} role={}", info.user, info.role))
}
