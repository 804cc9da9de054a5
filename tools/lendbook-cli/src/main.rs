//! Lendbook CLI - Command line tool for the lendbook lending CRM.
//!
//! Commands:
//! - `lendbook borrowers` - List, show, create, update, delete and export borrowers
//! - `lendbook tenants` - Create organizations and list a user's memberships
//! - `lendbook config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BorrowersArgs, ConfigArgs, TenantsArgs};

/// Lendbook CLI - Manage borrowers and tenants
#[derive(Parser)]
#[command(name = "lendbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage borrowers
    Borrowers(BorrowersArgs),

    /// Manage tenants and memberships
    Tenants(TenantsArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Send library events to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "lendbook=debug,lendbook_store=debug,lendbook_postgrest=debug,lendbook_domain=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = output::Output::new(cli.verbose, cli.json);
    let ctx = context::Context::load(cli.config.as_deref(), output)?;

    let result = match cli.command {
        Commands::Borrowers(args) => commands::borrowers::run(args, &ctx).await,
        Commands::Tenants(args) => commands::tenants::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
