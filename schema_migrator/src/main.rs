//! schema_migrator CLI
//!
//! Creates, drops, loads, dumps and versions the configured database.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use schema_migrator::config::{Config, DatabaseConfig, MigrationsConfig, DEFAULT_CONFIG_FILE};
use schema_migrator::utils::logging::init_logging;
use schema_migrator::Migrator;

#[derive(Parser, Debug)]
#[command(name = "schema_migrator")]
#[command(author, version, about = "Database lifecycle commands for ORM migrations", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Connection URL; skips the config file when given
    #[arg(long, global = true, value_name = "URL")]
    url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database
    Create,
    /// Drop the database
    Drop,
    /// Load the schema dump into the database
    Load,
    /// Dump the database structure and applied migrations
    Dump,
    /// Drop, create and load the database
    Prepare,
    /// Print the version of the last applied migration
    Version,
    /// Print the native console command line
    Console,
}

fn open_migrator(cli: &Cli) -> Result<Migrator> {
    match &cli.url {
        Some(url) => {
            let config = Config {
                database: DatabaseConfig {
                    url: url.clone(),
                    database_type: None,
                    pool_size: None,
                    timeout_seconds: None,
                },
                migrations: MigrationsConfig::default(),
                logging: None,
            };
            Ok(Migrator::new(config)?)
        }
        None => {
            let path = cli.config.to_string_lossy();
            schema_migrator::init(&path)
                .with_context(|| format!("loading configuration from {}", path))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let migrator = open_migrator(&cli)?;
    init_logging(&migrator.config().logging)?;

    match cli.command {
        Command::Create => migrator.create().await?,
        Command::Drop => migrator.drop().await?,
        Command::Load => migrator.load().await?,
        Command::Dump => migrator.dump().await?,
        Command::Prepare => migrator.prepare().await?,
        Command::Version => match migrator.version().await? {
            Some(version) => println!("{}", version),
            None => println!("no version"),
        },
        Command::Console => {
            let console = migrator.console().with_context(|| {
                format!(
                    "no console for {}",
                    migrator.connection().database_type()
                )
            })?;
            println!("{}", console.connection_string());
        }
    }

    Ok(())
}
