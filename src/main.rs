mod cli;

use bookstore::{config, demo};
use bookstore_db::{entity, global, schema};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "bookstore=debug,bookstore_db=debug".to_string()
        } else {
            "bookstore=info,bookstore_db=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Demo { json } => run_demo(cli.config.as_deref(), json),
        Commands::Schema => print_schema(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("bookstore {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_demo(config_path: Option<&std::path::Path>, json: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let factory = global::init(&config).context("Failed to build session factory")?;

    let report = if json {
        let report = demo::run(factory, &mut std::io::sink())?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        report
    } else {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        demo::run(factory, &mut out)?
    };

    // Cleanup
    global::shutdown().context("Failed to close session factory")?;

    if !report.failed_steps.is_empty() {
        tracing::warn!(
            "{} step(s) failed: {:?}",
            report.failed_steps.len(),
            report.failed_steps
        );
    }

    Ok(())
}

fn print_schema(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let mappings = entity::resolve_mappings(&config.mapping.entities)?;

    println!("{}", schema::ddl(&mappings));
    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    let mappings = entity::resolve_mappings(&config.mapping.entities)?;
    let location = config.database.location()?;

    println!("✓ Configuration is valid");
    println!("  Database: {}", config.database.url);
    println!(
        "  Storage: {}",
        if location.is_memory() {
            "in-memory"
        } else {
            "file"
        }
    );
    println!(
        "  Schema generation: {:?}",
        config.database.schema_generation
    );
    println!("  Show SQL: {}", config.database.show_sql);
    println!(
        "  Mapped entities: {}",
        mappings
            .iter()
            .map(|m| m.name)
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(())
}
