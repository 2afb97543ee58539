use clap::Parser;
use eyre::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;
mod config;
mod error;
mod filter;
mod output;
mod pipeline;
mod roles;
mod vars;

use cli::Cli;
use config::Config;
use output::get_formatter;

fn main() -> Result<()> {
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    init_logging(&cli);

    // Load configuration and apply CLI overrides
    let mut config = if cli.no_config {
        Config::default()
    } else {
        Config::load(cli.config.as_ref()).context("Failed to load configuration")?
    };
    cli.apply_overrides(&mut config)?;

    // Handle special commands
    if cli.show_config {
        return show_config(&config);
    }

    if cli.list_roles {
        return list_roles(&config);
    }

    config.validate()?;

    let options = config.run_options(cli.dry_run);
    let report = pipeline::run(&config, &options).context("Run aborted")?;

    // Format and output the report
    let formatter = get_formatter(&cli.format);
    println!("{}", formatter.format_report(&report));

    Ok(())
}

/// Log to stderr, filtered by --log-level
fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_new(cli.log_directive()).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// List every defined role with its enabled state
fn list_roles(config: &Config) -> Result<()> {
    let resolved = pipeline::resolve_roles(config).context("Failed to resolve roles")?;

    println!("Roles:");
    println!();

    for (name, enabled) in resolved.listing() {
        let state = if enabled { "enabled" } else { "disabled" };
        println!("  {:<40} {}", name, state);
    }

    Ok(())
}

/// Show the effective configuration
fn show_config(config: &Config) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;

    println!("Effective configuration:");
    println!("{}", yaml);

    Ok(())
}
