use anyhow::{Context, Result};
use tracing::info;

use trang_gate::config::GateConfig;
use trang_gate::config_discovery::{load_config_with_discovery, require_config};

use crate::cli::ConfigCommands;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Validate { config } => validate(config.as_deref()),
        ConfigCommands::Show { config } => show(config.as_deref()),
    }
}

fn validate(config_path: Option<&str>) -> Result<()> {
    let config = require_config(config_path)?;
    info!("Validating config rooted at: {}", config.base_dir().display());

    config.validate().context("Invalid configuration")?;

    println!("✓ Configuration is valid");
    println!("\nSummary:");
    println!(
        "  - Translator: {} {}",
        config.translator.program,
        config.translator.args.join(" ")
    );
    println!("  - Steps: {}", config.steps.len());

    for (i, step) in config.steps.iter().enumerate() {
        let request = config.request_for(step);
        println!(
            "    {}. {} ({} inputs -> {})",
            i + 1,
            step.name,
            request.inputs().len(),
            request.output()
        );
    }

    Ok(())
}

fn show(config_path: Option<&str>) -> Result<()> {
    info!("Showing effective configuration");

    let config = match load_config_with_discovery(config_path)? {
        Some(config) => config,
        None => GateConfig::default(),
    };

    println!("Effective Configuration:\n");
    println!("{}", toml::to_string_pretty(&config)?);

    Ok(())
}
