use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use trang_gate::config::{GateConfig, CONFIG_FILE_NAME};

use crate::cli::InitArgs;

pub fn run(args: InitArgs) -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it.",
            CONFIG_FILE_NAME
        );
    }

    fs::write(path, GateConfig::example())
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✓ Created {}", CONFIG_FILE_NAME);
    println!("\nNext steps:");
    println!("  1. Point [translator] at your Trang installation");
    println!("  2. List your input schemas under [[step]]");
    println!("  3. Run: trang-gate run");

    Ok(())
}
