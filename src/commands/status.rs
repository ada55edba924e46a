/// `trang-gate status` command implementation
///
/// Reports each step as fresh or stale. Creates no directories and never
/// invokes the translator.
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use trang_gate::config_discovery::require_config;
use trang_gate::gate::{self, Staleness};
use trang_gate::logging::operations;

use crate::cli::StatusArgs;

#[derive(Debug, Serialize)]
struct StepReport {
    step: String,
    output: String,
    stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

pub fn run(args: &StatusArgs) -> Result<()> {
    let config = require_config(args.config.as_deref())?;
    config.validate().context("Invalid configuration")?;

    let mut reports = Vec::new();

    for step in config.select_steps(&args.steps)? {
        let request = config.request_for(step);
        let staleness = gate::check(&request)
            .with_context(|| format!("Step '{}' cannot be checked", step.name))?;

        debug!(
            operation = operations::CHECK,
            step = %step.name,
            stale = staleness.is_stale(),
            "Checked step"
        );

        reports.push(StepReport {
            step: step.name.clone(),
            output: request.output().to_arg(),
            stale: staleness.is_stale(),
            reason: match staleness {
                Staleness::Fresh => None,
                Staleness::Stale(reason) => Some(reason.to_string()),
            },
        });
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for report in &reports {
        match &report.reason {
            Some(reason) => println!("✗ {}: stale ({})", report.step, reason),
            None => println!("✓ {}: up to date", report.step),
        }
    }

    Ok(())
}
