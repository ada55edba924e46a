/// `trang-gate run` command implementation
///
/// Runs every selected step through the staleness gate, in order, stopping at
/// the first failure.
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, warn};

use trang_gate::artifact::{absolutize, ArtifactRef, BuildRequest};
use trang_gate::cli_utils::{prefix, summary_line};
use trang_gate::config::{default_output_dir, validate_output_file_name, TranslatorConfig};
use trang_gate::config_discovery::require_config;
use trang_gate::gate::StalenessGate;
use trang_gate::logging::operations;
use trang_gate::translator::{anchor_program, CommandTranslator, Translator};

use crate::cli::RunArgs;

pub fn run(args: &RunArgs) -> Result<()> {
    if let Some(output_file) = &args.output_file {
        return run_adhoc(args, output_file);
    }

    let config = require_config(args.config.as_deref())?;
    config.validate().context("Invalid configuration")?;

    let steps = config.select_steps(&args.steps)?;
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let translator = resolve_translator(args, &config.translator, config.base_dir(), &cwd);
    let gate = StalenessGate::new(translator);

    for step in steps {
        run_step(&gate, &step.name, &config.request_for(step))?;
    }

    Ok(())
}

/// Single request built from command-line flags, paths relative to cwd
fn run_adhoc(args: &RunArgs, output_file: &str) -> Result<()> {
    validate_output_file_name(output_file)?;

    if let Some(config) = &args.config {
        warn!(
            config = %config,
            "Ignoring configuration file: --output-file runs a single ad-hoc step"
        );
    }

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let inputs = args
        .inputs
        .iter()
        .map(|input| ArtifactRef::resolve(input, &cwd))
        .collect();
    let output_dir = args.output_dir.clone().unwrap_or_else(default_output_dir);
    let request = BuildRequest::new(inputs, absolutize(Path::new(&output_dir), &cwd), output_file);

    let translator = resolve_translator(args, &TranslatorConfig::default(), &cwd, &cwd);
    run_step(&StalenessGate::new(translator), output_file, &request)
}

/// Command-line translator flags win over the configured ones.
///
/// Configured values are relative to the config file's directory; values from
/// `--translator`, `--translator-arg` or `TRANG_GATE_TRANSLATOR` are relative to
/// the current directory. The child runs in the directory its fixed arguments
/// were written against.
fn resolve_translator(
    args: &RunArgs,
    configured: &TranslatorConfig,
    config_dir: &Path,
    cwd: &Path,
) -> CommandTranslator {
    let program = match &args.translator {
        Some(program) => anchor_program(program, cwd),
        None => anchor_program(&configured.program, config_dir),
    };

    let (fixed_args, working_dir) = if args.translator_args.is_empty() {
        (configured.args.clone(), config_dir)
    } else {
        (args.translator_args.clone(), cwd)
    };

    CommandTranslator::new(program)
        .with_args(fixed_args)
        .with_working_dir(working_dir)
}

fn run_step<T: Translator>(
    gate: &StalenessGate<T>,
    name: &str,
    request: &BuildRequest,
) -> Result<()> {
    debug!(
        operation = operations::RUN_STEP,
        step = name,
        inputs = request.inputs().len(),
        output = %request.output(),
        "Running step"
    );

    let start = Instant::now();
    let outcome = gate
        .evaluate(request)
        .with_context(|| format!("Step '{}' failed", name))?;

    eprintln!("{} {}", prefix(), summary_line(name, outcome, start.elapsed()));

    Ok(())
}
