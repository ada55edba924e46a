use clap::{Parser, Subcommand};

/// trang-gate - Incremental schema generation with Trang
///
/// Regenerates each configured output schema only when one of its input
/// schemas is newer than the output.
#[derive(Parser, Debug)]
#[command(name = "trang-gate")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Regenerate schemas with Trang only when their inputs changed", long_about = None)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Regenerate outputs whose inputs changed
    Run(RunArgs),

    /// Report which outputs are stale, without regenerating anything
    Status(StatusArgs),

    /// Configuration management utilities
    Config(ConfigArgs),

    /// Create a starter trang-gate.toml in the current directory
    Init(InitArgs),
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Config file path (default: discover trang-gate.toml upwards from cwd)
    #[arg(short = 'c', long, env = "TRANG_GATE_CONFIG")]
    pub config: Option<String>,

    /// Only run these steps (repeatable, run in the given order)
    #[arg(short = 's', long = "step", conflicts_with = "output_file")]
    pub steps: Vec<String>,

    // AD-HOC MODE (no config file)
    /// Input schema file (repeatable, order is preserved)
    #[arg(short = 'i', long = "input", requires = "output_file")]
    pub inputs: Vec<String>,

    /// Output directory for ad-hoc mode
    #[arg(long, requires = "output_file")]
    pub output_dir: Option<String>,

    /// Output file name; switches to ad-hoc mode, where --config is ignored
    #[arg(short = 'o', long)]
    pub output_file: Option<String>,

    // TRANSLATOR OVERRIDES
    /// Translator program (overrides [translator].program, relative to cwd)
    #[arg(long, env = "TRANG_GATE_TRANSLATOR")]
    pub translator: Option<String>,

    /// Argument placed before the inputs (repeatable, overrides [translator].args)
    #[arg(long = "translator-arg", allow_hyphen_values = true)]
    pub translator_args: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Config file path (default: discover trang-gate.toml upwards from cwd)
    #[arg(short = 'c', long, env = "TRANG_GATE_CONFIG")]
    pub config: Option<String>,

    /// Only report these steps
    #[arg(short = 's', long = "step")]
    pub steps: Vec<String>,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the resolved configuration
    Show {
        /// Config file path
        #[arg(short = 'c', long, env = "TRANG_GATE_CONFIG")]
        config: Option<String>,
    },

    /// Validate a configuration file
    Validate {
        /// Config file path
        #[arg(short = 'c', long, env = "TRANG_GATE_CONFIG")]
        config: Option<String>,
    },
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Overwrite an existing trang-gate.toml
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_adhoc_run() {
        let cli = Cli::try_parse_from([
            "trang-gate",
            "run",
            "-i",
            "a.rng",
            "-i",
            "b.rng",
            "-o",
            "out.rnc",
            "--translator",
            "java",
            "--translator-arg",
            "-jar",
            "--translator-arg",
            "trang.jar",
        ])
        .unwrap();

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.inputs, vec!["a.rng", "b.rng"]);
                assert_eq!(args.output_file.as_deref(), Some("out.rnc"));
                assert_eq!(args.translator.as_deref(), Some("java"));
                assert_eq!(args.translator_args, vec!["-jar", "trang.jar"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_input_requires_output_file() {
        let result = Cli::try_parse_from(["trang-gate", "run", "-i", "a.rng"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_step_conflicts_with_adhoc() {
        let result = Cli::try_parse_from(["trang-gate", "run", "-s", "x", "-o", "out.rnc"]);
        assert!(result.is_err());
    }
}
