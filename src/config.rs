use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::artifact::{absolutize, ArtifactRef, BuildRequest};
use crate::translator::CommandTranslator;

/// Name of the project configuration file
pub const CONFIG_FILE_NAME: &str = "trang-gate.toml";

/// Complete trang-gate configuration (loaded from TOML file)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GateConfig {
    #[serde(default)]
    pub translator: TranslatorConfig,

    /// Generation steps, run in declaration order
    #[serde(default, rename = "step")]
    pub steps: Vec<StepConfig>,

    /// Directory relative paths are resolved against (the config file's directory)
    #[serde(skip)]
    base_dir: PathBuf,
}

/// How to launch the translator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Program name (looked up on PATH) or path relative to the config file
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments placed before the inputs (e.g. ["-jar", "tools/trang.jar"])
    #[serde(default)]
    pub args: Vec<String>,
}

impl TranslatorConfig {
    /// Relative program paths and relative arguments are resolved by the child
    /// from `working_dir`
    pub fn to_translator(&self, working_dir: &Path) -> CommandTranslator {
        CommandTranslator::new(&self.program)
            .with_args(self.args.iter().cloned())
            .with_working_dir(working_dir)
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: Vec::new(),
        }
    }
}

/// One output schema and the inputs it is generated from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    pub name: String,

    /// Input schema files; order is preserved on the translator command line
    #[serde(default)]
    pub inputs: Vec<String>,

    /// Output directory
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Output file name (no path separators)
    pub output_file: String,
}

impl StepConfig {
    /// Build the request for this step, resolving relative paths against `base_dir`
    pub fn to_request(&self, base_dir: &Path) -> BuildRequest {
        let inputs = self
            .inputs
            .iter()
            .map(|input| ArtifactRef::resolve(input, base_dir))
            .collect();
        let output_dir = absolutize(Path::new(&self.output_dir), base_dir);

        BuildRequest::new(inputs, output_dir, &self.output_file)
    }
}

// Default value functions
fn default_program() -> String {
    "trang".to_string()
}

/// Default output directory, relative to the project root
pub fn default_output_dir() -> String {
    "target/trang".to_string()
}

/// Check an output file name is a single plain path component
pub fn validate_output_file_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
        _ => anyhow::bail!(
            "output_file must be a plain file name without path separators: {:?}",
            name
        ),
    }
}

impl GateConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        let base_dir = absolutize(path, &cwd)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(cwd);

        Ok(config.with_base_dir(base_dir))
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Translator described by this configuration, run from the config directory
    pub fn translator(&self) -> CommandTranslator {
        self.translator.to_translator(&self.base_dir)
    }

    pub fn request_for(&self, step: &StepConfig) -> BuildRequest {
        step.to_request(&self.base_dir)
    }

    /// Pick steps by name, keeping the requested order. An empty selection means all steps.
    pub fn select_steps(&self, names: &[String]) -> Result<Vec<&StepConfig>> {
        if names.is_empty() {
            return Ok(self.steps.iter().collect());
        }

        names
            .iter()
            .map(|name| {
                self.steps
                    .iter()
                    .find(|step| &step.name == name)
                    .ok_or_else(|| {
                        anyhow::anyhow!(
                            "Unknown step: {}. Configured steps: {}",
                            name,
                            self.step_names().join(", ")
                        )
                    })
            })
            .collect()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.name.as_str()).collect()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.translator.program.trim().is_empty() {
            anyhow::bail!("translator.program must be set");
        }

        if self.steps.is_empty() {
            anyhow::bail!("at least one [[step]] must be configured");
        }

        let mut names = HashSet::new();
        let mut outputs = HashSet::new();

        for step in &self.steps {
            if step.name.trim().is_empty() {
                anyhow::bail!("step.name must not be empty");
            }

            if !names.insert(step.name.as_str()) {
                anyhow::bail!("duplicate step name: {}", step.name);
            }

            validate_output_file_name(&step.output_file)
                .with_context(|| format!("invalid step '{}'", step.name))?;

            // Two steps writing the same file would race each other's timestamps
            let output = self.request_for(step).output().path().to_path_buf();
            if !outputs.insert(output.clone()) {
                anyhow::bail!(
                    "step '{}' writes {} which another step already writes",
                    step.name,
                    output.display()
                );
            }
        }

        Ok(())
    }

    /// Starter configuration written by `trang-gate init`
    pub fn example() -> String {
        format!(
            r#"# trang-gate configuration
#
# Each [[step]] regenerates one output schema from its inputs when any input
# is newer than the output. Relative paths are resolved against this file.

[translator]
# Program on PATH, or a path relative to this file.
program = "trang"
# Arguments placed before the input files, e.g. ["-jar", "tools/trang.jar"]
args = []

[[step]]
name = "schema"
inputs = ["src/main/rng/schema.rng"]
output_dir = "{}"
output_file = "schema.rnc"
"#,
            default_output_dir()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GateConfig {
        GateConfig::parse(
            r#"
[translator]
program = "java"
args = ["-jar", "tools/trang.jar"]

[[step]]
name = "schema"
inputs = ["src/a.rng", "/abs/b.rng"]
output_file = "schema.rnc"

[[step]]
name = "xsd"
inputs = ["src/a.rng"]
output_dir = "generated"
output_file = "schema.xsd"
"#,
        )
        .unwrap()
        .with_base_dir("/project")
    }

    #[test]
    fn test_default_config() {
        let config = GateConfig::default();
        assert_eq!(config.translator.program, "trang");
        assert!(config.translator.args.is_empty());
        assert!(config.steps.is_empty());
    }

    #[test]
    fn test_parse_steps() {
        let config = sample();
        assert_eq!(config.step_names(), vec!["schema", "xsd"]);
        assert_eq!(config.steps[0].output_dir, "target/trang");
        assert_eq!(config.steps[1].output_dir, "generated");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_request_resolves_against_base_dir() {
        let config = sample();
        let request = config.request_for(&config.steps[0]);

        assert_eq!(
            request.translator_args(),
            vec![
                "/project/src/a.rng",
                "/abs/b.rng",
                "/project/target/trang/schema.rnc"
            ]
        );
        assert_eq!(request.output_dir(), Path::new("/project/target/trang"));
    }

    #[test]
    fn test_translator_from_config() {
        let translator = sample().translator();
        assert_eq!(translator.program(), "java");
        assert_eq!(translator.args(), ["-jar", "tools/trang.jar"]);
    }

    #[test]
    fn test_select_steps_keeps_requested_order() {
        let config = sample();

        let all = config.select_steps(&[]).unwrap();
        assert_eq!(all.len(), 2);

        let picked = config
            .select_steps(&["xsd".to_string(), "schema".to_string()])
            .unwrap();
        assert_eq!(picked[0].name, "xsd");
        assert_eq!(picked[1].name, "schema");
    }

    #[test]
    fn test_select_unknown_step() {
        let err = sample()
            .select_steps(&["nope".to_string()])
            .unwrap_err();
        assert!(err.to_string().contains("Unknown step: nope"));
    }

    #[test]
    fn test_output_file_name_validation() {
        assert!(validate_output_file_name("schema.rnc").is_ok());
        assert!(validate_output_file_name("").is_err());
        assert!(validate_output_file_name("..").is_err());
        assert!(validate_output_file_name(".").is_err());
        assert!(validate_output_file_name("sub/schema.rnc").is_err());
        assert!(validate_output_file_name("/schema.rnc").is_err());
    }

    #[test]
    fn test_duplicate_step_names_rejected() {
        let mut config = sample();
        config.steps[1].name = "schema".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_outputs_rejected() {
        let mut config = sample();
        config.steps[1].output_dir = "target/trang".to_string();
        config.steps[1].output_file = "schema.rnc".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("another step already writes"));
    }

    #[test]
    fn test_no_steps_rejected() {
        let config = GateConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_output_file_is_parse_error() {
        let result = GateConfig::parse(
            r#"
[[step]]
name = "schema"
inputs = ["a.rng"]
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_example_is_valid() {
        let config = GateConfig::parse(&GateConfig::example()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.steps[0].output_dir, "target/trang");
    }

    #[test]
    fn test_from_file_sets_base_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, GateConfig::example()).unwrap();

        let config = GateConfig::from_file(&path).unwrap();
        assert_eq!(config.base_dir(), temp.path());
    }

    #[test]
    fn test_from_file_missing() {
        let err = GateConfig::from_file("/definitely/not/here/trang-gate.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
