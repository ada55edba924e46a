/// Incremental build-step gate
///
/// Decides once per invocation whether the translator has to run, comparing the
/// modification times of the inputs against the output, and maps whatever the
/// translator reports into [`GateOutcome`] or [`GateError`].
///
/// An absent output has no timestamp (`None`), which orders before every real
/// timestamp, so a never-built output is always stale without a separate branch.
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::artifact::{ArtifactRef, BuildRequest};
use crate::logging::{operations, status};
use crate::translator::{InvocationError, Translator};

/// Successful result of a gate evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Output was current; the translator was not invoked
    Skipped,
    /// Translator ran and reported success
    Regenerated,
}

impl GateOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Regenerated => "regenerated",
        }
    }
}

/// Why a request needs regeneration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    /// Nothing to compare against
    NoInputs,
    /// Output has never been built
    OutputMissing,
    /// First input (in request order) modified after the output
    InputNewer { path: PathBuf },
}

impl std::fmt::Display for StaleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoInputs => write!(f, "no inputs declared"),
            Self::OutputMissing => write!(f, "output does not exist"),
            Self::InputNewer { path } => write!(f, "{} is newer than output", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    Fresh,
    Stale(StaleReason),
}

impl Staleness {
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale(_))
    }
}

#[derive(Error, Debug)]
pub enum GateError {
    /// An input is missing or is not a regular file
    #[error("Input file {} does not exist as a file", .path.display())]
    MissingInput { path: PathBuf },

    #[error("Failed to {action} {}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Invocation(#[from] InvocationError),

    /// The translator ran and reported a non-zero status
    #[error("Translator '{translator}' failed with status {status}")]
    TranslationFailed { translator: String, status: i32 },
}

impl GateError {
    /// True for errors caused by the request itself rather than by running it
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::MissingInput { .. })
    }

    fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Check every input exists as a regular file. No side effects.
pub fn validate(request: &BuildRequest) -> Result<(), GateError> {
    match request.inputs().iter().find(|input| !input.is_file()) {
        Some(input) => Err(GateError::MissingInput {
            path: input.path().to_path_buf(),
        }),
        None => Ok(()),
    }
}

/// Validate the request and compute its staleness without side effects
pub fn check(request: &BuildRequest) -> Result<Staleness, GateError> {
    validate(request)?;
    staleness(request)
}

fn modified(artifact: &ArtifactRef) -> Result<Option<SystemTime>, GateError> {
    artifact
        .modified()
        .map_err(|e| GateError::io("read modification time of", artifact.path(), e))
}

fn staleness(request: &BuildRequest) -> Result<Staleness, GateError> {
    let output_modified = modified(request.output())?;

    if request.inputs().is_empty() {
        return Ok(Staleness::Stale(StaleReason::NoInputs));
    }

    for input in request.inputs() {
        if modified(input)? > output_modified {
            let reason = match output_modified {
                None => StaleReason::OutputMissing,
                Some(_) => StaleReason::InputNewer {
                    path: input.path().to_path_buf(),
                },
            };
            return Ok(Staleness::Stale(reason));
        }
    }

    Ok(Staleness::Fresh)
}

/// Skips or triggers a translator run for one [`BuildRequest`] at a time
#[derive(Debug)]
pub struct StalenessGate<T> {
    translator: T,
}

impl<T: Translator> StalenessGate<T> {
    pub fn new(translator: T) -> Self {
        Self { translator }
    }

    pub fn translator(&self) -> &T {
        &self.translator
    }

    /// Evaluate a request: validate, ensure the output directory, compare
    /// timestamps, and run the translator when the output is stale.
    ///
    /// Never retries and never removes a partially written output.
    pub fn evaluate(&self, request: &BuildRequest) -> Result<GateOutcome, GateError> {
        validate(request)?;

        let output_dir = request.output_dir();
        fs::create_dir_all(output_dir)
            .map_err(|e| GateError::io("create output directory", output_dir, e))?;

        let reason = match staleness(request)? {
            Staleness::Fresh => {
                info!(
                    operation = operations::EVALUATE,
                    status = status::SKIPPED,
                    output = %request.output(),
                    "Output is current, skipping translator invocation"
                );
                return Ok(GateOutcome::Skipped);
            }
            Staleness::Stale(reason) => reason,
        };

        let args = request.translator_args();
        debug!(
            operation = operations::EVALUATE,
            translator = self.translator.name(),
            reason = %reason,
            "Executing translator with parameters {:?}",
            args
        );

        let code = self.translator.translate(&args).inspect_err(|e| {
            warn!(
                operation = operations::EVALUATE,
                status = status::ERROR,
                kind = %e.kind,
                translator = self.translator.name(),
                "Translator could not be invoked"
            );
        })?;

        if code != 0 {
            warn!(
                operation = operations::EVALUATE,
                status = status::FAILURE,
                exit_status = code,
                output = %request.output(),
                "Translator invoked, failure"
            );
            return Err(GateError::TranslationFailed {
                translator: self.translator.name().to_string(),
                status: code,
            });
        }

        info!(
            operation = operations::EVALUATE,
            status = status::SUCCESS,
            output = %request.output(),
            "Translator invoked, success"
        );
        Ok(GateOutcome::Regenerated)
    }
}
