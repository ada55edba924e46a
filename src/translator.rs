/// Translator invocation
///
/// The translator is an opaque collaborator. It receives `[inputs..., output]`
/// and answers with an integer status where zero means success. How it parses
/// those arguments is its own business.
use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::debug;

use crate::artifact::absolutize;

/// Why a translator could not be invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationErrorKind {
    /// The program or entry point does not exist
    EntryPointMissing,
    /// The entry point exists but may not be executed
    AccessDenied,
    /// The invocation mechanism itself failed before the translator reported a status
    InvocationFailed,
}

impl fmt::Display for InvocationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::EntryPointMissing => "entry point missing",
            Self::AccessDenied => "access denied",
            Self::InvocationFailed => "invocation failed",
        };
        f.write_str(text)
    }
}

#[derive(Error, Debug)]
#[error("Could not invoke translator '{translator}': {kind}")]
pub struct InvocationError {
    pub kind: InvocationErrorKind,
    pub translator: String,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl InvocationError {
    pub fn new(
        kind: InvocationErrorKind,
        translator: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            kind,
            translator: translator.into(),
            source: source.into(),
        }
    }

    /// Classify a spawn/wait failure by its I/O error kind
    pub fn from_io(translator: impl Into<String>, err: io::Error) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::NotFound => InvocationErrorKind::EntryPointMissing,
            io::ErrorKind::PermissionDenied => InvocationErrorKind::AccessDenied,
            _ => InvocationErrorKind::InvocationFailed,
        };
        Self::new(kind, translator, err)
    }
}

/// An external schema translator
pub trait Translator {
    /// Name used in logs and diagnostics
    fn name(&self) -> &str;

    /// Run the translator once and return its status (0 = success)
    fn translate(&self, args: &[String]) -> Result<i32, InvocationError>;
}

impl<T: Translator + ?Sized> Translator for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn translate(&self, args: &[String]) -> Result<i32, InvocationError> {
        (**self).translate(args)
    }
}

impl<T: Translator + ?Sized> Translator for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn translate(&self, args: &[String]) -> Result<i32, InvocationError> {
        (**self).translate(args)
    }
}

/// Runs the translator as a child process and uses its exit code as the status
///
/// The child inherits stdout and stderr so its own diagnostics reach the user.
/// A child terminated by a signal reports status -1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTranslator {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandTranslator {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    /// Fixed arguments placed before the gate's arguments (e.g. `-jar trang.jar`)
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Locate the program to spawn.
    ///
    /// Bare names are looked up on `PATH`. Anything with a directory component is
    /// taken as a path relative to the working directory, so permission problems
    /// surface from the spawn instead of being reported as a missing program.
    fn resolve_program(&self) -> Result<PathBuf, InvocationError> {
        let program = Path::new(&self.program);

        if has_directory(program) {
            let base = match &self.working_dir {
                Some(dir) => dir.clone(),
                None => std::env::current_dir()
                    .map_err(|e| InvocationError::from_io(&self.program, e))?,
            };
            return Ok(absolutize(program, &base));
        }

        let found = match &self.working_dir {
            Some(dir) => which::which_in(&self.program, std::env::var_os("PATH"), dir),
            None => which::which(&self.program),
        };

        found.map_err(|e| {
            InvocationError::new(InvocationErrorKind::EntryPointMissing, &self.program, e)
        })
    }
}

fn has_directory(program: &Path) -> bool {
    program.components().count() > 1 || program.is_absolute()
}

/// Pin a program path with a directory component to `base_dir`.
///
/// Bare names are returned unchanged and stay `PATH` lookups.
pub fn anchor_program(program: &str, base_dir: &Path) -> String {
    let path = Path::new(program);
    if has_directory(path) {
        absolutize(path, base_dir).to_string_lossy().into_owned()
    } else {
        program.to_string()
    }
}

impl Default for CommandTranslator {
    fn default() -> Self {
        Self::new("trang")
    }
}

impl Translator for CommandTranslator {
    fn name(&self) -> &str {
        &self.program
    }

    fn translate(&self, args: &[String]) -> Result<i32, InvocationError> {
        let program = self.resolve_program()?;

        let mut cmd = Command::new(&program);
        cmd.args(&self.args);
        cmd.args(args);

        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        debug!(translator = %program.display(), "spawning translator: {:?}", cmd);

        let status = cmd
            .status()
            .map_err(|e| InvocationError::from_io(&self.program, e))?;

        Ok(status.code().unwrap_or(-1))
    }
}

/// An in-process translator entry point
///
/// A panic inside the entry point is reported as an invocation failure rather
/// than unwinding through the gate.
pub struct FnTranslator<F> {
    name: String,
    entry: F,
}

impl<F> FnTranslator<F>
where
    F: Fn(&[String]) -> i32,
{
    pub fn new(name: impl Into<String>, entry: F) -> Self {
        Self {
            name: name.into(),
            entry,
        }
    }
}

impl<F> Translator for FnTranslator<F>
where
    F: Fn(&[String]) -> i32,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn translate(&self, args: &[String]) -> Result<i32, InvocationError> {
        panic::catch_unwind(AssertUnwindSafe(|| (self.entry)(args))).map_err(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "translator panicked".to_string());
            InvocationError::new(InvocationErrorKind::InvocationFailed, &self.name, message)
        })
    }
}

impl<F> fmt::Debug for FnTranslator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTranslator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
