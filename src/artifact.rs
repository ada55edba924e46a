/// Build artifacts and requests
///
/// Inputs and outputs are identified by absolute paths. Timestamps are read from
/// the filesystem on demand; nothing is recorded between runs.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A file tracked as a build input or output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    path: PathBuf,
}

impl ArtifactRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a reference, joining relative paths onto `base_dir`
    pub fn resolve(path: impl AsRef<Path>, base_dir: &Path) -> Self {
        Self::new(absolutize(path.as_ref(), base_dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// True only for an existing regular file (directories do not count)
    pub fn is_file(&self) -> bool {
        self.path.is_file()
    }

    /// Last modification time, or `None` when the artifact does not exist.
    ///
    /// `None` orders before every `Some(_)`, so a missing artifact is older than
    /// any real one.
    pub fn modified(&self) -> io::Result<Option<SystemTime>> {
        match fs::metadata(&self.path) {
            Ok(metadata) => metadata.modified().map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Path as passed on a translator command line
    pub fn to_arg(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl std::fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Ordered inputs plus the single output a translator run produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    inputs: Vec<ArtifactRef>,
    output_dir: PathBuf,
    output: ArtifactRef,
}

impl BuildRequest {
    /// The output path is `output_dir` joined with `output_file`
    pub fn new(inputs: Vec<ArtifactRef>, output_dir: impl Into<PathBuf>, output_file: &str) -> Self {
        let output_dir = output_dir.into();
        let output = ArtifactRef::new(output_dir.join(output_file));
        Self {
            inputs,
            output_dir,
            output,
        }
    }

    pub fn inputs(&self) -> &[ArtifactRef] {
        &self.inputs
    }

    pub fn output(&self) -> &ArtifactRef {
        &self.output
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Translator arguments: every input in order, then the output path
    pub fn translator_args(&self) -> Vec<String> {
        self.inputs
            .iter()
            .chain(std::iter::once(&self.output))
            .map(ArtifactRef::to_arg)
            .collect()
    }
}

/// Make `path` absolute without touching the filesystem (symlinks are kept)
pub fn absolutize(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
