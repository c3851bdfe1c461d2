//! XDG-compliant path resolution for vpdt-digest.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(vpdt::paths::no_home),
        help("Set the HOME environment variable or pass --config explicitly.")
    )]
    NoHome,

    #[error("failed to create directory: {path}")]
    #[diagnostic(
        code(vpdt::paths::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type PathResult<T> = std::result::Result<T, PathError>;

/// Global directories for vpdt-digest.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// `$XDG_CONFIG_HOME/vpdt-digest/`
    pub config_dir: PathBuf,
    /// `$XDG_CACHE_HOME/vpdt-digest/`
    pub cache_dir: PathBuf,
}

impl AppPaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| PathError::NoHome)?;

        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".config"))
            .join("vpdt-digest");

        let cache_dir = std::env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".cache"))
            .join("vpdt-digest");

        Ok(Self {
            config_dir,
            cache_dir,
        })
    }

    /// Path to the config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Directory generated speech is written to.
    pub fn audio_dir(&self) -> PathBuf {
        self.cache_dir.join("audio")
    }

    /// Default output file for a document's spoken summary.
    pub fn summary_audio_file(&self, document_number: &str) -> PathBuf {
        self.audio_dir()
            .join(format!("summary-{}.mp3", file_stem(document_number)))
    }

    /// Create the audio directory. Idempotent.
    pub fn ensure_audio_dir(&self) -> PathResult<PathBuf> {
        let dir = self.audio_dir();
        std::fs::create_dir_all(&dir).map_err(|e| PathError::CreateDir {
            path: dir.display().to_string(),
            source: e,
        })?;
        Ok(dir)
    }
}

/// Document numbers look like `123/QĐ-UBND`; keep them usable as file names.
fn file_stem(document_number: &str) -> String {
    let stem: String = document_number
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "document".into()
    } else {
        stem
    }
}
