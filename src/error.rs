//! Error types for advisory selection and manifest patching.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the resolution pipeline.
///
/// Every variant except [`Error::ManifestNotFound`] aborts the run.
/// `ManifestNotFound` is turned into [`PinOutcome::NoManifest`](crate::manifest::PinOutcome)
/// by [`apply_pin`](crate::manifest::apply_pin).
#[derive(Error, Debug)]
pub enum Error {
    #[error("advisory source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("no usable advisory among {examined} candidates")]
    NoCandidateFound { examined: usize },

    #[error("unsupported version range {range:?} (advisory {cve:?})")]
    UnsupportedRangeFormat { cve: String, range: String },

    #[error("no requirements.txt found under {}", root.display())]
    ManifestNotFound { root: PathBuf },

    #[error("cannot extract owner/repo from {0:?}")]
    InvalidRepoUrl(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::SourceUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
