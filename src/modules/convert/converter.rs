use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::modules::convert::model::DocumentFormat;

#[derive(thiserror::Error, Debug)]
pub enum ConversionError {
    #[error("failed to start converter: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("converter exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("converter timed out after {0:?}")]
    Timeout(Duration),
    #[error("converter produced no output at {0}")]
    MissingOutput(PathBuf),
}

/// One call to an external document converter.
#[async_trait::async_trait]
pub trait Converter {
    /// Convert `input` into `target`, writing into `output_dir`, and return the produced file.
    ///
    /// `profile_dir` is scratch space private to this call.
    async fn convert(
        &self,
        input: &Path,
        target: DocumentFormat,
        output_dir: &Path,
        profile_dir: &Path,
    ) -> Result<PathBuf, ConversionError>;
}
