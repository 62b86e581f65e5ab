//! Errors the entry point needs to tell apart from generic failures.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ChatpipeError {
    #[error(
        "Error: API key is required either as an argument or in the OPENAI_API_KEY environment variable."
    )]
    MissingApiKey,
    #[error("failed to read image {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
