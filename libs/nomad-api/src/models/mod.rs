//! Nomad API models

pub mod job;
pub mod register;

use thiserror::Error;

/// Errors raised while decoding, patching or encoding a job document
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("malformed job document: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("job field '{field}' has an unexpected shape: {source}")]
    FieldShape {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("job field '{0}' is absent")]
    AbsentField(&'static str),

    #[error("unable to encode job document: {0}")]
    Encode(#[source] serde_json::Error),
}
