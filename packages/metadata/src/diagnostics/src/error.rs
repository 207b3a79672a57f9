use thiserror::Error;

use crate::reflection::HostError;

/// Failures that abort a metadata build request.
///
/// Recoverable host failures never surface here: the engine converts them
/// into the canonical empty metadata so the rest of the compilation can
/// proceed. Everything else fails fast.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The reflection host reported an unrecoverable compiler state.
    #[error("fatal reflection host failure: {0}")]
    Host(String),

    /// An alias marker is structurally unusable, e.g. `AliasFor` with no
    /// target member. This is a programmer error in annotation authoring.
    #[error("invalid alias on annotation {annotation}: {detail}")]
    InvalidAlias { annotation: String, detail: String },
}

impl From<HostError> for MetadataError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::Recoverable(reason) | HostError::Fatal(reason) => {
                MetadataError::Host(reason)
            }
        }
    }
}
