use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// The two error families the engine can raise: a local mutator whose
/// preconditions were not met, and a decoder that was handed an operation
/// tag it doesn't recognize.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unmet preconditions: {0}")]
    UnmetPreconditions(String),
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
}
