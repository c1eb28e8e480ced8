use thiserror::Error;

/// Errors raised while generating a program or loading its parameters.
#[derive(Debug, Error)]
pub enum EmitError {
    /// The sink refused further output. Whatever was written before is partial
    /// and should be discarded.
    #[error("failed to write program text: {0}")]
    Write(#[from] std::io::Error),

    /// A parameter document could not be parsed. Never raised while emitting.
    #[error("invalid process parameters: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EmitError>;
