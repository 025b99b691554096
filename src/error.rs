use thiserror::Error;

/// Malformed or insufficient command line input.
///
/// Never reaches the dispatcher; always maps to exit code 2 and is always
/// followed by the help text on standard error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("unrecognized option(s): {}", .0.join(", "))]
    UnrecognizedOptions(Vec<String>),

    #[error("option --{option} does not take an argument")]
    UnexpectedValue { option: String },

    #[error("option --{option} requires an argument")]
    MissingValue { option: String },

    #[error("missing arguments")]
    MissingArguments,

    /// Any other command line problem, described by its kind
    #[error("{0}")]
    Rejected(String),
}

/// Failure raised while loading a document or inside the schema engine.
///
/// Captured per input by the dispatcher; any occurrence maps to exit code 1.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown meta-schema: {uri}")]
    UnknownMetaSchema { uri: String },

    #[error("schema compilation failed: {details}")]
    Compilation { details: String },
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
