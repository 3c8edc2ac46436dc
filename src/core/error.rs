use thiserror::Error;

/// Domain errors raised by the notifier and its host boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// The host handed over a command node of a kind we do not index.
    #[error("unsupported command node kind: {0}")]
    UnsupportedCommandKind(String),

    /// A command node without a `type` tag.
    #[error("command node is missing its `type` field")]
    MissingCommandKind,

    /// Unload event for a plugin that was never indexed.
    #[error("plugin '{0}' is not tracked")]
    PluginNotTracked(String),

    #[error("malformed message origin: {0}")]
    InvalidOrigin(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
