use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid command: {details}")]
    InvalidCommand { details: String },
    #[error("{details}")]
    ExecutionFailed { details: String },
}

/// What the presentation layer can ask of the apartment store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New,
    List,
    Load {
        name: String,
    },
    Save {
        name: String,
        /// `key=value` assignments applied on top of the defaults.
        assignments: Vec<(String, String)>,
        password: String,
    },
    Delete {
        name: String,
        password: String,
    },
    ToggleLock {
        password: String,
    },
}

#[async_trait::async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, command: Command) -> error_stack::Result<String, CommandError>;
}
