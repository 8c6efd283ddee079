#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Unknown command: {0}. Type 'help' for the list of commands")]
    UnknownCommand(String),

    #[error("Missing argument for '{0}'")]
    MissingArgument(String),

    #[error("Invalid page number: {0}")]
    InvalidPage(String),

    #[error("Invalid pokemon reference: {0}")]
    InvalidReference(String),
}
