use thiserror::Error;

pub type Result<T> = std::result::Result<T, IgniteError>;

#[derive(Debug, Error)]
pub enum IgniteError {
    #[error("Dependency not found: {type_name}")]
    DependencyNotFound { type_name: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to read configuration file '{path}'")]
    ConfigFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed configuration: {0}")]
    ConfigSource(#[from] figment::Error),
}

impl IgniteError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
