use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    #[error("Variable '{name}' is not bound")]
    UnboundVariable { name: String },

    #[error("No active model prefix named '{name}'")]
    UnknownPrefix { name: String },

    #[error("Expected a list at '{path}'")]
    NotAList { path: String },

    #[error("Expected a map at '{path}'")]
    NotAMap { path: String },

    #[error("Attaching node would create a cycle")]
    CycleDetected,
}

impl ModelError {
    pub fn invalid_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn unbound_variable(name: impl Into<String>) -> Self {
        Self::UnboundVariable { name: name.into() }
    }

    pub fn unknown_prefix(name: impl Into<String>) -> Self {
        Self::UnknownPrefix { name: name.into() }
    }

    pub fn not_a_list(path: impl Into<String>) -> Self {
        Self::NotAList { path: path.into() }
    }

    pub fn not_a_map(path: impl Into<String>) -> Self {
        Self::NotAMap { path: path.into() }
    }
}
