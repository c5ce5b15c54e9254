use crate::tree::NodeId;
use stencil_model::{AccessType, ModelError};
use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

/// A placeholder that could not be parsed by its document format
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    /// Byte offset inside the placeholder text, when the format knows it
    pub offset: Option<usize>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            offset: None,
        }
    }

    pub fn at(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset: Some(offset),
        }
    }
}

/// Discriminant of a [`RenderError`], handy for matching in tests and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidPlaceholderStructure,
    UnexpectedLoopCondition,
    MissingValue,
    InvalidValue,
    UnexpectedAccessMode,
    Syntax,
    UnknownCommand,
    RescanLimit,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Invalid placeholder structure at {key} ({node:?}): {message}")]
    InvalidPlaceholderStructure {
        key: String,
        node: NodeId,
        message: String,
    },

    #[error("Unexpected loop condition at {key} ({node:?}): {message}")]
    UnexpectedLoopCondition {
        key: String,
        node: NodeId,
        message: String,
    },

    #[error("Missing value for '{attribute}' of {key} ({node:?})")]
    MissingValue {
        key: String,
        attribute: String,
        node: NodeId,
    },

    #[error("Invalid value for '{attribute}' of {key} ({node:?}): {message}")]
    InvalidValue {
        key: String,
        attribute: String,
        node: NodeId,
        message: String,
    },

    #[error("Unexpected {access} access for '{attribute}' of {key} ({node:?})")]
    UnexpectedAccessMode {
        key: String,
        attribute: String,
        node: NodeId,
        access: AccessType,
    },

    #[error("Cannot parse placeholder ({node:?}): {source}")]
    Syntax {
        node: NodeId,
        #[source]
        source: SyntaxError,
    },

    #[error("Unknown command {key} ({node:?})")]
    UnknownCommand { key: String, node: NodeId },

    #[error("Rendering did not settle after {limit} rescans")]
    RescanLimit { limit: usize },
}

impl RenderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::InvalidPlaceholderStructure { .. } => ErrorKind::InvalidPlaceholderStructure,
            RenderError::UnexpectedLoopCondition { .. } => ErrorKind::UnexpectedLoopCondition,
            RenderError::MissingValue { .. } => ErrorKind::MissingValue,
            RenderError::InvalidValue { .. } => ErrorKind::InvalidValue,
            RenderError::UnexpectedAccessMode { .. } => ErrorKind::UnexpectedAccessMode,
            RenderError::Syntax { .. } => ErrorKind::Syntax,
            RenderError::UnknownCommand { .. } => ErrorKind::UnknownCommand,
            RenderError::RescanLimit { .. } => ErrorKind::RescanLimit,
        }
    }

    pub fn structure(key: impl Into<String>, node: NodeId, message: impl Into<String>) -> Self {
        RenderError::InvalidPlaceholderStructure {
            key: key.into(),
            node,
            message: message.into(),
        }
    }

    pub fn loop_condition(key: impl Into<String>, node: NodeId, message: impl Into<String>) -> Self {
        RenderError::UnexpectedLoopCondition {
            key: key.into(),
            node,
            message: message.into(),
        }
    }

    pub fn missing(key: impl Into<String>, attribute: impl Into<String>, node: NodeId) -> Self {
        RenderError::MissingValue {
            key: key.into(),
            attribute: attribute.into(),
            node,
        }
    }

    pub fn invalid(
        key: impl Into<String>,
        attribute: impl Into<String>,
        node: NodeId,
        message: impl Into<String>,
    ) -> Self {
        RenderError::InvalidValue {
            key: key.into(),
            attribute: attribute.into(),
            node,
            message: message.into(),
        }
    }

    pub fn access_mode(
        key: impl Into<String>,
        attribute: impl Into<String>,
        node: NodeId,
        access: AccessType,
    ) -> Self {
        RenderError::UnexpectedAccessMode {
            key: key.into(),
            attribute: attribute.into(),
            node,
            access,
        }
    }

    /// Attribute-scoped translation of a model addressing failure
    pub fn from_model(err: ModelError, key: &str, attribute: &str, node: NodeId) -> Self {
        match err {
            ModelError::UnboundVariable { .. } => RenderError::missing(key, attribute, node),
            ModelError::UnknownPrefix { .. } => RenderError::access_mode(
                key,
                attribute,
                node,
                AccessType::ModelByName { prefixed: true },
            ),
            other => RenderError::invalid(key, attribute, node, other.to_string()),
        }
    }
}
