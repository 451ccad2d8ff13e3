//! Service-level error taxonomy.
//!
//! `NotFound` and validation failures stop an operation before any mutation
//! and propagate unchanged to the transport boundary. Business-rule refusals
//! are not errors; see `model::outcome`.

use crate::model::descriptor::DescriptorId;
use crate::model::language::LanguageId;
use crate::model::node::NodeId;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Coarse error class used by transports to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Storage,
}

/// Missing required input or violated structural precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Language code is absent or blank.
    MissingCode,
    /// Update request does not name its target.
    MissingId,
    /// The initial language is permanent.
    InitialLanguageUndeletable(LanguageId),
    /// The default language must be replaced before it can be deleted.
    DefaultLanguageUndeletable(LanguageId),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCode => write!(f, "language code is required"),
            Self::MissingId => write!(f, "id is required"),
            Self::InitialLanguageUndeletable(id) => {
                write!(f, "initial language cannot be deleted: {id}")
            }
            Self::DefaultLanguageUndeletable(id) => {
                write!(f, "default language cannot be deleted: {id}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Errors from content engine use-cases.
#[derive(Debug)]
pub enum ServiceError {
    LanguageNotFound(LanguageId),
    /// No language carries the default flag.
    DefaultLanguageNotFound,
    NodeNotFound(NodeId),
    /// Parent or relocation destination does not exist.
    ParentNotFound(NodeId),
    DescriptorNotFound(DescriptorId),
    Validation(ValidationError),
    /// Repository-level failure.
    Repo(RepoError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LanguageNotFound(_)
            | Self::DefaultLanguageNotFound
            | Self::NodeNotFound(_)
            | Self::ParentNotFound(_)
            | Self::DescriptorNotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Repo(_) => ErrorKind::Storage,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::LanguageNotFound(_) => "LANGUAGE_NOT_FOUND",
            Self::DefaultLanguageNotFound => "DEFAULT_LANGUAGE_NOT_FOUND",
            Self::NodeNotFound(_) => "NODE_NOT_FOUND",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::DescriptorNotFound(_) => "DESCRIPTOR_NOT_FOUND",
            Self::Validation(ValidationError::MissingCode) => "VALIDATION_MISSING_CODE",
            Self::Validation(ValidationError::MissingId) => "VALIDATION_MISSING_ID",
            Self::Validation(ValidationError::InitialLanguageUndeletable(_)) => {
                "VALIDATION_INITIAL_LANGUAGE"
            }
            Self::Validation(ValidationError::DefaultLanguageUndeletable(_)) => {
                "VALIDATION_DEFAULT_LANGUAGE"
            }
            Self::Repo(_) => "STORAGE",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LanguageNotFound(id) => write!(f, "language not found: {id}"),
            Self::DefaultLanguageNotFound => write!(f, "default language not found"),
            Self::NodeNotFound(id) => write!(f, "node not found: {id}"),
            Self::ParentNotFound(id) => write!(f, "parent node not found: {id}"),
            Self::DescriptorNotFound(id) => write!(f, "descriptor not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::LanguageNotFound(id) => Self::LanguageNotFound(id),
            RepoError::NodeNotFound(id) => Self::NodeNotFound(id),
            RepoError::DescriptorNotFound(id) => Self::DescriptorNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}
