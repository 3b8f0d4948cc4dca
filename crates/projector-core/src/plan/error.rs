use crate::{
    error::ErrorCode,
    model::{provider::ProviderId, types::ValueType},
    reduce::ReducerError,
    resolve::{MethodError, PathError},
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// PlanError
///
/// One field-level build diagnostic. Every error names the target field it
/// belongs to; `kind` carries the detail.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("field '{field}': {kind}")]
pub struct PlanError {
    pub field: String,
    pub kind: PlanErrorKind,
}

impl PlanError {
    #[must_use]
    pub fn new(field: impl Into<String>, kind: impl Into<PlanErrorKind>) -> Self {
        Self {
            field: field.into(),
            kind: kind.into(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.kind.code()
    }
}

///
/// PlanErrorKind
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PlanErrorKind {
    #[error("{0}")]
    Path(Box<PathError>),

    #[error("{0}")]
    Method(Box<MethodError>),

    #[error("{0}")]
    Reducer(Box<ReducerError>),

    /// A dependency is rooted at another computed target field.
    #[error(
        "dependency '{dependency}' refers to computed field '{sibling}'; computed fields may only depend on source paths"
    )]
    CircularDependency { dependency: String, sibling: String },

    #[error("target field is declared more than once")]
    DuplicateTargetField,

    #[error(
        "expected {expected} reducer(s), one per collection-traversing dependency, but {found} were declared"
    )]
    ReducerCountMismatch { expected: usize, found: usize },

    #[error(
        "transformation method {provider}.{method} requires a provider instance; transformations must be stateless"
    )]
    TransformationMustBeStateless { provider: ProviderId, method: String },

    #[error("transformation reference must name a method")]
    TransformationNameRequired,

    #[error("source type {found} is not assignable to target type {expected}")]
    TypeMismatch { expected: ValueType, found: ValueType },
}

impl PlanErrorKind {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Path(err) => match **err {
                PathError::EmptySegment { .. } => ErrorCode::EmptyPath,
                PathError::NotFound { .. } => ErrorCode::PathNotFound,
                PathError::InvalidCollection { .. } => ErrorCode::InvalidCollectionPath,
            },
            Self::Method(err) => match **err {
                MethodError::ProviderNotRegistered { .. } => ErrorCode::ProviderNotRegistered,
                MethodError::NameRequired | MethodError::NotFound { .. } => {
                    ErrorCode::MethodNotFound
                }
            },
            Self::Reducer(_) => ErrorCode::ReducerUnsupported,
            Self::CircularDependency { .. } => ErrorCode::CircularDependency,
            Self::DuplicateTargetField => ErrorCode::DuplicateTargetField,
            Self::ReducerCountMismatch { .. } => ErrorCode::ReducerCountMismatch,
            Self::TransformationMustBeStateless { .. } => ErrorCode::TransformationMustBeStateless,
            Self::TransformationNameRequired => ErrorCode::TransformationNameRequired,
            Self::TypeMismatch { .. } => ErrorCode::TypeMismatch,
        }
    }
}

impl From<PathError> for PlanErrorKind {
    fn from(err: PathError) -> Self {
        Self::Path(Box::new(err))
    }
}

impl From<MethodError> for PlanErrorKind {
    fn from(err: MethodError) -> Self {
        Self::Method(Box::new(err))
    }
}

impl From<ReducerError> for PlanErrorKind {
    fn from(err: ReducerError) -> Self {
        Self::Reducer(Box::new(err))
    }
}

///
/// BuildErrors
///
/// Complete, ordered diagnostics from one failed build. Field order follows
/// declaration order; a field may contribute several entries.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, ThisError)]
pub struct BuildErrors {
    pub projection: String,
    pub errors: Vec<PlanError>,
}

impl BuildErrors {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlanError> {
        self.errors.iter()
    }

    /// Codes of every error, in order.
    #[must_use]
    pub fn codes(&self) -> Vec<ErrorCode> {
        self.errors.iter().map(PlanError::code).collect()
    }

    /// Errors reported for one target field.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a PlanError> {
        self.errors.iter().filter(move |err| err.field == field)
    }
}

impl fmt::Display for BuildErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "projection '{}' has {} error(s):",
            self.projection,
            self.errors.len()
        )?;
        for err in &self.errors {
            write!(f, "\n  [{}] {err}", err.code())?;
        }

        Ok(())
    }
}

impl IntoIterator for BuildErrors {
    type Item = PlanError;
    type IntoIter = std::vec::IntoIter<PlanError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}
