//! Plan building: classify every target field, validate it, and assemble the
//! executable `ProjectionPlan`.
//!
//! The builder is the only component with cross-field knowledge. Path and
//! method resolution stay pure functions in `resolve`.

mod builder;
mod computed;
mod error;
mod explain;

#[cfg(test)]
mod tests;

use crate::{
    model::{provider::ProviderRegistry, source::SourceType, types::ValueType},
    reduce::ReducerKind,
    resolve::{ResolvedMethod, ResolvedPath},
};
use derive_more::Display;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

// re-exports
pub use builder::{PlanBuilder, build_plan};
pub use error::{BuildErrors, PlanError, PlanErrorKind};

///
/// MappingKind
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum MappingKind {
    Implicit,
    Explicit,
    Computed,
}

///
/// ComputeStep
///
/// First stage of a computed field: either a provider method, or the
/// reduced value of its only dependency passed through as is.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ComputeStep {
    Identity { value_type: ValueType },
    Invoke(ResolvedMethod),
}

impl ComputeStep {
    #[must_use]
    pub const fn returns(&self) -> &ValueType {
        match self {
            Self::Identity { value_type } => value_type,
            Self::Invoke(method) => method.returns(),
        }
    }

    #[must_use]
    pub const fn method(&self) -> Option<&ResolvedMethod> {
        match self {
            Self::Identity { .. } => None,
            Self::Invoke(method) => Some(method),
        }
    }

    #[must_use]
    pub const fn is_identity(&self) -> bool {
        matches!(self, Self::Identity { .. })
    }
}

impl fmt::Display for ComputeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity { value_type } => write!(f, "identity -> {value_type}"),
            Self::Invoke(method) => write!(f, "{method}"),
        }
    }
}

///
/// ReducerBinding
///
/// A reducer paired with the collection-traversing dependency it collapses.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ReducerBinding {
    /// Position of the dependency in `ComputedMapping::dependencies`.
    pub dependency: usize,
    pub path: String,
    pub reducer: ReducerKind,
    pub output_type: ValueType,
}

///
/// ComputedMapping
///
/// Executed as: read every dependency, reduce the collection-traversing ones,
/// invoke `compute` with `parameter_types` in order, then `transform`.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ComputedMapping {
    pub dependencies: Vec<ResolvedPath>,
    pub parameter_types: Vec<ValueType>,
    pub compute: ComputeStep,
    pub transform: Option<ResolvedMethod>,
    pub reducers: Vec<ReducerBinding>,
}

impl ComputedMapping {
    /// Type of the value finally assigned to the target field.
    #[must_use]
    pub fn output_type(&self) -> &ValueType {
        self.transform
            .as_ref()
            .map_or_else(|| self.compute.returns(), ResolvedMethod::returns)
    }

    /// Reducer applied to the dependency at `index`, if any.
    #[must_use]
    pub fn reducer_for(&self, index: usize) -> Option<&ReducerBinding> {
        self.reducers
            .iter()
            .find(|binding| binding.dependency == index)
    }
}

///
/// FieldMapping
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum FieldMapping {
    /// Direct copy of the same-named source field.
    Implicit {
        source_field: String,
        value_type: ValueType,
        nullable: bool,
    },

    /// Direct copy of the value at a resolved path.
    Explicit { path: ResolvedPath },

    Computed(Box<ComputedMapping>),
}

impl FieldMapping {
    #[must_use]
    pub const fn kind(&self) -> MappingKind {
        match self {
            Self::Implicit { .. } => MappingKind::Implicit,
            Self::Explicit { .. } => MappingKind::Explicit,
            Self::Computed(_) => MappingKind::Computed,
        }
    }

    #[must_use]
    pub fn as_computed(&self) -> Option<&ComputedMapping> {
        match self {
            Self::Computed(computed) => Some(computed),
            _ => None,
        }
    }

    /// Type of the value this mapping produces.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Implicit { value_type, .. } => value_type.clone(),
            Self::Explicit { path } => path.value_type(),
            Self::Computed(computed) => computed.output_type().clone(),
        }
    }

    /// Source paths read by this mapping, in dependency order.
    pub fn source_paths(&self) -> Vec<&str> {
        match self {
            Self::Implicit { source_field, .. } => vec![source_field.as_str()],
            Self::Explicit { path } => vec![path.path.as_str()],
            Self::Computed(computed) => computed
                .dependencies
                .iter()
                .map(|dep| dep.path.as_str())
                .collect(),
        }
    }
}

///
/// ProjectionPlan
///
/// Validated mapping for one (source type, DTO declaration) pair, keyed by
/// target field in declaration order. Immutable once built.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ProjectionPlan {
    pub(crate) dto: String,
    pub(crate) source: SourceType,
    pub(crate) providers: ProviderRegistry,
    pub(crate) fields: IndexMap<String, FieldMapping>,
}

impl ProjectionPlan {
    #[must_use]
    pub fn dto(&self) -> &str {
        &self.dto
    }

    #[must_use]
    pub const fn source(&self) -> &SourceType {
        &self.source
    }

    #[must_use]
    pub const fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldMapping> {
        self.fields.get(field)
    }

    /// Mappings in target declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldMapping)> {
        self.fields
            .iter()
            .map(|(name, mapping)| (name.as_str(), mapping))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Every source path the plan reads, deduplicated, in first-seen order.
    #[must_use]
    pub fn required_source_paths(&self) -> Vec<&str> {
        let paths: IndexSet<&str> = self
            .fields
            .values()
            .flat_map(FieldMapping::source_paths)
            .collect();

        paths.into_iter().collect()
    }
}
