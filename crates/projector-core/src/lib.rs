//! Core resolution engine for Projector: source and directive models, the
//! provider registry, path and method resolution, reducer typing, and the
//! plan builder that turns a DTO declaration into a validated `ProjectionPlan`.
//!
//! The engine is a pure function of its inputs. Nothing here parses surface
//! syntax, generates code, or looks up provider instances; those concerns
//! belong to the tools that feed the engine and consume its plans.

pub mod config;
pub mod error;
pub mod model;
pub mod obs;
pub mod plan;
pub mod reduce;
pub mod resolve;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Separator between segments of a source field path.
pub const PATH_SEPARATOR: char = '.';

/// Default prefix for convention-named computation methods (`get[FieldName]`).
pub const DEFAULT_COMPUTE_METHOD_PREFIX: &str = "get";

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// Errors, resolvers, and observability helpers are imported from their modules.
///

pub mod prelude {
    pub use crate::{
        config::EngineConfig,
        model::{
            directive::{ComputedDirective, Directive, MethodRef, ProjectionDecl, TargetField},
            provider::{
                InvocationMode, MethodSignature, ProviderDescriptor, ProviderId, ProviderRegistry,
                Receiver,
            },
            source::{FieldKind, SourceField, SourceType},
            types::{ScalarType, ValueType},
        },
        plan::{FieldMapping, PlanBuilder, ProjectionPlan, build_plan},
        reduce::ReducerKind,
    };
}
