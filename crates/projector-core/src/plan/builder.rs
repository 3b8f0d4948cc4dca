use crate::{
    config::EngineConfig,
    model::{
        directive::{Directive, ProjectionDecl, TargetField},
        provider::ProviderRegistry,
        source::SourceType,
        types::ValueType,
    },
    obs::sink::{self, PlanEvent},
    plan::{BuildErrors, FieldMapping, PlanError, PlanErrorKind, ProjectionPlan},
    resolve::{PathError, resolve_path},
};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::{debug, debug_span, warn};

///
/// PlanBuilder
///
/// Turns one DTO declaration into a `ProjectionPlan`. Holds configuration
/// only; every `build` call is a pure function of its inputs.
///

#[derive(Clone, Debug, Default)]
pub struct PlanBuilder {
    config: EngineConfig,
}

impl PlanBuilder {
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve every target field of `decl` against `source` and `providers`.
    ///
    /// Field errors never stop the run: each field is resolved independently
    /// and all diagnostics are returned together, in declaration order.
    pub fn build(
        &self,
        source: &SourceType,
        decl: &ProjectionDecl,
        providers: &ProviderRegistry,
    ) -> Result<ProjectionPlan, BuildErrors> {
        let span = debug_span!("build_projection", dto = %decl.name, source = %source.name);
        let _enter = span.enter();

        sink::record(PlanEvent::BuildStart {
            projection: &decl.name,
            source: &source.name,
            fields: decl.fields.len(),
        });

        let ctx = FieldContext {
            config: &self.config,
            source,
            decl,
            providers,
        };

        let mut fields = IndexMap::with_capacity(decl.fields.len());
        let mut errors = Vec::new();
        let mut seen = HashSet::with_capacity(decl.fields.len());
        let mut rejected = 0;

        for target in &decl.fields {
            let result = if seen.insert(target.name.as_str()) {
                ctx.resolve(target)
            } else {
                Err(vec![ctx.error(target, PlanErrorKind::DuplicateTargetField)])
            };

            match result {
                Ok(mapping) => {
                    debug!(field = %target.name, kind = %mapping.kind(), "field resolved");
                    sink::record(PlanEvent::FieldResolved {
                        projection: &decl.name,
                        field: &target.name,
                        kind: mapping.kind(),
                    });
                    fields.insert(target.name.clone(), mapping);
                }
                Err(field_errors) => {
                    rejected += 1;
                    for err in &field_errors {
                        warn!(field = %target.name, code = %err.code(), "{}", err.kind);
                        sink::record(PlanEvent::FieldRejected {
                            projection: &decl.name,
                            field: &target.name,
                            code: err.code(),
                        });
                    }
                    errors.extend(field_errors);
                }
            }
        }

        sink::record(PlanEvent::BuildFinish {
            projection: &decl.name,
            resolved: fields.len(),
            rejected,
        });

        if !errors.is_empty() {
            return Err(BuildErrors {
                projection: decl.name.clone(),
                errors,
            });
        }

        Ok(ProjectionPlan {
            dto: decl.name.clone(),
            source: source.clone(),
            providers: providers.clone(),
            fields,
        })
    }
}

/// Build a plan with the default configuration.
pub fn build_plan(
    source: &SourceType,
    decl: &ProjectionDecl,
    providers: &ProviderRegistry,
) -> Result<ProjectionPlan, BuildErrors> {
    PlanBuilder::default().build(source, decl, providers)
}

///
/// FieldContext
///
/// Inputs shared by every field of one build.
///

pub(super) struct FieldContext<'a> {
    pub(super) config: &'a EngineConfig,
    pub(super) source: &'a SourceType,
    pub(super) decl: &'a ProjectionDecl,
    pub(super) providers: &'a ProviderRegistry,
}

pub(super) type FieldResult = Result<FieldMapping, Vec<PlanError>>;

impl FieldContext<'_> {
    pub(super) fn error(&self, target: &TargetField, kind: impl Into<PlanErrorKind>) -> PlanError {
        PlanError::new(target.name.clone(), kind)
    }

    fn resolve(&self, target: &TargetField) -> FieldResult {
        match &target.directive {
            Directive::Implicit => self.implicit(target),
            Directive::Explicit { path } => self.explicit(target, path),
            Directive::Computed(directive) => self.computed(target, directive),
        }
    }

    // The same-named source field, copied whole. Collections are allowed here:
    // no element field is selected, so the collection itself is the value.
    fn implicit(&self, target: &TargetField) -> FieldResult {
        let Some(field) = self.source.field(&target.name) else {
            let err = PathError::NotFound {
                path: target.name.clone(),
                segment: target.name.clone(),
                owner: self.source.name.clone(),
                resolved: String::new(),
            };
            return Err(vec![self.error(target, err)]);
        };

        let value_type = field.kind.value_type();
        self.check_projected(target, &value_type)?;

        Ok(FieldMapping::Implicit {
            source_field: field.name.clone(),
            value_type,
            nullable: field.nullable,
        })
    }

    fn explicit(&self, target: &TargetField, path: &str) -> FieldResult {
        let resolved =
            resolve_path(self.source, path).map_err(|err| vec![self.error(target, err)])?;
        self.check_projected(target, &resolved.value_type())?;

        Ok(FieldMapping::Explicit { path: resolved })
    }

    fn check_projected(
        &self,
        target: &TargetField,
        found: &ValueType,
    ) -> Result<(), Vec<PlanError>> {
        if !self.config.check_projected_types
            || found.is_assignable_to(&target.ty, self.config.numeric_widening)
        {
            return Ok(());
        }

        Err(vec![self.error(
            target,
            PlanErrorKind::TypeMismatch {
                expected: target.ty.clone(),
                found: found.clone(),
            },
        )])
    }
}
