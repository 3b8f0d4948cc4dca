mod computed;

use crate::{
    config::EngineConfig,
    model::{
        directive::{ComputedDirective, ProjectionDecl, TargetField},
        provider::ProviderRegistry,
        source::SourceType,
        types::ValueType,
    },
    plan::{BuildErrors, ComputedMapping, FieldMapping, PlanBuilder, ProjectionPlan, build_plan},
};

fn decl_of(fields: impl IntoIterator<Item = TargetField>) -> ProjectionDecl {
    fields
        .into_iter()
        .fold(ProjectionDecl::new("UserDto"), ProjectionDecl::with_field)
}

fn computed_field(
    name: &str,
    ty: impl Into<ValueType>,
    directive: ComputedDirective,
) -> ProjectionDecl {
    decl_of([TargetField::computed(name, ty, directive)])
}

fn build_ok(
    source: &SourceType,
    decl: &ProjectionDecl,
    providers: &ProviderRegistry,
) -> ProjectionPlan {
    match build_plan(source, decl, providers) {
        Ok(plan) => plan,
        Err(errors) => panic!("build should succeed:\n{errors}"),
    }
}

fn build_err(
    source: &SourceType,
    decl: &ProjectionDecl,
    providers: &ProviderRegistry,
) -> BuildErrors {
    build_plan(source, decl, providers).expect_err("build should fail")
}

fn build_with(
    config: EngineConfig,
    source: &SourceType,
    decl: &ProjectionDecl,
    providers: &ProviderRegistry,
) -> Result<ProjectionPlan, BuildErrors> {
    PlanBuilder::new(config).build(source, decl, providers)
}

fn computed<'a>(plan: &'a ProjectionPlan, field: &str) -> &'a ComputedMapping {
    plan.get(field)
        .and_then(FieldMapping::as_computed)
        .unwrap_or_else(|| panic!("field '{field}' should be computed"))
}
