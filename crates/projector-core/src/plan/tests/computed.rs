use super::{build_err, build_ok, build_with, computed, computed_field, decl_of};
use crate::{
    config::EngineConfig,
    error::ErrorCode,
    model::{
        directive::{ComputedDirective, MethodRef, TargetField},
        provider::{MethodSignature, ProviderDescriptor, ProviderId, ProviderRegistry},
        source::{FieldKind, SourceType},
        types::{ScalarType, ValueType},
    },
    plan::{ComputeStep, PlanErrorKind, ReducerBinding},
    reduce::ReducerKind,
    resolve::{Invocation, MethodError},
    test_support::{full_name_providers, scalar, user, vt},
};

fn stats_provider(method: MethodSignature) -> ProviderRegistry {
    ProviderRegistry::new().with(ProviderDescriptor::by_type("OrderStats").with_method(method))
}

//
// Computation method
//

#[test]
fn convention_method_resolves_with_dependency_types() {
    let decl = computed_field(
        "fullName",
        ScalarType::Text,
        ComputedDirective::new(["firstName", "lastName"]),
    );
    let plan = build_ok(&user(), &decl, &full_name_providers());
    let mapping = computed(&plan, "fullName");

    assert_eq!(mapping.parameter_types, vec![vt(ScalarType::Text); 2]);
    assert!(mapping.reducers.is_empty());
    assert!(mapping.transform.is_none());

    let method = mapping.compute.method().expect("compute is a method");
    assert_eq!(method.provider, ProviderId::new("UserComputations"));
    assert_eq!(method.invocation, Invocation::Stateless);
}

#[test]
fn computed_by_override_selects_named_method_on_provider() {
    let providers = ProviderRegistry::new()
        .with(ProviderDescriptor::by_type("Legacy").with_method(MethodSignature::stateless(
            "calculateAge",
            [vt(ScalarType::Date)],
            ScalarType::Int32,
        )))
        .with(
            ProviderDescriptor::by_name("Modern", "modernUtils").with_method(
                MethodSignature::instance("calculateAge", [vt(ScalarType::Date)], ScalarType::Int32),
            ),
        );
    let decl = computed_field(
        "years",
        ScalarType::Int32,
        ComputedDirective::new(["birthDate"])
            .computed_by(MethodRef::new("Modern", "calculateAge")),
    );
    let plan = build_ok(&user(), &decl, &providers);

    let method = computed(&plan, "years").compute.method().cloned();
    assert_eq!(
        method.map(|method| method.invocation),
        Some(Invocation::InstanceByName("modernUtils".to_string()))
    );
}

#[test]
fn unregistered_override_provider_is_reported() {
    let decl = computed_field(
        "years",
        ScalarType::Int32,
        ComputedDirective::new(["birthDate"]).computed_by(MethodRef::on("ModernUtils")),
    );
    let errors = build_err(&user(), &decl, &full_name_providers());

    assert_eq!(errors.codes(), vec![ErrorCode::ProviderNotRegistered]);
    assert!(
        errors.to_string().contains("available providers: UserComputations"),
        "{errors}"
    );
}

#[test]
fn missing_method_reports_expected_signature_and_providers() {
    let decl = computed_field(
        "displayName",
        ScalarType::Text,
        ComputedDirective::new(["firstName", "age"]),
    );
    let errors = build_err(&user(), &decl, &full_name_providers());

    assert_eq!(errors.codes(), vec![ErrorCode::MethodNotFound]);
    let message = errors.errors[0].to_string();
    assert!(message.starts_with("field 'displayName': "), "{message}");
    assert!(message.contains("Text getDisplayName(Text, Int32)"), "{message}");
    assert!(message.contains("searched in: UserComputations"), "{message}");
}

#[test]
fn compute_return_must_fit_target_without_transformation() {
    let decl = computed_field(
        "fullName",
        ScalarType::Int32,
        ComputedDirective::new(["firstName", "lastName"]),
    );
    let errors = build_err(&user(), &decl, &full_name_providers());

    assert_eq!(errors.codes(), vec![ErrorCode::MethodNotFound]);
}

//
// Reducers
//

#[test]
fn reducers_pair_with_collection_dependencies_only() {
    let providers = stats_provider(MethodSignature::stateless(
        "getSummary",
        [vt(ScalarType::Text), vt(ScalarType::Decimal), vt(ScalarType::Int64)],
        ScalarType::Text,
    ));
    let decl = computed_field(
        "summary",
        ScalarType::Text,
        ComputedDirective::new(["firstName", "orders.total", "orders.items.sku"])
            .reducers([ReducerKind::Sum, ReducerKind::CountDistinct]),
    );
    let plan = build_ok(&user(), &decl, &providers);
    let mapping = computed(&plan, "summary");

    assert_eq!(
        mapping.reducers,
        vec![
            ReducerBinding {
                dependency: 1,
                path: "orders.total".to_string(),
                reducer: ReducerKind::Sum,
                output_type: vt(ScalarType::Decimal),
            },
            ReducerBinding {
                dependency: 2,
                path: "orders.items.sku".to_string(),
                reducer: ReducerKind::CountDistinct,
                output_type: vt(ReducerKind::COUNT_TYPE),
            },
        ]
    );
    assert!(mapping.reducer_for(0).is_none());
    assert_eq!(mapping.dependencies[2].collection_hop_count, 2);
}

#[test]
fn reducer_count_mismatch_is_reported() {
    let decl = computed_field(
        "orderCount",
        ScalarType::Int64,
        ComputedDirective::new(["firstName", "orders.total"]),
    );
    let errors = build_err(&user(), &decl, &ProviderRegistry::new());

    assert_eq!(
        errors.errors[0].kind,
        PlanErrorKind::ReducerCountMismatch {
            expected: 1,
            found: 0,
        }
    );
}

#[test]
fn scalar_only_dependencies_reject_any_reducer() {
    let decl = computed_field(
        "fullName",
        ScalarType::Text,
        ComputedDirective::new(["firstName", "lastName"]).reducers([ReducerKind::Count]),
    );
    let errors = build_err(&user(), &decl, &full_name_providers());

    assert_eq!(errors.codes(), vec![ErrorCode::ReducerCountMismatch]);
}

#[test]
fn sum_over_text_leaf_is_unsupported() {
    let decl = computed_field(
        "tagTotal",
        ScalarType::Text,
        ComputedDirective::new(["tags.length"]).reducers([ReducerKind::Sum]),
    );
    let errors = build_err(&user(), &decl, &ProviderRegistry::new());
    // tags is a collection of scalars; no element field can be selected
    assert_eq!(errors.codes(), vec![ErrorCode::PathNotFound]);

    let decl = computed_field(
        "skuTotal",
        ScalarType::Text,
        ComputedDirective::new(["orders.items.sku"]).reducers([ReducerKind::Sum]),
    );
    let errors = build_err(&user(), &decl, &ProviderRegistry::new());
    assert_eq!(errors.codes(), vec![ErrorCode::ReducerUnsupported]);
}

#[test]
fn count_feeds_integer_parameter_whatever_the_leaf() {
    let providers = stats_provider(MethodSignature::stateless(
        "getItemCount",
        [vt(ScalarType::Int64)],
        ScalarType::Int64,
    ));
    let decl = computed_field(
        "itemCount",
        ScalarType::Int64,
        ComputedDirective::new(["orders.items.sku"]).reducers([ReducerKind::Count]),
    );
    let plan = build_ok(&user(), &decl, &providers);

    assert_eq!(
        computed(&plan, "itemCount").parameter_types,
        vec![vt(ReducerKind::COUNT_TYPE)]
    );
}

//
// Identity reduction
//

// Assumed default: a lone reduced dependency with no computation method
// passes its reduced value through. `identity_reduction = false` turns it off.

#[test]
fn single_reduced_dependency_without_method_passes_through() {
    let decl = computed_field(
        "totalSpent",
        ScalarType::Decimal,
        ComputedDirective::new(["orders.total"]).reducers([ReducerKind::Sum]),
    );
    let plan = build_ok(&user(), &decl, &ProviderRegistry::new());

    assert_eq!(
        computed(&plan, "totalSpent").compute,
        ComputeStep::Identity {
            value_type: vt(ScalarType::Decimal),
        }
    );
}

#[test]
fn identity_prefers_a_matching_convention_method() {
    let providers = stats_provider(MethodSignature::stateless(
        "getTotalSpent",
        [vt(ScalarType::Decimal)],
        ScalarType::Decimal,
    ));
    let decl = computed_field(
        "totalSpent",
        ScalarType::Decimal,
        ComputedDirective::new(["orders.total"]).reducers([ReducerKind::Sum]),
    );
    let plan = build_ok(&user(), &decl, &providers);

    assert!(!computed(&plan, "totalSpent").compute.is_identity());
}

#[test]
fn identity_requires_assignable_reduced_type() {
    let decl = computed_field(
        "orderCount",
        ScalarType::Int32,
        ComputedDirective::new(["orders.total"]).reducers([ReducerKind::Count]),
    );
    let errors = build_err(&user(), &decl, &ProviderRegistry::new());
    assert_eq!(errors.codes(), vec![ErrorCode::MethodNotFound]);

    let widening = EngineConfig {
        numeric_widening: true,
        ..EngineConfig::default()
    };
    let widened = computed_field(
        "orderCount",
        ScalarType::Decimal,
        ComputedDirective::new(["orders.total"]).reducers([ReducerKind::Count]),
    );
    assert!(build_with(widening, &user(), &widened, &ProviderRegistry::new()).is_ok());
}

#[test]
fn identity_does_not_apply_with_explicit_compute_or_when_disabled() {
    let explicit = computed_field(
        "totalSpent",
        ScalarType::Decimal,
        ComputedDirective::new(["orders.total"])
            .reducers([ReducerKind::Sum])
            .computed_by(MethodRef::named("sumTotals")),
    );
    let errors = build_err(&user(), &explicit, &ProviderRegistry::new());
    assert_eq!(errors.codes(), vec![ErrorCode::MethodNotFound]);

    let implicit = computed_field(
        "totalSpent",
        ScalarType::Decimal,
        ComputedDirective::new(["orders.total"]).reducers([ReducerKind::Sum]),
    );
    let disabled = EngineConfig {
        identity_reduction: false,
        ..EngineConfig::default()
    };
    let errors = build_with(disabled, &user(), &implicit, &ProviderRegistry::new())
        .expect_err("identity reduction is off");
    assert_eq!(errors.codes(), vec![ErrorCode::MethodNotFound]);
}

#[test]
fn identity_needs_exactly_one_collection_dependency() {
    let decl = computed_field(
        "spendByName",
        ScalarType::Decimal,
        ComputedDirective::new(["firstName", "orders.total"]).reducers([ReducerKind::Sum]),
    );
    let errors = build_err(&user(), &decl, &ProviderRegistry::new());

    assert_eq!(errors.codes(), vec![ErrorCode::MethodNotFound]);
}

//
// Transformation
//

fn fmt_providers(receiver_is_instance: bool) -> ProviderRegistry {
    let signature = if receiver_is_instance {
        MethodSignature::instance("format", [vt(ScalarType::Decimal)], ScalarType::Text)
    } else {
        MethodSignature::stateless("format", [vt(ScalarType::Decimal)], ScalarType::Text)
    };

    ProviderRegistry::new()
        .with(ProviderDescriptor::by_type("Fmt").with_method(signature))
        .with(
            ProviderDescriptor::by_type("OrderStats").with_method(MethodSignature::stateless(
                "getTotalLabel",
                [vt(ScalarType::Decimal)],
                ScalarType::Decimal,
            )),
        )
}

fn total_label(then: MethodRef) -> ComputedDirective {
    ComputedDirective::new(["orders.total"])
        .reducers([ReducerKind::Sum])
        .then(then)
}

#[test]
fn stateless_transformation_consumes_compute_return() {
    let decl = computed_field(
        "totalLabel",
        ScalarType::Text,
        total_label(MethodRef::named("format")),
    );
    let plan = build_ok(&user(), &decl, &fmt_providers(false));
    let mapping = computed(&plan, "totalLabel");

    assert_eq!(mapping.compute.returns(), &vt(ScalarType::Decimal));
    let transform = mapping.transform.as_ref().expect("transformation resolved");
    assert_eq!(transform.provider, ProviderId::new("Fmt"));
    assert_eq!(mapping.output_type(), &vt(ScalarType::Text));
}

#[test]
fn instance_transformation_is_rejected_even_when_signature_matches() {
    let decl = computed_field(
        "totalLabel",
        ScalarType::Text,
        total_label(MethodRef::named("format")),
    );
    let errors = build_err(&user(), &decl, &fmt_providers(true));

    assert_eq!(
        errors.errors[0].kind,
        PlanErrorKind::TransformationMustBeStateless {
            provider: ProviderId::new("Fmt"),
            method: "format".to_string(),
        }
    );
}

#[test]
fn instance_transformation_on_stateless_provider_is_rejected() {
    let providers = ProviderRegistry::new().with(
        ProviderDescriptor::stateless("Fmt").with_method(MethodSignature::instance(
            "format",
            [vt(ScalarType::Decimal)],
            ScalarType::Text,
        )),
    );
    let decl = computed_field(
        "totalLabel",
        ScalarType::Text,
        total_label(MethodRef::new("Fmt", "format")),
    );
    let errors = build_err(&user(), &decl, &providers);

    assert_eq!(errors.codes(), vec![ErrorCode::TransformationMustBeStateless]);
    assert_eq!(
        errors.errors[0].kind,
        PlanErrorKind::TransformationMustBeStateless {
            provider: ProviderId::new("Fmt"),
            method: "format".to_string(),
        }
    );
}

#[test]
fn transformation_without_name_is_rejected() {
    let decl = computed_field(
        "totalLabel",
        ScalarType::Text,
        total_label(MethodRef::on("Fmt")),
    );
    let errors = build_err(&user(), &decl, &fmt_providers(false));

    assert_eq!(errors.codes(), vec![ErrorCode::TransformationNameRequired]);
}

#[test]
fn transformation_with_wrong_input_is_method_not_found() {
    let providers = ProviderRegistry::new().with(ProviderDescriptor::by_type("Fmt").with_method(
        MethodSignature::stateless("format", [vt(ScalarType::Int64)], ScalarType::Text),
    ));
    let decl = computed_field(
        "totalLabel",
        ScalarType::Text,
        total_label(MethodRef::named("format")),
    );
    let errors = build_err(&user(), &decl, &providers);

    let PlanErrorKind::Method(err) = &errors.errors[0].kind else {
        panic!("expected a method error");
    };
    let MethodError::NotFound { candidates, .. } = &**err else {
        panic!("expected NotFound");
    };
    assert_eq!(candidates.len(), 1, "format(Int64) is a near miss");
}

#[test]
fn compute_failure_skips_transformation() {
    let providers = ProviderRegistry::new();
    let decl = computed_field(
        "label",
        ScalarType::Text,
        ComputedDirective::new(["firstName"]).then(MethodRef::named("format")),
    );
    let errors = build_err(&user(), &decl, &providers);

    assert_eq!(errors.codes(), vec![ErrorCode::MethodNotFound]);
    assert!(errors.to_string().contains("getLabel"), "{errors}");
}

//
// Dependency roots
//

#[test]
fn dependency_on_sibling_computed_field_is_circular() {
    let decl = decl_of([
        TargetField::computed(
            "fullName",
            ScalarType::Text,
            ComputedDirective::new(["firstName", "lastName"]),
        ),
        TargetField::computed(
            "greeting",
            ScalarType::Text,
            ComputedDirective::new(["fullName"]),
        ),
    ]);
    let errors = build_err(&user(), &decl, &full_name_providers());

    assert_eq!(errors.codes(), vec![ErrorCode::CircularDependency]);
    assert_eq!(errors.errors[0].field, "greeting");
    assert_eq!(
        errors.errors[0].kind,
        PlanErrorKind::CircularDependency {
            dependency: "fullName".to_string(),
            sibling: "fullName".to_string(),
        }
    );
}

#[test]
fn circular_check_uses_the_path_root() {
    let source = user().with_field(
        "summary",
        FieldKind::object(SourceType::new("Summary").with_field("text", scalar(ScalarType::Text))),
    );
    let decl = decl_of([
        TargetField::computed(
            "summary",
            ScalarType::Text,
            ComputedDirective::new(["firstName", "lastName"])
                .computed_by(MethodRef::named("getFullName")),
        ),
        TargetField::computed(
            "shout",
            ScalarType::Text,
            ComputedDirective::new(["summary.text"]),
        ),
    ]);
    let errors = build_err(&source, &decl, &full_name_providers());

    assert_eq!(errors.codes(), vec![ErrorCode::CircularDependency]);
}

#[test]
fn dependency_named_like_plain_sibling_resolves_against_source() {
    let decl = decl_of([
        TargetField::implicit("firstName", ScalarType::Text),
        TargetField::explicit("lastName", ScalarType::Text, "lastName"),
        TargetField::computed(
            "fullName",
            ScalarType::Text,
            ComputedDirective::new(["firstName", "lastName"]),
        ),
    ]);

    let providers = full_name_providers();
    assert!(build_with(EngineConfig::default(), &user(), &decl, &providers).is_ok());
}

#[test]
fn dependency_on_own_name_reads_the_source_field() {
    let providers = stats_provider(MethodSignature::stateless(
        "getAge",
        [vt(ScalarType::Int32)],
        ScalarType::Int32,
    ));
    let decl = computed_field("age", ScalarType::Int32, ComputedDirective::new(["age"]));

    assert!(build_with(EngineConfig::default(), &user(), &decl, &providers).is_ok());
}

#[test]
fn every_failing_dependency_path_is_reported() {
    let decl = computed_field(
        "broken",
        ScalarType::Text,
        ComputedDirective::new(["nickname", "orders", "address.zip"]),
    );
    let errors = build_err(&user(), &decl, &ProviderRegistry::new());

    assert_eq!(
        errors.codes(),
        vec![
            ErrorCode::PathNotFound,
            ErrorCode::InvalidCollectionPath,
            ErrorCode::PathNotFound,
        ]
    );
}

//
// Scenarios
//

fn scenario_source() -> SourceType {
    SourceType::new("Customer")
        .with_field("firstName", scalar(ScalarType::Text))
        .with_field("lastName", scalar(ScalarType::Text))
        .with_field(
            "orders",
            FieldKind::collection_of(FieldKind::object(
                SourceType::new("Order").with_field("total", scalar(ScalarType::Decimal)),
            )),
        )
}

#[test]
fn scenario_full_name_and_order_total() {
    let providers = ProviderRegistry::new().with(
        ProviderDescriptor::stateless("Names").with_method(MethodSignature::stateless(
            "toFullName",
            [vt(ScalarType::Text), vt(ScalarType::Text)],
            ScalarType::Text,
        )),
    );
    let decl = decl_of([
        TargetField::computed(
            "fullName",
            ScalarType::Text,
            ComputedDirective::new(["firstName", "lastName"]),
        ),
        TargetField::computed(
            "totalOrders",
            ScalarType::Decimal,
            ComputedDirective::new(["orders.total"]).reducers([ReducerKind::Sum]),
        ),
    ]);
    let config = EngineConfig {
        compute_method_prefix: "to".to_string(),
        ..EngineConfig::default()
    };
    let plan =
        build_with(config, &scenario_source(), &decl, &providers).expect("scenario builds");

    let full_name = computed(&plan, "fullName");
    assert_eq!(
        full_name.compute.method().map(|method| method.provider.clone()),
        Some(ProviderId::new("Names"))
    );
    assert!(full_name.reducers.is_empty());

    let total = computed(&plan, "totalOrders");
    assert!(total.dependencies[0].traverses_collection);
    assert_eq!(total.reducers.len(), 1);
    assert_eq!(total.reducers[0].reducer, ReducerKind::Sum);
    assert_eq!(total.parameter_types, vec![ValueType::Scalar(ScalarType::Decimal)]);
    assert!(total.compute.is_identity());
}
