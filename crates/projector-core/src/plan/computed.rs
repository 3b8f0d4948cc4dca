use crate::{
    PATH_SEPARATOR,
    model::{
        directive::{ComputedDirective, MethodRef, TargetField},
        types::ValueType,
    },
    plan::{
        ComputeStep, ComputedMapping, FieldMapping, PlanError, PlanErrorKind, ReducerBinding,
        builder::{FieldContext, FieldResult},
    },
    resolve::{
        MethodError, MethodQuery, ReceiverFilter, ResolvedMethod, ResolvedPath, ReturnConstraint,
        resolve_method, resolve_path,
    },
};

impl FieldContext<'_> {
    /// Resolve a computed field in stages: dependency roots, dependency paths,
    /// reducer pairing, the computation method, then the transformation.
    /// Each stage needs the previous one to succeed.
    pub(super) fn computed(
        &self,
        target: &TargetField,
        directive: &ComputedDirective,
    ) -> FieldResult {
        self.check_dependency_roots(target, directive)?;

        let dependencies = self.resolve_dependencies(target, directive)?;
        let (reducers, parameter_types) = self.bind_reducers(target, directive, &dependencies)?;

        let compute = self.resolve_compute(target, directive, &dependencies, &parameter_types)?;
        let transform = match &directive.then {
            Some(then) => Some(self.resolve_transform(target, then, compute.returns())?),
            None => None,
        };

        Ok(FieldMapping::Computed(Box::new(ComputedMapping {
            dependencies,
            parameter_types,
            compute,
            transform,
            reducers,
        })))
    }

    // Computed fields read source paths only. A dependency rooted at a sibling
    // computed field is rejected; a root naming the field itself, or a
    // non-computed sibling, still resolves against the source type.
    fn check_dependency_roots(
        &self,
        target: &TargetField,
        directive: &ComputedDirective,
    ) -> Result<(), Vec<PlanError>> {
        let errors: Vec<PlanError> = directive
            .depends_on
            .iter()
            .filter_map(|dependency| {
                let root = dependency
                    .split(PATH_SEPARATOR)
                    .next()
                    .unwrap_or(dependency.as_str());

                (root != target.name && self.decl.is_computed(root)).then(|| {
                    self.error(
                        target,
                        PlanErrorKind::CircularDependency {
                            dependency: dependency.clone(),
                            sibling: root.to_string(),
                        },
                    )
                })
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn resolve_dependencies(
        &self,
        target: &TargetField,
        directive: &ComputedDirective,
    ) -> Result<Vec<ResolvedPath>, Vec<PlanError>> {
        let mut resolved = Vec::with_capacity(directive.depends_on.len());
        let mut errors = Vec::new();

        for dependency in &directive.depends_on {
            match resolve_path(self.source, dependency) {
                Ok(path) => resolved.push(path),
                Err(err) => errors.push(self.error(target, err)),
            }
        }

        if errors.is_empty() {
            Ok(resolved)
        } else {
            Err(errors)
        }
    }

    // Reducers pair with collection-traversing dependencies left to right;
    // scalar dependencies never consume one. Returns the bindings and the
    // effective parameter type of every dependency.
    fn bind_reducers(
        &self,
        target: &TargetField,
        directive: &ComputedDirective,
        dependencies: &[ResolvedPath],
    ) -> Result<(Vec<ReducerBinding>, Vec<ValueType>), Vec<PlanError>> {
        let collection_deps: Vec<usize> = dependencies
            .iter()
            .enumerate()
            .filter(|(_, dep)| dep.traverses_collection)
            .map(|(index, _)| index)
            .collect();

        if collection_deps.len() != directive.reducers.len() {
            return Err(vec![self.error(
                target,
                PlanErrorKind::ReducerCountMismatch {
                    expected: collection_deps.len(),
                    found: directive.reducers.len(),
                },
            )]);
        }

        let mut parameter_types: Vec<ValueType> = dependencies
            .iter()
            .map(|dep| dep.terminal_type.clone())
            .collect();
        let mut bindings = Vec::with_capacity(collection_deps.len());
        let mut errors = Vec::new();

        for (&index, &reducer) in collection_deps.iter().zip(&directive.reducers) {
            let dep = &dependencies[index];
            match reducer.output_type(&dep.terminal_type) {
                Ok(output_type) => {
                    parameter_types[index] = output_type.clone();
                    bindings.push(ReducerBinding {
                        dependency: index,
                        path: dep.path.clone(),
                        reducer,
                        output_type,
                    });
                }
                Err(err) => errors.push(self.error(target, err)),
            }
        }

        if errors.is_empty() {
            Ok((bindings, parameter_types))
        } else {
            Err(errors)
        }
    }

    // With a transformation the compute return is unconstrained here; the
    // transformation lookup checks it.
    fn resolve_compute(
        &self,
        target: &TargetField,
        directive: &ComputedDirective,
        dependencies: &[ResolvedPath],
        parameter_types: &[ValueType],
    ) -> Result<ComputeStep, Vec<PlanError>> {
        let returns = if directive.then.is_some() {
            ReturnConstraint::Any
        } else {
            ReturnConstraint::AssignableTo(target.ty.clone())
        };
        let convention = self.config.compute_method_name(&target.name);
        let query = MethodQuery::new(parameter_types, returns)
            .method_ref(directive.compute_override())
            .convention(&convention)
            .numeric_widening(self.config.numeric_widening);

        match resolve_method(self.providers, &query) {
            Ok(method) => Ok(ComputeStep::Invoke(method)),
            Err(err) => self
                .identity_step(target, directive, dependencies, parameter_types, &err)
                .ok_or_else(|| vec![self.error(target, err)]),
        }
    }

    // A single reduced dependency with no computation method of its own
    // passes the reduced value straight through.
    fn identity_step(
        &self,
        target: &TargetField,
        directive: &ComputedDirective,
        dependencies: &[ResolvedPath],
        parameter_types: &[ValueType],
        err: &MethodError,
    ) -> Option<ComputeStep> {
        let eligible = self.config.identity_reduction
            && directive.compute_override().is_none()
            && matches!(err, MethodError::NotFound { .. })
            && dependencies.len() == 1
            && dependencies[0].traverses_collection;
        if !eligible {
            return None;
        }

        let value_type = parameter_types.first()?.clone();
        let fits = directive.then.is_some()
            || value_type.is_assignable_to(&target.ty, self.config.numeric_widening);

        fits.then_some(ComputeStep::Identity { value_type })
    }

    // Transformations have no naming convention and must be stateless. An
    // instance method that would otherwise match is reported as such rather
    // than as a missing method.
    fn resolve_transform(
        &self,
        target: &TargetField,
        then: &MethodRef,
        input: &ValueType,
    ) -> Result<ResolvedMethod, Vec<PlanError>> {
        let params = [input.clone()];
        let query = MethodQuery::new(&params, ReturnConstraint::AssignableTo(target.ty.clone()))
            .method_ref(Some(then))
            .receivers(ReceiverFilter::StatelessOnly)
            .numeric_widening(self.config.numeric_widening);

        let kind = match resolve_method(self.providers, &query) {
            Ok(method) => return Ok(method),
            Err(MethodError::NameRequired) => PlanErrorKind::TransformationNameRequired,
            Err(err @ MethodError::NotFound { .. }) => {
                let instance_only = query.clone().receivers(ReceiverFilter::InstanceOnly);
                match resolve_method(self.providers, &instance_only) {
                    Ok(instance) => PlanErrorKind::TransformationMustBeStateless {
                        provider: instance.provider,
                        method: instance.signature.name,
                    },
                    Err(_) => err.into(),
                }
            }
            Err(err) => err.into(),
        };

        Err(vec![self.error(target, kind)])
    }
}
