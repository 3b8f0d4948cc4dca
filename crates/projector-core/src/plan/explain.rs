use crate::plan::{ComputedMapping, FieldMapping, ProjectionPlan};
use std::fmt::Write;

impl ProjectionPlan {
    /// Render the plan as stable, line-based text for build logs.
    ///
    /// One header line, then one line per target field in declaration order;
    /// computed fields add an indented line per dependency and transformation.
    #[must_use]
    pub fn explain(&self) -> String {
        let mut out = format!(
            "projection {} from {} ({} fields)",
            self.dto,
            self.source.name,
            self.fields.len()
        );

        for (name, mapping) in &self.fields {
            match mapping {
                FieldMapping::Implicit {
                    source_field,
                    value_type,
                    ..
                } => {
                    let _ = write!(out, "\n  {name} <- {source_field}: {value_type}");
                }
                FieldMapping::Explicit { path } => {
                    let _ = write!(out, "\n  {name} <- {}: {}", path.path, path.value_type());
                }
                FieldMapping::Computed(computed) => explain_computed(&mut out, name, computed),
            }
        }

        out
    }
}

fn explain_computed(out: &mut String, name: &str, computed: &ComputedMapping) {
    let _ = write!(out, "\n  {name} <- compute {}", computed.compute);

    for (index, dep) in computed.dependencies.iter().enumerate() {
        match computed.reducer_for(index) {
            Some(binding) => {
                let _ = write!(
                    out,
                    "\n    arg {index}: {}({}) -> {}",
                    binding.reducer, dep.path, binding.output_type
                );
            }
            None => {
                let _ = write!(out, "\n    arg {index}: {}: {}", dep.path, dep.terminal_type);
            }
        }
    }

    if let Some(transform) = &computed.transform {
        let _ = write!(out, "\n    then {transform}");
    }
}
