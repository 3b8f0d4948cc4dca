use crate::DEFAULT_COMPUTE_METHOD_PREFIX;
use serde::{Deserialize, Serialize};

///
/// EngineConfig
///
/// Knobs for one resolution run. Defaults match the declarative directive
/// semantics exactly; every switch is opt-in or opt-out from there.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Prefix for convention-named computation methods (`get` → `getFullName`).
    pub compute_method_prefix: String,

    /// Allow method return types and projected source types to widen into a
    /// larger numeric type. Parameter lists always match exactly.
    pub numeric_widening: bool,

    /// Check that implicit and explicit mappings copy a type assignable to
    /// the target field's declared type.
    pub check_projected_types: bool,

    /// Let a computed field with a single collection dependency and no
    /// matching computation method pass its reduced value through unchanged.
    pub identity_reduction: bool,
}

impl EngineConfig {
    /// Convention name of the computation method for `field`:
    /// the prefix followed by the field name with its first letter uppercased.
    #[must_use]
    pub fn compute_method_name(&self, field: &str) -> String {
        let mut chars = field.chars();
        match chars.next() {
            Some(first) => format!(
                "{}{}{}",
                self.compute_method_prefix,
                first.to_uppercase(),
                chars.as_str()
            ),
            None => self.compute_method_prefix.clone(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            compute_method_prefix: DEFAULT_COMPUTE_METHOD_PREFIX.to_string(),
            numeric_widening: false,
            check_projected_types: true,
            identity_reduction: true,
        }
    }
}
