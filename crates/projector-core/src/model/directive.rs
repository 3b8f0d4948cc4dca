use crate::{
    model::{provider::ProviderId, types::ValueType},
    reduce::ReducerKind,
};
use serde::{Deserialize, Serialize};

///
/// MethodRef
///
/// Optional override for method resolution. Both parts are optional:
///
/// | provider | name | search                                    |
/// |----------|------|-------------------------------------------|
/// | unset    | unset| convention name in every provider         |
/// | unset    | set  | `name` in every provider                  |
/// | set      | unset| convention name in `provider` only        |
/// | set      | set  | `name` in `provider` only                 |
///
/// An empty name counts as unset.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct MethodRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl MethodRef {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            provider: None,
            name: Some(name.into()),
        }
    }

    #[must_use]
    pub fn on(provider: impl Into<ProviderId>) -> Self {
        Self {
            provider: Some(provider.into()),
            name: None,
        }
    }

    #[must_use]
    pub fn new(provider: impl Into<ProviderId>, name: impl Into<String>) -> Self {
        Self {
            provider: Some(provider.into()),
            name: Some(name.into()),
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    #[must_use]
    pub const fn provider(&self) -> Option<&ProviderId> {
        self.provider.as_ref()
    }

    /// A reference with neither part set behaves exactly like no reference.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.provider.is_none() && self.name().is_none()
    }
}

///
/// ComputedDirective
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ComputedDirective {
    /// Source paths whose values become the computation's arguments, in order.
    pub depends_on: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed_by: Option<MethodRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub then: Option<MethodRef>,

    /// One reducer per collection-traversing dependency, left to right.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reducers: Vec<ReducerKind>,
}

impl ComputedDirective {
    #[must_use]
    pub fn new<I, S>(depends_on: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            depends_on: depends_on.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn computed_by(mut self, method: MethodRef) -> Self {
        self.computed_by = Some(method);
        self
    }

    #[must_use]
    pub fn then(mut self, method: MethodRef) -> Self {
        self.then = Some(method);
        self
    }

    #[must_use]
    pub fn reducers(mut self, reducers: impl IntoIterator<Item = ReducerKind>) -> Self {
        self.reducers = reducers.into_iter().collect();
        self
    }

    /// The explicit computation override, ignoring one with nothing set.
    #[must_use]
    pub fn compute_override(&self) -> Option<&MethodRef> {
        self.computed_by.as_ref().filter(|method| !method.is_unset())
    }
}

///
/// Directive
///
/// How one target field obtains its value.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Directive {
    /// Copy the source field with the same name as the target field.
    Implicit,

    /// Copy the value found at a dot-separated source path.
    Explicit { path: String },

    /// Derive the value from source dependencies through a provider method.
    Computed(ComputedDirective),
}

impl Directive {
    #[must_use]
    pub fn explicit(path: impl Into<String>) -> Self {
        Self::Explicit { path: path.into() }
    }

    #[must_use]
    pub const fn is_computed(&self) -> bool {
        matches!(self, Self::Computed(_))
    }
}

///
/// TargetField
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TargetField {
    pub name: String,
    pub ty: ValueType,
    pub directive: Directive,
}

impl TargetField {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: impl Into<ValueType>, directive: Directive) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            directive,
        }
    }

    #[must_use]
    pub fn implicit(name: impl Into<String>, ty: impl Into<ValueType>) -> Self {
        Self::new(name, ty, Directive::Implicit)
    }

    #[must_use]
    pub fn explicit(
        name: impl Into<String>,
        ty: impl Into<ValueType>,
        path: impl Into<String>,
    ) -> Self {
        Self::new(name, ty, Directive::explicit(path))
    }

    #[must_use]
    pub fn computed(
        name: impl Into<String>,
        ty: impl Into<ValueType>,
        computed: ComputedDirective,
    ) -> Self {
        Self::new(name, ty, Directive::Computed(computed))
    }
}

///
/// ProjectionDecl
///
/// Normalized declaration of one DTO: its name and its target fields in
/// declaration order.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ProjectionDecl {
    pub name: String,
    pub fields: Vec<TargetField>,
}

impl ProjectionDecl {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: TargetField) -> Self {
        self.fields.push(field);
        self
    }

    // get
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&TargetField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Return whether `name` is declared as a computed target field.
    #[must_use]
    pub fn is_computed(&self, name: &str) -> bool {
        self.fields
            .iter()
            .any(|field| field.name == name && field.directive.is_computed())
    }
}
