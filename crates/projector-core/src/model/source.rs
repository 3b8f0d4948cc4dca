use crate::model::types::{ScalarType, ValueType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

///
/// FieldKind
///
/// Declared shape of one source field. Nested object types are shared through
/// `Arc`, so one type may be referenced from many fields without copying.
/// Collections may nest; each layer counts as one collection hop.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum FieldKind {
    Scalar(ScalarType),
    Object(Arc<SourceType>),
    Collection(Box<Self>),
}

impl FieldKind {
    #[must_use]
    pub fn object(ty: SourceType) -> Self {
        Self::Object(Arc::new(ty))
    }

    #[must_use]
    pub fn collection_of(element: Self) -> Self {
        Self::Collection(Box::new(element))
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }

    /// Strip every collection layer, returning the element shape and the
    /// number of layers removed.
    #[must_use]
    pub fn element(&self) -> (ElementKind<'_>, usize) {
        let mut kind = self;
        let mut hops = 0;
        loop {
            match kind {
                Self::Scalar(scalar) => return (ElementKind::Scalar(*scalar), hops),
                Self::Object(ty) => return (ElementKind::Object(ty.as_ref()), hops),
                Self::Collection(inner) => {
                    kind = inner;
                    hops += 1;
                }
            }
        }
    }

    /// Project this field shape onto the value-type vocabulary.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Scalar(scalar) => ValueType::Scalar(*scalar),
            Self::Object(ty) => ValueType::Object(ty.name.clone()),
            Self::Collection(element) => ValueType::collection_of(element.value_type()),
        }
    }
}

///
/// ElementKind
///
/// Non-collection shape left after stripping a field's collection layers.
///

#[derive(Clone, Copy, Debug)]
pub enum ElementKind<'a> {
    Scalar(ScalarType),
    Object(&'a SourceType),
}

impl ElementKind<'_> {
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Scalar(scalar) => ValueType::Scalar(*scalar),
            Self::Object(ty) => ValueType::Object(ty.name.clone()),
        }
    }
}

///
/// SourceField
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SourceField {
    pub name: String,
    pub kind: FieldKind,

    #[serde(default)]
    pub nullable: bool,
}

///
/// SourceType
///
/// Read-only description of the origin type: its name and its fields in
/// declaration order.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SourceType {
    pub name: String,
    pub fields: IndexMap<String, SourceField>,
}

impl SourceType {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Add a non-nullable field. A later field with the same name replaces
    /// the earlier one in place.
    #[must_use]
    pub fn with_field(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.with(name, kind, false)
    }

    #[must_use]
    pub fn with_nullable_field(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.with(name, kind, true)
    }

    fn with(mut self, name: impl Into<String>, kind: FieldKind, nullable: bool) -> Self {
        let name = name.into();
        self.fields.insert(
            name.clone(),
            SourceField {
                name,
                kind,
                nullable,
            },
        );

        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    // get
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&SourceField> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &SourceField> {
        self.fields.values()
    }
}
