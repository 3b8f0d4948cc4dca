//! Shared fixtures for unit tests.

use crate::model::{
    provider::{MethodSignature, ProviderDescriptor, ProviderRegistry},
    source::{FieldKind, SourceType},
    types::{ScalarType, ValueType},
};

pub(crate) const fn scalar(ty: ScalarType) -> FieldKind {
    FieldKind::Scalar(ty)
}

pub(crate) const fn vt(ty: ScalarType) -> ValueType {
    ValueType::Scalar(ty)
}

pub(crate) fn address() -> SourceType {
    SourceType::new("Address")
        .with_field("city", scalar(ScalarType::Text))
        .with_nullable_field("country", scalar(ScalarType::Text))
}

pub(crate) fn line_item() -> SourceType {
    SourceType::new("LineItem")
        .with_field("sku", scalar(ScalarType::Text))
        .with_field("quantity", scalar(ScalarType::Int32))
        .with_field("price", scalar(ScalarType::Decimal))
}

pub(crate) fn order() -> SourceType {
    SourceType::new("Order")
        .with_field("total", scalar(ScalarType::Decimal))
        .with_field("placedAt", scalar(ScalarType::DateTime))
        .with_field("shipTo", FieldKind::object(address()))
        .with_field("items", FieldKind::collection_of(FieldKind::object(line_item())))
}

/// `User` with scalar, nested, collection, and collection-of-collection fields.
pub(crate) fn user() -> SourceType {
    SourceType::new("User")
        .with_field("id", scalar(ScalarType::Uuid))
        .with_field("firstName", scalar(ScalarType::Text))
        .with_field("lastName", scalar(ScalarType::Text))
        .with_field("email", scalar(ScalarType::Text))
        .with_field("birthDate", scalar(ScalarType::Date))
        .with_field("age", scalar(ScalarType::Int32))
        .with_nullable_field("address", FieldKind::object(address()))
        .with_field("orders", FieldKind::collection_of(FieldKind::object(order())))
        .with_field("tags", FieldKind::collection_of(scalar(ScalarType::Text)))
        .with_field(
            "orderBatches",
            FieldKind::collection_of(FieldKind::collection_of(FieldKind::object(order()))),
        )
}

/// Single stateless provider exposing `getFullName(Text, Text) -> Text`.
pub(crate) fn full_name_providers() -> ProviderRegistry {
    ProviderRegistry::new().with(ProviderDescriptor::by_type("UserComputations").with_method(
        MethodSignature::stateless(
            "getFullName",
            [vt(ScalarType::Text), vt(ScalarType::Text)],
            ScalarType::Text,
        ),
    ))
}
