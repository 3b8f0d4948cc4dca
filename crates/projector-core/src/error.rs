use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// ErrorCode
///
/// Stable classification of every build diagnostic. Calling tools can key
/// on this instead of matching message text.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[remain::sorted]
pub enum ErrorCode {
    /// A computed field depends on a sibling computed field.
    CircularDependency,

    /// Two target fields share a name.
    DuplicateTargetField,

    /// A path has an empty segment.
    EmptyPath,

    /// A path terminates on a collection.
    InvalidCollectionPath,

    /// No provider yields a matching method.
    MethodNotFound,

    /// A path segment has no matching field.
    PathNotFound,

    /// A method override names an unknown provider.
    ProviderNotRegistered,

    /// Reducer count differs from the collection dependency count.
    ReducerCountMismatch,

    /// A reducer cannot be applied to a dependency's leaf type.
    ReducerUnsupported,

    /// A transformation method requires a provider instance.
    TransformationMustBeStateless,

    /// A transformation reference carries no method name.
    TransformationNameRequired,

    /// A copied source type is not assignable to the target type.
    TypeMismatch,
}
