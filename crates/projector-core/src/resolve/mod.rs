//! Stateless resolvers used by the plan builder.
//!
//! Both resolvers are pure functions over their inputs and return exactly one
//! error per call; aggregation across fields is the plan builder's job.

mod method;
mod path;


// re-exports
pub use method::{
    Candidate, ExpectedSignature, Invocation, MethodError, MethodQuery, ReceiverFilter,
    ResolvedMethod, ReturnConstraint, resolve_method,
};
pub use path::{FieldRef, PathError, ResolvedPath, SegmentKind, resolve_path};
