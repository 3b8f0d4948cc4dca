//! Input models handed to the engine by its collaborators.
//!
//! - `source`: read-only description of the type being projected from.
//! - `directive`: normalized per-field mapping directives of the DTO.
//! - `provider`: ordered catalog of computation providers and their methods.
//! - `types`: the value-type vocabulary shared by all of the above.

pub mod directive;
pub mod provider;
pub mod source;
pub mod types;
