//! ## Crate layout
//! - `core`: source and directive models, resolvers, and the plan builder.
//! - `config`: `projector.toml` loading for `EngineConfig`.
//! - `error`: the public error type returned by the entry points below.
//!
//! `build_projection` resolves one DTO with the default configuration;
//! `build_projection_with_config_file` reads the configuration first.

pub use projector_config as config;
pub use projector_core as core;

pub mod error;


pub use error::{Error, ErrorKind};

use crate::core::{
    model::{directive::ProjectionDecl, provider::ProviderRegistry, source::SourceType},
    plan::{PlanBuilder, ProjectionPlan},
};
use std::path::Path;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resolve `decl` against `source` and `providers` with the default engine
/// configuration.
pub fn build_projection(
    source: &SourceType,
    decl: &ProjectionDecl,
    providers: &ProviderRegistry,
) -> Result<ProjectionPlan, Error> {
    let plan = crate::core::plan::build_plan(source, decl, providers)?;

    Ok(plan)
}

/// Load the engine configuration from `path`, then resolve `decl`.
pub fn build_projection_with_config_file(
    path: impl AsRef<Path>,
    source: &SourceType,
    decl: &ProjectionDecl,
    providers: &ProviderRegistry,
) -> Result<ProjectionPlan, Error> {
    let config = crate::config::load_file(path)?;
    let plan = PlanBuilder::new(config).build(source, decl, providers)?;

    Ok(plan)
}

///
/// Prelude
/// Domain vocabulary plus the entry points.
///

pub mod prelude {
    pub use crate::{
        Error, ErrorKind, build_projection, build_projection_with_config_file,
        core::{error::ErrorCode, prelude::*},
    };
}
