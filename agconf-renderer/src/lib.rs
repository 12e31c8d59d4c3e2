//! agconf renderer: `repeat` template expansion and the `init` scaffold.
//!
//! - [`expand`] turns templated test cases and commands into concrete ones
//! - [`engine`] renders the starter `ag_project.yml` with Tera

pub mod context;
pub mod engine;
pub mod error;
pub mod expand;

pub use context::ScaffoldContext;
pub use engine::Renderer;
pub use error::RenderError;
pub use expand::{
    expand, materialize_commands, materialize_suite, materialize_test_case, Repeatable,
};
