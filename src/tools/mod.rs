//! Tool-side helpers: catalog reading, argument normalization, schema checks.
//!
//! These are the pure (or read-only) pieces the dispatcher builds on. None of
//! them owns a connection; all work against a borrowed `ServerHandle`.

pub mod catalog;
pub mod normalize;
pub mod schema;

pub use catalog::{list_server_tools, ToolDescriptor, ToolListing};
pub use normalize::{
    normalize_arguments, ArgKind, ArgumentMap, DefaultStrategy, NameConventionDefaults,
};
pub use schema::validate_arguments;
