// Paper QA backend - API core
//
// Thin HTTP boundary over the paperqa pipeline: upload and serve papers,
// trigger artifact extraction, and expose the cached-artifact and QA
// routes. All pipeline semantics live in the paperqa crate.

pub mod config;
pub mod routes;
pub mod state;

pub use config::Config;
pub use state::AppState;
