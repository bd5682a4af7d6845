//! Document-intelligence boundary implementations.

pub mod http;

pub use http::HttpDocIntel;
