//! hello-http: two minimal "Hello, World!" HTTP servers.
//!
//! Two independent entry points share this crate:
//! - `hello-async`: tokio server that reads to end-of-headers and writes one
//!   fixed byte-exact response per connection
//! - `hello-gateway`: blocking WSGI-style gateway that dispatches every
//!   request to an application callback
//!
//! Features:
//! - Fixed plaintext response, independent of request content
//! - Configuration via CLI arguments or TOML file
//! - Structured logging via tracing

pub mod config;
pub mod gateway;
pub mod response;
pub mod server;
