//! Client module
//!
//! This module provides the ways a controller can reach the command bridge:
//! over HTTP against a running server, or in-process.

mod core;
mod http;
mod trait_def;

// Re-export the trait and types
pub use core::CoreClient;
pub use http::{ClientConfig, ClientError, HttpClientImpl};
pub use trait_def::Client;
