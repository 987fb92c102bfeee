//! API module
//!
//! This module provides the HTTP surface of the command bridge and the clients
//! a session uses to reach it.

pub mod client;
pub mod server;

// Re-export commonly used types
pub use client::{Client, ClientConfig, ClientError, CoreClient, HttpClientImpl};
pub use server::{app, serve, ServerConfig};
