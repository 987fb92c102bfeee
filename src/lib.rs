//! Todo agent library crate
//!
//! A task list whose mutations are driven by natural-language commands. Each
//! command, together with the full current list, goes to a language model that
//! may call a single `update_todo_list` tool carrying the complete new list.
//!
//! - [`bridge`]: the stateless command bridge and its deletion guard
//! - [`controller`]: per-session state with full-replacement semantics
//! - [`prompt`]: the instruction contract and tool schema
//! - [`provider`]: model backends (OpenAI, offline rules, scripted)
//! - [`api`]: HTTP server and clients

pub mod api;
pub mod bridge;
pub mod cli;
pub mod controller;
pub mod intent;
pub mod models;
pub mod prompt;
pub mod provider;

pub use bridge::{Bridge, BridgeConfig, BridgeError, GuardPolicy};
pub use controller::{Controller, SessionState, SubmitOutcome};
pub use models::{ChatRequest, ChatResponse, ChatTurn, Role, Task};
