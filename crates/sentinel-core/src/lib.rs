//! Core domain + application logic for the Sentinel community bot.
//!
//! This crate is intentionally framework-agnostic. The chat platform and the
//! HTTP surface live behind ports/adapters: the chat side delivers typed
//! [`gateway::GatewayEvent`]s and renders typed [`gateway::CommandReply`]s,
//! the HTTP side reads the stores through shared handles.

pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod gateway;
pub mod guilds;
pub mod links;
pub mod logging;
pub mod netpolicy;
pub mod status;

pub use errors::{Error, Result};
