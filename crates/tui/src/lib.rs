//! Terminal client for the expense service.
//!
//! The binary wires these modules together; they are exposed as a library
//! so the integration tests can drive the client, cache and coordinator
//! against a stub service.

pub mod app;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod ui;
