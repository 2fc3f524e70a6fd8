//! Shared types for the cellwatch telephony bridge.
//!
//! This crate contains:
//! - **Protocol messages** — channel envelope and payload types exchanged
//!   between the host application shell and the bridge
//! - **Radio models** — radio access technology, network generation, and
//!   permission state types
//! - **ID generation** — prefixed UUIDv7 helpers (`req_`)

pub mod ids;
pub mod models;
pub mod protocol;
