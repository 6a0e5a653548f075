//! External system integrations for examgen.
//!
//! - [`store`] - capability traits the core depends on ([`store::DocumentStore`],
//!   [`store::RosterSource`], [`store::LedgerSink`]) and their shared types
//! - [`google`] - Drive v3 / Sheets v4 implementations over `reqwest`
//!
//! # Design Pattern
//!
//! Adapters isolate the remote service behind traits so the core can be tested
//! with in-memory fakes and the HTTP clients can be tested against a mock server.

pub mod google;
pub mod store;
