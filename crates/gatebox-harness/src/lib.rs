//! Deterministic test harness for gatebox clients.
//!
//! In-memory implementations of the gateway capability traits and a seeded
//! [`Environment`](gatebox_client::Environment), so sends can be replayed
//! byte for byte and failures can be injected at any step.
//!
//! # Fault Injection
//!
//! [`MemoryGateway`] supports scripted faults (fail the n-th upload, reject
//! submissions, break lookups or downloads) and seeded chaos, where uploads
//! and submissions fail at a configured rate. Every upload and submission is
//! recorded so tests can check what reached the gateway.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod memory_gateway;
pub mod sim_env;

pub use memory_gateway::MemoryGateway;
pub use sim_env::SimEnv;
