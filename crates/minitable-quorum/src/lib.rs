//! # Embedded Coordination Service
//!
//! A single-node, in-process coordination service. It persists an epoch
//! marker under its state directory, binds a client TCP listener (port 0
//! selects an ephemeral port), and serves a trivial accept loop so that
//! liveness probes and table-store worker registrations have a real
//! endpoint to connect to.
//!
//! Leader election and replicated state are out of scope; a single node is
//! all the embedded cluster needs.

pub mod error;
pub mod server;

pub use error::QuorumError;
pub use server::QuorumServer;

/// Name of the epoch marker persisted under the state directory.
pub const EPOCH_FILE: &str = "epoch";
