//! # minitable Test Suite
//!
//! Unified test crate containing whole-cluster integration flows.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── lifecycle.rs   # startup/shutdown cycles, reuse, rollback
//!     ├── network.rs     # bind policy overlays, readiness gates
//!     └── datasets.rs    # schema bootstrap and dataset repository
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p minitable-tests
//!
//! # By category
//! cargo test -p minitable-tests integration::lifecycle::
//! cargo test -p minitable-tests integration::network::
//! ```

pub mod integration;
