//! # minitable
//!
//! Demo binary: bring the in-process cluster up, keep it running until
//! interrupted, then shut it down in order.
//!
//! ## Environment
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MINITABLE_BASE_DIR` | `./data/minitable` | Persisted state location |
//! | `MINITABLE_QUORUM_PORT` | `0` (ephemeral) | Coordination client port |
//! | `MINITABLE_CLEAN` | unset | Set to `1`/`true` to wipe prior state |
//! | `MINITABLE_BIND_ADDRESS` | unset | Restricted-network bind address |
//! | `MINITABLE_LOG` | `info` | Log filter |

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use minitable_runtime::{ClusterOptions, MiniCluster};

/// Build cluster options from the environment.
fn load_options() -> ClusterOptions {
    let base_dir =
        std::env::var("MINITABLE_BASE_DIR").unwrap_or_else(|_| "./data/minitable".to_string());
    let mut options = ClusterOptions::new(base_dir);

    if let Ok(port) = std::env::var("MINITABLE_QUORUM_PORT") {
        match port.parse() {
            Ok(p) => options = options.with_quorum_client_port(p),
            Err(_) => warn!("MINITABLE_QUORUM_PORT must be a port number, ignoring"),
        }
    }
    if let Ok(clean) = std::env::var("MINITABLE_CLEAN") {
        options = options.with_clean(matches!(clean.as_str(), "1" | "true"));
    }

    options
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_env("MINITABLE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let options = load_options();
    let mut cluster = MiniCluster::new(options);
    cluster.startup().await?;

    info!("Cluster is up. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    cluster.shutdown().await?;
    Ok(())
}
