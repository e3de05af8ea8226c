//! Ordered, confirmation-aware transaction workflows for token-curated
//! registries.
//!
//! A [`Workflows`] builder turns one user intent into a [`StepQueue`]:
//! any allowance top-ups the intent depends on, followed by the primary
//! action. The queue runs its steps one at a time and each step waits for
//! its transaction to be confirmed before the next one starts.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tcrflow::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), FlowError> {
//!     let config = FlowConfig::load("tcrflow.toml")?;
//!     tcrflow::logging::init(&config.log_level)?;
//!
//!     // `client` implements the collaborator traits from `tcrflow_core`.
//!     let client = Arc::new(MyChainClient::connect().await?);
//!     let workflows = Workflows::with_ledger(client.clone(), client, config)?;
//!
//!     let queue = workflows.apply_listing("0xabc", "ipfs://data", "100").await?;
//!     for meta in queue.steps() {
//!         println!("{}", meta.label);
//!     }
//!     queue.run().await?;
//!     Ok(())
//! }
//! ```

mod config;
pub mod logging;
mod lease;
mod queue;
mod steps;
mod watcher;
mod workflows;

// Re-export core types
pub use tcrflow_core::*;

pub use config::{FlowConfig, Intent, WatchConfig};
pub use lease::{PoolLease, PoolLeases};
pub use queue::{Progress, RunReport, SettledStep, StepQueue};
pub use steps::{describe, BestEffort, FnStep};
pub use watcher::PollingWatcher;
pub use workflows::Workflows;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        AllowancePool, Amount, FlowConfig, FlowError, Intent, Progress, Receipt, Resolution,
        RunReport, Step, StepKind, StepMeta, StepOutput, StepQueue, TransactionWatcher,
        Workflows,
    };
}
