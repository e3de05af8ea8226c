//! Workflow configuration.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tcrflow_core::FlowError;

/// A user intent with its own workflow builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Apply a new listing with a deposit.
    ApplyListing,
    /// Challenge an existing listing.
    ChallengeListing,
    /// Commit a sealed vote.
    CommitVote,
    /// Reveal a committed vote.
    RevealVote,
    /// Resolve a listing's pending application or challenge.
    RefreshListingStatus,
    /// Process a finished parameter proposal.
    ProcessProposal,
    /// Claim a voter reward.
    ClaimReward,
    /// Propose a new parameter value.
    ProposeParameter,
    /// Challenge a parameter proposal.
    ChallengeProposal,
    /// Add tokens to a listing's stake.
    Deposit,
    /// Remove unlocked tokens from a listing's stake.
    Withdraw,
    /// Remove a listing from the registry.
    ExitListing,
}

impl Intent {
    /// Intents that may be configured as best-effort.
    pub const BEST_EFFORT_CAPABLE: [Intent; 5] = [
        Intent::RevealVote,
        Intent::RefreshListingStatus,
        Intent::Deposit,
        Intent::Withdraw,
        Intent::ExitListing,
    ];

    /// Returns `true` if failures of this intent may be logged and skipped.
    pub fn supports_best_effort(&self) -> bool {
        Self::BEST_EFFORT_CAPABLE.contains(self)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Intent::ApplyListing => "apply_listing",
            Intent::ChallengeListing => "challenge_listing",
            Intent::CommitVote => "commit_vote",
            Intent::RevealVote => "reveal_vote",
            Intent::RefreshListingStatus => "refresh_listing_status",
            Intent::ProcessProposal => "process_proposal",
            Intent::ClaimReward => "claim_reward",
            Intent::ProposeParameter => "propose_parameter",
            Intent::ChallengeProposal => "challenge_proposal",
            Intent::Deposit => "deposit",
            Intent::Withdraw => "withdraw",
            Intent::ExitListing => "exit_listing",
        };
        write!(f, "{}", name)
    }
}

/// Transaction watching settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Delay between status polls, in milliseconds.
    pub poll_interval_ms: u64,
    /// Give up after this many seconds. `None` waits indefinitely.
    pub deadline_secs: Option<u64>,
    /// Blocks required, counting the inclusion block.
    pub confirmations: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2_000,
            deadline_secs: None,
            confirmations: 1,
        }
    }
}

impl WatchConfig {
    /// Polling interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Deadline as a [`Duration`].
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

/// Root configuration.
///
/// Read once at startup and passed explicitly to the components that need
/// it; nothing reads it from global state.
///
/// # Examples
///
/// ```
/// use tcrflow::{FlowConfig, Intent};
///
/// let config = FlowConfig::from_toml_str(r#"
///     network = 4
///     best_effort = ["reveal_vote"]
///
///     [watch]
///     deadline_secs = 600
/// "#)?;
///
/// assert_eq!(config.network, 4);
/// assert!(config.is_best_effort(Intent::RevealVote));
/// assert_eq!(config.watch.poll_interval_ms, 2_000);
/// # Ok::<(), tcrflow::FlowError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Network identifier, handed to the explorer-URL collaborator.
    pub network: u64,
    /// Default log level; `RUST_LOG` takes precedence.
    pub log_level: String,
    /// Transaction watching.
    pub watch: WatchConfig,
    /// Intents whose step failures are logged instead of propagated.
    pub best_effort: BTreeSet<Intent>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            network: 1,
            log_level: "info".to_string(),
            watch: WatchConfig::default(),
            best_effort: BTreeSet::new(),
        }
    }
}

impl FlowConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, FlowError> {
        let config: FlowConfig =
            toml::from_str(content).map_err(|e| FlowError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FlowError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            FlowError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), FlowError> {
        if self.watch.poll_interval_ms == 0 {
            return Err(FlowError::Configuration(
                "watch.poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.watch.confirmations == 0 {
            return Err(FlowError::Configuration(
                "watch.confirmations must be at least 1".to_string(),
            ));
        }
        if let Some(intent) = self.best_effort.iter().find(|i| !i.supports_best_effort()) {
            return Err(FlowError::Configuration(format!(
                "{} cannot be best-effort",
                intent
            )));
        }
        Ok(())
    }

    /// Returns `true` if `intent` is configured as best-effort.
    ///
    /// Intents that cannot be best-effort never are, even when listed.
    pub fn is_best_effort(&self, intent: Intent) -> bool {
        intent.supports_best_effort() && self.best_effort.contains(&intent)
    }
}
