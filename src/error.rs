//! Error types.
//!
//! The simulation has no external failure sources, so the only recoverable
//! errors are configuration errors raised before a run starts.

use thiserror::Error;

/// Why a [`SimConfig`](crate::SimConfig) (or a policy label) was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("at least one server is required")]
    NoServers,

    #[error("initial mean latency of server {index} must be finite and > 0 (got {value})")]
    InitialMean { index: usize, value: f64 },

    #[error("temperature must be finite and > 0 (got {0})")]
    Temperature(f64),

    #[error("total requests per run must be >= 1")]
    NoRequests,

    #[error("latency floor must be finite and > 0 (got {0})")]
    LatencyFloor(f64),

    #[error("reward constant must be finite and > 0 (got {0})")]
    RewardScale(f64),

    #[error("{name} standard deviation must be finite and >= 0 (got {value})")]
    StdDev { name: &'static str, value: f64 },

    #[error("policy was built for {policy} servers but the simulation has {config}")]
    ServerCountMismatch { policy: usize, config: usize },

    #[error("unknown policy {0:?} (expected one of: random, round-robin, softmax)")]
    UnknownPolicy(String),

    #[error("invalid noise distribution: {0}")]
    Distribution(#[from] rand_distr::NormalError),
}
