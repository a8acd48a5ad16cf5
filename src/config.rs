//! Simulation constants.
//!
//! These are read-only inputs for the whole comparison. `Default` yields the
//! reference setup: three servers, one clearly faster than the others.

use crate::ConfigError;

/// Default starting hidden mean latencies (ms), one per server.
pub const DEFAULT_INITIAL_MEANS: [f64; 3] = [120.0, 75.0, 200.0];
/// Default softmax temperature.
pub const DEFAULT_TEMPERATURE: f64 = 1.5;
/// Default number of requests per policy run.
pub const DEFAULT_TOTAL_REQUESTS: u64 = 10_000;

/// Fixed inputs for a simulation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Hidden mean latency (ms) of each server at the start of every run.
    ///
    /// The number of servers `K` is `initial_means.len()`.
    pub initial_means: Vec<f64>,
    /// Softmax temperature (must be finite and > 0).
    pub temperature: f64,
    /// Requests dispatched per policy run (must be >= 1).
    pub total_requests: u64,
    /// Std-dev of the per-request random-walk step of a server's hidden mean.
    pub drift_std: f64,
    /// Std-dev of the per-request measurement noise around the hidden mean.
    pub noise_std: f64,
    /// Reward constant `C` in `reward = C / latency`.
    pub reward_scale: f64,
    /// Lower bound for every latency sample (must be > 0).
    pub latency_floor: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            initial_means: DEFAULT_INITIAL_MEANS.to_vec(),
            temperature: DEFAULT_TEMPERATURE,
            total_requests: DEFAULT_TOTAL_REQUESTS,
            drift_std: 0.5,
            noise_std: 10.0,
            reward_scale: 1000.0,
            latency_floor: 5.0,
        }
    }
}

impl SimConfig {
    /// Number of servers.
    pub fn servers(&self) -> usize {
        self.initial_means.len()
    }

    /// Check every constant; the simulation refuses to run on the first failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_means.is_empty() {
            return Err(ConfigError::NoServers);
        }
        for (index, &value) in self.initial_means.iter().enumerate() {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InitialMean { index, value });
            }
        }
        if !(self.temperature.is_finite() && self.temperature > 0.0) {
            return Err(ConfigError::Temperature(self.temperature));
        }
        if self.total_requests == 0 {
            return Err(ConfigError::NoRequests);
        }
        if !(self.latency_floor.is_finite() && self.latency_floor > 0.0) {
            return Err(ConfigError::LatencyFloor(self.latency_floor));
        }
        if !(self.reward_scale.is_finite() && self.reward_scale > 0.0) {
            return Err(ConfigError::RewardScale(self.reward_scale));
        }
        for (name, value) in [("drift", self.drift_std), ("noise", self.noise_std)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::StdDev { name, value });
            }
        }
        if self.noise_std <= self.drift_std {
            tracing::warn!(
                drift_std = self.drift_std,
                noise_std = self.noise_std,
                "measurement noise is not larger than drift; hidden means will wander quickly"
            );
        }
        Ok(())
    }
}
