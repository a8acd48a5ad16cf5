//! Non-stationary latency environment.
//!
//! Each server has a hidden mean latency that takes a small Gaussian random-walk
//! step every time the server is sampled. Observed latency is that mean plus
//! larger per-request measurement noise, clamped to a positive floor.
//!
//! Policies never see this type; the only signal they get is the returned sample.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::{ConfigError, SimConfig};

/// Hidden latency state for one run.
#[derive(Debug, Clone)]
pub struct LatencyEnv {
    means: Vec<f64>,
    drift: Normal<f64>,
    noise: Normal<f64>,
    floor: f64,
}

impl LatencyEnv {
    /// Build a fresh environment from the config's starting means.
    ///
    /// The means are copied, so every run starts from identical conditions.
    pub fn new(cfg: &SimConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            means: cfg.initial_means.clone(),
            drift: Normal::new(0.0, cfg.drift_std)?,
            noise: Normal::new(0.0, cfg.noise_std)?,
            floor: cfg.latency_floor,
        })
    }

    /// Number of servers.
    pub fn servers(&self) -> usize {
        self.means.len()
    }

    /// Serve one request on `server` and return its observed latency.
    ///
    /// Drifts the server's hidden mean first, then draws the noisy sample.
    ///
    /// # Panics
    ///
    /// If `server >= self.servers()`.
    pub fn sample<R: Rng + ?Sized>(&mut self, server: usize, rng: &mut R) -> f64 {
        let mean = &mut self.means[server];
        *mean += self.drift.sample(rng);
        let observed = *mean + self.noise.sample(rng);
        observed.max(self.floor)
    }

    /// Current hidden means. Reporting only.
    pub fn hidden_means(&self) -> &[f64] {
        &self.means
    }
}
