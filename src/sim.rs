//! The per-request simulation loop.
//!
//! One run drives `total_requests` iterations of
//! select → sample → observe against freshly built state:
//! a new [`LatencyEnv`] from the starting means, a zeroed [`RewardEstimator`],
//! and a start-of-run [`Policy`]. Nothing carries over between runs.

use rand::Rng;
use tracing::{debug, trace};

use crate::{
    ConfigError, LatencyEnv, Policy, PolicyKind, RewardEstimator, Selection, SelectionNote,
    SelectionPolicy, SimConfig,
};

/// Result of one policy run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunReport {
    pub policy: PolicyKind,
    pub requests: u64,
    /// Sum of all observed latencies (ms).
    pub total_latency: f64,
    /// `total_latency / requests`.
    pub mean_latency: f64,
    /// How often each server was chosen.
    pub selections: Vec<u64>,
    /// Value estimates at the end of the run.
    pub estimates: Vec<f64>,
    /// Hidden mean latencies at the end of the run (after drift).
    pub final_means: Vec<f64>,
    /// Softmax draws that hit the last-server numerical fallback.
    pub fallbacks: u64,
}

/// State of one run in progress: its environment, its estimator and the totals so far.
///
/// [`Simulation::run`] drives one of these to completion. Stepping it by hand with
/// [`RunState::dispatch`] replays exactly the same per-request path.
#[derive(Debug, Clone)]
pub struct RunState {
    env: LatencyEnv,
    est: RewardEstimator,
    requests: u64,
    total_latency: f64,
    fallbacks: u64,
}

impl RunState {
    /// What the policy sees before choosing the next server.
    pub fn estimator(&self) -> &RewardEstimator {
        &self.est
    }

    /// Serve one request on `selection.server`, feed the estimator and return the latency.
    ///
    /// # Panics
    ///
    /// If `selection.server` is out of range.
    pub fn dispatch<R: Rng + ?Sized>(&mut self, selection: Selection, rng: &mut R) -> f64 {
        if selection.note == SelectionNote::NumericalFallbackToLastServer {
            self.fallbacks += 1;
        }
        let latency = self.env.sample(selection.server, rng);
        self.total_latency += latency;
        let reward = self.est.observe(selection.server, latency);
        trace!(
            request = self.requests,
            server = selection.server,
            latency,
            reward,
            "dispatched"
        );
        self.requests += 1;
        latency
    }

    /// Close the run. `mean_latency` is 0 if nothing was dispatched.
    pub fn finish(self, policy: PolicyKind) -> RunReport {
        let requests = self.requests;
        let mean_latency = if requests == 0 {
            0.0
        } else {
            self.total_latency / requests as f64
        };
        debug!(
            %policy,
            requests,
            mean_latency,
            fallbacks = self.fallbacks,
            selections = ?self.est.counts(),
            "run finished"
        );

        RunReport {
            policy,
            requests,
            total_latency: self.total_latency,
            mean_latency,
            selections: self.est.counts().to_vec(),
            estimates: self.est.values().to_vec(),
            final_means: self.env.hidden_means().to_vec(),
            fallbacks: self.fallbacks,
        }
    }
}

/// A validated simulation setup.
#[derive(Debug, Clone)]
pub struct Simulation {
    cfg: SimConfig,
    // Templates only: never sampled or selected from, each run copies them.
    start: LatencyEnv,
    policies: [Policy; 3],
}

impl Simulation {
    /// Validate `cfg` once; runs are infallible afterwards.
    pub fn new(cfg: SimConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let start = LatencyEnv::new(&cfg)?;
        let k = cfg.servers();
        let policies = [
            Policy::new(PolicyKind::Random, k, cfg.temperature)?,
            Policy::new(PolicyKind::RoundRobin, k, cfg.temperature)?,
            Policy::new(PolicyKind::Softmax, k, cfg.temperature)?,
        ];
        Ok(Self {
            cfg,
            start,
            policies,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    /// Fresh per-run state: starting means, zeroed estimator, zero totals.
    pub fn start_run(&self) -> RunState {
        RunState {
            env: self.start.clone(),
            est: RewardEstimator::new(self.cfg.servers(), self.cfg.reward_scale),
            requests: 0,
            total_latency: 0.0,
            fallbacks: 0,
        }
    }

    /// Run `kind` over the configured number of requests and return its mean latency.
    pub fn run_policy<R: Rng + ?Sized>(&self, kind: PolicyKind, rng: &mut R) -> f64 {
        self.run(kind, rng).mean_latency
    }

    /// Run `kind` from fresh state and return the full report.
    pub fn run<R: Rng + ?Sized>(&self, kind: PolicyKind, rng: &mut R) -> RunReport {
        let mut policy = self.policies[kind as usize];
        self.drive(&mut policy, rng)
    }

    /// Run an already constructed policy. The policy is reset first.
    ///
    /// The policy must have been built for this simulation's server count.
    pub fn run_with<R: Rng + ?Sized>(
        &self,
        policy: &mut Policy,
        rng: &mut R,
    ) -> Result<RunReport, ConfigError> {
        if policy.servers() != self.start.servers() {
            return Err(ConfigError::ServerCountMismatch {
                policy: policy.servers(),
                config: self.start.servers(),
            });
        }
        Ok(self.drive(policy, rng))
    }

    fn drive<R: Rng + ?Sized>(&self, policy: &mut Policy, rng: &mut R) -> RunReport {
        let mut state = self.start_run();
        policy.reset();
        for _ in 0..self.cfg.total_requests {
            let selection = policy.select(state.estimator(), rng);
            state.dispatch(selection, rng);
        }
        state.finish(policy.kind())
    }
}
