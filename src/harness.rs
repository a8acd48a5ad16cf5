//! Comparison harness glue.
//!
//! Runs every [`PolicyKind`] once, in the fixed order random → round-robin → softmax,
//! each from fresh state, and summarizes how much softmax improved on round-robin.
//! The runs share one RNG stream sequentially.

use rand::Rng;
use tracing::info;

use crate::{PolicyKind, RunReport, Simulation};

/// Reports from one pass over all three policies.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Comparison {
    pub random: RunReport,
    pub round_robin: RunReport,
    pub softmax: RunReport,
}

impl Comparison {
    /// Report for `kind`.
    pub fn report(&self, kind: PolicyKind) -> &RunReport {
        match kind {
            PolicyKind::Random => &self.random,
            PolicyKind::RoundRobin => &self.round_robin,
            PolicyKind::Softmax => &self.softmax,
        }
    }

    /// Softmax's latency reduction relative to round-robin, in percent.
    ///
    /// Positive means softmax was faster.
    pub fn improvement_pct(&self) -> f64 {
        improvement_pct(self.round_robin.mean_latency, self.softmax.mean_latency)
    }

    /// Policy with the lowest mean latency (first in comparison order on ties).
    pub fn best(&self) -> PolicyKind {
        let mut best = PolicyKind::Random;
        for kind in PolicyKind::ALL {
            if self.report(kind).mean_latency < self.report(best).mean_latency {
                best = kind;
            }
        }
        best
    }
}

/// `(baseline - candidate) / baseline * 100`.
pub fn improvement_pct(baseline: f64, candidate: f64) -> f64 {
    (baseline - candidate) / baseline * 100.0
}

impl Simulation {
    /// Run all three policies in order and collect their reports.
    pub fn compare<R: Rng + ?Sized>(&self, rng: &mut R) -> Comparison {
        let random = self.run(PolicyKind::Random, rng);
        let round_robin = self.run(PolicyKind::RoundRobin, rng);
        let softmax = self.run(PolicyKind::Softmax, rng);
        let out = Comparison {
            random,
            round_robin,
            softmax,
        };
        info!(
            random_ms = out.random.mean_latency,
            round_robin_ms = out.round_robin.mean_latency,
            softmax_ms = out.softmax.mean_latency,
            improvement_pct = out.improvement_pct(),
            "comparison finished"
        );
        out
    }
}
