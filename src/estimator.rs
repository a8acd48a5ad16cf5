//! Per-server reward estimates.
//!
//! Reward shaping is `reward = C / latency`: lower latency means higher reward.
//! Each estimate is the plain incremental mean of every reward seen for that
//! server in the current run. There is no decay, so old observations keep their
//! full weight even after a server's hidden latency has drifted.

/// Running value estimates `Q` and selection counts `N`, one slot per server.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RewardEstimator {
    q: Vec<f64>,
    n: Vec<u64>,
    reward_scale: f64,
}

impl RewardEstimator {
    /// Zeroed estimator for `servers` slots.
    pub fn new(servers: usize, reward_scale: f64) -> Self {
        Self {
            q: vec![0.0; servers],
            n: vec![0; servers],
            reward_scale,
        }
    }

    /// Reward for one latency sample (`latency` must be > 0).
    pub fn reward(&self, latency: f64) -> f64 {
        self.reward_scale / latency
    }

    /// Record one observation and return the reward it produced.
    ///
    /// # Panics
    ///
    /// If `server` is out of range.
    pub fn observe(&mut self, server: usize, latency: f64) -> f64 {
        let reward = self.reward(latency);
        self.n[server] += 1;
        let n = self.n[server] as f64;
        self.q[server] += (reward - self.q[server]) / n;
        reward
    }

    /// Current value estimates.
    pub fn values(&self) -> &[f64] {
        &self.q
    }

    /// Observations per server.
    pub fn counts(&self) -> &[u64] {
        &self.n
    }

    /// Number of slots (`K`).
    pub fn servers(&self) -> usize {
        self.q.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn starts_at_zero() {
        let est = RewardEstimator::new(3, 1000.0);
        assert_eq!(est.values(), &[0.0, 0.0, 0.0]);
        assert_eq!(est.counts(), &[0, 0, 0]);
    }

    #[test]
    fn first_observation_sets_estimate_to_reward() {
        let mut est = RewardEstimator::new(2, 1000.0);
        let r = est.observe(1, 50.0);
        assert_eq!(r, 20.0);
        assert_eq!(est.values(), &[0.0, 20.0]);
        assert_eq!(est.counts(), &[0, 1]);
    }

    #[test]
    fn old_observations_keep_full_weight() {
        // No decay: a late shift in latency moves the estimate only by 1/N.
        let mut est = RewardEstimator::new(1, 100.0);
        for _ in 0..99 {
            est.observe(0, 10.0);
        }
        est.observe(0, 100.0);
        let expected = (99.0 * 10.0 + 1.0) / 100.0;
        assert!((est.values()[0] - expected).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn estimate_is_arithmetic_mean_of_rewards(
            latencies in proptest::collection::vec(1.0f64..1_000.0, 1..300),
            scale in 1.0f64..5_000.0,
        ) {
            let mut est = RewardEstimator::new(2, scale);
            let mut rewards = Vec::with_capacity(latencies.len());
            for &l in &latencies {
                rewards.push(est.observe(0, l));
            }
            let mean = rewards.iter().sum::<f64>() / rewards.len() as f64;
            let q = est.values()[0];
            prop_assert!((q - mean).abs() <= 1e-9 * mean.abs().max(1.0), "q={} mean={}", q, mean);
            prop_assert_eq!(est.counts()[0], latencies.len() as u64);
            // Untouched slot stays zeroed.
            prop_assert_eq!(est.values()[1], 0.0);
            prop_assert_eq!(est.counts()[1], 0);
        }

        #[test]
        fn lower_latency_gives_strictly_higher_reward(
            a in 0.001f64..1.0e6,
            factor in 1.000_001f64..100.0,
            scale in 0.1f64..1.0e4,
        ) {
            let b = a * factor;
            let est = RewardEstimator::new(1, scale);
            prop_assert!(est.reward(a) > est.reward(b));
        }
    }
}
