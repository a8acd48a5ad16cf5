//! Server selection policies.
//!
//! [`UniformRandom`], [`RoundRobin`] and [`Softmax`] share one capability,
//! [`SelectionPolicy::select`]: read the current [`RewardEstimator`] and return a
//! server index in `[0, K)`. [`Policy`] is the closed set of all three, dispatched
//! by an exhaustive `match`; [`PolicyKind`] is its label.
//!
//! # Example
//!
//! ```rust
//! use rand::{rngs::StdRng, SeedableRng};
//! use softlb::{Policy, PolicyKind, RewardEstimator, SelectionPolicy};
//!
//! let est = RewardEstimator::new(3, 1000.0);
//! let mut rng = StdRng::seed_from_u64(0);
//! let mut rr = Policy::new(PolicyKind::RoundRobin, 3, 1.5).unwrap();
//! assert_eq!(rr.select(&est, &mut rng).server, 0);
//! assert_eq!(rr.select(&est, &mut rng).server, 1);
//!
//! // Zero servers or a non-positive temperature never builds a policy.
//! assert!(Policy::new(PolicyKind::Softmax, 3, 0.0).is_err());
//! assert!(Policy::new(PolicyKind::Random, 0, 1.5).is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::alloc::{roulette_pick, softmax_probs};
use crate::{ConfigError, RewardEstimator, Selection, SelectionNote};

/// Common interface for the selection strategies.
///
/// Implementors are only constructed for `K >= 1` servers and always return an
/// index in `[0, K)`. The estimator passed to `select` must have the same `K`.
pub trait SelectionPolicy {
    /// Choose the server for the next request.
    fn select<R: Rng + ?Sized>(&mut self, est: &RewardEstimator, rng: &mut R) -> Selection;

    /// Return to the start-of-run state.
    fn reset(&mut self) {}

    /// Number of servers this policy was built for.
    fn servers(&self) -> usize;
}

fn check_servers(servers: usize) -> Result<usize, ConfigError> {
    if servers == 0 {
        return Err(ConfigError::NoServers);
    }
    Ok(servers)
}

/// Uniform random choice; ignores the estimator.
#[derive(Debug, Clone, Copy)]
pub struct UniformRandom {
    servers: usize,
}

impl UniformRandom {
    pub fn new(servers: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            servers: check_servers(servers)?,
        })
    }
}

impl SelectionPolicy for UniformRandom {
    fn select<R: Rng + ?Sized>(&mut self, _est: &RewardEstimator, rng: &mut R) -> Selection {
        Selection {
            server: rng.random_range(0..self.servers),
            note: SelectionNote::Uniform,
        }
    }

    fn servers(&self) -> usize {
        self.servers
    }
}

/// Fixed cyclic order starting at server 0.
#[derive(Debug, Clone, Copy)]
pub struct RoundRobin {
    servers: usize,
    cursor: usize,
}

impl RoundRobin {
    pub fn new(servers: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            servers: check_servers(servers)?,
            cursor: 0,
        })
    }
}

impl SelectionPolicy for RoundRobin {
    fn select<R: Rng + ?Sized>(&mut self, _est: &RewardEstimator, _rng: &mut R) -> Selection {
        let server = self.cursor;
        self.cursor = (self.cursor + 1) % self.servers;
        Selection {
            server,
            note: SelectionNote::Cyclic,
        }
    }

    fn reset(&mut self) {
        self.cursor = 0;
    }

    fn servers(&self) -> usize {
        self.servers
    }
}

/// Boltzmann exploration over the estimator's values.
///
/// Server `i` is drawn with probability proportional to `exp(Q[i] / temperature)`.
/// Small temperatures approach greedy argmax, large ones approach uniform.
#[derive(Debug, Clone, Copy)]
pub struct Softmax {
    servers: usize,
    temperature: f64,
}

impl Softmax {
    /// Rejects `servers == 0` and any temperature that is not finite and > 0.
    pub fn new(servers: usize, temperature: f64) -> Result<Self, ConfigError> {
        let servers = check_servers(servers)?;
        if !(temperature.is_finite() && temperature > 0.0) {
            return Err(ConfigError::Temperature(temperature));
        }
        Ok(Self {
            servers,
            temperature,
        })
    }

    /// Selection probabilities for the given values.
    pub fn probabilities(&self, values: &[f64]) -> Vec<f64> {
        softmax_probs(values, self.temperature)
    }

    /// Select with an explicit uniform draw `r` instead of an RNG.
    pub fn select_with_draw(&self, values: &[f64], r: f64) -> Selection {
        let pick = roulette_pick(&self.probabilities(values), r);
        Selection {
            server: pick.index,
            note: if pick.fell_through {
                SelectionNote::NumericalFallbackToLastServer
            } else {
                SelectionNote::SampledFromDistribution
            },
        }
    }
}

impl SelectionPolicy for Softmax {
    fn select<R: Rng + ?Sized>(&mut self, est: &RewardEstimator, rng: &mut R) -> Selection {
        let r: f64 = rng.random();
        self.select_with_draw(est.values(), r)
    }

    fn servers(&self) -> usize {
        self.servers
    }
}

/// Label for one of the three policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum PolicyKind {
    Random,
    RoundRobin,
    Softmax,
}

impl PolicyKind {
    /// All kinds, in comparison order.
    pub const ALL: [PolicyKind; 3] = [Self::Random, Self::RoundRobin, Self::Softmax];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::RoundRobin => "round-robin",
            Self::Softmax => "softmax",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = ConfigError;

    /// Case-insensitive; `_` is accepted in place of `-`. Anything else is an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "random" => Ok(Self::Random),
            "round-robin" => Ok(Self::RoundRobin),
            "softmax" => Ok(Self::Softmax),
            _ => Err(ConfigError::UnknownPolicy(s.to_string())),
        }
    }
}

/// A concrete policy instance.
#[derive(Debug, Clone, Copy)]
pub enum Policy {
    Random(UniformRandom),
    RoundRobin(RoundRobin),
    Softmax(Softmax),
}

impl Policy {
    /// Fresh start-of-run policy for `servers` servers.
    ///
    /// `temperature` is only read (and validated) by [`PolicyKind::Softmax`].
    pub fn new(kind: PolicyKind, servers: usize, temperature: f64) -> Result<Self, ConfigError> {
        Ok(match kind {
            PolicyKind::Random => Self::Random(UniformRandom::new(servers)?),
            PolicyKind::RoundRobin => Self::RoundRobin(RoundRobin::new(servers)?),
            PolicyKind::Softmax => Self::Softmax(Softmax::new(servers, temperature)?),
        })
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Self::Random(_) => PolicyKind::Random,
            Self::RoundRobin(_) => PolicyKind::RoundRobin,
            Self::Softmax(_) => PolicyKind::Softmax,
        }
    }
}

impl SelectionPolicy for Policy {
    fn select<R: Rng + ?Sized>(&mut self, est: &RewardEstimator, rng: &mut R) -> Selection {
        debug_assert_eq!(est.servers(), self.servers(), "estimator/policy server count");
        match self {
            Self::Random(p) => p.select(est, rng),
            Self::RoundRobin(p) => p.select(est, rng),
            Self::Softmax(p) => p.select(est, rng),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Random(p) => p.reset(),
            Self::RoundRobin(p) => p.reset(),
            Self::Softmax(p) => p.reset(),
        }
    }

    fn servers(&self) -> usize {
        match self {
            Self::Random(p) => p.servers(),
            Self::RoundRobin(p) => p.servers(),
            Self::Softmax(p) => p.servers(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn estimator_with(values: &[f64]) -> RewardEstimator {
        let mut est = RewardEstimator::new(values.len(), 1.0);
        for (i, &v) in values.iter().enumerate() {
            if v > 0.0 {
                // reward = 1 / latency, so latency = 1 / v gives Q[i] = v.
                est.observe(i, 1.0 / v);
            }
        }
        est
    }

    #[test]
    fn round_robin_cycles_from_zero() {
        let est = RewardEstimator::new(3, 1000.0);
        let mut rng = StdRng::seed_from_u64(0);
        let mut rr = RoundRobin::new(3).unwrap();
        let picks: Vec<usize> = (0..7).map(|_| rr.select(&est, &mut rng).server).collect();
        assert_eq!(picks, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn round_robin_reset_restarts_cycle() {
        let est = RewardEstimator::new(3, 1000.0);
        let mut rng = StdRng::seed_from_u64(0);
        let mut p = Policy::new(PolicyKind::RoundRobin, 3, 1.5).unwrap();
        p.select(&est, &mut rng);
        p.select(&est, &mut rng);
        p.reset();
        assert_eq!(p.select(&est, &mut rng).server, 0);
    }

    #[test]
    fn random_covers_every_server() {
        let est = RewardEstimator::new(4, 1000.0);
        let mut rng = StdRng::seed_from_u64(9);
        let mut p = UniformRandom::new(4).unwrap();
        let mut seen = [0u32; 4];
        for _ in 0..4_000 {
            let s = p.select(&est, &mut rng);
            assert_eq!(s.note, SelectionNote::Uniform);
            seen[s.server] += 1;
        }
        for c in seen {
            assert!((800..1_200).contains(&c), "seen={seen:?}");
        }
    }

    #[test]
    fn softmax_prefers_highest_value() {
        let est = estimator_with(&[8.3, 13.3, 5.0]);
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = Softmax::new(3, 1.5).unwrap();
        let mut counts = [0u32; 3];
        for _ in 0..2_000 {
            counts[p.select(&est, &mut rng).server] += 1;
        }
        assert!(counts[1] > counts[0] && counts[0] > counts[2], "counts={counts:?}");
    }

    #[test]
    fn softmax_with_all_zero_values_is_uniform() {
        let p = Softmax::new(3, 1.5).unwrap().probabilities(&[0.0, 0.0, 0.0]);
        for x in p {
            assert!((x - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn softmax_draw_past_cumulative_sum_returns_last_server() {
        let s = Softmax::new(3, 1.5).unwrap().select_with_draw(&[3.0, 1.0, 2.0], 1.5);
        assert_eq!(
            s,
            Selection {
                server: 2,
                note: SelectionNote::NumericalFallbackToLastServer
            }
        );
    }

    #[test]
    fn softmax_draw_at_zero_picks_first_server() {
        let s = Softmax::new(3, 1.5).unwrap().select_with_draw(&[3.0, 1.0, 2.0], 0.0);
        assert_eq!(s.server, 0);
        assert_eq!(s.note, SelectionNote::SampledFromDistribution);
    }

    #[test]
    fn softmax_rejects_invalid_temperature() {
        for t in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(Softmax::new(3, t), Err(ConfigError::Temperature(_))),
                "t={t}"
            );
            assert!(matches!(
                Policy::new(PolicyKind::Softmax, 3, t),
                Err(ConfigError::Temperature(_))
            ));
        }
        // Baselines ignore the temperature.
        assert!(Policy::new(PolicyKind::RoundRobin, 3, 0.0).is_ok());
    }

    #[test]
    fn zero_servers_is_rejected() {
        assert_eq!(UniformRandom::new(0).err(), Some(ConfigError::NoServers));
        assert_eq!(RoundRobin::new(0).err(), Some(ConfigError::NoServers));
        assert_eq!(Softmax::new(0, 1.5).err(), Some(ConfigError::NoServers));
        for k in PolicyKind::ALL {
            assert_eq!(Policy::new(k, 0, 1.5).err(), Some(ConfigError::NoServers));
        }
    }

    #[test]
    fn policy_reports_its_server_count() {
        for k in PolicyKind::ALL {
            assert_eq!(Policy::new(k, 5, 1.5).unwrap().servers(), 5);
        }
    }

    #[test]
    fn parses_labels_and_rejects_unknown() {
        assert_eq!("softmax".parse::<PolicyKind>(), Ok(PolicyKind::Softmax));
        assert_eq!("ROUND_ROBIN".parse::<PolicyKind>(), Ok(PolicyKind::RoundRobin));
        assert_eq!(" Random ".parse::<PolicyKind>(), Ok(PolicyKind::Random));
        assert_eq!(
            "softmx".parse::<PolicyKind>(),
            Err(ConfigError::UnknownPolicy("softmx".to_string()))
        );
        for k in PolicyKind::ALL {
            assert_eq!(k.to_string().parse::<PolicyKind>(), Ok(k));
        }
    }

    #[test]
    fn policy_kind_round_trips_through_constructor() {
        for k in PolicyKind::ALL {
            assert_eq!(Policy::new(k, 3, 1.5).unwrap().kind(), k);
        }
    }

    proptest! {
        #[test]
        fn every_policy_returns_index_in_range(
            seed in any::<u64>(),
            values in proptest::collection::vec(0.0f64..100.0, 1..8),
            temperature in 1.0e-3f64..1.0e3,
            steps in 1usize..64,
        ) {
            let est = estimator_with(&values);
            let k = values.len();
            let mut rng = StdRng::seed_from_u64(seed);
            for kind in PolicyKind::ALL {
                let mut p = Policy::new(kind, k, temperature).unwrap();
                for _ in 0..steps {
                    let s = p.select(&est, &mut rng);
                    prop_assert!(s.server < k, "kind={} server={} k={}", kind, s.server, k);
                }
            }
        }

        #[test]
        fn round_robin_covers_each_server_equally(
            k in 1usize..10,
            rounds in 1usize..50,
        ) {
            let est = RewardEstimator::new(k, 1000.0);
            let mut rng = StdRng::seed_from_u64(0);
            let mut p = RoundRobin::new(k).unwrap();
            let mut counts = vec![0usize; k];
            for t in 0..k * rounds {
                let s = p.select(&est, &mut rng).server;
                prop_assert_eq!(s, t % k);
                counts[s] += 1;
            }
            prop_assert!(counts.iter().all(|&c| c == rounds));
        }
    }
}
