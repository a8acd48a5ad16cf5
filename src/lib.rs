//! `softlb`: softmax (Boltzmann) server selection under drifting latency.
//!
//! Models a small pool of backend servers whose latency characteristics drift over
//! time, and compares three dispatch policies on mean observed latency:
//!
//! - [`UniformRandom`]: uniform draw per request.
//! - [`RoundRobin`]: fixed cyclic order.
//! - [`Softmax`]: learns a per-server value online and samples servers with
//!   probability proportional to `exp(Q / temperature)`.
//!
//! **Per request:** the policy reads the [`RewardEstimator`] → picks a server →
//! [`LatencyEnv`] samples a latency for it (and drifts its hidden mean) → the
//! estimator turns latency into `reward = C / latency` and updates that server's
//! incremental mean.
//!
//! **Goals:**
//! - **Seedable**: every random draw comes from an injected [`rand::Rng`], so runs
//!   are reproducible with `StdRng::seed_from_u64`.
//! - **Fresh state per run**: each run clones the starting environment and zeroes
//!   the estimator; nothing is shared between runs.
//! - **Closed policy set**: [`PolicyKind`] is an enum; unknown labels are a
//!   [`ConfigError`], never a silent fallback.
//!
//! **Non-goals:**
//! - No real network calls, no concurrent dispatch, no persistence.
//! - The estimator never forgets: old rewards keep full weight even after drift.
//!
//! # Example
//!
//! ```rust
//! use rand::{rngs::StdRng, SeedableRng};
//! use softlb::{PolicyKind, SimConfig, Simulation};
//!
//! let sim = Simulation::new(SimConfig {
//!     total_requests: 2_000,
//!     ..SimConfig::default()
//! })
//! .unwrap();
//! let mut rng = StdRng::seed_from_u64(7);
//! let mean = sim.run_policy(PolicyKind::Softmax, &mut rng);
//! assert!(mean > 0.0);
//! ```

#![forbid(unsafe_code)]

mod error;
pub use error::*;

mod config;
pub use config::*;

mod alloc;
pub use alloc::*;

mod decision;
pub use decision::*;

mod environment;
pub use environment::*;

mod estimator;
pub use estimator::*;

mod policy;
pub use policy::*;

mod sim;
pub use sim::*;

mod harness;
pub use harness::*;
