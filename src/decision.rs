//! Selection envelope for policy outputs.
//!
//! Each `select` call returns the chosen server plus a small typed note saying how
//! the choice was made, so runs can count fallbacks and tests can assert on paths.

/// How a policy arrived at a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionNote {
    /// Uniform draw over all servers.
    Uniform,

    /// Next slot of the round-robin cycle.
    Cyclic,

    /// Roulette-wheel draw from the softmax distribution.
    SampledFromDistribution,

    /// Cumulative probability never reached the draw; the last server was chosen.
    NumericalFallbackToLastServer,
}

/// A single policy decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selection {
    /// Chosen server index, always in `[0, K)`.
    pub server: usize,
    pub note: SelectionNote,
}
