//! Allocation helpers (softmax probabilities, roulette-wheel sampling).
//!
//! Both are pure functions so the numerical behavior can be checked without an RNG.

/// Compute a stable softmax distribution over per-server values.
///
/// - `temperature` controls sharpness and must be finite and > 0. [`Softmax::new`]
///   rejects anything else, so callers going through a policy never violate this.
/// - Uses the standard max-trick: every weight is `exp((v - max) / t)`, so weights lie
///   in `(0, 1]` and the maximizing index gets exactly `1.0`. The result is identical
///   to the unshifted softmax, which would overflow for large values.
/// - Returns a distribution that sums to 1 (or empty if input is empty).
///
/// [`Softmax::new`]: crate::Softmax::new
pub fn softmax_probs(values: &[f64], temperature: f64) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    debug_assert!(
        temperature.is_finite() && temperature > 0.0,
        "temperature must be finite and > 0 (got {temperature})"
    );

    let max_value = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut out: Vec<f64> = Vec::with_capacity(values.len());
    let mut denom = 0.0;
    for &v in values {
        let x = ((v - max_value) / temperature).exp();
        denom += x;
        out.push(x);
    }
    if denom <= 0.0 || !denom.is_finite() {
        // Degenerate fallback (non-finite values): uniform.
        let n = values.len() as f64;
        return vec![1.0 / n; values.len()];
    }

    for p in &mut out {
        *p /= denom;
    }
    out
}

/// Outcome of a roulette-wheel draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pick {
    /// Chosen index.
    pub index: usize,
    /// The cumulative sum never reached the draw, so the last index was returned.
    pub fell_through: bool,
}

/// Roulette-wheel selection: the first index whose cumulative probability reaches `r`.
///
/// `r` is normally a uniform draw in `[0, 1)`. If rounding leaves the cumulative sum
/// short of `r` for every index, the last index is returned with `fell_through = true`.
/// `probs` must be non-empty.
pub fn roulette_pick(probs: &[f64], r: f64) -> Pick {
    let mut cdf = 0.0;
    for (index, &p) in probs.iter().enumerate() {
        cdf += p;
        if r <= cdf {
            return Pick {
                index,
                fell_through: false,
            };
        }
    }
    // Numerical fallback.
    Pick {
        index: probs.len().saturating_sub(1),
        fell_through: true,
    }
}
