use rand::{rngs::StdRng, SeedableRng};

/// Asserts that a numerical value is in the provided interval `[a,b]` and panics
/// with a helpful message if not
///
/// ### Example
/// ```should_panic
/// # use snake_rl::assert_interval;
/// let value = 2.0;
/// assert_interval!(value, 0.0, 1.0);
/// ```
/// This will panic with the message "Invalid value for \`value\`. Must be in the interval \[0, 1\]."
#[macro_export]
macro_rules! assert_interval {
    ($var:expr, $a:expr, $b:expr) => {
        assert!(
            $var >= $a && $var <= $b,
            "Invalid value for `{}`. Must be in the interval [{}, {}].",
            stringify!($var),
            $a,
            $b,
        );
    };
}

/// Random stream used for food placement
pub const GAME_STREAM: u64 = 0x5eed_0001;
/// Random stream used for exploration and replay sampling
pub const AGENT_STREAM: u64 = 0x5eed_0002;

/// Build the random number generator for one stream of a run
///
/// With a seed, every stream is reproducible and independent of the others.
/// Without one, the generator is seeded from OS entropy.
pub fn seeded_rng(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ stream),
        None => StdRng::from_entropy(),
    }
}
