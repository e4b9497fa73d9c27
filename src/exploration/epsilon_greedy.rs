use rand::Rng;

use crate::{assert_interval, decay::Decay};

use super::Choice;

/// Epsilon greedy exploration policy with time-decaying epsilon threshold
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<D: Decay> {
    epsilon: D,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay strategy
    ///
    /// **Panics** if the schedule starts outside the interval `[0,1]`
    pub fn new(decay: D) -> Self {
        let start = decay.evaluate(0.0);
        assert_interval!(start, 0.0, 1.0);
        Self { epsilon: decay }
    }

    /// Exploration probability at time `t`, clamped to `[0,1]`
    pub fn epsilon(&self, t: u32) -> f32 {
        self.epsilon.evaluate(t as f32).clamp(0.0, 1.0)
    }

    /// Invoke epsilon greedy policy at time `t`
    pub fn choose(&self, t: u32, rng: &mut impl Rng) -> Choice {
        if rng.gen::<f32>() < self.epsilon(t) {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }
}
