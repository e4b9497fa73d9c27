use crate::error::ConfigError;

/// An implementation of a time-decaying value
pub trait Decay {
    /// Calculate value at time `t`
    fn evaluate(&self, t: f32) -> f32;
}

fn validate(rate: f32, vi: f32, vf: f32) -> Result<(), ConfigError> {
    ((rate >= 0.0 && vi >= vf) || (rate < 0.0 && vi <= vf))
        .then_some(())
        .ok_or_else(|| ConfigError::Validation(String::from("`vi - vf` must have same sign as `rate`")))
}

/// v(t) = max(v<sub>i</sub> - rt, v<sub>f</sub>)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Linear {
    rate: f32,
    vi: f32,
    vf: f32,
}

impl Linear {
    pub fn new(rate: f32, vi: f32, vf: f32) -> Result<Self, ConfigError> {
        validate(rate, vi, vf)?;
        Ok(Self { rate, vi, vf })
    }

    /// Decay from `vi` to `vf` over `steps` units of time, then hold at `vf`
    pub fn over(steps: u32, vi: f32, vf: f32) -> Result<Self, ConfigError> {
        if steps == 0 {
            return Err(ConfigError::Validation(String::from(
                "decay must span at least one step",
            )));
        }
        Self::new((vi - vf) / steps as f32, vi, vf)
    }
}

impl Decay for Linear {
    fn evaluate(&self, t: f32) -> f32 {
        let &Self { rate, vi, vf } = self;
        if rate >= 0.0 {
            (vi - rate * t).max(vf)
        } else {
            (vi - rate * t).min(vf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_functional() {
        assert!(validate(1.0, 1.0, 0.0).is_ok());
        assert!(validate(1.0, -1.0, 0.0).is_err());
        assert!(validate(-1.0, 1.0, 0.0).is_err());
        assert!(validate(-1.0, -1.0, 0.0).is_ok());
        assert!(validate(0.0, 0.0, 0.0).is_ok(), "flat schedule allowed");
    }

    #[test]
    fn linear_decay() {
        let x = Linear::new(0.5, 2.0, 0.5).unwrap();
        assert_eq!(x.evaluate(0.0), 2.0);
        assert_eq!(x.evaluate(1.0), 1.5);
        assert_eq!(x.evaluate(10.0), 0.5);
    }

    #[test]
    fn linear_decay_over_steps() {
        let x = Linear::over(80, 0.4, 0.0).unwrap();
        assert_eq!(x.evaluate(0.0), 0.4);
        assert!((x.evaluate(40.0) - 0.2).abs() < 1e-6);
        assert!(x.evaluate(80.0) < 1e-6, "reaches the floor");
        assert_eq!(x.evaluate(500.0), 0.0, "stays at the floor");
        assert!(Linear::over(0, 0.4, 0.0).is_err());
    }
}
