use serde::{Deserialize, Serialize};

/// Upper bound (inclusive) of months with the current mode and the probability to reconsider the
/// mode choice within that bound.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct InertiaBucket {
    pub max_months: u32,
    pub probability: f64,
}

/// Behavioral stickiness as a discrete time Markov process. The state is the number of months an
/// agent has used its current mode, bucketed into regimes. Recent switchers reconsider often,
/// long term users rarely.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct InertiaPolicy {
    /// Checked in order, the first bucket with `months <= max_months` applies.
    pub buckets: Vec<InertiaBucket>,
    /// Applies when no bucket matches.
    pub otherwise: f64,
}

impl Default for InertiaPolicy {
    fn default() -> Self {
        InertiaPolicy {
            buckets: vec![
                InertiaBucket {
                    max_months: 1,
                    probability: 0.8,
                },
                InertiaBucket {
                    max_months: 3,
                    probability: 0.4,
                },
                InertiaBucket {
                    max_months: 6,
                    probability: 0.2,
                },
            ],
            otherwise: 0.1,
        }
    }
}

impl InertiaPolicy {
    pub fn reconsider_probability(&self, months_with_current_mode: u32) -> f64 {
        self.buckets
            .iter()
            .find(|b| months_with_current_mode <= b.max_months)
            .map(|b| b.probability)
            .unwrap_or(self.otherwise)
    }

    /// `draw` is expected to be uniform in [0, 1).
    pub fn reconsiders(&self, months_with_current_mode: u32, draw: f64) -> bool {
        draw < self.reconsider_probability(months_with_current_mode)
    }

    /// Buckets must be sorted ascending by their bound and all probabilities within [0, 1].
    pub fn is_valid(&self) -> bool {
        let sorted = self
            .buckets
            .windows(2)
            .all(|w| w[0].max_months < w[1].max_months);
        let in_range = self
            .buckets
            .iter()
            .map(|b| b.probability)
            .chain(std::iter::once(self.otherwise))
            .all(|p| (0. ..=1.).contains(&p));
        sorted && in_range
    }
}
