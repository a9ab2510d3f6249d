//! Population growth: the target size of each new generation.

use serde::{Deserialize, Serialize};

/// Name of the growth model as written in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthKind {
    None,
    Exponential,
    Capacity,
    Founders,
}

/// A growth law with its parameters resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrowthModel {
    /// Constant size.
    None { pop_size: usize },
    /// `ceil(rate * prev)`.
    Exponential { rate: f64 },
    /// Logistic approach to `carrying_capacity`.
    Capacity { rate: f64, carrying_capacity: usize },
    /// Exponential growth, an optional bottleneck, then growth at `rate2`.
    /// Capped by `carrying_capacity` throughout.
    Founders {
        rate: f64,
        rate2: f64,
        carrying_capacity: usize,
        /// First bottleneck generation; 0 disables the bottleneck.
        bottleneck_generation: u32,
        bottleneck_pop_size: usize,
        num_bottleneck_generations: u32,
    },
}

impl GrowthModel {
    /// Target size of generation `gen` given the previous live size.
    pub fn target_size(&self, prev: usize, gen: u32) -> usize {
        let prev_f = prev as f64;
        match *self {
            Self::None { pop_size } => pop_size,
            Self::Exponential { rate } => (rate * prev_f).ceil() as usize,
            Self::Capacity {
                rate,
                carrying_capacity,
            } => {
                let k = carrying_capacity as f64;
                let next = (prev_f * (1.0 + rate * (1.0 - prev_f / k))).ceil();
                next.max(0.0) as usize
            }
            Self::Founders {
                rate,
                rate2,
                carrying_capacity,
                bottleneck_generation,
                bottleneck_pop_size,
                num_bottleneck_generations,
            } => {
                let bottleneck_end = bottleneck_generation.saturating_add(num_bottleneck_generations);
                let next = if bottleneck_generation == 0 || gen < bottleneck_generation {
                    (rate * prev_f).ceil() as usize
                } else if gen < bottleneck_end {
                    bottleneck_pop_size
                } else {
                    (rate2 * prev_f).ceil() as usize
                };
                next.min(carrying_capacity)
            }
        }
    }

    /// Whether the population size changes from one generation to the next.
    pub fn is_growing(&self) -> bool {
        !matches!(self, Self::None { .. })
    }

    /// Whether the target size can ever pass `max_pop_size`.
    pub fn can_exceed(&self, max_pop_size: usize) -> bool {
        match *self {
            Self::None { .. } => false,
            Self::Exponential { rate } => rate > 1.0,
            // Logistic steps with rate above 1 overshoot the capacity.
            Self::Capacity {
                rate,
                carrying_capacity,
            } => carrying_capacity > max_pop_size || rate > 1.0,
            Self::Founders {
                carrying_capacity, ..
            } => carrying_capacity > max_pop_size,
        }
    }
}
