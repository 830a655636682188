//! Random-walk stand-in for real sensors.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::SamplerConfig;
use crate::sensor::SensorState;

/// Walks temperature and water level inside the configured bounds.
///
/// Each step moves temperature by a whole number of tenths in `[-1.0, 0.9]`
/// and water by `[-0.5, 0.4]`, then clamps.
pub struct Simulator {
    rng: SmallRng,
    config: SamplerConfig,
    temperature: f32,
    water: f32,
}

impl Simulator {
    pub fn new(config: &SamplerConfig) -> Self {
        Self::from_rng(config, SmallRng::from_os_rng())
    }

    pub fn with_seed(config: &SamplerConfig, seed: u64) -> Self {
        Self::from_rng(config, SmallRng::seed_from_u64(seed))
    }

    fn from_rng(config: &SamplerConfig, rng: SmallRng) -> Self {
        Self {
            rng,
            config: config.clone(),
            temperature: config.temperature_start,
            water: config.water_start,
        }
    }

    /// Advances both walks one step and publishes the result.
    pub fn sample(&mut self, sensors: &SensorState) {
        let dt = self.rng.random_range(-10..10) as f32 / 10.0;
        let dw = self.rng.random_range(-5..5) as f32 / 10.0;

        self.temperature = (self.temperature + dt)
            .clamp(self.config.temperature_min, self.config.temperature_max);
        self.water = (self.water + dw).clamp(self.config.water_min, self.config.water_max);

        sensors.set_temperature(self.temperature);
        sensors.set_water(self.water);
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn water(&self) -> f32 {
        self.water
    }
}
