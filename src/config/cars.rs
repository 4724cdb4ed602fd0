use serde::{Deserialize, Serialize};
use super::{ConfigError, Validate};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CarsConfig {
    pub simulation: SimulationSection,
    pub steering: SteeringConfig,
    pub appearance: Appearance,
    pub random: RandomConfig,
    pub performance: PerformanceConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationSection {
    pub total_cars: u32,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self { total_cars: 300 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SteeringConfig {
    pub steer_gain: f32,
    pub max_speed: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            steer_gain: 0.2,
            max_speed: 3.0,
        }
    }
}

/// Rendering hints only; the simulation never reads these.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Appearance {
    pub length: f32,
    pub color: String,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            length: 12.0,
            color: "#833aff".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RandomConfig {
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub timing_samples: u32,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self { timing_samples: 120 }
    }
}

fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

impl Validate for CarsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.total_cars == 0 {
            return Err(ConfigError::NoCars);
        }

        let steering = &self.steering;
        if !(steering.steer_gain >= 0.0) {
            return Err(ConfigError::InvalidSteerGain(steering.steer_gain));
        }
        if !(steering.max_speed > 0.0) {
            return Err(ConfigError::InvalidMaxSpeed(steering.max_speed));
        }

        if !(self.appearance.length > 0.0) {
            return Err(ConfigError::InvalidCarLength(self.appearance.length));
        }
        if !is_hex_color(&self.appearance.color) {
            return Err(ConfigError::InvalidColor(self.appearance.color.clone()));
        }

        if self.performance.timing_samples == 0 {
            return Err(ConfigError::NoTimingSamples);
        }

        Ok(())
    }
}
