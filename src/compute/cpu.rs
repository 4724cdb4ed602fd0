use crate::simulation::{SimulationState, SteeringEngine, SteeringParams};
use anyhow::Result;
use super::SimulationBackend;

/// Steps cars one after another in creation order.
pub struct CpuBackend {
    steering: SteeringEngine,
}

impl CpuBackend {
    pub fn new(params: SteeringParams) -> Self {
        Self {
            steering: SteeringEngine::new(params),
        }
    }
}

impl SimulationBackend for CpuBackend {
    fn update(&mut self, state: &mut SimulationState) -> Result<()> {
        let SimulationState {
            cars,
            grid,
            world,
            tick,
            anchor_changes,
        } = state;

        for car in cars.iter_mut() {
            if self.steering.step_car(car, grid, world).is_changed() {
                *anchor_changes += 1;
            }
        }

        *tick += 1;
        Ok(())
    }

    fn get_name(&self) -> &'static str {
        "CPU"
    }

    fn supports_parallel(&self) -> bool {
        false
    }
}
