use crate::simulation::{SimulationState, SteeringEngine, SteeringParams};
use anyhow::Result;
use rayon::prelude::*;
use super::SimulationBackend;

/// Steps cars across the rayon pool. Cars only read the shared grid and
/// carry their own random stream, so results match [`super::CpuBackend`].
pub struct ParallelBackend {
    steering: SteeringEngine,
}

impl ParallelBackend {
    pub fn new(params: SteeringParams) -> Self {
        Self {
            steering: SteeringEngine::new(params),
        }
    }
}

impl SimulationBackend for ParallelBackend {
    fn update(&mut self, state: &mut SimulationState) -> Result<()> {
        let SimulationState {
            cars,
            grid,
            world,
            tick,
            anchor_changes,
        } = state;
        let steering = &self.steering;
        let (grid, world) = (&*grid, &*world);

        let changed = cars
            .par_iter_mut()
            .map(|car| steering.step_car(car, grid, world))
            .filter(|event| event.is_changed())
            .count();

        *anchor_changes += changed as u64;
        *tick += 1;
        Ok(())
    }

    fn get_name(&self) -> &'static str {
        "Parallel"
    }

    fn supports_parallel(&self) -> bool {
        true
    }
}
