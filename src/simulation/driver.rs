use super::{
    Anchor, Car, CarStateCounts, MapGrid, RouteGrid, RouteLayout, SimulationState, SteeringParams, TrafficManager,
    WorldBounds,
};
use crate::compute::{BackendKind, ComputeBackend, SimulationBackend};
use crate::config::{LayoutKind, SimulationConfig};
use anyhow::{bail, Result};
use log::info;

/// Tunables of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    pub total_cars: usize,
    pub cell_size: f32,
    pub steering: SteeringParams,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            total_cars: 300,
            cell_size: 100.0,
            steering: SteeringParams::default(),
        }
    }
}

/// A self-contained simulation: route grid, cars, and the backend that
/// advances them. Hosts call [`Simulation::tick`] once per frame and
/// [`Simulation::resize`] when their surface changes size.
pub struct Simulation {
    params: SimulationParams,
    layout: RouteLayout,
    state: SimulationState,
    traffic: TrafficManager,
    backend: ComputeBackend,
}

impl Simulation {
    /// Builds a simulation from loaded configuration. `map_text` is the
    /// host-fetched map and is required for the map layout.
    pub fn new(config: &SimulationConfig, map_text: Option<&str>, backend: BackendKind) -> Result<Self> {
        let route = &config.route.route;
        let layout = match (route.layout, map_text) {
            (LayoutKind::Map, Some(text)) => RouteLayout::Map(MapGrid::parse(text)),
            (LayoutKind::Map, None) => bail!("Route '{}' uses the map layout but no map text was supplied", route.name),
            (LayoutKind::Random, _) => RouteLayout::Random,
        };

        let params = SimulationParams {
            total_cars: config.cars.simulation.total_cars as usize,
            cell_size: route.cell_size,
            steering: SteeringParams::from(&config.cars.steering),
        };
        let world = WorldBounds::new(route.world.width, route.world.height);

        Ok(Self::from_parts(params, layout, world, config.cars.random.seed, backend))
    }

    pub fn from_parts(
        params: SimulationParams,
        layout: RouteLayout,
        world: WorldBounds,
        seed: Option<u64>,
        backend: BackendKind,
    ) -> Self {
        let mut traffic = TrafficManager::new(params.total_cars, params.cell_size, seed);
        let grid = traffic.build_grid(&layout, params.cell_size, &world);
        let mut state = SimulationState::new(grid, world);
        traffic.populate(&mut state);

        Self {
            params,
            layout,
            state,
            traffic,
            backend: ComputeBackend::new(backend, params.steering),
        }
    }

    /// Advances every car by one step.
    pub fn tick(&mut self) -> Result<()> {
        self.backend.update(&mut self.state)
    }

    /// Rebuilds the route grid for a new world size. Cars keep their
    /// position and velocity and re-resolve their anchor on the next tick.
    /// Sizes that are not finite and positive leave the world untouched.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<()> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            bail!("Cannot resize world to {}x{}", width, height);
        }
        let world = WorldBounds::new(width, height);
        info!(
            "Resizing world {:.0}x{:.0} -> {:.0}x{:.0}",
            self.state.world.width, self.state.world.height, width, height
        );
        self.state.grid = self.traffic.build_grid(&self.layout, self.params.cell_size, &world);
        self.state.world = world;
        Ok(())
    }

    pub fn cars(&self) -> &[Car] {
        &self.state.cars
    }

    pub fn anchors(&self) -> &[Anchor] {
        self.state.grid.anchors()
    }

    pub fn grid(&self) -> &RouteGrid {
        &self.state.grid
    }

    pub fn world(&self) -> WorldBounds {
        self.state.world
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn tick_count(&self) -> u64 {
        self.state.tick
    }

    pub fn state_counts(&self) -> CarStateCounts {
        self.state.state_counts()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.get_name()
    }

    pub fn backend_supports_parallel(&self) -> bool {
        self.backend.supports_parallel()
    }
}
