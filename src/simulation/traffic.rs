use super::{Car, CarId, Point, RouteGrid, RouteLayout, SimulationState, Vec2, VectorExt, WorldBounds};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Uniform};
use std::f32::consts::TAU;

/// Owns the simulation's master random stream: spawns the fixed car
/// population and (re)builds route grids.
pub struct TrafficManager {
    total_cars: usize,
    spawn_inset: f32,
    next_car_id: usize,
    rng: StdRng,
}

impl TrafficManager {
    pub fn new(total_cars: usize, spawn_inset: f32, seed: Option<u64>) -> Self {
        let rng = if let Some(seed) = seed {
            StdRng::seed_from_u64(seed)
        } else {
            StdRng::from_entropy()
        };

        Self {
            total_cars,
            spawn_inset,
            next_car_id: 0,
            rng,
        }
    }

    pub fn total_cars(&self) -> usize {
        self.total_cars
    }

    pub fn build_grid(&mut self, layout: &RouteLayout, cell_size: f32, world: &WorldBounds) -> RouteGrid {
        let grid = RouteGrid::build(layout, cell_size, world, &mut self.rng);

        let kind = match layout {
            RouteLayout::Map(map) => {
                debug!("Map is {}x{} with {} road cells", map.width(), map.height(), map.road_cells());
                "map"
            }
            RouteLayout::Random => "random",
        };
        info!(
            "Built {} route grid: {}x{} anchors ({} routed) over {:.0}x{:.0}",
            kind,
            grid.width_in_anchors(),
            grid.height_in_anchors(),
            grid.routed_anchor_count(),
            world.width,
            world.height
        );
        if grid.routed_anchor_count() == 0 {
            warn!("Route grid has no exits; every car will coast");
        }

        grid
    }

    /// Spawns cars until the configured population is reached.
    pub fn populate(&mut self, state: &mut SimulationState) {
        let missing = self.total_cars.saturating_sub(state.cars.len());
        for _ in 0..missing {
            let car = self.spawn_car(&state.world);
            state.add_car(car);
        }
        info!("Spawned {} cars ({} total)", missing, state.cars.len());
    }

    /// A car at a random inset position with a random unit heading.
    pub fn spawn_car(&mut self, world: &WorldBounds) -> Car {
        let x = sample_axis(&mut self.rng, world.width, self.spawn_inset);
        let y = sample_axis(&mut self.rng, world.height, self.spawn_inset);
        let heading = Uniform::new(0.0, TAU).sample(&mut self.rng);
        let car_rng = StdRng::seed_from_u64(self.rng.gen());

        let id = CarId(self.next_car_id);
        self.next_car_id += 1;

        debug!("Spawned car {} at ({:.1}, {:.1}) heading {:.2} rad", id.0, x, y, heading);
        Car::new(id, Point::new(x, y), Vec2::from_angle(heading), car_rng)
    }
}

fn sample_axis<R: Rng + ?Sized>(rng: &mut R, extent: f32, inset: f32) -> f32 {
    let (low, high) = if extent > 2.0 * inset { (inset, extent - inset) } else { (0.0, extent) };
    if high > low {
        Uniform::new(low, high).sample(rng)
    } else {
        low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::MapGrid;

    fn empty_state(world: WorldBounds) -> SimulationState {
        SimulationState::new(RouteGrid::from_map(&MapGrid::parse(""), 100.0, &world), world)
    }

    #[test]
    fn populate_spawns_inside_the_inset_world() {
        let world = WorldBounds::new(800.0, 600.0);
        let mut manager = TrafficManager::new(250, 100.0, Some(1));
        let mut state = empty_state(world);

        manager.populate(&mut state);

        assert_eq!(state.cars.len(), 250);
        for (i, car) in state.cars.iter().enumerate() {
            assert_eq!(car.id, CarId(i));
            assert!(car.position.x >= 100.0 && car.position.x < 700.0);
            assert!(car.position.y >= 100.0 && car.position.y < 500.0);
            assert!((car.speed() - 1.0).abs() < 1e-5);
            assert!(car.anchor.is_none());
        }
    }

    #[test]
    fn populate_tops_up_only() {
        let world = WorldBounds::new(800.0, 600.0);
        let mut manager = TrafficManager::new(10, 100.0, Some(1));
        let mut state = empty_state(world);
        manager.populate(&mut state);
        manager.populate(&mut state);
        assert_eq!(state.cars.len(), 10);
    }

    #[test]
    fn tiny_world_falls_back_to_full_extent() {
        let world = WorldBounds::new(150.0, 0.0);
        let mut manager = TrafficManager::new(1, 100.0, Some(2));
        let car = manager.spawn_car(&world);
        assert!(car.position.x >= 0.0 && car.position.x < 150.0);
        assert_eq!(car.position.y, 0.0);
    }

    #[test]
    fn same_seed_spawns_same_cars() {
        let world = WorldBounds::new(800.0, 600.0);
        let spawn = |seed| {
            let mut manager = TrafficManager::new(5, 100.0, Some(seed));
            (0..5)
                .map(|_| {
                    let car = manager.spawn_car(&world);
                    (car.position, car.velocity)
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(spawn(9), spawn(9));
        assert_ne!(spawn(9), spawn(10));
    }
}
