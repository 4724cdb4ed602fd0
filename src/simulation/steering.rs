use super::{behavior, AnchorEvent, Car, RouteGrid, Vec2, VectorExt, WorldBounds};
use crate::config::SteeringConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringParams {
    /// Magnitude of the seek acceleration.
    pub steer_gain: f32,
    /// Velocity clamp.
    pub max_speed: f32,
}

impl Default for SteeringParams {
    fn default() -> Self {
        Self {
            steer_gain: 0.2,
            max_speed: 3.0,
        }
    }
}

impl From<&SteeringConfig> for SteeringParams {
    fn from(config: &SteeringConfig) -> Self {
        Self {
            steer_gain: config.steer_gain,
            max_speed: config.max_speed,
        }
    }
}

/// Seek steering and integration for one car per call.
///
/// Reads only the grid and writes only the car it is given, so cars can be
/// stepped in any order or in parallel.
#[derive(Debug, Clone)]
pub struct SteeringEngine {
    params: SteeringParams,
}

impl SteeringEngine {
    pub fn new(params: SteeringParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SteeringParams {
        &self.params
    }

    /// Advances one car by one tick and reports how its anchor changed.
    pub fn step_car(&self, car: &mut Car, grid: &RouteGrid, world: &WorldBounds) -> AnchorEvent {
        let event = behavior::update_route(car, grid);
        let acceleration = self.seek_force(car);
        self.integrate(car, acceleration, world);
        event
    }

    /// Acceleration towards the checkpoint, zero while coasting.
    pub fn seek_force(&self, car: &Car) -> Vec2 {
        match car.checkpoint {
            Some(checkpoint) => (checkpoint - car.position).normalize_or_zero() * self.params.steer_gain,
            None => Vec2::zeros(),
        }
    }

    pub fn integrate(&self, car: &mut Car, acceleration: Vec2, world: &WorldBounds) {
        car.acceleration = acceleration;
        car.velocity = (car.velocity + acceleration).limit(self.params.max_speed);
        car.position = world.wrap(car.position + car.velocity);
    }
}

impl Default for SteeringEngine {
    fn default() -> Self {
        Self::new(SteeringParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{CarId, MapGrid, Point};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn car(position: Point, velocity: Vec2) -> Car {
        Car::new(CarId(0), position, velocity, StdRng::seed_from_u64(0))
    }

    #[test]
    fn car_on_single_exit_anchor_moves_toward_exit() {
        let world = WorldBounds::new(300.0, 300.0);
        let grid = RouteGrid::from_map(&MapGrid::parse("   \n v \n   "), 100.0, &world);
        let start = Point::new(100.0, 100.0);
        let exit = Point::new(100.0, 200.0);
        let mut car = car(start, Vec2::zeros());

        SteeringEngine::default().step_car(&mut car, &grid, &world);

        assert_eq!(car.checkpoint, Some(exit));
        let displacement = car.position - start;
        assert!(displacement.dot(&(exit - start)) > 0.0);
        assert!((car.velocity.norm() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn step_reports_anchor_changes() {
        let world = WorldBounds::new(300.0, 300.0);
        let grid = RouteGrid::from_map(&MapGrid::parse("   \n v \n   "), 100.0, &world);
        let engine = SteeringEngine::default();
        let mut car = car(Point::new(100.0, 100.0), Vec2::zeros());

        let first = engine.step_car(&mut car, &grid, &world);
        assert_eq!(first, AnchorEvent::Changed { checkpoint: Some(Point::new(100.0, 200.0)) });
        assert!(first.is_changed());
        assert_eq!(engine.step_car(&mut car, &grid, &world), AnchorEvent::Unchanged);
        assert!((car.acceleration.norm() - 0.2).abs() < 1e-6);

        let empty = RouteGrid::from_map(&MapGrid::parse(""), 100.0, &WorldBounds::new(0.0, 0.0));
        assert_eq!(engine.step_car(&mut car, &empty, &world), AnchorEvent::Unresolved);
    }

    #[test]
    fn coasting_preserves_velocity() {
        let world = WorldBounds::new(300.0, 300.0);
        let grid = RouteGrid::from_map(&MapGrid::parse(""), 100.0, &world);
        let mut car = car(Point::new(120.0, 120.0), Vec2::new(1.0, -2.0));

        SteeringEngine::default().step_car(&mut car, &grid, &world);

        assert!(car.anchor.is_some());
        assert!(!car.has_checkpoint());
        assert_eq!(car.velocity, Vec2::new(1.0, -2.0));
        assert_eq!(car.position, Point::new(121.0, 118.0));
    }

    #[test]
    fn velocity_is_clamped_to_max_speed() {
        let world = WorldBounds::new(1000.0, 1000.0);
        let grid = RouteGrid::from_map(&MapGrid::parse(">>>>>>>>>>"), 100.0, &world);
        let engine = SteeringEngine::default();
        let mut car = car(Point::new(0.0, 0.0), Vec2::new(2.9, 0.0));

        for _ in 0..200 {
            engine.step_car(&mut car, &grid, &world);
            assert!(car.velocity.norm() <= 3.0 + 1e-5);
        }
    }

    #[test]
    fn position_wraps_past_the_right_edge() {
        let world = WorldBounds::new(400.0, 300.0);
        let grid = RouteGrid::from_map(&MapGrid::parse(""), 100.0, &world);
        let mut car = car(Point::new(399.0, 150.0), Vec2::new(5.0, 0.0));

        SteeringEngine::default().step_car(&mut car, &grid, &world);

        assert!(car.position.x >= 0.0 && car.position.x < 5.0, "{:?}", car.position);
        assert_eq!(car.position.y, 150.0);
    }

    #[test]
    fn position_wraps_past_the_top_edge() {
        let world = WorldBounds::new(400.0, 300.0);
        let grid = RouteGrid::from_map(&MapGrid::parse(""), 100.0, &world);
        let mut car = car(Point::new(50.0, 1.0), Vec2::new(0.0, -3.0));

        SteeringEngine::default().step_car(&mut car, &grid, &world);

        assert!((car.position.y - 298.0).abs() < 1e-4, "{:?}", car.position);
    }

    #[test]
    fn zero_gain_never_steers() {
        let world = WorldBounds::new(300.0, 300.0);
        let grid = RouteGrid::from_map(&MapGrid::parse(">>>"), 100.0, &world);
        let engine = SteeringEngine::new(SteeringParams { steer_gain: 0.0, max_speed: 3.0 });
        let mut car = car(Point::new(0.0, 0.0), Vec2::zeros());

        engine.step_car(&mut car, &grid, &world);

        assert!(car.has_checkpoint());
        assert_eq!(car.position, Point::new(0.0, 0.0));
    }
}
