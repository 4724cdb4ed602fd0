use instant::Instant;
use rand::rngs::StdRng;
use std::time::Duration;

pub mod behavior;
pub mod driver;
pub mod grid;
pub mod steering;
pub mod traffic;
pub mod vector;

pub use behavior::*;
pub use driver::*;
pub use grid::*;
pub use steering::*;
pub use traffic::*;
pub use vector::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CarId(pub usize);

/// Where a car is in its routing state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarState {
    NoAnchor,
    Seeking,
    Coasting,
}

#[derive(Debug, Clone)]
pub struct Car {
    pub id: CarId,
    pub position: Point,
    pub velocity: Vec2,
    /// Acceleration applied on the last tick.
    pub acceleration: Vec2,
    pub anchor: Option<AnchorId>,
    pub checkpoint: Option<Point>,
    /// Per-car stream for checkpoint choices.
    pub rng: StdRng,
}

impl Car {
    pub fn new(id: CarId, position: Point, velocity: Vec2, rng: StdRng) -> Self {
        Self {
            id,
            position,
            velocity,
            acceleration: Vec2::zeros(),
            anchor: None,
            checkpoint: None,
            rng,
        }
    }

    pub fn has_checkpoint(&self) -> bool {
        self.checkpoint.is_some()
    }

    pub fn state(&self) -> CarState {
        match (self.anchor, self.checkpoint) {
            (None, _) => CarState::NoAnchor,
            (Some(_), Some(_)) => CarState::Seeking,
            (Some(_), None) => CarState::Coasting,
        }
    }

    /// Direction of travel in radians, for renderers.
    pub fn heading(&self) -> f32 {
        self.velocity.angle_of()
    }

    pub fn speed(&self) -> f32 {
        self.velocity.norm()
    }
}

/// Extent of the toroidal world; positions wrap at its edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

impl WorldBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Single-step wrap into `[0, width) x [0, height)`; enough while a
    /// tick moves less than the world size.
    pub fn wrap(&self, p: Point) -> Point {
        Point::new(wrap_axis(p.x, self.width), wrap_axis(p.y, self.height))
    }

    pub fn contains(&self, p: &Point) -> bool {
        p.x >= 0.0 && p.x < self.width && p.y >= 0.0 && p.y < self.height
    }
}

fn wrap_axis(mut v: f32, bound: f32) -> f32 {
    if v < 0.0 {
        v += bound;
    }
    // A tiny negative plus the bound can round up to the bound itself.
    if v >= bound {
        v -= bound;
    }
    v
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CarStateCounts {
    pub no_anchor: usize,
    pub seeking: usize,
    pub coasting: usize,
}

#[derive(Debug, Clone)]
pub struct SimulationState {
    pub cars: Vec<Car>,
    pub grid: RouteGrid,
    pub world: WorldBounds,
    pub tick: u64,
    /// Cars that moved onto a new anchor, summed over all ticks.
    pub anchor_changes: u64,
}

impl SimulationState {
    pub fn new(grid: RouteGrid, world: WorldBounds) -> Self {
        Self {
            cars: Vec::new(),
            grid,
            world,
            tick: 0,
            anchor_changes: 0,
        }
    }

    pub fn add_car(&mut self, car: Car) {
        self.cars.push(car);
    }

    pub fn state_counts(&self) -> CarStateCounts {
        let mut counts = CarStateCounts::default();
        for car in &self.cars {
            match car.state() {
                CarState::NoAnchor => counts.no_anchor += 1,
                CarState::Seeking => counts.seeking += 1,
                CarState::Coasting => counts.coasting += 1,
            }
        }
        counts
    }

    pub fn average_speed(&self) -> f32 {
        if self.cars.is_empty() {
            return 0.0;
        }
        self.cars.iter().map(Car::speed).sum::<f32>() / self.cars.len() as f32
    }

    /// Mean magnitude of the acceleration applied on the last tick.
    pub fn average_acceleration(&self) -> f32 {
        if self.cars.is_empty() {
            return 0.0;
        }
        self.cars.iter().map(|c| c.acceleration.norm()).sum::<f32>() / self.cars.len() as f32
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FrameTiming {
    pub frame_time: Duration,
    pub simulation_time: Duration,
}

/// Rolling window of frame and tick timings for the host loop.
#[derive(Debug)]
pub struct PerformanceTracker {
    samples: Vec<FrameTiming>,
    max_samples: usize,
    pending_simulation_time: Duration,
    current_frame_start: Option<Instant>,
    current_sim_start: Option<Instant>,
}

impl PerformanceTracker {
    pub fn new(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            samples: Vec::with_capacity(max_samples),
            max_samples,
            pending_simulation_time: Duration::ZERO,
            current_frame_start: None,
            current_sim_start: None,
        }
    }

    pub fn start_frame(&mut self) {
        self.current_frame_start = Some(Instant::now());
        self.pending_simulation_time = Duration::ZERO;
    }

    pub fn start_simulation(&mut self) {
        self.current_sim_start = Some(Instant::now());
    }

    pub fn end_simulation(&mut self) {
        if let Some(start) = self.current_sim_start.take() {
            self.pending_simulation_time += start.elapsed();
        }
    }

    pub fn end_frame(&mut self) {
        if let Some(start) = self.current_frame_start.take() {
            self.record(FrameTiming {
                frame_time: start.elapsed(),
                simulation_time: self.pending_simulation_time,
            });
        }
    }

    pub fn record(&mut self, timing: FrameTiming) {
        if self.samples.len() >= self.max_samples {
            self.samples.remove(0);
        }
        self.samples.push(timing);
    }

    pub fn average_frame_time(&self) -> Duration {
        self.average(|s| s.frame_time)
    }

    pub fn average_simulation_time(&self) -> Duration {
        self.average(|s| s.simulation_time)
    }

    fn average(&self, field: impl Fn(&FrameTiming) -> Duration) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.samples.iter().map(field).sum();
        total / self.samples.len() as u32
    }

    pub fn fps(&self) -> f32 {
        let avg_frame_time = self.average_frame_time();
        if avg_frame_time.is_zero() {
            return 0.0;
        }
        1.0 / avg_frame_time.as_secs_f32()
    }
}
