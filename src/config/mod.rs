use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod route;
pub mod cars;

pub use route::*;
pub use cars::*;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub route: RouteConfig,
    pub cars: CarsConfig,
    /// Directory relative map paths are resolved against.
    pub base_dir: PathBuf,
}

impl SimulationConfig {
    pub fn new(route: RouteConfig, cars: CarsConfig) -> Self {
        Self {
            route,
            cars,
            base_dir: PathBuf::from("."),
        }
    }

    pub fn load_from_files(route_path: &str, cars_path: &str) -> Result<Self> {
        let route_content = std::fs::read_to_string(route_path)
            .with_context(|| format!("Failed to read route configuration {route_path}"))?;
        let cars_content = std::fs::read_to_string(cars_path)
            .with_context(|| format!("Failed to read cars configuration {cars_path}"))?;

        let mut config = Self::from_toml_strs(&route_content, &cars_content)
            .with_context(|| format!("Invalid configuration in {route_path} / {cars_path}"))?;
        config.base_dir = Path::new(route_path)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    pub fn from_toml_strs(route_content: &str, cars_content: &str) -> Result<Self> {
        let route: RouteConfig = toml::from_str(route_content).context("Failed to parse route TOML")?;
        let cars: CarsConfig = toml::from_str(cars_content).context("Failed to parse cars TOML")?;

        // Validate configurations
        route.validate()?;
        cars.validate()?;

        Ok(Self::new(route, cars))
    }

    /// Map text for the map layout, read from the inline `map` or from
    /// `map_file` under `base_dir`. `None` for the random layout.
    pub fn load_map_text(&self) -> Result<Option<String>> {
        let route = &self.route.route;
        if route.layout == LayoutKind::Random {
            return Ok(None);
        }
        if let Some(map) = &route.map {
            return Ok(Some(map.clone()));
        }
        match &route.map_file {
            Some(file) => {
                let path = self.base_dir.join(file);
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read map file {}", path.display()))?;
                Ok(Some(text))
            }
            None => Err(ConfigError::MissingMap.into()),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),
    #[error("World size must be finite, got {width}x{height}")]
    NonFiniteWorld { width: f32, height: f32 },
    #[error("World {width}x{height} with cell size {cell_size} needs more than {max} anchors")]
    TooManyAnchors { width: f32, height: f32, cell_size: f32, max: usize },
    #[error("World must be at least one cell in each dimension, got {width}x{height} with cell size {cell_size}")]
    WorldTooSmall { width: f32, height: f32, cell_size: f32 },
    #[error("Map layout needs either `map` or `map_file`")]
    MissingMap,
    #[error("Only one of `map` and `map_file` may be given")]
    AmbiguousMap,
    #[error("Total cars must be greater than zero")]
    NoCars,
    #[error("Steer gain must be non-negative, got {0}")]
    InvalidSteerGain(f32),
    #[error("Max speed must be positive, got {0}")]
    InvalidMaxSpeed(f32),
    #[error("Car length must be positive, got {0}")]
    InvalidCarLength(f32),
    #[error("Color must look like #rrggbb, got {0:?}")]
    InvalidColor(String),
    #[error("Timing samples must be greater than zero")]
    NoTimingSamples,
}

pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;
}
