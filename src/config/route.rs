use serde::{Deserialize, Serialize};
use super::{ConfigError, Validate};
use crate::simulation::MAX_ANCHORS;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RouteConfig {
    pub route: Route,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// Exits read from map text.
    #[default]
    Map,
    /// One random exit per anchor.
    Random,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Route {
    pub name: String,
    pub description: String,
    pub layout: LayoutKind,
    /// Path to the map text, relative to the route file.
    #[serde(default)]
    pub map_file: Option<String>,
    /// Inline map text; alternative to `map_file`.
    #[serde(default)]
    pub map: Option<String>,
    /// Spacing of the anchor lattice in world units.
    pub cell_size: f32,
    pub world: WorldSize,
}

impl Default for Route {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            description: String::new(),
            layout: LayoutKind::Map,
            map_file: Some("map.txt".to_string()),
            map: None,
            cell_size: 100.0,
            world: WorldSize::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorldSize {
    pub width: f32,
    pub height: f32,
}

impl Default for WorldSize {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

impl Validate for RouteConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let route = &self.route;

        if !(route.cell_size > 0.0 && route.cell_size.is_finite()) {
            return Err(ConfigError::InvalidCellSize(route.cell_size));
        }

        let world = &route.world;
        if !(world.width.is_finite() && world.height.is_finite()) {
            return Err(ConfigError::NonFiniteWorld {
                width: world.width,
                height: world.height,
            });
        }
        if !(world.width >= route.cell_size && world.height >= route.cell_size) {
            return Err(ConfigError::WorldTooSmall {
                width: world.width,
                height: world.height,
                cell_size: route.cell_size,
            });
        }
        let anchors = (world.width as f64 / route.cell_size as f64).floor()
            * (world.height as f64 / route.cell_size as f64).floor();
        if anchors > MAX_ANCHORS as f64 {
            return Err(ConfigError::TooManyAnchors {
                width: world.width,
                height: world.height,
                cell_size: route.cell_size,
                max: MAX_ANCHORS,
            });
        }

        if route.layout == LayoutKind::Map {
            match (&route.map, &route.map_file) {
                (None, None) => return Err(ConfigError::MissingMap),
                (Some(_), Some(_)) => return Err(ConfigError::AmbiguousMap),
                _ => {}
            }
        }

        Ok(())
    }
}
