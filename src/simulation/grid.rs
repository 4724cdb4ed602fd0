use super::{Point, WorldBounds};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(0);

/// Largest lattice a grid will build; bigger worlds get an empty grid.
pub const MAX_ANCHORS: usize = 1 << 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    East,
    South,
    West,
    North,
}

impl Direction {
    /// Order in which junction exits are listed.
    pub const ALL: [Direction; 4] = [Direction::East, Direction::South, Direction::West, Direction::North];

    /// `(dx, dy)` in lattice steps; y grows downwards.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::North => (0, -1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::North => Direction::South,
        }
    }

    pub fn arrow(self) -> char {
        match self {
            Direction::East => '>',
            Direction::South => 'v',
            Direction::West => '<',
            Direction::North => '^',
        }
    }
}

/// One cell of a textual map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapSymbol {
    /// One-way road: `>`, `v`, `<` or `^`.
    Flow(Direction),
    /// `x`: may exit in any direction its neighbours allow.
    Junction,
    /// Space or any unrecognised character.
    Blank,
}

impl MapSymbol {
    pub fn from_char(c: char) -> Self {
        match c {
            '>' => MapSymbol::Flow(Direction::East),
            'v' => MapSymbol::Flow(Direction::South),
            '<' => MapSymbol::Flow(Direction::West),
            '^' => MapSymbol::Flow(Direction::North),
            'x' => MapSymbol::Junction,
            _ => MapSymbol::Blank,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            MapSymbol::Flow(direction) => direction.arrow(),
            MapSymbol::Junction => 'x',
            MapSymbol::Blank => ' ',
        }
    }

    /// Directions a car may leave this cell in.
    ///
    /// `neighbour` returns the symbol one step away in a direction, or `None`
    /// outside the map. A junction exit is dropped when its neighbour is
    /// missing, blank, or a one-way road flowing straight back in.
    pub fn exit_directions<F>(self, neighbour: F) -> Vec<Direction>
    where
        F: Fn(Direction) -> Option<MapSymbol>,
    {
        match self {
            MapSymbol::Flow(direction) => vec![direction],
            MapSymbol::Junction => Direction::ALL
                .into_iter()
                .filter(|&direction| match neighbour(direction) {
                    None | Some(MapSymbol::Blank) => false,
                    Some(symbol) => symbol != MapSymbol::Flow(direction.opposite()),
                })
                .collect(),
            MapSymbol::Blank => Vec::new(),
        }
    }
}

/// Map text padded out to a rectangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapGrid {
    width: usize,
    height: usize,
    cells: Vec<MapSymbol>,
}

impl MapGrid {
    /// Parses map text. Never fails: short rows are padded with blanks and
    /// unknown characters read as blank.
    pub fn parse(text: &str) -> Self {
        let rows: Vec<Vec<MapSymbol>> = text
            .lines()
            .map(|line| line.chars().map(MapSymbol::from_char).collect())
            .collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let height = rows.len();

        let mut cells = Vec::with_capacity(width * height);
        for mut row in rows {
            row.resize(width, MapSymbol::Blank);
            cells.extend(row);
        }

        Self { width, height, cells }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn symbol(&self, col: isize, row: isize) -> Option<MapSymbol> {
        if col < 0 || row < 0 {
            return None;
        }
        let (col, row) = (col as usize, row as usize);
        if col >= self.width || row >= self.height {
            return None;
        }
        Some(self.cells[row * self.width + col])
    }

    pub fn exit_directions(&self, col: usize, row: usize) -> Vec<Direction> {
        let (col, row) = (col as isize, row as isize);
        match self.symbol(col, row) {
            Some(symbol) => symbol.exit_directions(|direction| {
                let (dx, dy) = direction.offset();
                self.symbol(col + dx, row + dy)
            }),
            None => Vec::new(),
        }
    }

    /// Number of junction and one-way cells.
    pub fn road_cells(&self) -> usize {
        self.cells.iter().filter(|s| **s != MapSymbol::Blank).count()
    }
}

impl std::fmt::Display for MapGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (row, line) in self.cells.chunks(self.width.max(1)).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for symbol in line {
                write!(f, "{}", symbol.to_char())?;
            }
        }
        Ok(())
    }
}

/// How a route grid's exits are produced.
#[derive(Debug, Clone)]
pub enum RouteLayout {
    Map(MapGrid),
    /// One random exit per anchor, circulating clockwise by quadrant.
    Random,
}

/// Identity of an anchor within one particular grid build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorId {
    pub generation: u64,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct Anchor {
    pub id: AnchorId,
    pub position: Point,
    /// Absolute world points reachable from here.
    pub exits: Vec<Point>,
}

impl Anchor {
    pub fn index(&self) -> usize {
        self.id.index
    }

    pub fn is_dead_end(&self) -> bool {
        self.exits.is_empty()
    }
}

/// Lattice of anchors spaced `cell_size` apart across the world.
///
/// Immutable once built; a resize builds a new grid with a new generation so
/// none of its anchors compare equal to the old ones.
#[derive(Debug, Clone)]
pub struct RouteGrid {
    generation: u64,
    cell_size: f32,
    width_in_anchors: usize,
    height_in_anchors: usize,
    anchors: Vec<Anchor>,
}

impl RouteGrid {
    fn with_exits<F>(cell_size: f32, world: &WorldBounds, mut exits_for: F) -> Self
    where
        F: FnMut(usize, usize, Point) -> Vec<Point>,
    {
        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        let (width_in_anchors, height_in_anchors) = lattice_size(world, cell_size);

        let mut anchors = Vec::with_capacity(width_in_anchors * height_in_anchors);
        for row in 0..height_in_anchors {
            for col in 0..width_in_anchors {
                let position = Point::new(col as f32 * cell_size, row as f32 * cell_size);
                anchors.push(Anchor {
                    id: AnchorId { generation, index: anchors.len() },
                    position,
                    exits: exits_for(col, row, position),
                });
            }
        }

        Self {
            generation,
            cell_size,
            width_in_anchors,
            height_in_anchors,
            anchors,
        }
    }

    /// Builds the grid by reading each anchor's exits off the map.
    pub fn from_map(map: &MapGrid, cell_size: f32, world: &WorldBounds) -> Self {
        Self::with_exits(cell_size, world, |col, row, position| {
            map.exit_directions(col, row)
                .into_iter()
                .map(|direction| step(position, direction, cell_size))
                .collect()
        })
    }

    /// Builds the grid with exactly one random exit per anchor.
    ///
    /// Each quadrant of the world offers two directions so that traffic
    /// circulates clockwise. Directions leading off the lattice are avoided
    /// unless nothing else remains.
    pub fn random<R: Rng + ?Sized>(cell_size: f32, world: &WorldBounds, rng: &mut R) -> Self {
        let (width_in_anchors, height_in_anchors) = lattice_size(world, cell_size);
        let center = Point::new(world.width / 2.0, world.height / 2.0);

        Self::with_exits(cell_size, world, |col, row, position| {
            let options = quadrant_options(position, center);
            let in_lattice: Vec<Direction> = options
                .iter()
                .copied()
                .filter(|&direction| {
                    let (dx, dy) = direction.offset();
                    let (c, r) = (col as isize + dx, row as isize + dy);
                    c >= 0 && r >= 0 && (c as usize) < width_in_anchors && (r as usize) < height_in_anchors
                })
                .collect();
            let pool: &[Direction] = if in_lattice.is_empty() { &options } else { &in_lattice };
            pool.choose(&mut *rng)
                .map(|&direction| vec![step(position, direction, cell_size)])
                .unwrap_or_default()
        })
    }

    pub fn build<R: Rng + ?Sized>(layout: &RouteLayout, cell_size: f32, world: &WorldBounds, rng: &mut R) -> Self {
        match layout {
            RouteLayout::Map(map) => Self::from_map(map, cell_size, world),
            RouteLayout::Random => Self::random(cell_size, world, rng),
        }
    }

    /// Anchor at the lattice corner closest to `position`.
    ///
    /// Returns `None` when the rounded corner falls outside the anchor list;
    /// callers treat that as "no anchor yet".
    pub fn nearest_anchor(&self, position: &Point) -> Option<&Anchor> {
        let d = self.cell_size;
        if !(position.x >= 0.0 && position.y >= 0.0) || d <= 0.0 {
            return None;
        }
        let round = |v: f32| {
            let offset = if v.rem_euclid(d) > d / 2.0 { 1 } else { 0 };
            (v / d).floor() as usize + offset
        };
        let (col, row) = (round(position.x), round(position.y));
        let index = row.checked_mul(self.width_in_anchors)?.checked_add(col)?;
        self.anchors.get(index)
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn anchor(&self, index: usize) -> Option<&Anchor> {
        self.anchors.get(index)
    }

    pub fn anchor_at(&self, col: usize, row: usize) -> Option<&Anchor> {
        if col >= self.width_in_anchors || row >= self.height_in_anchors {
            return None;
        }
        self.anchors.get(row * self.width_in_anchors + col)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn width_in_anchors(&self) -> usize {
        self.width_in_anchors
    }

    pub fn height_in_anchors(&self) -> usize {
        self.height_in_anchors
    }

    /// Anchors with at least one exit.
    pub fn routed_anchor_count(&self) -> usize {
        self.anchors.iter().filter(|a| !a.is_dead_end()).count()
    }
}

/// Anchors along each axis, or `(0, 0)` when the world is not finite or
/// the lattice would exceed [`MAX_ANCHORS`].
pub fn lattice_size(world: &WorldBounds, cell_size: f32) -> (usize, usize) {
    let along = |extent: f32| -> Option<usize> {
        if !(cell_size > 0.0 && cell_size.is_finite() && extent.is_finite()) {
            return None;
        }
        let count = (extent / cell_size).floor().max(0.0);
        (count <= MAX_ANCHORS as f32).then_some(count as usize)
    };
    match (along(world.width), along(world.height)) {
        (Some(w), Some(h)) if w.checked_mul(h).is_some_and(|n| n <= MAX_ANCHORS) => (w, h),
        _ => (0, 0),
    }
}

fn step(position: Point, direction: Direction, cell_size: f32) -> Point {
    let (dx, dy) = direction.offset();
    Point::new(position.x + dx as f32 * cell_size, position.y + dy as f32 * cell_size)
}

fn quadrant_options(position: Point, center: Point) -> [Direction; 2] {
    let left = position.x < center.x;
    let top = position.y < center.y;
    match (left, top) {
        (true, true) => [Direction::East, Direction::North],
        (false, true) => [Direction::East, Direction::South],
        (false, false) => [Direction::South, Direction::West],
        (true, false) => [Direction::West, Direction::North],
    }
}
